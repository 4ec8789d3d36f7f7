//! Shader programs
//!
//! [`ShaderProgram`] compiles and links one vertex/fragment pair and wraps
//! name-based uniform and attribute access. [`ShaderLibrary`] holds the three
//! programs the frame pipeline uses.

use std::path::Path;
use std::rc::Rc;

use crate::config::ShaderConfig;

use super::device::{
    AttribLocation, GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage, UniformValue,
};
use super::{RenderError, RenderResult};

/// A linked shader program
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    handle: ProgramHandle,
}

impl ShaderProgram {
    /// Compile both stages and link them.
    ///
    /// A stage that fails to compile yields [`RenderError::ShaderCompile`], a
    /// failed link [`RenderError::ProgramLink`]; both carry the backend log.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<Self> {
        let vertex = compile(device, label, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile(device, label, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                device.delete_shader(vertex);
                return Err(e);
            }
        };

        let handle = device.create_program(vertex, fragment);
        device.delete_shader(vertex);
        device.delete_shader(fragment);

        if !device.program_link_status(handle) {
            let log = device.program_info_log(handle);
            device.delete_program(handle);
            return Err(RenderError::ProgramLink {
                label: label.to_string(),
                log,
            });
        }

        log::debug!("Linked shader program '{label}' ({handle:?})");
        Ok(Self {
            label: label.to_string(),
            handle,
        })
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Device handle
    pub const fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Make this program current
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.use_program(Some(self.handle));
    }

    /// Write a uniform by name; uniforms the program does not use are skipped
    pub fn set(&self, device: &mut dyn GraphicsDevice, name: &str, value: UniformValue) {
        match device.uniform_location(self.handle, name) {
            Some(location) => device.set_uniform(location, value),
            None => log::trace!("Program '{}' has no active uniform {name}", self.label),
        }
    }

    /// Location of a vertex attribute, if the program reads it
    pub fn attribute(&self, device: &dyn GraphicsDevice, name: &str) -> Option<AttribLocation> {
        device.attrib_location(self.handle, name)
    }

    /// Release the program
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        device.delete_program(self.handle);
    }
}

fn compile(
    device: &mut dyn GraphicsDevice,
    label: &str,
    stage: ShaderStage,
    source: &str,
) -> RenderResult<ShaderHandle> {
    let shader = device.create_shader(stage, source);
    if device.shader_compile_status(shader) {
        return Ok(shader);
    }

    let log = device.shader_info_log(shader);
    device.delete_shader(shader);
    Err(RenderError::ShaderCompile {
        label: label.to_string(),
        stage,
        log,
    })
}

/// GLSL sources for every program in the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    /// Lit vertex stage
    pub lit_vertex: String,
    /// Lit fragment stage
    pub lit_fragment: String,
    /// Depth-only vertex stage
    pub shadow_vertex: String,
    /// Depth-only fragment stage
    pub shadow_fragment: String,
    /// Fullscreen vertex stage
    pub composite_vertex: String,
    /// Fullscreen fragment stage
    pub composite_fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            lit_vertex: include_str!("../../shaders/lit.vert").to_string(),
            lit_fragment: include_str!("../../shaders/lit.frag").to_string(),
            shadow_vertex: include_str!("../../shaders/shadow.vert").to_string(),
            shadow_fragment: include_str!("../../shaders/shadow.frag").to_string(),
            composite_vertex: include_str!("../../shaders/composite.vert").to_string(),
            composite_fragment: include_str!("../../shaders/composite.frag").to_string(),
        }
    }
}

impl ShaderSources {
    /// Read all six stages from a directory
    pub fn from_directory(directory: impl AsRef<Path>) -> RenderResult<Self> {
        let directory = directory.as_ref();
        let read = |file: &str| {
            let path = directory.join(file);
            std::fs::read_to_string(&path).map_err(|e| RenderError::ShaderSource {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };

        Ok(Self {
            lit_vertex: read("lit.vert")?,
            lit_fragment: read("lit.frag")?,
            shadow_vertex: read("shadow.vert")?,
            shadow_fragment: read("shadow.frag")?,
            composite_vertex: read("composite.vert")?,
            composite_fragment: read("composite.frag")?,
        })
    }

    /// Embedded sources, or the configured directory when one is set
    pub fn from_config(config: &ShaderConfig) -> RenderResult<Self> {
        match &config.directory {
            Some(directory) => {
                log::info!("Loading shader overrides from {directory}");
                Self::from_directory(directory)
            }
            None => Ok(Self::default()),
        }
    }
}

/// The three programs of the frame pipeline
#[derive(Debug)]
pub struct ShaderLibrary {
    /// Shaded colour with soft shadows; shared with every drawable
    pub lit: Rc<ShaderProgram>,
    /// Depth-only shadow caster
    pub shadow: ShaderProgram,
    /// Fullscreen texture copy
    pub composite: ShaderProgram,
}

impl ShaderLibrary {
    /// Compile and link every program
    pub fn new(device: &mut dyn GraphicsDevice, sources: &ShaderSources) -> RenderResult<Self> {
        let lit = ShaderProgram::new(device, "lit", &sources.lit_vertex, &sources.lit_fragment)?;
        let shadow = ShaderProgram::new(device, "shadow", &sources.shadow_vertex, &sources.shadow_fragment)?;
        let composite = ShaderProgram::new(
            device,
            "composite",
            &sources.composite_vertex,
            &sources.composite_fragment,
        )?;

        Ok(Self {
            lit: Rc::new(lit),
            shadow,
            composite,
        })
    }

    /// Release every program
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        self.lit.destroy(device);
        self.shadow.destroy(device);
        self.composite.destroy(device);
    }
}
