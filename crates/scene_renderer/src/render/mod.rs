//! # Rendering
//!
//! GPU-facing half of the renderer, built on the [`GraphicsDevice`] seam:
//!
//! - **Resources**: shader programs, uploaded geometry, materials and
//!   drawable bindings
//! - **Targets**: the shadow depth map and the intermediate colour target
//! - **View**: the orbiting camera and the directional sun
//! - **Passes**: shadow, geometry and composite, run in that order each frame

pub mod device;
pub mod recording;
pub mod shader;
pub mod mesh;
pub mod material;
pub mod drawable;
pub mod targets;
pub mod camera;
pub mod light;
pub mod passes;

pub use device::{GraphicsDevice, UniformValue};
pub use recording::{DeviceCommand, RecordingDevice};
pub use shader::{ShaderLibrary, ShaderProgram, ShaderSources};
pub use mesh::GeometryRecord;
pub use material::Material;
pub use drawable::DrawableBinding;
pub use targets::{ColorTarget, ShadowMap};
pub use camera::OrbitCamera;
pub use light::{LightState, SunLight};
pub use passes::{Compositor, GeometryPass, PassStats, ShadowPass};

use device::ShaderStage;

/// Errors raised while creating GPU resources
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A shader stage failed to compile
    #[error("{stage} shader of program '{label}' failed to compile: {log}")]
    ShaderCompile {
        /// Program label
        label: String,
        /// Failing stage
        stage: ShaderStage,
        /// Compiler output
        log: String,
    },

    /// A program failed to link
    #[error("program '{label}' failed to link: {log}")]
    ProgramLink {
        /// Program label
        label: String,
        /// Linker output
        log: String,
    },

    /// A render target is not usable
    #[error("{target} framebuffer incomplete: {status}")]
    IncompleteFramebuffer {
        /// Which target
        target: &'static str,
        /// Backend status text
        status: String,
    },

    /// A shader override file could not be read
    #[error("cannot read shader source {path}: {message}")]
    ShaderSource {
        /// File path
        path: String,
        /// IO error text
        message: String,
    },
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
