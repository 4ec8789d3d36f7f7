//! Headless graphics device that records every command
//!
//! [`RecordingDevice`] keeps just enough state to behave like a GL context
//! (handle allocation, buffer contents, program interfaces parsed from the
//! GLSL source, framebuffer completeness) and appends every state change and
//! draw to a command log. The headless viewer renders through it and the test
//! suite asserts against the log.

use std::collections::{HashMap, HashSet};

use super::device::{
    AttribLocation, BufferHandle, BufferTarget, Capability, ClearFlags, DepthAttachment, DepthFunc,
    Face, FramebufferDesc, FramebufferHandle, FramebufferStatus, GraphicsDevice, IndexType,
    ProgramHandle, RenderbufferHandle, ShaderHandle, ShaderStage, TextureDesc, TextureFormat,
    TextureHandle, UniformLocation, UniformValue,
};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Buffer created
    CreateBuffer {
        /// New handle
        buffer: BufferHandle,
        /// Binding target
        target: BufferTarget,
        /// Size in bytes
        len: usize,
    },
    /// Buffer released
    DeleteBuffer(BufferHandle),
    /// Texture created
    CreateTexture(TextureHandle, TextureDesc),
    /// Texture released
    DeleteTexture(TextureHandle),
    /// Depth renderbuffer created
    CreateRenderbuffer(RenderbufferHandle, u32, u32),
    /// Renderbuffer released
    DeleteRenderbuffer(RenderbufferHandle),
    /// Framebuffer created
    CreateFramebuffer(FramebufferHandle, FramebufferDesc),
    /// Framebuffer released
    DeleteFramebuffer(FramebufferHandle),
    /// Framebuffer bound, `None` is the default output
    BindFramebuffer(Option<FramebufferHandle>),
    /// Viewport changed
    Viewport(u32, u32),
    /// Clear colour changed
    ClearColor([f32; 4]),
    /// Buffers cleared
    Clear(ClearFlags),
    /// Capability enabled
    Enable(Capability),
    /// Capability disabled
    Disable(Capability),
    /// Cull face selected
    CullFace(Face),
    /// Depth function selected
    DepthFunc(DepthFunc),
    /// Depth offset set
    PolygonOffset(f32, f32),
    /// Program made current
    UseProgram(Option<ProgramHandle>),
    /// Uniform written on the current program
    SetUniform {
        /// Program the uniform belongs to
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Written value
        value: UniformValue,
    },
    /// Attribute sourced from a buffer
    BindAttribute {
        /// Attribute name
        name: String,
        /// Source buffer
        buffer: BufferHandle,
        /// Components per vertex
        components: u32,
    },
    /// Attribute detached
    DisableAttribute(String),
    /// Element buffer bound
    BindIndexBuffer(Option<BufferHandle>),
    /// Texture bound to a unit
    BindTexture(u32, Option<TextureHandle>),
    /// Non-indexed draw
    DrawArrays {
        /// Current program
        program: Option<ProgramHandle>,
        /// Bound framebuffer
        framebuffer: Option<FramebufferHandle>,
        /// Vertex count
        count: u32,
    },
    /// Indexed draw
    DrawElements {
        /// Current program
        program: Option<ProgramHandle>,
        /// Bound framebuffer
        framebuffer: Option<FramebufferHandle>,
        /// Index count
        count: u32,
        /// Index width
        index_type: IndexType,
    },
}

impl DeviceCommand {
    /// Whether this command submits geometry
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::DrawArrays { .. } | Self::DrawElements { .. })
    }
}

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    compiled: bool,
    log: String,
    uniforms: Vec<String>,
    inputs: Vec<String>,
}

#[derive(Debug)]
struct ProgramRecord {
    linked: bool,
    log: String,
    uniforms: HashMap<String, UniformLocation>,
    attributes: HashMap<String, AttribLocation>,
}

/// Recording implementation of [`GraphicsDevice`]
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_handle: u32,
    next_uniform: i32,
    commands: Vec<DeviceCommand>,
    buffers: HashMap<BufferHandle, (BufferTarget, Vec<u8>)>,
    textures: HashMap<TextureHandle, TextureDesc>,
    renderbuffers: HashMap<RenderbufferHandle, (u32, u32)>,
    framebuffers: HashMap<FramebufferHandle, FramebufferStatus>,
    shaders: HashMap<ShaderHandle, ShaderRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    uniform_names: HashMap<UniformLocation, (ProgramHandle, String)>,
    attribute_names: HashMap<(ProgramHandle, AttribLocation), String>,
    enabled: HashSet<Capability>,
    current_program: Option<ProgramHandle>,
    current_framebuffer: Option<FramebufferHandle>,
    fail_next_compile: Option<String>,
    fail_next_link: Option<String>,
    incomplete_status: Option<String>,
}

impl RecordingDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next shader compilation fail with `log`
    pub fn fail_next_compile(&mut self, log: impl Into<String>) {
        self.fail_next_compile = Some(log.into());
    }

    /// Make the next program link fail with `log`
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.fail_next_link = Some(log.into());
    }

    /// Report framebuffers created from now on as incomplete, `None` to stop
    pub fn set_incomplete_framebuffers(&mut self, status: Option<String>) {
        self.incomplete_status = status;
    }

    /// All commands recorded so far
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Take the command log, leaving it empty
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded draw calls in submission order
    pub fn draws(&self) -> impl Iterator<Item = &DeviceCommand> + '_ {
        self.commands.iter().filter(|c| c.is_draw())
    }

    /// Bytes currently stored in a live buffer
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|(_, data)| data.as_slice())
    }

    /// Number of buffers not yet deleted
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of textures not yet deleted
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Description of a live texture
    pub fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(&texture)
    }

    /// Whether a framebuffer has been created and not deleted
    pub fn is_live_framebuffer(&self, framebuffer: FramebufferHandle) -> bool {
        self.framebuffers.contains_key(&framebuffer)
    }

    /// Name a uniform location was handed out for
    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        self.uniform_names.get(&location).map(|(_, name)| name.as_str())
    }

    /// Last value written to `name` on `program`
    pub fn last_uniform(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|command| match command {
            DeviceCommand::SetUniform { program: p, name: n, value } if *p == program && n == name => {
                Some(*value)
            }
            _ => None,
        })
    }

    /// Whether a capability is currently enabled
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    /// Currently bound framebuffer
    pub const fn bound_framebuffer(&self) -> Option<FramebufferHandle> {
        self.current_framebuffer
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn record(&mut self, command: DeviceCommand) {
        log::trace!("RecordingDevice: {command:?}");
        self.commands.push(command);
    }

    fn attachment_size(&self, attachment: DepthAttachment) -> Option<(u32, u32)> {
        match attachment {
            DepthAttachment::Texture(t) => self
                .textures
                .get(&t)
                .filter(|d| d.format == TextureFormat::Depth24)
                .map(|d| (d.width, d.height)),
            DepthAttachment::Renderbuffer(r) => self.renderbuffers.get(&r).copied(),
        }
    }

    fn check_attachments(&self, desc: &FramebufferDesc) -> FramebufferStatus {
        if desc.color.is_none() && desc.depth.is_none() {
            return FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT".into());
        }

        let color = match desc.color {
            Some(t) => match self.textures.get(&t) {
                Some(d) if d.format == TextureFormat::Rgba8 => Some((d.width, d.height)),
                _ => return FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_ATTACHMENT".into()),
            },
            None => None,
        };
        let depth = match desc.depth {
            Some(a) => match self.attachment_size(a) {
                Some(size) => Some(size),
                None => return FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_ATTACHMENT".into()),
            },
            None => None,
        };

        match (color, depth) {
            (Some(c), Some(d)) if c != d => {
                FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_DIMENSIONS".into())
            }
            _ => FramebufferStatus::Complete,
        }
    }
}

/// Names declared by `uniform` and, for vertex shaders, `in`/`attribute` lines
fn parse_interface(source: &str, stage: ShaderStage) -> (Vec<String>, Vec<String>) {
    let mut uniforms = Vec::new();
    let mut inputs = Vec::new();

    for line in source.lines() {
        let code = line.split("//").next().unwrap_or_default().trim();
        let Some(declaration) = code.strip_suffix(';') else {
            continue;
        };
        let tokens: Vec<&str> = declaration.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }
        let name = tokens[tokens.len() - 1];
        let name = name.split('[').next().unwrap_or(name).to_string();

        match tokens[0] {
            "uniform" => uniforms.push(name),
            "in" | "attribute" if stage == ShaderStage::Vertex => inputs.push(name),
            _ => {}
        }
    }

    (uniforms, inputs)
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferHandle {
        let buffer = BufferHandle(self.allocate());
        self.buffers.insert(buffer, (target, data.to_vec()));
        self.record(DeviceCommand::CreateBuffer {
            buffer,
            target,
            len: data.len(),
        });
        buffer
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.record(DeviceCommand::DeleteBuffer(buffer));
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> TextureHandle {
        let texture = TextureHandle(self.allocate());
        self.textures.insert(texture, *desc);
        self.record(DeviceCommand::CreateTexture(texture, *desc));
        texture
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.record(DeviceCommand::DeleteTexture(texture));
    }

    fn create_depth_renderbuffer(&mut self, width: u32, height: u32) -> RenderbufferHandle {
        let renderbuffer = RenderbufferHandle(self.allocate());
        self.renderbuffers.insert(renderbuffer, (width, height));
        self.record(DeviceCommand::CreateRenderbuffer(renderbuffer, width, height));
        renderbuffer
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle) {
        self.renderbuffers.remove(&renderbuffer);
        self.record(DeviceCommand::DeleteRenderbuffer(renderbuffer));
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> FramebufferHandle {
        let framebuffer = FramebufferHandle(self.allocate());
        let status = match &self.incomplete_status {
            Some(status) => FramebufferStatus::Incomplete(status.clone()),
            None => self.check_attachments(desc),
        };
        self.framebuffers.insert(framebuffer, status);
        self.record(DeviceCommand::CreateFramebuffer(framebuffer, *desc));
        framebuffer
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(&framebuffer);
        if self.current_framebuffer == Some(framebuffer) {
            self.current_framebuffer = None;
        }
        self.record(DeviceCommand::DeleteFramebuffer(framebuffer));
    }

    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> FramebufferStatus {
        self.framebuffers
            .get(&framebuffer)
            .cloned()
            .unwrap_or_else(|| FramebufferStatus::Incomplete("FRAMEBUFFER_UNDEFINED".into()))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.current_framebuffer = framebuffer;
        self.record(DeviceCommand::BindFramebuffer(framebuffer));
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.record(DeviceCommand::Viewport(width, height));
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.record(DeviceCommand::ClearColor(rgba));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(DeviceCommand::Clear(flags));
    }

    fn enable(&mut self, capability: Capability) {
        self.enabled.insert(capability);
        self.record(DeviceCommand::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.enabled.remove(&capability);
        self.record(DeviceCommand::Disable(capability));
    }

    fn cull_face(&mut self, face: Face) {
        self.record(DeviceCommand::CullFace(face));
    }

    fn depth_func(&mut self, func: DepthFunc) {
        self.record(DeviceCommand::DepthFunc(func));
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.record(DeviceCommand::PolygonOffset(factor, units));
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderHandle {
        let shader = ShaderHandle(self.allocate());
        let (uniforms, inputs) = parse_interface(source, stage);
        let (compiled, log) = match self.fail_next_compile.take() {
            Some(log) => (false, log),
            None => (true, String::new()),
        };
        self.shaders.insert(
            shader,
            ShaderRecord {
                stage,
                compiled,
                log,
                uniforms,
                inputs,
            },
        );
        shader
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> ProgramHandle {
        let program = ProgramHandle(self.allocate());

        let stages_ok = matches!(self.shaders.get(&vertex), Some(s) if s.compiled && s.stage == ShaderStage::Vertex)
            && matches!(self.shaders.get(&fragment), Some(s) if s.compiled && s.stage == ShaderStage::Fragment);
        let (linked, log) = match self.fail_next_link.take() {
            Some(log) => (false, log),
            None if !stages_ok => (false, "attached shaders are missing or did not compile".to_string()),
            None => (true, String::new()),
        };

        let mut uniform_names: Vec<String> = Vec::new();
        let mut input_names: Vec<String> = Vec::new();
        for shader in [vertex, fragment] {
            if let Some(record) = self.shaders.get(&shader) {
                for name in &record.uniforms {
                    if !uniform_names.contains(name) {
                        uniform_names.push(name.clone());
                    }
                }
                input_names.extend(record.inputs.iter().cloned());
            }
        }

        let mut uniforms = HashMap::new();
        for name in uniform_names {
            self.next_uniform += 1;
            let location = UniformLocation(self.next_uniform);
            self.uniform_names.insert(location, (program, name.clone()));
            uniforms.insert(name, location);
        }

        let mut attributes = HashMap::new();
        for (index, name) in (0u32..).zip(input_names) {
            let location = AttribLocation(index);
            self.attribute_names.insert((program, location), name.clone());
            attributes.insert(name, location);
        }

        self.programs.insert(
            program,
            ProgramRecord {
                linked,
                log,
                uniforms,
                attributes,
            },
        );
        program
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.current_program = program;
        self.record(DeviceCommand::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.get(name).copied())
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        self.programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.attributes.get(name).copied())
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some((program, name)) = self.uniform_names.get(&location).cloned() else {
            log::warn!("RecordingDevice: write to unknown uniform location {location:?}");
            return;
        };
        if self.current_program != Some(program) {
            log::warn!("RecordingDevice: uniform {name} written while its program is not current");
        }
        self.record(DeviceCommand::SetUniform { program, name, value });
    }

    fn bind_vertex_attribute(&mut self, location: AttribLocation, buffer: BufferHandle, components: u32) {
        let name = self.attribute_name(location);
        self.record(DeviceCommand::BindAttribute {
            name,
            buffer,
            components,
        });
    }

    fn disable_vertex_attribute(&mut self, location: AttribLocation) {
        let name = self.attribute_name(location);
        self.record(DeviceCommand::DisableAttribute(name));
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) {
        self.record(DeviceCommand::BindIndexBuffer(buffer));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) {
        self.record(DeviceCommand::BindTexture(unit, texture));
    }

    fn draw_arrays(&mut self, count: u32) {
        self.record(DeviceCommand::DrawArrays {
            program: self.current_program,
            framebuffer: self.current_framebuffer,
            count,
        });
    }

    fn draw_elements(&mut self, count: u32, index_type: IndexType) {
        self.record(DeviceCommand::DrawElements {
            program: self.current_program,
            framebuffer: self.current_framebuffer,
            count,
            index_type,
        });
    }
}

impl RecordingDevice {
    fn attribute_name(&self, location: AttribLocation) -> String {
        self.current_program
            .and_then(|program| self.attribute_names.get(&(program, location)))
            .cloned()
            .unwrap_or_else(|| format!("attribute#{}", location.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::TextureFilter;

    const VERTEX: &str = "
        #version 330 core
        in vec3 aPosition;
        in vec3 aNormal; // per-vertex
        uniform mat4 uModel;
        void main() { gl_Position = uModel * vec4(aPosition, 1.0); }
    ";
    const FRAGMENT: &str = "
        #version 330 core
        uniform vec3 uBaseColor;
        uniform mat4 uModel;
        out vec4 fragColor;
        void main() { fragColor = vec4(uBaseColor, 1.0); }
    ";

    fn program(device: &mut RecordingDevice) -> ProgramHandle {
        let vs = device.create_shader(ShaderStage::Vertex, VERTEX);
        let fs = device.create_shader(ShaderStage::Fragment, FRAGMENT);
        device.create_program(vs, fs)
    }

    #[test]
    fn test_program_interface_comes_from_source() {
        let mut device = RecordingDevice::new();
        let program = program(&mut device);

        assert!(device.program_link_status(program));
        assert!(device.uniform_location(program, "uModel").is_some());
        assert!(device.uniform_location(program, "uBaseColor").is_some());
        assert!(device.uniform_location(program, "uMissing").is_none());
        assert_eq!(device.attrib_location(program, "aNormal"), Some(AttribLocation(1)));
        assert!(device.attrib_location(program, "fragColor").is_none());
    }

    #[test]
    fn test_injected_failures() {
        let mut device = RecordingDevice::new();
        device.fail_next_compile("0:3: syntax error");
        let vs = device.create_shader(ShaderStage::Vertex, VERTEX);
        assert!(!device.shader_compile_status(vs));
        assert_eq!(device.shader_info_log(vs), "0:3: syntax error");

        device.fail_next_link("varying mismatch");
        let program = program(&mut device);
        assert!(!device.program_link_status(program));
        assert_eq!(device.program_info_log(program), "varying mismatch");
    }

    #[test]
    fn test_framebuffer_completeness() {
        let mut device = RecordingDevice::new();
        let color = device.create_texture(&TextureDesc {
            width: 4,
            height: 4,
            format: TextureFormat::Rgba8,
            filter: TextureFilter::Nearest,
        });
        let depth = device.create_depth_renderbuffer(4, 4);
        let small_depth = device.create_depth_renderbuffer(2, 2);

        let complete = device.create_framebuffer(&FramebufferDesc {
            color: Some(color),
            depth: Some(DepthAttachment::Renderbuffer(depth)),
        });
        let mismatched = device.create_framebuffer(&FramebufferDesc {
            color: Some(color),
            depth: Some(DepthAttachment::Renderbuffer(small_depth)),
        });
        let empty = device.create_framebuffer(&FramebufferDesc::default());

        assert_eq!(device.framebuffer_status(complete), FramebufferStatus::Complete);
        assert!(matches!(device.framebuffer_status(mismatched), FramebufferStatus::Incomplete(_)));
        assert!(matches!(device.framebuffer_status(empty), FramebufferStatus::Incomplete(_)));
    }

    #[test]
    fn test_draws_record_program_and_target() {
        let mut device = RecordingDevice::new();
        let program = program(&mut device);
        device.use_program(Some(program));
        device.draw_arrays(3);

        assert_eq!(
            device.draws().collect::<Vec<_>>(),
            vec![&DeviceCommand::DrawArrays {
                program: Some(program),
                framebuffer: None,
                count: 3
            }]
        );
    }
}
