//! # Frame Orchestrator
//!
//! Owns everything that lives for the duration of the render loop: the
//! device, the shader programs, the scene, the camera and sun, procedural
//! animations and the three passes. Each frame it
//!
//! 1. measures the elapsed time,
//! 2. resizes the intermediate target when the output size changed,
//! 3. updates the camera aspect and advances camera, animated nodes and sun,
//! 4. derives the light matrices,
//! 5. runs shadow, geometry and composite passes in that order.
//!
//! All animation happens before the first pass, so no pass reads a stale
//! world transform.

use crate::config::RendererConfig;
use crate::foundation::time::FrameClock;
use crate::render::device::GraphicsDevice;
use crate::render::passes::{Compositor, FrameView, GeometryPass, PassStats, ShadowPass};
use crate::render::{OrbitCamera, ShaderLibrary, SunLight};
use crate::scene::{Scene, SceneError, SceneResult};

use super::animation::NodeOrbit;
use super::surface::OutputSurface;

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Zero-based frame number
    pub frame: u64,
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Output size the frame was rendered at
    pub output_size: (u32, u32),
    /// Shadow pass work
    pub shadow: PassStats,
    /// Geometry pass work
    pub geometry: PassStats,
    /// Composite pass work
    pub composite: PassStats,
}

impl FrameStats {
    /// Draw calls across all passes
    pub const fn draw_calls(&self) -> usize {
        self.shadow.draw_calls + self.geometry.draw_calls + self.composite.draw_calls
    }
}

/// Drives the per-frame pipeline
pub struct FrameOrchestrator<D: GraphicsDevice> {
    device: D,
    config: RendererConfig,
    shaders: ShaderLibrary,
    scene: Scene,
    camera: OrbitCamera,
    sun: SunLight,
    orbits: Vec<NodeOrbit>,
    shadow_pass: ShadowPass,
    geometry_pass: GeometryPass,
    compositor: Compositor,
    clock: FrameClock,
    frame: u64,
}

impl<D: GraphicsDevice> FrameOrchestrator<D> {
    /// Create the passes and resolve the configured node orbits.
    ///
    /// Rejects a configuration that does not validate. Also fails when a render
    /// target is incomplete or an orbit names a node the scene does not have.
    pub fn new(mut device: D, config: RendererConfig, shaders: ShaderLibrary, scene: Scene) -> SceneResult<Self> {
        config.validate().map_err(SceneError::InvalidConfig)?;

        let orbits = config
            .orbits
            .iter()
            .map(|orbit| NodeOrbit::new(&scene, orbit))
            .collect::<SceneResult<Vec<_>>>()?;

        let (width, height) = config.fallback_size;
        let shadow_pass = ShadowPass::new(&mut device, &config.shadow)?;
        let geometry_pass = GeometryPass::new(&mut device, width, height, config.clear_color)?;
        let compositor = Compositor::new(&mut device, config.clear_color);

        log::info!(
            "Frame orchestrator ready: {} animated nodes, shadow map {}",
            orbits.len(),
            config.shadow.map_size
        );

        Ok(Self {
            camera: OrbitCamera::new(&config.camera),
            sun: SunLight::new(&config.sun),
            device,
            config,
            shaders,
            scene,
            orbits,
            shadow_pass,
            geometry_pass,
            compositor,
            clock: FrameClock::new(),
            frame: 0,
        })
    }

    /// Output size to render at, falling back when a dimension is zero
    fn resolve_size(&self, (width, height): (u32, u32)) -> (u32, u32) {
        if width == 0 || height == 0 {
            log::warn!("Output reported {width}x{height}; using fallback size");
            self.config.fallback_size
        } else {
            (width, height)
        }
    }

    /// Render one frame for `surface`, timing it with the wall clock
    pub fn frame(&mut self, surface: &dyn OutputSurface) -> SceneResult<FrameStats> {
        let dt = self.clock.tick();
        self.render_frame(dt, surface.framebuffer_size())
    }

    /// Render one frame with an explicit time step and output size
    pub fn render_frame(&mut self, dt: f32, output_size: (u32, u32)) -> SceneResult<FrameStats> {
        let (width, height) = self.resolve_size(output_size);

        if self.geometry_pass.resize(&mut self.device, width, height)? {
            log::info!("Output resized to {width}x{height}");
        }
        self.camera.set_viewport(width, height);

        self.camera.advance(dt);
        for orbit in &mut self.orbits {
            orbit.advance(&mut self.scene.graph, dt)?;
        }
        self.sun.advance(dt);

        let light = self.sun.state();
        let view = FrameView::from_camera(&self.camera);

        let shadow = self
            .shadow_pass
            .render(&mut self.device, &self.shaders.shadow, &self.scene, &light);
        let geometry = self.geometry_pass.render(
            &mut self.device,
            &self.shaders.lit,
            &self.scene,
            &view,
            &light,
            self.shadow_pass.shadow_map(),
            &self.config.lighting,
        );
        let composite = self.compositor.render(
            &mut self.device,
            &self.shaders.composite,
            self.geometry_pass.target(),
            width,
            height,
        );

        let stats = FrameStats {
            frame: self.frame,
            delta_time: dt,
            output_size: (width, height),
            shadow,
            geometry,
            composite,
        };
        self.frame += 1;

        log::debug!(
            "Frame {}: {:.2} ms, {} draw calls, {} nodes",
            stats.frame,
            dt * 1000.0,
            stats.draw_calls(),
            stats.geometry.nodes_visited
        );
        Ok(stats)
    }

    /// Render and present until the surface asks to close; returns the frame count
    pub fn run(&mut self, surface: &mut dyn OutputSurface) -> SceneResult<u64> {
        let start = self.frame;
        while !surface.should_close() {
            self.frame(surface)?;
            surface.present();
        }

        let rendered = self.frame - start;
        log::info!(
            "Frame loop finished after {rendered} frames ({:.1} fps average)",
            self.clock.average_fps()
        );
        Ok(rendered)
    }

    /// The graphics device
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// The graphics device, mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The rendered scene
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The rendered scene, mutably; call `update_world` after editing locals
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The camera
    pub const fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// The sun
    pub const fn sun(&self) -> &SunLight {
        &self.sun
    }

    /// Shader programs
    pub const fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// Shadow pass
    pub const fn shadow_pass(&self) -> &ShadowPass {
        &self.shadow_pass
    }

    /// Geometry pass
    pub const fn geometry_pass(&self) -> &GeometryPass {
        &self.geometry_pass
    }

    /// Frames rendered so far
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Release every GPU resource and hand the device back
    pub fn shutdown(mut self) -> D {
        self.compositor.destroy(&mut self.device);
        self.geometry_pass.destroy(&mut self.device);
        self.shadow_pass.destroy(&mut self.device);
        self.scene.destroy(&mut self.device);
        self.shaders.destroy(&mut self.device);
        log::info!("Renderer shut down after {} frames", self.frame);
        self.device
    }
}

impl<D: GraphicsDevice + std::fmt::Debug> std::fmt::Debug for FrameOrchestrator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameOrchestrator")
            .field("device", &self.device)
            .field("frame", &self.frame)
            .field("nodes", &self.scene.graph.len())
            .field("orbits", &self.orbits.len())
            .finish_non_exhaustive()
    }
}
