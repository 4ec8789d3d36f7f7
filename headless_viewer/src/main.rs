//! Headless viewer
//!
//! Loads a glTF scene (or the built-in demo scene), renders it for a fixed
//! number of frames against the recording device and logs what each pass did.
//!
//! ```text
//! headless_viewer [config.toml|config.ron]
//! ```
//!
//! Without an argument `viewer.toml` is read from the working directory when
//! present; otherwise defaults are used.

mod demo;

use std::path::Path;

use serde::{Deserialize, Serialize};

use scene_renderer::assets::SceneAsset;
use scene_renderer::config::{Config, RendererConfig};
use scene_renderer::foundation::logging;
use scene_renderer::frame::{FrameOrchestrator, HeadlessSurface};
use scene_renderer::render::{DeviceCommand, RecordingDevice, ShaderLibrary, ShaderSources};
use scene_renderer::scene::Scene;
use scene_renderer::EngineError;

const DEFAULT_CONFIG_PATH: &str = "viewer.toml";

/// Viewer settings wrapped around the renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ViewerConfig {
    /// glTF/GLB file to render, the demo scene when `None`
    asset_path: Option<String>,
    /// Frames to render before exiting
    max_frames: u64,
    /// Size reported by the headless surface
    output_size: (u32, u32),
    /// `error`, `warn`, `info`, `debug` or `trace`
    log_level: String,
    renderer: RendererConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: None,
            max_frames: 120,
            output_size: (800, 600),
            log_level: "info".to_string(),
            renderer: RendererConfig::default(),
        }
    }
}

impl Config for ViewerConfig {}

fn load_config() -> Result<ViewerConfig, EngineError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(ViewerConfig::load_from_file(&path)?),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Ok(ViewerConfig::load_from_file(DEFAULT_CONFIG_PATH)?),
        None => Ok(ViewerConfig::default()),
    }
}

fn load_asset(config: &ViewerConfig) -> Result<SceneAsset, EngineError> {
    match &config.asset_path {
        Some(path) => Ok(scene_renderer::assets::load_gltf(path)?),
        None => {
            log::info!("No asset_path configured; rendering the demo scene");
            Ok(demo::scene())
        }
    }
}

fn run(config: ViewerConfig) -> Result<(), EngineError> {
    config.renderer.validate().map_err(EngineError::InvalidConfig)?;

    let asset = load_asset(&config)?;
    let mut device = RecordingDevice::new();
    let sources = ShaderSources::from_config(&config.renderer.shaders)?;
    let shaders = ShaderLibrary::new(&mut device, &sources)?;
    let scene = Scene::from_asset(&mut device, &asset, &shaders.lit)?;
    log::info!(
        "Scene ready: {} nodes, {} uploaded primitives",
        scene.graph.len(),
        scene.cache.geometry_count()
    );

    let (width, height) = config.output_size;
    let mut renderer = FrameOrchestrator::new(device, config.renderer, shaders, scene)?;
    let mut surface = HeadlessSurface::new(width, height, config.max_frames);

    let frames = renderer.run(&mut surface)?;
    let draws = renderer.device().draws().count();
    let commands = renderer.device().commands().len();
    let clears = renderer
        .device()
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::Clear(_)))
        .count();
    log::info!("Rendered {frames} frames: {draws} draw calls, {clears} clears, {commands} device commands");

    let device = renderer.shutdown();
    if device.live_buffer_count() != 0 || device.live_texture_count() != 0 {
        log::warn!(
            "Leaked GPU resources: {} buffers, {} textures",
            device.live_buffer_count(),
            device.live_texture_count()
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(logging::parse_level(&config.log_level));

    log::info!("Starting headless viewer");
    match run(config) {
        Ok(()) => {
            log::info!("Headless viewer finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Headless viewer failed: {e}");
            Err(e.into())
        }
    }
}
