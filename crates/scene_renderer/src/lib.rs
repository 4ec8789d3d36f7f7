//! # Scene Renderer
//!
//! Scene-graph driven renderer for glTF scenes with shadow mapping and a
//! fullscreen composite.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena of transform nodes with cached world matrices
//! - **Resource Cache**: One GPU upload per source primitive, shared by all instances
//! - **Geometry Extraction**: Smooth or flat normal synthesis and colour normalization
//! - **Three-Pass Frame**: Shadow depth, lit geometry with soft shadows, composite
//! - **Device Agnostic**: Everything goes through the [`GraphicsDevice`](render::GraphicsDevice) trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_renderer::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut device = RecordingDevice::new();
//!     let config = RendererConfig::default();
//!
//!     let asset = scene_renderer::assets::load_gltf("scene.glb")?;
//!     let shaders = ShaderLibrary::new(&mut device, &ShaderSources::from_config(&config.shaders)?)?;
//!     let scene = Scene::from_asset(&mut device, &asset, &shaders.lit)?;
//!
//!     let mut renderer = FrameOrchestrator::new(device, config, shaders, scene)?;
//!     let mut surface = HeadlessSurface::new(800, 600, 60);
//!     renderer.run(&mut surface)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod frame;

mod error;

pub use error::EngineError;

#[cfg(test)]
mod tests;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        EngineError,
        config::{Config, RendererConfig},
        assets::{SceneAsset, AssetError},
        foundation::math::{Vec3, Mat4, Transform},
        render::{GraphicsDevice, RecordingDevice, ShaderLibrary, ShaderSources, RenderError},
        scene::{Scene, SceneGraph, NodeId, SceneError},
        frame::{FrameOrchestrator, FrameStats, HeadlessSurface, OutputSurface},
    };
}
