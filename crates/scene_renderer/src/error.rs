//! Crate-level error type

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::render::RenderError;
use crate::scene::SceneError;

/// Any error the renderer can report
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Asset import or geometry extraction failed
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// GPU resource creation failed
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Scene construction or update failed
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration values are inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
