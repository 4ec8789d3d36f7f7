//! Frame loop: output surface, procedural animation and the orchestrator

pub mod surface;
pub mod animation;
pub mod orchestrator;

pub use surface::{HeadlessSurface, OutputSurface};
pub use animation::NodeOrbit;
pub use orchestrator::{FrameOrchestrator, FrameStats};
