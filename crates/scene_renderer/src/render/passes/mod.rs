//! Frame passes
//!
//! Each frame runs [`ShadowPass`], then [`GeometryPass`], then
//! [`Compositor`]. Passes own their render targets and report what they drew.

pub mod shadow;
pub mod geometry;
pub mod composite;

pub use shadow::ShadowPass;
pub use geometry::{GeometryPass, FrameView};
pub use composite::Compositor;

use std::ops::AddAssign;

/// Work done by one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Scene nodes visited
    pub nodes_visited: usize,
    /// Draw calls issued
    pub draw_calls: usize,
}

impl AddAssign for PassStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes_visited += other.nodes_visited;
        self.draw_calls += other.draw_calls;
    }
}
