//! Output surface abstraction
//!
//! The window system is outside the renderer. The frame loop only needs the
//! current framebuffer size, a close signal and a way to present.

/// A presentable output such as a window
pub trait OutputSurface {
    /// Framebuffer size in pixels; may be zero while minimised
    fn framebuffer_size(&self) -> (u32, u32);

    /// Whether the frame loop should stop
    fn should_close(&self) -> bool;

    /// Show the finished frame (swap buffers)
    fn present(&mut self);
}

/// Offscreen surface that closes after a fixed number of presented frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    frame_budget: u64,
    presented: u64,
}

impl HeadlessSurface {
    /// Surface of the given size that closes after `frame_budget` frames
    pub const fn new(width: u32, height: u32, frame_budget: u64) -> Self {
        Self {
            width,
            height,
            frame_budget,
            presented: 0,
        }
    }

    /// Change the reported size, as a window resize would
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Frames presented so far
    pub const fn presented(&self) -> u64 {
        self.presented
    }
}

impl OutputSurface for HeadlessSurface {
    fn framebuffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn should_close(&self) -> bool {
        self.presented >= self.frame_budget
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}
