//! Offscreen render targets

use super::device::{
    DepthAttachment, FramebufferDesc, FramebufferHandle, FramebufferStatus, GraphicsDevice,
    RenderbufferHandle, TextureDesc, TextureFilter, TextureFormat, TextureHandle,
};
use super::{RenderError, RenderResult};

fn ensure_complete(
    device: &dyn GraphicsDevice,
    framebuffer: FramebufferHandle,
    target: &'static str,
) -> RenderResult<()> {
    match device.framebuffer_status(framebuffer) {
        FramebufferStatus::Complete => Ok(()),
        FramebufferStatus::Incomplete(status) => Err(RenderError::IncompleteFramebuffer { target, status }),
    }
}

/// Square depth-only target the shadow pass renders into
#[derive(Debug)]
pub struct ShadowMap {
    size: u32,
    texture: TextureHandle,
    framebuffer: FramebufferHandle,
}

impl ShadowMap {
    /// Create a `size` x `size` depth texture with linear filtering
    pub fn new(device: &mut dyn GraphicsDevice, size: u32) -> RenderResult<Self> {
        let texture = device.create_texture(&TextureDesc {
            width: size,
            height: size,
            format: TextureFormat::Depth24,
            filter: TextureFilter::Linear,
        });
        let framebuffer = device.create_framebuffer(&FramebufferDesc {
            color: None,
            depth: Some(DepthAttachment::Texture(texture)),
        });

        if let Err(e) = ensure_complete(device, framebuffer, "shadow") {
            device.delete_framebuffer(framebuffer);
            device.delete_texture(texture);
            return Err(e);
        }

        log::info!("Created {size}x{size} shadow map");
        Ok(Self {
            size,
            texture,
            framebuffer,
        })
    }

    /// Edge length in texels
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Size of one texel in texture coordinates
    pub fn texel_size(&self) -> [f32; 2] {
        let texel = 1.0 / self.size as f32;
        [texel, texel]
    }

    /// Depth texture sampled by the geometry pass
    pub const fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Framebuffer handle
    pub const fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    /// Bind as the render target with a full-map viewport
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.bind_framebuffer(Some(self.framebuffer));
        device.viewport(self.size, self.size);
    }

    /// Release the framebuffer and texture
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        device.delete_framebuffer(self.framebuffer);
        device.delete_texture(self.texture);
    }
}

/// Intermediate colour + depth target sized to the output
#[derive(Debug)]
pub struct ColorTarget {
    width: u32,
    height: u32,
    color: TextureHandle,
    depth: RenderbufferHandle,
    framebuffer: FramebufferHandle,
}

impl ColorTarget {
    /// Create an RGBA8 colour texture with a 24-bit depth renderbuffer
    pub fn new(device: &mut dyn GraphicsDevice, width: u32, height: u32) -> RenderResult<Self> {
        let color = device.create_texture(&TextureDesc {
            width,
            height,
            format: TextureFormat::Rgba8,
            filter: TextureFilter::Nearest,
        });
        let depth = device.create_depth_renderbuffer(width, height);
        let framebuffer = device.create_framebuffer(&FramebufferDesc {
            color: Some(color),
            depth: Some(DepthAttachment::Renderbuffer(depth)),
        });

        let target = Self {
            width,
            height,
            color,
            depth,
            framebuffer,
        };
        if let Err(e) = ensure_complete(device, framebuffer, "color") {
            target.destroy(device);
            return Err(e);
        }

        log::debug!("Created {width}x{height} color target");
        Ok(target)
    }

    /// Current size
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Colour texture sampled by the compositor
    pub const fn texture(&self) -> TextureHandle {
        self.color
    }

    /// Framebuffer handle
    pub const fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    /// Recreate the attachments at a new size.
    ///
    /// Returns `Ok(false)` when the size is unchanged. On failure the current
    /// attachments stay in place.
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> RenderResult<bool> {
        if (width, height) == (self.width, self.height) {
            return Ok(false);
        }

        let replacement = Self::new(device, width, height)?;
        let previous = std::mem::replace(self, replacement);
        previous.destroy(device);

        log::info!("Resized color target to {width}x{height}");
        Ok(true)
    }

    /// Bind as the render target with a full-size viewport
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.bind_framebuffer(Some(self.framebuffer));
        device.viewport(self.width, self.height);
    }

    /// Release the framebuffer and both attachments
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        device.delete_framebuffer(self.framebuffer);
        device.delete_texture(self.color);
        device.delete_renderbuffer(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingDevice;

    #[test]
    fn test_shadow_map_is_depth_only() {
        let mut device = RecordingDevice::new();
        let map = ShadowMap::new(&mut device, 512).unwrap();

        let desc = device.texture_desc(map.texture()).unwrap();
        assert_eq!(desc.format, TextureFormat::Depth24);
        assert_eq!(desc.filter, TextureFilter::Linear);
        assert_eq!(map.texel_size(), [1.0 / 512.0; 2]);
    }

    #[test]
    fn test_incomplete_shadow_map_is_an_error() {
        let mut device = RecordingDevice::new();
        device.set_incomplete_framebuffers(Some("FRAMEBUFFER_UNSUPPORTED".into()));

        let err = ShadowMap::new(&mut device, 64).unwrap_err();
        assert_eq!(
            err,
            RenderError::IncompleteFramebuffer {
                target: "shadow",
                status: "FRAMEBUFFER_UNSUPPORTED".into()
            }
        );
        assert_eq!(device.live_texture_count(), 0);
    }

    #[test]
    fn test_resize_is_noop_for_same_size() {
        let mut device = RecordingDevice::new();
        let mut target = ColorTarget::new(&mut device, 800, 600).unwrap();
        let framebuffer = target.framebuffer();

        assert!(!target.resize(&mut device, 800, 600).unwrap());
        assert_eq!(target.framebuffer(), framebuffer);
    }

    #[test]
    fn test_resize_replaces_attachments() {
        let mut device = RecordingDevice::new();
        let mut target = ColorTarget::new(&mut device, 800, 600).unwrap();
        let old_framebuffer = target.framebuffer();

        assert!(target.resize(&mut device, 1024, 768).unwrap());
        assert_eq!(target.size(), (1024, 768));
        assert!(!device.is_live_framebuffer(old_framebuffer));
        assert_eq!(device.live_texture_count(), 1);
        assert_eq!(device.texture_desc(target.texture()).unwrap().width, 1024);
    }

    #[test]
    fn test_failed_resize_keeps_previous_target() {
        let mut device = RecordingDevice::new();
        let mut target = ColorTarget::new(&mut device, 800, 600).unwrap();
        device.set_incomplete_framebuffers(Some("FRAMEBUFFER_INCOMPLETE_ATTACHMENT".into()));

        assert!(target.resize(&mut device, 10, 10).is_err());
        assert_eq!(target.size(), (800, 600));
        assert!(device.is_live_framebuffer(target.framebuffer()));
    }
}
