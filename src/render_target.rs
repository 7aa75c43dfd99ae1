use crate::gpu::GpuContext;

/// An off-screen colour target for the feedback loop.
///
/// Created with both `RENDER_ATTACHMENT` and `TEXTURE_BINDING` usage so one
/// frame can render into it and the next can sample it.
pub struct RenderTarget {
    /// The underlying GPU texture that stores pixel data.
    pub texture: wgpu::Texture,
    /// A view into the texture, used for render pass attachments and shader sampling.
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Feedback targets use a linear 8-bit format regardless of the surface
    /// format, so sampling and re-rendering every frame does not drift
    /// through sRGB encode/decode.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a new render target of the given size.
    ///
    /// Zero dimensions are bumped to one pixel; wgpu rejects empty textures.
    pub fn new(gpu: &GpuContext, label: &str, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
