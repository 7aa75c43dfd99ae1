//! The composite stage: shows the freshly rendered feedback target on the
//! window surface over the background colour.

use glam::Vec3;

use crate::gpu::GpuContext;
use crate::render_target::RenderTarget;
use crate::uniforms::{CompositeUniforms, srgb_to_linear};

/// Built-in textured-quad program.
pub const COMPOSITE_SHADER: &str = include_str!("shaders/composite.wgsl");

pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    surface_is_srgb: bool,
}

impl CompositePass {
    /// Create the composite pipeline targeting the current surface format.
    pub fn new(gpu: &GpuContext, shader_source: &str) -> Result<Self, crate::EngineError> {
        let surface_is_srgb = gpu.config.format.is_srgb();

        gpu.validated("composite", |device| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Composite Shader"),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Composite Uniforms"),
                size: std::mem::size_of::<CompositeUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Composite Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            });

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Composite Bind Group Layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Composite Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Composite Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        // Feedback texels come out of ALPHA_BLENDING onto a
                        // transparent clear, i.e. already premultiplied.
                        blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            Self {
                pipeline,
                uniform_buffer,
                bind_group_layout,
                sampler,
                surface_is_srgb,
            }
        })
    }

    fn create_bind_group(&self, gpu: &GpuContext, source: &RenderTarget) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Clear colour for a render pass, converting from display-referred RGB
    /// when the destination encodes to sRGB itself.
    fn clear_color(color: Vec3, srgb_target: bool) -> wgpu::Color {
        let c = if srgb_target {
            Vec3::new(
                srgb_to_linear(color.x),
                srgb_to_linear(color.y),
                srgb_to_linear(color.z),
            )
        } else {
            color
        };
        wgpu::Color {
            r: c.x as f64,
            g: c.y as f64,
            b: c.z as f64,
            a: 1.0,
        }
    }

    /// Record the composite of `source` onto `screen`.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        uniforms: &CompositeUniforms,
        background: Vec3,
        source: &RenderTarget,
        screen: &wgpu::TextureView,
    ) {
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));

        let bind_group = self.create_bind_group(gpu, source);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: screen,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Self::clear_color(background, self.surface_is_srgb)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..6, 0..1);
    }

    /// Fill a feedback target with the opaque background colour, so the
    /// first frame that samples it starts from the background.
    pub fn seed(encoder: &mut wgpu::CommandEncoder, background: Vec3, target: &RenderTarget) {
        // Feedback targets are linear Rgba8Unorm storing display-referred values.
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Feedback Seed Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Self::clear_color(background, false)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    pub fn surface_is_srgb(&self) -> bool {
        self.surface_is_srgb
    }
}
