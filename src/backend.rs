//! The seam between the frame driver and the graphics API.
//!
//! [`VisualEngine`](crate::VisualEngine) owns the feedback pair and all
//! uniform state; a [`RenderBackend`] only knows how to allocate targets and
//! how to draw the two passes. [`WgpuBackend`] is the real implementation;
//! [`MockBackend`](crate::mock::MockBackend) records calls for tests.

use glam::Vec3;

use crate::camera::OrthoCamera;
use crate::composite_pass::{COMPOSITE_SHADER, CompositePass};
use crate::error::EngineError;
use crate::feedback_pass::{FEEDBACK_SHADER, FeedbackPass};
use crate::gpu::GpuContext;
use crate::render_target::RenderTarget;
use crate::uniforms::{CompositeUniforms, ShaderUniforms};

/// Operations the frame driver needs from a graphics backend.
pub trait RenderBackend {
    /// Offscreen colour target type.
    type Target;

    /// Create a target of the given size, filled with the background colour.
    fn allocate_target(&mut self, label: &str, width: u32, height: u32) -> Self::Target;

    /// Resize the visible surface.
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Run the shader stage: sample `source`, render into `dest`.
    fn draw_feedback(&mut self, uniforms: &ShaderUniforms, source: &Self::Target, dest: &Self::Target);

    /// Run the composite stage: show `source` on the visible surface.
    fn draw_composite(&mut self, source: &Self::Target) -> Result<(), EngineError>;
}

/// Shader program sources handed to the backend at start-up.
#[derive(Clone, Copy, Debug)]
pub struct ShaderSources<'a> {
    pub feedback: &'a str,
    pub composite: &'a str,
}

impl Default for ShaderSources<'static> {
    fn default() -> Self {
        Self {
            feedback: FEEDBACK_SHADER,
            composite: COMPOSITE_SHADER,
        }
    }
}

/// [`RenderBackend`] over wgpu.
///
/// The feedback draw is recorded into a pending encoder; the composite draw
/// appends to it and submits both in one batch, then presents. Submission is
/// fire-and-forget: the next frame is paced by the Fifo present mode.
pub struct WgpuBackend {
    gpu: GpuContext,
    feedback: FeedbackPass,
    composite: CompositePass,
    camera: OrthoCamera,
    background: Vec3,
    pending: Option<wgpu::CommandEncoder>,
}

impl WgpuBackend {
    /// Compile both programs. Any compilation failure aborts start-up.
    pub fn new(gpu: GpuContext, shaders: ShaderSources<'_>, background: Vec3) -> Result<Self, EngineError> {
        let feedback = FeedbackPass::new(&gpu, shaders.feedback)?;
        let composite = CompositePass::new(&gpu, shaders.composite)?;
        log::info!(
            "Pipelines ready (surface {:?}, srgb decode: {})",
            gpu.config.format,
            composite.surface_is_srgb()
        );

        Ok(Self {
            gpu,
            feedback,
            composite,
            camera: OrthoCamera::new(),
            background,
            pending: None,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// The encoder collecting this frame's passes.
    fn take_encoder(&mut self) -> wgpu::CommandEncoder {
        self.pending.take().unwrap_or_else(|| {
            self.gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                })
        })
    }

    fn flush(&mut self) {
        if let Some(encoder) = self.pending.take() {
            self.gpu.queue.submit(std::iter::once(encoder.finish()));
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Target = RenderTarget;

    fn allocate_target(&mut self, label: &str, width: u32, height: u32) -> RenderTarget {
        let target = RenderTarget::new(&self.gpu, label, width, height);
        let mut encoder = self.take_encoder();
        CompositePass::seed(&mut encoder, self.background, &target);
        self.pending = Some(encoder);
        target
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn draw_feedback(&mut self, uniforms: &ShaderUniforms, source: &RenderTarget, dest: &RenderTarget) {
        let gpu_uniforms = uniforms.to_gpu(self.camera.view_proj());
        let mut encoder = self.take_encoder();
        self.feedback
            .render(&self.gpu, &mut encoder, &gpu_uniforms, source, dest);
        self.pending = Some(encoder);
    }

    fn draw_composite(&mut self, source: &RenderTarget) -> Result<(), EngineError> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.gpu.reconfigure();
                // The feedback step still has to land so the loop stays in step.
                self.flush();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.pending = None;
                return Err(EngineError::SurfaceOutOfMemory);
            }
            Err(e) => {
                log::warn!("Failed to get surface texture: {}", e);
                self.flush();
                return Ok(());
            }
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = CompositeUniforms::new(self.camera.view_proj(), self.composite.surface_is_srgb());
        let mut encoder = self.take_encoder();
        self.composite.render(
            &self.gpu,
            &mut encoder,
            &uniforms,
            self.background,
            source,
            &screen_view,
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
