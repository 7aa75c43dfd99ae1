//! Uniform state for the two passes.
//!
//! [`ShaderUniforms`] is the CPU-side state the frame driver mutates;
//! [`FeedbackUniforms`] and [`CompositeUniforms`] are the byte layouts uploaded
//! to the GPU.

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use crate::pointer::PointerState;

/// Values fed to the feedback shader each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderUniforms {
    /// Surface width divided by height.
    pub aspect_ratio: f32,
    /// Last interaction point in texture space (bottom-left origin).
    pub pointer: Vec2,
    /// Effect clock in seconds, starting from the configured offset.
    pub elapsed_time: f32,
    /// Seconds since the last consumed pointer event.
    pub time_since_stop: f32,
    /// Three uniform draws in `[0, 1)`, refreshed with every pointer event.
    pub stop_seed: Vec3,
    /// Display-referred RGB the effect fades towards.
    pub background_color: Vec3,
}

impl ShaderUniforms {
    pub fn new(aspect_ratio: f32, pointer: Vec2, time_offset: f32, background_color: Vec3) -> Self {
        Self {
            aspect_ratio,
            pointer,
            elapsed_time: time_offset,
            time_since_stop: 0.0,
            stop_seed: Vec3::ZERO,
            background_color,
        }
    }

    /// Advance by one frame of `delta` seconds, consuming a pending pointer
    /// event if there is one.
    ///
    /// Returns `true` when an event was consumed.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        pointer: &mut PointerState,
        delta: f32,
        rng: &mut R,
    ) -> bool {
        self.elapsed_time += delta;

        let consumed = match pointer.take_trigger() {
            Some(p) => {
                self.pointer = Vec2::new(p.x, 1.0 - p.y);
                self.time_since_stop = 0.0;
                self.stop_seed = Vec3::new(rng.random(), rng.random(), rng.random());
                true
            }
            None => false,
        };

        self.time_since_stop += delta;
        consumed
    }

    /// GPU layout of these values under the given camera transform.
    pub fn to_gpu(&self, view_proj: Mat4) -> FeedbackUniforms {
        FeedbackUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            pointer: self.pointer.to_array(),
            aspect_ratio: self.aspect_ratio,
            elapsed_time: self.elapsed_time,
            stop_seed: self.stop_seed.to_array(),
            time_since_stop: self.time_since_stop,
            background_color: self.background_color.to_array(),
            _padding: 0.0,
        }
    }
}

/// Feedback pass uniforms bound at `@group(0) @binding(0)`.
///
/// # WGSL Declaration
///
/// ```wgsl
/// struct Uniforms {
///     view_proj: mat4x4f,
///     pointer: vec2f,
///     ratio: f32,
///     time: f32,
///     stop_seed: vec3f,
///     stop_time: f32,
///     background: vec3f,
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FeedbackUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub pointer: [f32; 2],
    pub aspect_ratio: f32,
    pub elapsed_time: f32,
    pub stop_seed: [f32; 3],
    pub time_since_stop: f32,
    pub background_color: [f32; 3],
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

/// Composite pass uniforms bound at `@group(0) @binding(0)`.
///
/// # WGSL Declaration
///
/// ```wgsl
/// struct Uniforms {
///     view_proj: mat4x4f,
///     decode_srgb: u32,
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Non-zero when the surface re-encodes to sRGB on write, so the
    /// display-referred feedback texels must be linearized first.
    pub decode_srgb: u32,
    /// Padding for 16-byte alignment.
    pub _padding: [u32; 3],
}

impl CompositeUniforms {
    pub fn new(view_proj: Mat4, surface_is_srgb: bool) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            decode_srgb: surface_is_srgb as u32,
            _padding: [0; 3],
        }
    }
}

/// Convert one display-referred sRGB channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn uniforms() -> ShaderUniforms {
        ShaderUniforms::new(4.0 / 3.0, Vec2::new(0.65, 0.3), 200.0, Vec3::ONE)
    }

    #[test]
    fn gpu_layouts_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FeedbackUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<FeedbackUniforms>(), 112);
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 80);
    }

    #[test]
    fn advance_without_input_only_moves_clocks() {
        let mut u = uniforms();
        let mut pointer = PointerState::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!u.advance(&mut pointer, 0.5, &mut rng));
        assert_eq!(u.elapsed_time, 200.5);
        assert_eq!(u.time_since_stop, 0.5);
        assert_eq!(u.pointer, Vec2::new(0.65, 0.3));
        assert_eq!(u.stop_seed, Vec3::ZERO);
    }

    #[test]
    fn advance_consumes_trigger_and_flips_y() {
        let mut u = uniforms();
        u.time_since_stop = 9.0;
        let mut pointer = PointerState::default();
        pointer.record(0.2, 0.1);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(u.advance(&mut pointer, 0.016, &mut rng));
        assert!(!pointer.is_triggered());
        assert!((u.pointer - Vec2::new(0.2, 0.9)).length() < 1e-6);
        assert_eq!(u.time_since_stop, 0.016);

        let seed = u.stop_seed;
        for c in seed.to_array() {
            assert!((0.0..1.0).contains(&c));
        }

        // A second frame keeps the seed and keeps counting.
        assert!(!u.advance(&mut pointer, 0.016, &mut rng));
        assert_eq!(u.stop_seed, seed);
        assert!(u.time_since_stop > 0.016);
    }

    #[test]
    fn srgb_decode_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn to_gpu_copies_fields() {
        let u = uniforms();
        let gpu = u.to_gpu(Mat4::IDENTITY);
        assert_eq!(gpu.pointer, [0.65, 0.3]);
        assert_eq!(gpu.elapsed_time, 200.0);
        assert_eq!(gpu.background_color, [1.0, 1.0, 1.0]);
        assert_eq!(gpu.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }
}
