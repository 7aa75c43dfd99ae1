//! # Bloomloop
//!
//! **A pointer-driven fragment-shader feedback visual.**
//!
//! Each frame a procedural shader samples the previous frame's output and
//! draws into the other half of a ping-pong buffer pair; the result is shown
//! on screen and the two buffers swap roles. Clicks and taps (or the built-in
//! ambient simulator when nobody is interacting) seed new blooms.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), bloomloop::EngineError> {
//!     bloomloop::run(bloomloop::Config::default())
//! }
//! ```
//!
//! ## Without a window
//!
//! [`VisualEngine`] is generic over its [`RenderBackend`], so the whole frame
//! protocol runs against [`mock::MockBackend`]:
//!
//! ```
//! use bloomloop::mock::MockBackend;
//! use bloomloop::{EngineEvent, EngineSettings, VisualEngine};
//!
//! let mut engine = VisualEngine::new(MockBackend::new(), 800, 600, &EngineSettings::default());
//! engine.submit(EngineEvent::Pointer { x: 0.5, y: 0.5 });
//! engine.tick(0.016).unwrap();
//! assert!(!engine.pointer().is_triggered());
//! ```

mod ambient;
mod app;
mod backend;
mod camera;
mod composite_pass;
mod config;
mod engine;
mod error;
mod feedback;
mod feedback_pass;
mod gpu;
mod input;
pub mod mock;
mod pointer;
mod render_target;
mod uniforms;

pub use ambient::{AmbientTimer, TimerState, ambient_point};
pub use app::{FrameClock, run};
pub use backend::{RenderBackend, ShaderSources, WgpuBackend};
pub use camera::OrthoCamera;
pub use composite_pass::{COMPOSITE_SHADER, CompositePass};
pub use config::{AmbientConfig, Config, EffectConfig, WindowConfig};
pub use engine::{EngineEvent, EngineSettings, Mode, TickOutcome, VisualEngine};
pub use error::{ConfigError, EngineError};
pub use feedback::{FeedbackPair, Slot};
pub use feedback_pass::{FEEDBACK_SHADER, FeedbackPass};
pub use gpu::GpuContext;
pub use input::{Command, Input, key_command};
pub use pointer::PointerState;
pub use render_target::RenderTarget;
pub use uniforms::{CompositeUniforms, FeedbackUniforms, ShaderUniforms, srgb_to_linear};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
