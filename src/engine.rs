//! The frame driver.
//!
//! [`VisualEngine`] is the one context object that owns everything the
//! feedback loop mutates: pointer state, the buffer pair, uniforms, mode,
//! the ambient timer and the RNG. Input reaches it only through
//! [`submit`](VisualEngine::submit); queued events are applied as one batch at
//! the start of the next [`tick`](VisualEngine::tick), so nothing changes
//! halfway through a frame.
//!
//! Per tick, while [`Mode::Active`]:
//!
//! ```text
//! drain events ─▶ advance uniforms ─▶ shader stage (read ─▶ write)
//!              ─▶ composite stage (write ─▶ screen) ─▶ swap roles
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ambient::{AmbientTimer, TimerState, ambient_point};
use crate::backend::RenderBackend;
use crate::config::Config;
use crate::error::EngineError;
use crate::feedback::FeedbackPair;
use crate::pointer::PointerState;
use crate::uniforms::ShaderUniforms;

/// Whether the feedback loop is advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Active,
    /// Nothing advances; the last composited frame stays on screen.
    Paused,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Active => Mode::Paused,
            Mode::Paused => Mode::Active,
        }
    }
}

/// Input to the engine, applied at the start of the next tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEvent {
    /// Pointer or tap at normalized, top-left-origin coordinates.
    Pointer { x: f32, y: f32 },
    /// Pointer or tap in surface pixels.
    PointerPixels { x: f32, y: f32 },
    /// The visible surface changed size.
    Resize { width: u32, height: u32 },
    SetMode(Mode),
    ToggleMode,
    /// The ambient timer fired. Ignored unless the timer is still armed when
    /// the pulse is applied.
    AmbientPulse,
}

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// One frame was rendered and the buffers swapped.
    Rendered,
    /// The engine is paused; nothing was rendered.
    Paused,
}

/// Start-up parameters for [`VisualEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    pub time_offset: f32,
    pub background_color: Vec3,
    pub initial_pointer: Vec2,
    pub ambient_enabled: bool,
    pub ambient_period: Duration,
    pub ambient_debounce: Duration,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            time_offset: config.effect.time_offset,
            background_color: Vec3::from_array(config.effect.background_color),
            initial_pointer: Vec2::from_array(config.effect.initial_pointer),
            ambient_enabled: config.ambient.enabled,
            ambient_period: config.ambient.period(),
            ambient_debounce: config.ambient.debounce(),
            seed: config.effect.seed,
        }
    }
}

pub struct VisualEngine<B: RenderBackend> {
    backend: B,
    buffers: FeedbackPair<B::Target>,
    pointer: PointerState,
    uniforms: ShaderUniforms,
    mode: Mode,
    ambient: AmbientTimer,
    ambient_enabled: bool,
    rng: StdRng,
    events: VecDeque<EngineEvent>,
    surface: (u32, u32),
    now: Duration,
    frame_count: u64,
}

impl<B: RenderBackend> VisualEngine<B> {
    /// Allocate the feedback pair for a `width` x `height` surface and start
    /// the ambient timer.
    pub fn new(mut backend: B, width: u32, height: u32, settings: &EngineSettings) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let buffers = FeedbackPair::allocate(width, height, |label, w, h| {
            backend.allocate_target(label, w, h)
        });

        let pointer = PointerState::new(settings.initial_pointer.x, settings.initial_pointer.y);
        let uniforms = ShaderUniforms::new(
            width as f32 / height as f32,
            pointer.position(),
            settings.time_offset,
            settings.background_color,
        );

        let mut ambient = AmbientTimer::new(settings.ambient_period, settings.ambient_debounce);
        if settings.ambient_enabled {
            ambient.start(Duration::ZERO);
        }

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        log::info!("Feedback loop ready at {}x{}", width, height);

        Self {
            backend,
            buffers,
            pointer,
            uniforms,
            mode: Mode::Active,
            ambient,
            ambient_enabled: settings.ambient_enabled,
            rng,
            events: VecDeque::new(),
            surface: (width, height),
            now: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Queue an event for the next tick.
    pub fn submit(&mut self, event: EngineEvent) {
        self.events.push_back(event);
    }

    /// Number of events waiting for the next tick.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Advance the engine's notion of time to `now` (since start) and queue an
    /// ambient pulse if one is due.
    pub fn update_timers(&mut self, now: Duration) {
        self.now = now;
        if self.ambient.poll(now) {
            self.submit(EngineEvent::AmbientPulse);
        }
    }

    /// Run one display frame of `delta` seconds.
    ///
    /// Always applies queued events; renders and swaps only while active.
    /// Pointer and uniform state are committed only once the frame has been
    /// shown, so a failed composite leaves any pending input pending.
    pub fn tick(&mut self, delta: f32) -> Result<TickOutcome, EngineError> {
        self.apply_events();

        if self.mode == Mode::Paused {
            return Ok(TickOutcome::Paused);
        }

        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        let mut pointer = self.pointer;
        let mut uniforms = self.uniforms;
        if uniforms.advance(&mut pointer, delta, &mut self.rng) {
            log::trace!("Pointer consumed at {:?}", uniforms.pointer);
        }

        let (read, write) = self.buffers.split();
        self.backend.draw_feedback(&uniforms, read, write);
        self.backend.draw_composite(write)?;

        self.pointer = pointer;
        self.uniforms = uniforms;
        self.buffers.swap();

        self.frame_count += 1;
        Ok(TickOutcome::Rendered)
    }

    /// Stop the ambient timer and drop queued events.
    pub fn shutdown(&mut self) {
        self.ambient.cancel();
        self.events.clear();
        log::info!("Feedback loop stopped after {} frames", self.frame_count);
    }

    fn apply_events(&mut self) {
        while let Some(event) = self.events.pop_front() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Pointer { x, y } => {
                self.pointer.record(x, y);
                self.interrupt_ambient();
            }
            EngineEvent::PointerPixels { x, y } => {
                let (w, h) = self.surface;
                self.pointer.record_pixels(x, y, w, h);
                self.interrupt_ambient();
            }
            EngineEvent::Resize { width, height } => self.resize(width, height),
            EngineEvent::SetMode(mode) => self.set_mode(mode),
            EngineEvent::ToggleMode => self.set_mode(self.mode.toggled()),
            EngineEvent::AmbientPulse => {
                // A pulse queued before real input in the same batch is stale.
                let armed = matches!(self.ambient.state(), TimerState::Armed { .. });
                if !armed {
                    log::debug!("Dropping ambient pulse, timer is {:?}", self.ambient.state());
                } else if self.mode == Mode::Active {
                    let (w, h) = self.surface;
                    let p = ambient_point(&mut self.rng, w, h);
                    log::debug!("Ambient pulse at ({:.3}, {:.3})", p.x, p.y);
                    self.pointer.record(p.x, p.y);
                }
            }
        }
    }

    fn interrupt_ambient(&mut self) {
        if self.ambient_enabled {
            self.ambient.interrupt(self.now);
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            log::debug!("Mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }

        self.uniforms.aspect_ratio = width as f32 / height as f32;
        if self.surface == (width, height) {
            return;
        }

        log::info!("Resizing to {}x{}", width, height);
        self.surface = (width, height);
        self.backend.resize_surface(width, height);
        let backend = &mut self.backend;
        self.buffers
            .resize(width, height, |label, w, h| backend.allocate_target(label, w, h));
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn buffers(&self) -> &FeedbackPair<B::Target> {
        &self.buffers
    }

    pub fn ambient(&self) -> &AmbientTimer {
        &self.ambient
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// Frames rendered so far (paused ticks excluded).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::TimerState;
    use crate::feedback::Slot;
    use crate::mock::{BackendCall, MockBackend};

    fn settings() -> EngineSettings {
        EngineSettings {
            seed: Some(7),
            ..EngineSettings::default()
        }
    }

    fn engine() -> VisualEngine<MockBackend> {
        VisualEngine::new(MockBackend::new(), 800, 600, &settings())
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn new_allocates_two_targets() {
        let e = engine();
        assert_eq!(
            e.backend().calls,
            vec![
                BackendCall::Allocate { id: 0, width: 800, height: 600 },
                BackendCall::Allocate { id: 1, width: 800, height: 600 },
            ]
        );
        assert_eq!(e.uniforms().pointer, Vec2::new(0.65, 0.3));
        assert_eq!(e.uniforms().elapsed_time, 200.0);
        assert!(!e.pointer().is_triggered());
    }

    #[test]
    fn events_wait_for_tick() {
        let mut e = engine();
        e.submit(EngineEvent::Pointer { x: 0.1, y: 0.2 });
        e.submit(EngineEvent::SetMode(Mode::Paused));
        assert_eq!(e.pending_events(), 2);
        assert!(!e.pointer().is_triggered());
        assert_eq!(e.mode(), Mode::Active);

        assert_eq!(e.tick(0.016).unwrap(), TickOutcome::Paused);
        assert_eq!(e.pending_events(), 0);
        assert_eq!(e.mode(), Mode::Paused);
        // Paused before the frame ran, so the input is still pending.
        assert!(e.pointer().is_triggered());
    }

    #[test]
    fn tick_draws_read_into_write_then_composites_write() {
        let mut e = engine();
        e.backend_mut().clear_calls();
        e.tick(0.016).unwrap();

        let calls = &e.backend().calls;
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], BackendCall::Feedback { source: 0, dest: 1, .. }));
        assert_eq!(calls[1], BackendCall::Composite { source: 1, generation: 1 });
    }

    #[test]
    fn pixel_pointer_uses_surface_size() {
        let mut e = engine();
        e.submit(EngineEvent::PointerPixels { x: 400.0, y: 150.0 });
        e.tick(0.016).unwrap();
        assert_eq!(e.uniforms().pointer, Vec2::new(0.5, 0.75));
    }

    #[test]
    fn pointer_interrupts_ambient_timer() {
        let mut e = engine();
        e.update_timers(ms(1000));
        e.submit(EngineEvent::Pointer { x: 0.5, y: 0.5 });
        e.tick(0.016).unwrap();
        assert_eq!(e.ambient().state(), TimerState::Debouncing { resume_at: ms(1200) });

        // The 1400 ms fire is gone.
        e.update_timers(ms(1400));
        assert_eq!(e.pending_events(), 0);
        e.update_timers(ms(2600));
        assert_eq!(e.pending_events(), 1);
    }

    #[test]
    fn ambient_pulse_records_input_only_when_active() {
        let mut e = engine();
        e.submit(EngineEvent::SetMode(Mode::Paused));
        e.tick(0.016).unwrap();
        e.update_timers(ms(1400));
        assert_eq!(e.pending_events(), 1);
        e.tick(0.016).unwrap();
        assert!(!e.pointer().is_triggered());

        e.submit(EngineEvent::SetMode(Mode::Active));
        e.update_timers(ms(2800));
        e.tick(0.016).unwrap();
        // Consumed by the same tick that applied it.
        assert!(!e.pointer().is_triggered());
        assert_eq!(e.uniforms().time_since_stop, 0.016);
    }

    #[test]
    fn pause_keeps_pending_manual_input() {
        let mut e = engine();
        e.submit(EngineEvent::SetMode(Mode::Paused));
        e.submit(EngineEvent::Pointer { x: 0.3, y: 0.4 });
        e.tick(0.016).unwrap();
        assert!(e.pointer().is_triggered());

        e.submit(EngineEvent::ToggleMode);
        e.tick(0.016).unwrap();
        assert!(!e.pointer().is_triggered());
        assert!((e.uniforms().pointer - Vec2::new(0.3, 0.6)).length() < 1e-6);
    }

    #[test]
    fn disabled_ambient_never_fires() {
        let mut e = VisualEngine::new(
            MockBackend::new(),
            800,
            600,
            &EngineSettings {
                ambient_enabled: false,
                ..settings()
            },
        );
        e.submit(EngineEvent::Pointer { x: 0.5, y: 0.5 });
        e.tick(0.016).unwrap();
        e.update_timers(ms(60_000));
        assert_eq!(e.pending_events(), 0);
        assert_eq!(e.ambient().state(), TimerState::Idle);
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut e = engine();
        e.submit(EngineEvent::Resize { width: 0, height: 600 });
        e.tick(0.016).unwrap();
        assert_eq!(e.surface_size(), (800, 600));
        assert_eq!(e.buffers().dimensions(), (800, 600));
    }

    #[test]
    fn resize_updates_aspect_and_reallocates() {
        let mut e = engine();
        e.tick(0.016).unwrap();
        assert_eq!(e.buffers().read_slot(), Slot::B);

        e.submit(EngineEvent::Resize { width: 1000, height: 500 });
        e.tick(0.016).unwrap();

        assert_eq!(e.uniforms().aspect_ratio, 2.0);
        assert_eq!(e.backend().surface, (1000, 500));
        assert_eq!(e.buffers().read().width, 1000);
        assert_eq!(e.buffers().write().height, 500);
        // Roles survive the resize; the tick then swaps them as usual.
        assert_eq!(e.buffers().read_slot(), Slot::A);
        assert_eq!(e.frame_count(), 2);
    }

    #[test]
    fn composite_failure_is_returned_without_swapping() {
        let mut e = engine();
        e.backend_mut().fail_next_composite = true;
        e.submit(EngineEvent::Pointer { x: 0.4, y: 0.2 });
        let read_before = e.buffers().read_slot();
        let uniforms_before = *e.uniforms();
        assert!(matches!(e.tick(0.016), Err(EngineError::SurfaceOutOfMemory)));
        assert_eq!(e.buffers().read_slot(), read_before);
        assert_eq!(e.frame_count(), 0);
        assert_eq!(*e.uniforms(), uniforms_before);
        assert!(e.pointer().is_triggered());

        // The next successful frame picks the input up.
        e.tick(0.016).unwrap();
        assert!(!e.pointer().is_triggered());
        assert!((e.uniforms().pointer - Vec2::new(0.4, 0.8)).length() < 1e-6);
    }

    #[test]
    fn stale_pulse_behind_real_input_is_dropped() {
        let mut e = engine();
        e.submit(EngineEvent::Pointer { x: 0.05, y: 0.05 });
        e.update_timers(ms(1400));
        assert_eq!(e.pending_events(), 2);
        e.tick(0.016).unwrap();
        assert!((e.uniforms().pointer - Vec2::new(0.05, 0.95)).length() < 1e-6);
        assert_eq!(e.ambient().state(), TimerState::Debouncing { resume_at: ms(1600) });
    }

    #[test]
    fn shutdown_cancels_timer_and_queue() {
        let mut e = engine();
        e.submit(EngineEvent::ToggleMode);
        e.shutdown();
        assert_eq!(e.pending_events(), 0);
        assert_eq!(e.ambient().state(), TimerState::Idle);
    }
}
