use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::{ShaderSources, WgpuBackend};
use crate::config::Config;
use crate::engine::{EngineEvent, EngineSettings, VisualEngine};
use crate::error::EngineError;
use crate::gpu::GpuContext;
use crate::input::{Command, Input};

/// Measures time between display frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
        }
    }

    /// Mark a new frame. Returns the time since start and the seconds since
    /// the previous frame.
    pub fn advance(&mut self, now: Instant) -> (Duration, f32) {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        (now.saturating_duration_since(self.start), dt)
    }
}

/// Open a window and run the feedback loop until it is closed.
///
/// Start-up failures (no adapter, shader compilation, ...) stop the event
/// loop and are returned here.
pub fn run(config: Config) -> Result<(), EngineError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = BloomApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        BloomApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    engine: VisualEngine<WgpuBackend>,
    input: Input,
    clock: FrameClock,
}

enum BloomApp {
    Pending { config: Config },
    Running(Box<Running>),
    Failed(EngineError),
    Stopped,
}

fn start(event_loop: &ActiveEventLoop, config: &Config) -> Result<Running, EngineError> {
    let window_attrs = Window::default_attributes()
        .with_title(&config.window.title)
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width,
            config.window.height,
        ));
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let gpu = GpuContext::new(window.clone())?;
    let (width, height) = (gpu.width(), gpu.height());

    let settings = EngineSettings::from(config);
    let backend = WgpuBackend::new(gpu, ShaderSources::default(), settings.background_color)?;
    let engine = VisualEngine::new(backend, width, height, &settings);

    window.request_redraw();
    Ok(Running {
        window,
        engine,
        input: Input::new(),
        clock: FrameClock::new(Instant::now()),
    })
}

impl Running {
    fn redraw(&mut self) -> Result<(), EngineError> {
        let (now, dt) = self.clock.advance(Instant::now());
        self.engine.update_timers(now);
        self.engine.tick(dt)?;
        self.window.request_redraw();
        Ok(())
    }
}

impl BloomApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EngineError) {
        log::error!("{}", error);
        if let BloomApp::Running(running) = self {
            running.engine.shutdown();
        }
        *self = BloomApp::Failed(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for BloomApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let BloomApp::Pending { config } = self else {
            return;
        };

        match start(event_loop, config) {
            Ok(running) => *self = BloomApp::Running(Box::new(running)),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let BloomApp::Running(running) = self else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                running.engine.submit(EngineEvent::Resize {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = running.redraw() {
                    self.fail(event_loop, e);
                }
            }
            other => match running.input.handle_event(&other) {
                Some(Command::Submit(ev)) => running.engine.submit(ev),
                Some(Command::Exit) => event_loop.exit(),
                None => {}
            },
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let BloomApp::Running(running) = self {
            running.engine.shutdown();
            *self = BloomApp::Stopped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_measures_every_frame() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0);

        let (now, dt) = clock.advance(t0 + Duration::from_millis(16));
        assert_eq!(now, Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);

        let (now, dt) = clock.advance(t0 + Duration::from_millis(50));
        assert_eq!(now, Duration::from_millis(50));
        assert!((dt - 0.034).abs() < 1e-6);
    }

    #[test]
    fn frame_clock_never_goes_backwards() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0 + Duration::from_millis(10));
        let (now, dt) = clock.advance(t0);
        assert_eq!(now, Duration::ZERO);
        assert_eq!(dt, 0.0);
    }
}
