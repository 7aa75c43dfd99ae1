//! Synthetic pointer input for when nobody is interacting.
//!
//! [`AmbientTimer`] decides *when* a synthetic event is due; [`ambient_point`]
//! decides *where* it lands. The timer works on explicit timestamps measured
//! from engine start instead of wall-clock callbacks, so real input, timer
//! expiry and frames are ordered by whoever drives the engine.
//!
//! ```text
//!            start()                    period elapsed
//!   Idle ────────────▶ Armed ◀──────────────────────┐ (fires)
//!    ▲                  │  └────────────────────────┘
//!    │ cancel()         │ interrupt()
//!    │                  ▼
//!    └────────────── Debouncing ── quiet period over ──▶ Armed
//! ```

use std::time::Duration;

use glam::Vec2;
use rand::Rng;

/// Fraction of the surface kept on each axis before cropping.
const CONSTRAINED_FRACTION: f32 = 0.8;
/// Fraction of the full surface height cropped from the top and the bottom
/// of the constrained band.
const VERTICAL_CROP_FRACTION: f32 = 0.1;

/// Current phase of the ambient timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    /// Not running.
    Idle,
    /// Running; the next synthetic event is due at `next_fire`.
    Armed { next_fire: Duration },
    /// Suspended after real input; re-arms at `resume_at`.
    Debouncing { resume_at: Duration },
}

/// Periodic timer with a debounced restart after real input.
#[derive(Clone, Debug)]
pub struct AmbientTimer {
    state: TimerState,
    period: Duration,
    quiet: Duration,
}

impl AmbientTimer {
    /// Create an idle timer firing every `period`, waiting `quiet` after real
    /// input before it re-arms.
    pub fn new(period: Duration, quiet: Duration) -> Self {
        Self {
            state: TimerState::Idle,
            period,
            quiet,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the timer. Does nothing if it is already armed.
    pub fn start(&mut self, now: Duration) {
        if !matches!(self.state, TimerState::Armed { .. }) {
            self.state = TimerState::Armed {
                next_fire: now + self.period,
            };
        }
    }

    /// Real input arrived: stop firing and restart after the quiet period.
    ///
    /// Repeated input keeps pushing the restart back.
    pub fn interrupt(&mut self, now: Duration) {
        self.state = TimerState::Debouncing {
            resume_at: now + self.quiet,
        };
    }

    /// Stop the timer entirely.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Advance to `now`. Returns `true` if a synthetic event is due.
    ///
    /// At most one event is reported per call; periods missed while the host
    /// was stalled are dropped rather than delivered as a burst.
    pub fn poll(&mut self, now: Duration) -> bool {
        if let TimerState::Debouncing { resume_at } = self.state {
            if now < resume_at {
                return false;
            }
            self.state = TimerState::Armed {
                next_fire: resume_at + self.period,
            };
        }

        let TimerState::Armed { next_fire } = self.state else {
            return false;
        };
        if now < next_fire {
            return false;
        }

        let mut next_fire = next_fire + self.period;
        if next_fire <= now {
            next_fire = now + self.period;
        }
        self.state = TimerState::Armed { next_fire };
        true
    }
}

/// Pick a synthetic pointer position on a `width` x `height` surface.
///
/// The point lies in the central 80% of the width and in the central 80% of
/// the height with a further tenth of the full height cropped from the top
/// and bottom. Returned coordinates are normalized, top-left origin.
pub fn ambient_point<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Vec2 {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);

    let constrained_w = w * CONSTRAINED_FRACTION;
    let constrained_h = h * CONSTRAINED_FRACTION;
    let offset_x = (w - constrained_w) / 2.0;
    let offset_y = (h - constrained_h) / 2.0;

    let crop = h * VERTICAL_CROP_FRACTION;
    let usable_h = constrained_h - 2.0 * crop;

    let x = offset_x + rng.random::<f32>() * constrained_w;
    let y = offset_y + crop + rng.random::<f32>() * usable_h;

    Vec2::new(x / w, y / h)
}
