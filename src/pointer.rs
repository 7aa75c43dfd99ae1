use glam::Vec2;

/// The most recent pointer event, waiting to be picked up by the next frame.
///
/// Coordinates are normalized to `[0, 1]` with the origin in the top-left
/// corner, matching window input. A recorded event stays pending until
/// [`take_trigger`](Self::take_trigger) consumes it; later events overwrite the
/// position of one that has not been consumed yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    position: Vec2,
    triggered: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

impl PointerState {
    /// Create a pointer resting at the given position with nothing pending.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: clamp_unit(Vec2::new(x, y)),
            triggered: false,
        }
    }

    /// Record a normalized pointer event.
    ///
    /// Out-of-range coordinates are clamped into the unit square.
    pub fn record(&mut self, x: f32, y: f32) {
        self.position = clamp_unit(Vec2::new(x, y));
        self.triggered = true;
    }

    /// Record a pointer event given in pixels on a surface of `width` x `height`.
    ///
    /// Events against a zero-sized surface are dropped.
    pub fn record_pixels(&mut self, x: f32, y: f32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Dropping pointer event on zero-sized surface");
            return;
        }
        self.record(x / width as f32, y / height as f32);
    }

    /// Consume a pending event, returning its position.
    pub fn take_trigger(&mut self) -> Option<Vec2> {
        if std::mem::take(&mut self.triggered) {
            Some(self.position)
        } else {
            None
        }
    }

    /// Whether an event is waiting to be consumed.
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Last recorded position.
    pub fn position(&self) -> Vec2 {
        self.position
    }
}

fn clamp_unit(v: Vec2) -> Vec2 {
    // NaN would survive clamp(); treat it as the origin.
    let v = Vec2::new(
        if v.x.is_nan() { 0.0 } else { v.x },
        if v.y.is_nan() { 0.0 } else { v.y },
    );
    v.clamp(Vec2::ZERO, Vec2::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sets_trigger_once() {
        let mut pointer = PointerState::default();
        assert!(!pointer.is_triggered());

        pointer.record(0.25, 0.75);
        assert!(pointer.is_triggered());
        assert_eq!(pointer.take_trigger(), Some(Vec2::new(0.25, 0.75)));
        assert!(!pointer.is_triggered());
        assert_eq!(pointer.take_trigger(), None);
    }

    #[test]
    fn later_event_overwrites_pending_one() {
        let mut pointer = PointerState::default();
        pointer.record(0.1, 0.1);
        pointer.record(0.9, 0.2);
        assert_eq!(pointer.take_trigger(), Some(Vec2::new(0.9, 0.2)));
        assert_eq!(pointer.take_trigger(), None);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let mut pointer = PointerState::default();
        pointer.record(-3.0, 1.5);
        assert_eq!(pointer.position(), Vec2::new(0.0, 1.0));

        pointer.record(f32::NAN, f32::INFINITY);
        assert_eq!(pointer.position(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn pixel_events_are_normalized() {
        let mut pointer = PointerState::default();
        pointer.record_pixels(200.0, 450.0, 800, 600);
        assert_eq!(pointer.take_trigger(), Some(Vec2::new(0.25, 0.75)));

        pointer.record_pixels(900.0, -10.0, 800, 600);
        assert_eq!(pointer.take_trigger(), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn pixel_events_on_empty_surface_are_dropped() {
        let mut pointer = PointerState::new(0.65, 0.3);
        pointer.record_pixels(10.0, 10.0, 0, 600);
        assert!(!pointer.is_triggered());
        assert_eq!(pointer.position(), Vec2::new(0.65, 0.3));
    }
}
