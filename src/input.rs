use glam::Vec2;
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::engine::EngineEvent;

/// What the host should do in response to a window event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Queue an event on the engine.
    Submit(EngineEvent),
    /// Leave the event loop.
    Exit,
}

/// Turns raw window input into engine commands.
///
/// Mouse button events carry no position in winit, so the last cursor
/// position is tracked here and attached to the press.
#[derive(Debug, Default)]
pub struct Input {
    cursor: Option<Vec2>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in window pixels.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Process a window event. Returns the command it maps to, if any.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Command> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                None
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.cursor.map(pointer_pixels),
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => match phase {
                TouchPhase::Started => Some(pointer_pixels(Vec2::new(
                    location.x as f32,
                    location.y as f32,
                ))),
                TouchPhase::Moved | TouchPhase::Ended | TouchPhase::Cancelled => None,
            },
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(key) => key_command(key, event.state, event.repeat),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::CloseRequested => Some(Command::Exit),
            _ => None,
        }
    }
}

fn pointer_pixels(p: Vec2) -> Command {
    Command::Submit(EngineEvent::PointerPixels { x: p.x, y: p.y })
}

/// Keyboard bindings: `Space` toggles pause, `Escape` quits.
pub fn key_command(key: KeyCode, state: ElementState, repeat: bool) -> Option<Command> {
    if state != ElementState::Pressed || repeat {
        return None;
    }
    match key {
        KeyCode::Space => Some(Command::Submit(EngineEvent::ToggleMode)),
        KeyCode::Escape => Some(Command::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only compared, never passed to the platform.
        unsafe { DeviceId::dummy() }
    }

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
        }
    }

    fn touch(phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id: 0,
        })
    }

    #[test]
    fn press_without_cursor_is_ignored() {
        let mut input = Input::new();
        assert_eq!(input.handle_event(&mouse(ElementState::Pressed, MouseButton::Left)), None);
    }

    #[test]
    fn left_press_uses_last_cursor_position() {
        let mut input = Input::new();
        assert_eq!(input.handle_event(&cursor_moved(120.0, 45.0)), None);
        assert_eq!(
            input.handle_event(&mouse(ElementState::Pressed, MouseButton::Left)),
            Some(Command::Submit(EngineEvent::PointerPixels { x: 120.0, y: 45.0 }))
        );
        assert_eq!(input.handle_event(&mouse(ElementState::Released, MouseButton::Left)), None);
        assert_eq!(input.handle_event(&mouse(ElementState::Pressed, MouseButton::Right)), None);
    }

    #[test]
    fn one_tap_records_once() {
        let mut input = Input::new();
        let expected = Some(Command::Submit(EngineEvent::PointerPixels { x: 10.0, y: 20.0 }));
        assert_eq!(input.handle_event(&touch(TouchPhase::Started, 10.0, 20.0)), expected);
        assert_eq!(input.handle_event(&touch(TouchPhase::Moved, 11.0, 21.0)), None);
        assert_eq!(input.handle_event(&touch(TouchPhase::Ended, 10.0, 20.0)), None);
        assert_eq!(input.handle_event(&touch(TouchPhase::Cancelled, 10.0, 20.0)), None);
    }

    #[test]
    fn key_bindings() {
        assert_eq!(
            key_command(KeyCode::Space, ElementState::Pressed, false),
            Some(Command::Submit(EngineEvent::ToggleMode))
        );
        assert_eq!(key_command(KeyCode::Space, ElementState::Pressed, true), None);
        assert_eq!(key_command(KeyCode::Space, ElementState::Released, false), None);
        assert_eq!(
            key_command(KeyCode::Escape, ElementState::Pressed, false),
            Some(Command::Exit)
        );
        assert_eq!(key_command(KeyCode::KeyA, ElementState::Pressed, false), None);
    }

    #[test]
    fn close_requested_exits() {
        let mut input = Input::new();
        assert_eq!(input.handle_event(&WindowEvent::CloseRequested), Some(Command::Exit));
    }
}
