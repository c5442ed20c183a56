//! Input handling for keyboard and mouse.

use glam::Vec2;
use std::collections::HashSet;

/// Digit keys bound to form hotkeys, in slot order (form 1 = Digit1).
const FORM_HOTKEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame.
    mouse_pressed: HashSet<MouseButton>,

    /// Mouse position in window coordinates.
    mouse_position: Vec2,
    /// Mouse movement delta this frame.
    mouse_delta: Vec2,
    /// Accumulated mouse delta (for when cursor is locked).
    accumulated_delta: Vec2,

    /// Whether the cursor is captured/locked.
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.clear();
        self.mouse_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.mouse_held.contains(&button) {
                    self.mouse_pressed.insert(button);
                }
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process mouse movement.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.accumulated_delta.x += delta.0 as f32;
        self.accumulated_delta.y += delta.1 as f32;
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.mouse_position = Vec2::new(position.0 as f32, position.1 as f32);
    }

    // Query methods

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Check if a mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    /// Get the mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Get the mouse movement delta for this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Check if the cursor is locked.
    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Set cursor lock state.
    pub fn set_cursor_locked(&mut self, locked: bool) {
        if self.cursor_locked != locked {
            log::debug!("Cursor {}", if locked { "locked" } else { "released" });
        }
        self.cursor_locked = locked;
    }

    /// Get movement input as a normalized vector (WASD). `y` is forward.
    pub fn get_movement_input(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(KeyCode::KeyW) {
            movement.y += 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) {
            movement.y -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyA) {
            movement.x -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) {
            movement.x += 1.0;
        }

        if movement.length_squared() > 0.0 {
            movement = movement.normalize();
        }

        movement
    }

    /// Check if run is held (Shift).
    pub fn is_running(&self) -> bool {
        self.is_key_held(KeyCode::ShiftLeft) || self.is_key_held(KeyCode::ShiftRight)
    }

    /// Check if jump was pressed (Space). Flying forms use it to toggle flight.
    pub fn is_jump_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Space)
    }

    /// Vertical flight input: +1 climbing (E), -1 descending (Q).
    pub fn flight_vertical(&self) -> f32 {
        let mut v = 0.0;
        if self.is_key_held(KeyCode::KeyE) {
            v += 1.0;
        }
        if self.is_key_held(KeyCode::KeyQ) {
            v -= 1.0;
        }
        v
    }

    /// Primary ability (Q).
    pub fn is_primary_ability_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyQ)
    }

    /// Secondary ability (E).
    pub fn is_secondary_ability_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyE)
    }

    /// Tertiary ability (F).
    pub fn is_tertiary_ability_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyF)
    }

    /// Cycle the pending form (C).
    pub fn is_cycle_form_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyC)
    }

    /// Transform into the pending form, or revert when transformed (T).
    pub fn is_transform_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyT)
    }

    /// Toggle the selection wheel (Tab).
    pub fn is_wheel_toggle_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Tab)
    }

    /// Cycle camera zoom mode (V).
    pub fn is_camera_mode_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyV)
    }

    /// Form hotkey pressed this frame: `Some(1)` for Digit1 and so on.
    pub fn form_hotkey_pressed(&self) -> Option<usize> {
        FORM_HOTKEYS
            .iter()
            .position(|key| self.is_key_pressed(*key))
            .map(|i| i + 1)
    }

    /// Check if the wheel selection click happened (Left mouse button).
    pub fn is_select_pressed(&self) -> bool {
        self.is_mouse_pressed(MouseButton::Left)
    }

    /// Turn the wheel carousel: -1 for Left arrow, +1 for Right arrow.
    pub fn carousel_step(&self) -> i32 {
        let mut step = 0;
        if self.is_key_pressed(KeyCode::ArrowLeft) {
            step -= 1;
        }
        if self.is_key_pressed(KeyCode::ArrowRight) {
            step += 1;
        }
        step
    }

    /// Confirm the carousel slot (Enter).
    pub fn is_confirm_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Enter) || self.is_key_pressed(KeyCode::NumpadEnter)
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_is_edge_triggered() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyT, ElementState::Pressed);
        assert!(input.is_transform_pressed());
        input.begin_frame();
        input.process_keyboard(KeyCode::KeyT, ElementState::Pressed);
        assert!(!input.is_transform_pressed());
        assert!(input.is_key_held(KeyCode::KeyT));
        input.process_keyboard(KeyCode::KeyT, ElementState::Released);
        assert!(input.is_key_released(KeyCode::KeyT));
    }

    #[test]
    fn movement_is_normalized() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        let m = input.get_movement_input();
        assert!((m.length() - 1.0).abs() < 1e-5);
        assert!(m.x > 0.0 && m.y > 0.0);
    }

    #[test]
    fn digit_keys_map_to_form_slots() {
        let mut input = InputState::new();
        assert_eq!(input.form_hotkey_pressed(), None);
        input.process_keyboard(KeyCode::Digit3, ElementState::Pressed);
        assert_eq!(input.form_hotkey_pressed(), Some(3));
    }

    #[test]
    fn mouse_delta_is_latched_per_frame() {
        let mut input = InputState::new();
        input.process_mouse_motion((3.0, -2.0));
        input.process_mouse_motion((1.0, 1.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::new(4.0, -1.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }
}
