//! Radial alien selection wheel.
//!
//! The wheel never changes forms itself: picking a slot sends a
//! [`SelectionEvent`] that the coordinator applies on its next tick.

use std::f32::consts::TAU;

use camera::{delta_angle, lerp_angle};
use glam::Vec2;
use input::InputState;
use serde::{Deserialize, Serialize};

use crate::omnitrix::{FormId, OmnitrixController, SelectionEvent, SelectionSender};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    #[serde(default = "default_true")]
    pub close_after_selection: bool,
    /// Gameplay time scale while the wheel is open.
    #[serde(default = "default_slow_motion")]
    pub slow_motion_scale: f32,
    /// Outer radius in pixels.
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Cursor this close to the centre selects nothing.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,
    /// Wheel centre in window coordinates.
    #[serde(default = "default_center")]
    pub center: [f32; 2],
    /// Carousel easing rate (higher snaps faster).
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
}

fn default_true() -> bool {
    true
}
fn default_slow_motion() -> f32 {
    0.5
}
fn default_radius() -> f32 {
    250.0
}
fn default_dead_zone() -> f32 {
    40.0
}
fn default_center() -> [f32; 2] {
    [640.0, 360.0]
}
fn default_rotation_speed() -> f32 {
    10.0
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            close_after_selection: default_true(),
            slow_motion_scale: default_slow_motion(),
            radius: default_radius(),
            dead_zone: default_dead_zone(),
            center: default_center(),
            rotation_speed: default_rotation_speed(),
        }
    }
}

/// One button on the wheel.
#[derive(Debug, Clone)]
pub struct WheelSlot {
    pub form: FormId,
    pub name: String,
    pub interactable: bool,
    /// The active alien's slot shows Ben's icon: clicking it turns back.
    pub shows_base_icon: bool,
    pub cooldown_fraction: f32,
}

pub struct AlienWheel {
    slots: Vec<WheelSlot>,
    sender: SelectionSender,
    config: WheelConfig,
    open: bool,
    hovered: Option<usize>,
    cursor_was_locked: bool,
    /// Carousel state, radians.
    selected: usize,
    rotation: f32,
    target_rotation: f32,
}

impl AlienWheel {
    pub fn new(controller: &OmnitrixController, sender: SelectionSender, config: WheelConfig) -> Self {
        let slots = controller
            .registry()
            .iter()
            .map(|form| WheelSlot {
                form: form.id,
                name: form.name.clone(),
                interactable: false,
                shows_base_icon: false,
                cooldown_fraction: 0.0,
            })
            .collect();
        let mut wheel = Self {
            slots,
            sender,
            config,
            open: false,
            hovered: None,
            cursor_was_locked: false,
            selected: 0,
            rotation: 0.0,
            target_rotation: 0.0,
        };
        wheel.sync(controller);
        wheel
    }

    pub fn slots(&self) -> &[WheelSlot] {
        &self.slots
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Gameplay time scale the wheel asks for.
    pub fn time_scale(&self) -> f32 {
        if self.open {
            self.config.slow_motion_scale
        } else {
            1.0
        }
    }

    pub fn open(&mut self, input: &mut InputState) {
        if self.open {
            return;
        }
        self.open = true;
        self.cursor_was_locked = input.is_cursor_locked();
        input.set_cursor_locked(false);
        log::debug!("Alien wheel opened");
    }

    pub fn close(&mut self, input: &mut InputState) {
        if !self.open {
            return;
        }
        self.open = false;
        self.hovered = None;
        input.set_cursor_locked(self.cursor_was_locked);
        log::debug!("Alien wheel closed");
    }

    pub fn toggle(&mut self, input: &mut InputState) {
        if self.open {
            self.close(input);
        } else {
            self.open(input);
        }
    }

    fn slot_angle(&self) -> f32 {
        TAU / self.slots.len().max(1) as f32
    }

    /// Slot under the cursor: slot 0 at twelve o'clock, counting clockwise.
    pub fn slot_at(&self, cursor: Vec2) -> Option<usize> {
        let offset = cursor - Vec2::from(self.config.center);
        let distance = offset.length();
        if self.slots.is_empty() || distance < self.config.dead_zone || distance > self.config.radius {
            return None;
        }
        // Window y grows downwards.
        let mut angle = offset.x.atan2(-offset.y);
        if angle < 0.0 {
            angle += TAU;
        }
        let step = self.slot_angle();
        Some(((angle + step * 0.5) / step) as usize % self.slots.len())
    }

    /// Ask the coordinator for a slot's form. False if the slot is disabled.
    pub fn select_slot(&mut self, slot: usize, input: &mut InputState) -> bool {
        let Some(entry) = self.slots.get(slot) else {
            return false;
        };
        if !entry.interactable {
            log::debug!("{} is not available", entry.name);
            return false;
        }
        // The lit "base icon" slot is the way back to Ben.
        let event = if entry.shows_base_icon {
            SelectionEvent::revert()
        } else {
            SelectionEvent::form(entry.form)
        };
        let sent = self.sender.send(event);
        if sent && self.config.close_after_selection {
            self.close(input);
        }
        sent
    }

    /// Mirror coordinator state into the slots.
    pub fn sync(&mut self, controller: &OmnitrixController) {
        let active = controller.active();
        let transformed = controller.is_transformed();
        for slot in &mut self.slots {
            slot.shows_base_icon = transformed && slot.form == active;
            slot.cooldown_fraction = controller.cooldown_fraction(slot.form);
            slot.interactable = if slot.form.is_base() || slot.shows_base_icon {
                transformed && !controller.is_transitioning()
            } else {
                controller.is_selectable(slot.form)
            };
        }
    }

    pub fn rotate_left(&mut self) {
        let n = self.slots.len().max(1);
        self.selected = (self.selected + n - 1) % n;
        self.target_rotation = -(self.selected as f32) * self.slot_angle();
    }

    pub fn rotate_right(&mut self) {
        self.selected = (self.selected + 1) % self.slots.len().max(1);
        self.target_rotation = -(self.selected as f32) * self.slot_angle();
    }

    pub fn carousel_slot(&self) -> usize {
        self.selected
    }

    /// Per-frame: sync, Tab toggle, carousel easing, hover and click.
    pub fn update(&mut self, input: &mut InputState, controller: &OmnitrixController, dt: f32) {
        self.sync(controller);
        if input.is_wheel_toggle_pressed() {
            self.toggle(input);
        }

        let remaining = delta_angle(self.rotation, self.target_rotation);
        if remaining.abs() < 0.1f32.to_radians() {
            self.rotation = self.target_rotation;
        } else {
            self.rotation = lerp_angle(self.rotation, self.target_rotation, dt * self.config.rotation_speed);
        }

        if !self.open {
            return;
        }
        match input.carousel_step() {
            -1 => self.rotate_left(),
            1 => self.rotate_right(),
            _ => {}
        }
        self.hovered = self.slot_at(input.mouse_position());
        if input.is_select_pressed() {
            if let Some(slot) = self.hovered {
                self.select_slot(slot, input);
            }
        } else if input.is_confirm_pressed() {
            self.select_slot(self.selected, input);
        }
    }
}
