//! The Omnitrix: decides which form the player is in and sequences every switch.
//!
//! [`OmnitrixController`] is the single owner of transformation state. Input,
//! the selection wheel and scripts all go through it; UI code talks to it over a
//! [`SelectionSender`] rather than sharing a global "selected alien" value.

pub mod camera_rig;
pub mod cooldown;
pub mod error;
pub mod form;
pub mod scene;
pub mod selection;
pub mod sequencer;

pub use camera_rig::{CameraBinding, CameraRig};
pub use cooldown::CooldownTracker;
pub use error::TransformError;
pub use form::{ArrivalCue, Form, FormDef, FormId, FormPresence, FormRegistry, FormSpec};
pub use scene::FormScene;
pub use selection::{selection_channel, Selection, SelectionEvent, SelectionInbox, SelectionSender};
pub use sequencer::{Sequencer, Stage, TransformTiming};

use glam::Vec3;
use hecs::Entity;
use input::InputState;

use sequencer::SequenceContext;

/// Something that can play the transformation flash.
pub trait EffectPlayer {
    fn play_at(&mut self, position: Vec3);
}

/// The scene objects the coordinator drives, borrowed for one call.
pub struct Collaborators<'c> {
    pub scene: &'c mut dyn FormScene,
    pub effects: &'c mut dyn EffectPlayer,
    pub camera: &'c mut dyn CameraRig,
}

pub struct OmnitrixController {
    registry: FormRegistry,
    cooldowns: CooldownTracker,
    selection: Selection,
    binding: CameraBinding,
    sequencer: Sequencer,
    inbox: Option<SelectionInbox>,
}

impl OmnitrixController {
    pub fn new(registry: FormRegistry, timing: TransformTiming, duration: f32) -> Self {
        let count = registry.len();
        Self {
            cooldowns: CooldownTracker::new(count),
            selection: Selection::new(count),
            binding: CameraBinding::default(),
            sequencer: Sequencer::new(timing, duration),
            inbox: None,
            registry,
        }
    }

    /// Put the scene in its starting state: only the base form visible and
    /// controllable, camera on the base form.
    pub fn start(&mut self, io: &mut Collaborators<'_>) {
        for form in self.registry.iter() {
            let base = form.id.is_base();
            io.scene.set_model_active(form.body, base);
            io.scene.set_controller_enabled(form.body, base);
        }
        self.binding.bind(io.camera, self.registry.base());
        log::info!("Omnitrix ready with {} alien forms", self.registry.len() - 1);
    }

    /// Open the selection channel. Any previously handed-out senders stop being heard.
    pub fn connect_selection(&mut self) -> SelectionSender {
        let (tx, inbox) = selection_channel();
        self.inbox = Some(inbox);
        tx
    }

    fn context<'a, 'c>(
        registry: &'a FormRegistry,
        cooldowns: &'a mut CooldownTracker,
        binding: &'a mut CameraBinding,
        io: &'a mut Collaborators<'c>,
    ) -> SequenceContext<'a, 'c> {
        SequenceContext { registry, cooldowns, binding, io }
    }

    // Commands

    /// Move the pending selection to the next form.
    pub fn select_next(&mut self) -> FormId {
        let id = self.selection.select_next();
        if let Some(form) = self.registry.get(id) {
            log::info!("Selected {}", form.name);
        }
        id
    }

    pub fn select(&mut self, index: usize) -> Result<FormId, TransformError> {
        let id = self.selection.select(index)?;
        if let Some(form) = self.registry.get(id) {
            log::info!("Selected {}", form.name);
        }
        Ok(id)
    }

    /// Switch to `target`. From one alien straight into another this is a quick
    /// switch; asking for the base form reverts.
    pub fn request_transform(
        &mut self,
        target: FormId,
        io: &mut Collaborators<'_>,
    ) -> Result<(), TransformError> {
        if self.sequencer.is_transitioning() {
            return Err(TransformError::AlreadyTransitioning);
        }
        self.registry.form(target)?;
        if target.is_base() {
            return self.revert_to_base(io);
        }
        if !self.active().is_base() {
            return self.quick_switch(target, io);
        }
        let mut ctx = Self::context(&self.registry, &mut self.cooldowns, &mut self.binding, io);
        self.sequencer.begin(target, true, None, &mut ctx)
    }

    /// Return to the base form, starting the vacated form's cooldown. No-op in base form.
    pub fn revert_to_base(&mut self, io: &mut Collaborators<'_>) -> Result<(), TransformError> {
        if self.sequencer.is_transitioning() {
            return Err(TransformError::AlreadyTransitioning);
        }
        if self.active().is_base() {
            return Ok(());
        }
        let mut ctx = Self::context(&self.registry, &mut self.cooldowns, &mut self.binding, io);
        self.sequencer.begin(FormId::BASE, true, None, &mut ctx)
    }

    /// Alien to alien through the base form, without charging a cooldown for the
    /// form being left. Two full sequences, so the flash plays twice.
    pub fn quick_switch(
        &mut self,
        target: FormId,
        io: &mut Collaborators<'_>,
    ) -> Result<(), TransformError> {
        if self.sequencer.is_transitioning() {
            return Err(TransformError::AlreadyTransitioning);
        }
        let active = self.active();
        if target == active {
            return Ok(());
        }
        if active.is_base() || target.is_base() {
            return self.request_transform(target, io);
        }
        let mut ctx = Self::context(&self.registry, &mut self.cooldowns, &mut self.binding, io);
        self.sequencer.begin(FormId::BASE, false, Some(target), &mut ctx)
    }

    /// The transform button: revert when transformed, else transform into the pending form.
    pub fn transform_pressed(&mut self, io: &mut Collaborators<'_>) -> Result<(), TransformError> {
        if self.is_transformed() {
            self.revert_to_base(io)
        } else {
            let pending = self.selection.pending();
            if pending.is_base() {
                return Ok(());
            }
            self.request_transform(pending, io)
        }
    }

    /// Digit hotkey `slot`: switch straight to that form, or revert if already in it.
    pub fn hotkey(&mut self, slot: usize, io: &mut Collaborators<'_>) -> Result<(), TransformError> {
        let id = self.select(slot)?;
        if id == self.active() {
            return self.revert_to_base(io);
        }
        self.request_transform(id, io)
    }

    /// Apply this frame's Omnitrix keys. Refusals are logged, never fatal.
    pub fn handle_input(&mut self, input: &InputState, io: &mut Collaborators<'_>) {
        if input.is_cycle_form_pressed() {
            self.select_next();
        }
        if input.is_transform_pressed() {
            report(self.transform_pressed(io));
        }
        if let Some(slot) = input.form_hotkey_pressed() {
            report(self.hotkey(slot, io));
        }
    }

    fn apply_selection(&mut self, event: SelectionEvent, io: &mut Collaborators<'_>) {
        if event.form.is_base() {
            report(self.revert_to_base(io));
            return;
        }
        if let Err(e) = self.selection.select(event.form.index()) {
            report(Err(e));
            return;
        }
        if event.form != self.active() {
            report(self.request_transform(event.form, io));
        }
    }

    /// Advance cooldowns, queued selections, the sequence and the form timer by `dt`.
    pub fn tick(&mut self, dt: f32, io: &mut Collaborators<'_>) {
        for id in self.cooldowns.tick(dt) {
            if let Some(form) = self.registry.get(id) {
                log::info!("{} is ready again", form.name);
            }
        }

        let events = self.inbox.as_ref().map(SelectionInbox::drain).unwrap_or_default();
        for event in events {
            self.apply_selection(event, io);
        }

        let mut ctx = Self::context(&self.registry, &mut self.cooldowns, &mut self.binding, io);
        if let Some(arrived) = self.sequencer.tick(dt, &mut ctx) {
            if let Some(form) = self.registry.get(arrived) {
                log::info!("Now playing as {}", form.name);
            }
        }
    }

    // Queries

    pub fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    pub fn active(&self) -> FormId {
        self.sequencer.active()
    }

    pub fn active_form(&self) -> &Form {
        self.registry.get(self.active()).unwrap_or_else(|| self.registry.base())
    }

    pub fn active_name(&self) -> &str {
        &self.active_form().name
    }

    pub fn active_body(&self) -> Entity {
        self.active_form().body
    }

    pub fn pending(&self) -> FormId {
        self.selection.pending()
    }

    pub fn pending_name(&self) -> &str {
        self.registry
            .get(self.pending())
            .map(|f| f.name.as_str())
            .unwrap_or_default()
    }

    pub fn is_transformed(&self) -> bool {
        !self.active().is_base()
    }

    pub fn is_transitioning(&self) -> bool {
        self.sequencer.is_transitioning()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.sequencer.stage()
    }

    /// Where the in-flight transition is heading.
    pub fn transition_target(&self) -> Option<FormId> {
        self.sequencer.transition().map(|t| t.to)
    }

    /// Seconds until the current alien times out; 0 in base form.
    pub fn time_remaining(&self) -> f32 {
        if self.is_transformed() {
            self.sequencer.time_remaining()
        } else {
            0.0
        }
    }

    /// Remaining share of the form timer, for the watch dial.
    pub fn time_fraction(&self) -> f32 {
        let duration = self.sequencer.duration();
        if self.is_transformed() && duration > 0.0 {
            (self.sequencer.time_remaining() / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn cooldown_remaining(&self, form: FormId) -> f32 {
        self.cooldowns.remaining(form)
    }

    /// Remaining share of a form's cooldown; 0 when ready.
    pub fn cooldown_fraction(&self, form: FormId) -> f32 {
        match self.registry.get(form) {
            Some(f) if f.cooldown > 0.0 => (self.cooldowns.remaining(form) / f.cooldown).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Could a request for `form` be accepted right now.
    pub fn is_selectable(&self, form: FormId) -> bool {
        self.registry.get(form).is_some() && self.cooldowns.is_ready(form) && !self.is_transitioning()
    }

    /// Is the camera currently following `form`.
    pub fn is_camera_target(&self, form: FormId) -> bool {
        self.registry
            .get(form)
            .is_some_and(|f| self.binding.is_bound_to(f.anchor))
    }

    pub fn camera_target(&self) -> Option<Entity> {
        self.binding.bound()
    }
}

fn report(result: Result<(), TransformError>) {
    match result {
        Ok(()) => {}
        Err(e @ (TransformError::FormOnCooldown { .. } | TransformError::AlreadyTransitioning)) => {
            log::info!("Omnitrix: {}", e)
        }
        Err(e) => log::warn!("Omnitrix: {}", e),
    }
}
