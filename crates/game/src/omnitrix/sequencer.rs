//! The tick-driven transformation sequence.
//!
//! A transformation walks through a fixed set of stages, at most one per tick:
//!
//! 1. outgoing controller disabled, pose captured (`RequestAccepted`)
//! 2. transformation effect played at the captured pose (`EffectsStarted`)
//! 3. after `effect_lead`, outgoing model hidden and camera released;
//!    incoming model shown at the captured pose (`PreviousDisabled`)
//! 4. incoming controller enabled, camera rebound, arrival cue played (`TargetEnabled`)
//! 5. cooldown started for the form being left, duration timer reset (`CooldownApplied`)
//! 6. after `settle` plus any arrival hold, back to idle.

use engine_core::Transform;

use super::camera_rig::CameraBinding;
use super::cooldown::CooldownTracker;
use super::error::TransformError;
use super::form::{FormId, FormRegistry};
use super::Collaborators;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequestAccepted,
    EffectsStarted,
    PreviousDisabled,
    TargetEnabled,
    CooldownApplied,
}

/// Waits inside the sequence, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformTiming {
    /// From the effect starting to the model swap.
    pub effect_lead: f32,
    /// After the cooldown step, before another request is accepted.
    pub settle: f32,
}

impl Default for TransformTiming {
    fn default() -> Self {
        Self { effect_lead: 0.3, settle: 0.3 }
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub from: FormId,
    pub to: FormId,
    pub stage: Stage,
    wait: f32,
    pose: Transform,
    apply_cooldown: bool,
    /// Form to switch into once this transition settles (quick switch).
    then: Option<FormId>,
}

/// Shared borrows of everything a stage may touch.
pub(super) struct SequenceContext<'a, 'c> {
    pub registry: &'a FormRegistry,
    pub cooldowns: &'a mut CooldownTracker,
    pub binding: &'a mut CameraBinding,
    pub io: &'a mut Collaborators<'c>,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    active: FormId,
    transition: Option<Transition>,
    timing: TransformTiming,
    /// How long a non-base form lasts before reverting on its own.
    duration: f32,
    time_remaining: f32,
}

impl Sequencer {
    pub fn new(timing: TransformTiming, duration: f32) -> Self {
        Self {
            active: FormId::BASE,
            transition: None,
            timing,
            duration: duration.max(0.0),
            time_remaining: 0.0,
        }
    }

    pub fn active(&self) -> FormId {
        self.active
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.transition.as_ref().map(|t| t.stage)
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    /// Validate and start a transition out of the active form.
    ///
    /// `then` is validated up front so a quick switch never strands the player
    /// halfway.
    pub(super) fn begin(
        &mut self,
        to: FormId,
        apply_cooldown: bool,
        then: Option<FormId>,
        ctx: &mut SequenceContext<'_, '_>,
    ) -> Result<(), TransformError> {
        if self.transition.is_some() {
            return Err(TransformError::AlreadyTransitioning);
        }
        let from = ctx.registry.form(self.active)?;
        let target = ctx.registry.form(to)?;
        for id in std::iter::once(to).chain(then) {
            let form = ctx.registry.form(id)?;
            if !ctx.cooldowns.is_ready(id) {
                return Err(TransformError::FormOnCooldown {
                    name: form.name.clone(),
                    remaining: ctx.cooldowns.remaining(id),
                });
            }
        }

        ctx.io.scene.set_controller_enabled(from.body, false);
        let pose = ctx.io.scene.pose(from.body).unwrap_or_else(|| {
            log::warn!("{} has no transform; arriving at the origin", from.name);
            Transform::default()
        });
        log::info!("Transforming: {} -> {}", from.name, target.name);

        self.transition = Some(Transition {
            from: self.active,
            to,
            stage: Stage::RequestAccepted,
            wait: 0.0,
            pose,
            apply_cooldown,
            then,
        });
        Ok(())
    }

    /// Advance by one tick. Returns the form arrived in when a transition completes.
    pub(super) fn tick(&mut self, dt: f32, ctx: &mut SequenceContext<'_, '_>) -> Option<FormId> {
        if let Some(mut transition) = self.transition.take() {
            if !self.advance(&mut transition, dt, ctx) {
                self.transition = Some(transition);
                return None;
            }
            log::debug!("Transformation into {} settled", transition.to);
            if let Some(next) = transition.then {
                if let Err(e) = self.begin(next, true, None, ctx) {
                    log::warn!("Quick switch to {} abandoned: {}", next, e);
                }
            }
            return Some(transition.to);
        }

        if !self.active.is_base() && self.duration > 0.0 {
            self.time_remaining = (self.time_remaining - dt).max(0.0);
            if self.time_remaining == 0.0 {
                log::info!("Time's up for {}", self.active);
                if let Err(e) = self.begin(FormId::BASE, true, None, ctx) {
                    log::warn!("Timed revert failed: {}", e);
                }
            }
        }
        None
    }

    /// Run the current stage. True once the transition is finished.
    fn advance(
        &mut self,
        t: &mut Transition,
        dt: f32,
        ctx: &mut SequenceContext<'_, '_>,
    ) -> bool {
        // Both forms were validated in `begin` and the registry never changes.
        let (Some(from), Some(to)) = (ctx.registry.get(t.from), ctx.registry.get(t.to)) else {
            return true;
        };

        match t.stage {
            Stage::RequestAccepted => {
                ctx.io.effects.play_at(t.pose.position);
                t.wait = self.timing.effect_lead;
                t.stage = Stage::EffectsStarted;
            }
            Stage::EffectsStarted => {
                t.wait -= dt;
                if t.wait <= 0.0 {
                    ctx.io.scene.set_model_active(from.body, false);
                    ctx.binding.release();
                    ctx.io.scene.set_model_active(to.body, true);
                    ctx.io.scene.place(to.body, &t.pose);
                    t.stage = Stage::PreviousDisabled;
                }
            }
            Stage::PreviousDisabled => {
                ctx.io.scene.set_controller_enabled(to.body, true);
                ctx.binding.bind(ctx.io.camera, to);
                self.active = t.to;
                t.wait = 0.0;
                if let Some((cue, hold)) = to.arrival {
                    ctx.io.scene.trigger_cue(to.body, cue);
                    t.wait = hold;
                }
                t.stage = Stage::TargetEnabled;
            }
            Stage::TargetEnabled => {
                if t.apply_cooldown && t.to.is_base() && !t.from.is_base() {
                    ctx.cooldowns.start(t.from, from.cooldown);
                }
                self.time_remaining = if t.to.is_base() { 0.0 } else { self.duration };
                t.wait += self.timing.settle;
                t.stage = Stage::CooldownApplied;
            }
            Stage::CooldownApplied => {
                t.wait -= dt;
                return t.wait <= 0.0;
            }
        }
        false
    }
}
