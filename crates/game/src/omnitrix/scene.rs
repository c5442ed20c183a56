//! The scene-side operations the transformation sequence performs on form bodies.

use engine_core::Transform;
use hecs::{Entity, World};

use super::form::{FormId, FormPresence};
use crate::animation::{AnimationCue, AnimationSet, Animator};
use crate::locomotion::Locomotion;

/// What the coordinator needs from the world holding the form bodies.
pub trait FormScene {
    /// Attach presence and animation state to `body`. False if the body does not exist.
    fn attach(&mut self, body: Entity, form: FormId, animations: &AnimationSet) -> bool;
    /// Is `entity` still alive in the scene.
    fn exists(&self, entity: Entity) -> bool;
    fn set_model_active(&mut self, body: Entity, active: bool);
    fn set_controller_enabled(&mut self, body: Entity, enabled: bool);
    fn pose(&self, body: Entity) -> Option<Transform>;
    /// Move `body` to `pose`, keeping its own scale.
    fn place(&mut self, body: Entity, pose: &Transform);
    fn trigger_cue(&mut self, body: Entity, cue: AnimationCue);
}

impl FormScene for World {
    fn attach(&mut self, body: Entity, form: FormId, animations: &AnimationSet) -> bool {
        self.insert(body, (FormPresence::new(form), Animator::new(animations.clone())))
            .is_ok()
    }

    fn exists(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn set_model_active(&mut self, body: Entity, active: bool) {
        match self.get::<&mut FormPresence>(body) {
            Ok(mut presence) => presence.set_model_active(active),
            Err(e) => log::warn!("Cannot toggle model of {:?}: {}", body, e),
        }
    }

    fn set_controller_enabled(&mut self, body: Entity, enabled: bool) {
        match self.get::<&mut FormPresence>(body) {
            Ok(mut presence) => presence.set_controller_enabled(enabled),
            Err(e) => {
                log::warn!("Cannot toggle controller of {:?}: {}", body, e);
                return;
            }
        }
        if enabled {
            if let Ok(mut locomotion) = self.get::<&mut Locomotion>(body) {
                locomotion.reset();
            }
        }
    }

    fn pose(&self, body: Entity) -> Option<Transform> {
        self.get::<&Transform>(body).ok().map(|t| *t)
    }

    fn place(&mut self, body: Entity, pose: &Transform) {
        if let Ok(mut transform) = self.get::<&mut Transform>(body) {
            transform.carry_pose(pose);
        }
    }

    fn trigger_cue(&mut self, body: Entity, cue: AnimationCue) {
        if let Ok(mut animator) = self.get::<&mut Animator>(body) {
            animator.trigger(cue);
        }
    }
}
