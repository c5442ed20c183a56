//! Keeping the follow camera on whichever form is active.

use camera::ThirdPersonCamera;
use hecs::Entity;

use super::form::Form;

/// A camera that can be pointed at a form's anchor.
pub trait CameraRig {
    fn bind_target(&mut self, anchor: Entity, distance: f32, height: f32);
}

impl CameraRig for ThirdPersonCamera {
    fn bind_target(&mut self, anchor: Entity, distance: f32, height: f32) {
        ThirdPersonCamera::bind_target(self, anchor, distance, height);
    }
}

/// Which anchor the coordinator last bound. Released while the outgoing
/// model is hidden, rebound once the incoming controller is live.
#[derive(Debug, Clone, Default)]
pub struct CameraBinding {
    bound: Option<Entity>,
}

impl CameraBinding {
    pub fn bind(&mut self, rig: &mut dyn CameraRig, form: &Form) {
        rig.bind_target(form.anchor, form.camera_distance, form.camera_height);
        self.bound = Some(form.anchor);
    }

    pub fn release(&mut self) -> Option<Entity> {
        self.bound.take()
    }

    pub fn bound(&self) -> Option<Entity> {
        self.bound
    }

    pub fn is_bound_to(&self, anchor: Entity) -> bool {
        self.bound == Some(anchor)
    }
}
