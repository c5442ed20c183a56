//! Orbiting follow camera for third-person play.

use engine_core::{Entity, Transform};
use glam::{Quat, Vec2, Vec3};

use crate::smoothing::smooth_damp;

/// How far in front of an obstruction the camera stops.
const COLLISION_BUFFER: f32 = 0.1;

/// Zoom presets. Each scales the distance the bound form asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    Close,
    #[default]
    Medium,
    Far,
    Combat,
}

impl CameraMode {
    /// Multiplier applied to the bound follow distance.
    pub fn distance_scale(&self) -> f32 {
        match self {
            CameraMode::Close => 0.6,
            CameraMode::Medium => 1.0,
            CameraMode::Far => 1.4,
            CameraMode::Combat => 0.8,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            CameraMode::Close => CameraMode::Medium,
            CameraMode::Medium => CameraMode::Far,
            CameraMode::Far => CameraMode::Combat,
            CameraMode::Combat => CameraMode::Close,
        }
    }
}

/// Third-person orbit camera with per-target framing.
#[derive(Debug, Clone)]
pub struct ThirdPersonCamera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Mouse sensitivity in radians per mouse unit.
    pub sensitivity: f32,
    /// Closest the camera may be pulled in by collision.
    pub min_distance: f32,
    /// Higher follows more tightly.
    pub follow_speed: f32,
    /// Pitch limits in radians (positive looks down on the target).
    pub min_pitch: f32,
    pub max_pitch: f32,
    target: Option<Entity>,
    follow_distance: f32,
    height_offset: f32,
    mode: CameraMode,
    /// Orbit angles in radians.
    yaw: f32,
    pitch: f32,
    velocity: Vec3,
}

impl Default for ThirdPersonCamera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            sensitivity: 0.002,
            min_distance: 1.0,
            follow_speed: 10.0,
            min_pitch: (-30.0f32).to_radians(),
            max_pitch: 60.0f32.to_radians(),
            target: None,
            follow_distance: 5.0,
            height_offset: 1.5,
            mode: CameraMode::Medium,
            yaw: 0.0,
            pitch: 10.0f32.to_radians(),
            velocity: Vec3::ZERO,
        }
    }
}

impl ThirdPersonCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    /// Point the rig at a new anchor with that anchor's framing.
    pub fn bind_target(&mut self, anchor: Entity, distance: f32, height: f32) {
        self.target = Some(anchor);
        self.follow_distance = distance.max(self.min_distance);
        self.height_offset = height;
        log::info!(
            "Camera following {:?} at distance {:.1} and height {:.1}",
            anchor,
            self.follow_distance,
            height
        );
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn follow_distance(&self) -> f32 {
        self.follow_distance
    }

    pub fn height_offset(&self) -> f32 {
        self.height_offset
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Advance to the next zoom preset.
    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        log::info!("Camera mode switched to {:?}", self.mode);
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Orbit from mouse movement.
    pub fn process_mouse(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.sensitivity;
        self.pitch = (self.pitch + delta.y * self.sensitivity).clamp(self.min_pitch, self.max_pitch);
    }

    /// Re-centre behind a heading with a slight downward angle.
    pub fn reset_behind(&mut self, heading: f32) {
        self.yaw = heading;
        self.pitch = 10.0f32.to_radians();
    }

    fn orbit_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch)
    }

    /// Point the camera looks at for an anchor position.
    pub fn focus_point(&self, anchor: Vec3) -> Vec3 {
        anchor + Vec3::Y * self.height_offset
    }

    /// Where the camera wants to be for an anchor position.
    ///
    /// `obstruction(origin, direction, max_distance)` returns the distance to the first
    /// blocking surface; the camera is pulled in front of it but never closer than `min_distance`.
    pub fn desired_position<F>(&self, anchor: Vec3, mut obstruction: F) -> Vec3
    where
        F: FnMut(Vec3, Vec3, f32) -> Option<f32>,
    {
        let focus = self.focus_point(anchor);
        let direction = self.orbit_rotation() * Vec3::Z;
        let mut distance = self.follow_distance * self.mode.distance_scale();
        if let Some(hit) = obstruction(focus, direction, distance) {
            distance = (hit - COLLISION_BUFFER).max(self.min_distance);
        }
        focus + direction * distance
    }

    /// Per-frame follow: orbit from `look`, smooth towards the desired position, face the focus.
    pub fn update<F>(&mut self, anchor: Vec3, look: Vec2, dt: f32, obstruction: F)
    where
        F: FnMut(Vec3, Vec3, f32) -> Option<f32>,
    {
        self.process_mouse(look);
        let desired = self.desired_position(anchor, obstruction);
        self.transform.position = smooth_damp(
            self.transform.position,
            desired,
            &mut self.velocity,
            1.0 / self.follow_speed.max(0.01),
            dt,
        );
        let focus = self.focus_point(anchor);
        self.transform.look_at(focus, Vec3::Y);
    }

    /// Jump straight to the desired position (scene start, teleports).
    pub fn snap<F>(&mut self, anchor: Vec3, obstruction: F)
    where
        F: FnMut(Vec3, Vec3, f32) -> Option<f32>,
    {
        self.transform.position = self.desired_position(anchor, obstruction);
        self.velocity = Vec3::ZERO;
        let focus = self.focus_point(anchor);
        self.transform.look_at(focus, Vec3::Y);
    }

    /// Flattened camera forward, for camera-relative movement.
    pub fn planar_forward(&self) -> Vec3 {
        let f = self.orbit_rotation() * -Vec3::Z;
        Vec3::new(f.x, 0.0, f.z).normalize_or_zero()
    }
}
