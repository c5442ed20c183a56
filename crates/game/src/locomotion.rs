//! One movement controller for every form, configured per form.
//!
//! Forms differ only in their [`LocomotionProfile`]: speeds, jump, gravity,
//! optional flight and up to three ability slots on Q/E/F.

use camera::lerp_angle;
use engine_core::{Transform, Vec3};
use glam::Quat;
use hecs::{Entity, World};
use input::InputState;
use physics::PhysicsWorld;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationCue, Animator};
use crate::omnitrix::FormPresence;

/// Vertical speed given when taking off into flight.
const TAKEOFF_SPEED: f32 = 4.0;
/// Eye height projectiles are launched from, before the body's size is applied.
const MUZZLE_HEIGHT: f32 = 1.5;
/// Gap kept between a dash and the wall that stopped it.
const DASH_CLEARANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKey {
    /// Q
    Primary,
    /// E
    Secondary,
    /// F
    Tertiary,
}

impl AbilityKey {
    fn pressed(self, input: &InputState) -> bool {
        match self {
            AbilityKey::Primary => input.is_primary_ability_pressed(),
            AbilityKey::Secondary => input.is_secondary_ability_pressed(),
            AbilityKey::Tertiary => input.is_tertiary_ability_pressed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ability {
    SuperSpeed { multiplier: f32, duration: f32, cooldown: f32 },
    Dash { distance: f32, cooldown: f32 },
    /// Toggle between normal size and `scale`, growing over `duration`.
    Grow { scale: f32, duration: f32 },
    GroundPound { radius: f32, damage: f32, force: f32, cooldown: f32 },
    CosmicRay { speed: f32, damage: f32, blast_radius: f32, lifetime: f32, cooldown: f32 },
}

impl Ability {
    pub fn cooldown(&self) -> f32 {
        match *self {
            Ability::SuperSpeed { cooldown, .. }
            | Ability::Dash { cooldown, .. }
            | Ability::GroundPound { cooldown, .. }
            | Ability::CosmicRay { cooldown, .. } => cooldown,
            Ability::Grow { duration, .. } => duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub key: AbilityKey,
    pub ability: Ability,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightProfile {
    pub fly_speed: f32,
    pub vertical_speed: f32,
}

/// Movement tuning for one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionProfile {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_force: f32,
    /// Downward acceleration (positive).
    pub gravity: f32,
    /// Roughly how long a turn towards the move direction takes.
    pub turn_smooth_time: f32,
    /// How far below the feet still counts as standing on ground.
    pub ground_probe: f32,
    /// Space toggles flight when set.
    pub flight: Option<FlightProfile>,
    pub abilities: Vec<AbilitySlot>,
}

impl Default for LocomotionProfile {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 6.0,
            jump_force: 8.0,
            gravity: 15.0,
            turn_smooth_time: 0.1,
            ground_probe: 0.4,
            flight: None,
            abilities: Vec::new(),
        }
    }
}

/// Gameplay consequences of an ability, resolved by the combat systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEvent {
    Shockwave { source: Entity, center: Vec3, radius: f32, damage: f32, force: f32 },
    Projectile {
        source: Entity,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
        damage: f32,
        blast_radius: f32,
        lifetime: f32,
    },
}

/// Movement state of a form body. Only runs while the body's controller is enabled.
#[derive(Debug, Clone)]
pub struct Locomotion {
    pub profile: LocomotionProfile,
    pub velocity: Vec3,
    pub grounded: bool,
    pub flying: bool,
    /// Current planar speed.
    pub speed: f32,
    ability_cooldowns: Vec<f32>,
    super_speed: f32,
    super_speed_multiplier: f32,
    base_scale: Vec3,
    size: f32,
    size_target: f32,
    size_rate: f32,
}

impl Locomotion {
    pub fn new(profile: LocomotionProfile, base_scale: Vec3) -> Self {
        let slots = profile.abilities.len();
        Self {
            profile,
            velocity: Vec3::ZERO,
            grounded: false,
            flying: false,
            speed: 0.0,
            ability_cooldowns: vec![0.0; slots],
            super_speed: 0.0,
            super_speed_multiplier: 1.0,
            base_scale,
            size: 1.0,
            size_target: 1.0,
            size_rate: 0.0,
        }
    }

    /// Drop momentum; called when the controller is (re)enabled after a transformation.
    pub fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
        self.speed = 0.0;
        self.flying = false;
        self.super_speed = 0.0;
    }

    pub fn ability_cooldown(&self, slot: usize) -> f32 {
        self.ability_cooldowns.get(slot).copied().unwrap_or(0.0)
    }

    pub fn is_super_speed(&self) -> bool {
        self.super_speed > 0.0
    }

    /// Current size multiplier from Grow.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// One frame of movement. `forward` is the camera's flattened forward.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        entity: Entity,
        transform: &mut Transform,
        input: &InputState,
        physics: &PhysicsWorld,
        forward: Vec3,
        dt: f32,
        events: &mut Vec<AbilityEvent>,
    ) -> Option<AnimationCue> {
        for cd in &mut self.ability_cooldowns {
            *cd = (*cd - dt).max(0.0);
        }
        self.super_speed = (self.super_speed - dt).max(0.0);

        if !self.flying {
            match physics.ground_probe(transform.position, self.profile.ground_probe) {
                Some(hit) if self.velocity.y <= 0.0 => {
                    self.grounded = true;
                    transform.position.y = hit.point.y;
                    self.velocity.y = 0.0;
                }
                _ => self.grounded = false,
            }
        }

        let mut one_shot = None;
        if !self.flying {
            for slot in 0..self.profile.abilities.len() {
                let AbilitySlot { key, ability } = self.profile.abilities[slot];
                if !key.pressed(input) {
                    continue;
                }
                if self.ability_cooldowns[slot] > 0.0 {
                    log::debug!("{:?} recharging ({:.1}s)", ability, self.ability_cooldowns[slot]);
                    continue;
                }
                if let Some(cue) = self.activate(entity, ability, transform, physics, events) {
                    self.ability_cooldowns[slot] = ability.cooldown();
                    one_shot = Some(cue);
                }
            }
        }

        // Flight forms use Space to take off and land instead of jumping.
        if let Some(flight) = self.profile.flight {
            if input.is_jump_pressed() {
                self.flying = !self.flying;
                self.velocity.y = if self.flying { TAKEOFF_SPEED } else { 0.0 };
                log::debug!("{}", if self.flying { "Taking off" } else { "Gliding down" });
            } else if self.flying {
                self.velocity.y = input.flight_vertical() * flight.vertical_speed;
            }
        }
        if !self.flying {
            if self.grounded && self.profile.flight.is_none() && input.is_jump_pressed() {
                self.velocity.y = self.profile.jump_force;
                self.grounded = false;
            } else if !self.grounded {
                self.velocity.y -= self.profile.gravity * dt;
            }
        }

        let movement = input.get_movement_input();
        let right = forward.cross(Vec3::Y);
        let direction = (forward * movement.y + right * movement.x).normalize_or_zero();
        let mut target_speed = match self.profile.flight {
            Some(flight) if self.flying => flight.fly_speed,
            _ if input.is_running() => self.profile.run_speed,
            _ => self.profile.walk_speed,
        };
        if self.super_speed > 0.0 {
            target_speed *= self.super_speed_multiplier;
        }

        if direction != Vec3::ZERO {
            let heading = (-direction.x).atan2(-direction.z);
            let t = dt / self.profile.turn_smooth_time.max(1e-3);
            transform.rotation = Quat::from_rotation_y(lerp_angle(transform.yaw(), heading, t));
            self.speed = target_speed;
        } else {
            self.speed = 0.0;
        }

        let planar = direction * self.speed;
        self.velocity.x = planar.x;
        self.velocity.z = planar.z;
        transform.position += self.velocity * dt;

        if self.flying && self.velocity.y < 0.0 {
            if let Some(hit) = physics.ground_probe(transform.position, self.profile.ground_probe) {
                self.flying = false;
                self.grounded = true;
                self.velocity.y = 0.0;
                transform.position.y = hit.point.y;
                one_shot = one_shot.or(Some(AnimationCue::Land));
            }
        }

        if self.size != self.size_target {
            let step = self.size_rate * dt;
            let delta = self.size_target - self.size;
            self.size = if delta.abs() <= step { self.size_target } else { self.size + step * delta.signum() };
            transform.scale = self.base_scale * self.size;
        }

        one_shot
    }

    fn activate(
        &mut self,
        entity: Entity,
        ability: Ability,
        transform: &mut Transform,
        physics: &PhysicsWorld,
        events: &mut Vec<AbilityEvent>,
    ) -> Option<AnimationCue> {
        let facing = {
            let f = transform.forward();
            Vec3::new(f.x, 0.0, f.z).normalize_or_zero()
        };
        match ability {
            Ability::SuperSpeed { multiplier, duration, .. } => {
                self.super_speed = duration;
                self.super_speed_multiplier = multiplier;
                log::info!("Super speed x{:.0} for {:.1}s", multiplier, duration);
                Some(AnimationCue::Run)
            }
            Ability::Dash { distance, .. } => {
                let chest = transform.position + Vec3::Y;
                let reach = physics
                    .obstruction_distance(chest, facing, distance)
                    .map(|d| (d - DASH_CLEARANCE).max(0.0))
                    .unwrap_or(distance);
                transform.position += facing * reach;
                Some(AnimationCue::Dash)
            }
            Ability::Grow { scale, duration } => {
                self.size_target = if self.size_target == 1.0 { scale } else { 1.0 };
                self.size_rate = (scale - 1.0).abs() / duration.max(1e-3);
                log::info!("{} to x{:.1}", if self.size_target > 1.0 { "Growing" } else { "Shrinking" }, self.size_target);
                None
            }
            Ability::GroundPound { radius, damage, force, .. } => {
                if !self.grounded {
                    return None;
                }
                events.push(AbilityEvent::Shockwave {
                    source: entity,
                    center: transform.position,
                    radius: radius * self.size,
                    damage,
                    force,
                });
                Some(AnimationCue::GroundPound)
            }
            Ability::CosmicRay { speed, damage, blast_radius, lifetime, .. } => {
                let origin = transform.position + Vec3::Y * MUZZLE_HEIGHT * transform.scale.y + facing;
                events.push(AbilityEvent::Projectile {
                    source: entity,
                    origin,
                    direction: facing,
                    speed,
                    damage,
                    blast_radius,
                    lifetime,
                });
                Some(AnimationCue::Attack)
            }
        }
    }

    /// Looping animation for the current movement state.
    pub fn locomotion_cue(&self) -> AnimationCue {
        if self.flying {
            AnimationCue::Fly
        } else if !self.grounded {
            if self.velocity.y > 0.0 { AnimationCue::Jump } else { AnimationCue::Fall }
        } else if self.speed > self.profile.walk_speed + f32::EPSILON {
            AnimationCue::Run
        } else if self.speed > 0.0 {
            AnimationCue::Walk
        } else {
            AnimationCue::Idle
        }
    }
}

/// Move every body whose controller is enabled. Returns the abilities fired this frame.
pub fn update_locomotion(
    world: &mut World,
    physics: &PhysicsWorld,
    input: &InputState,
    forward: Vec3,
    dt: f32,
) -> Vec<AbilityEvent> {
    let mut events = Vec::new();
    for (entity, (transform, locomotion, presence, animator)) in
        world.query_mut::<(&mut Transform, &mut Locomotion, &FormPresence, Option<&mut Animator>)>()
    {
        if !presence.is_controller_enabled() {
            continue;
        }
        let one_shot = locomotion.step(entity, transform, input, physics, forward, dt, &mut events);
        if let Some(animator) = animator {
            animator.set_locomotion(locomotion.locomotion_cue(), locomotion.speed);
            if let Some(cue) = one_shot {
                animator.trigger(cue);
            }
        }
    }
    events
}
