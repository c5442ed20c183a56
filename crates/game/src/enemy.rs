//! Kevin-style enemy: patrols home, chases what it can see, melee plus special attacks.

use std::ops::RangeInclusive;

use engine_core::{AIComponent, AIState, DamageType, Health, Lifetime, Transform, Vec3};
use glam::Quat;
use hecs::{Entity, World};
use physics::PhysicsWorld;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Height of the eyes used for line-of-sight checks.
const EYE_HEIGHT: f32 = 1.6;
/// Close enough to a patrol point to stop.
const ARRIVE_DISTANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    FireBlast,
    CrystalShard,
    ElectricShock,
}

impl SpecialKind {
    pub fn damage_type(&self) -> DamageType {
        match self {
            SpecialKind::FireBlast => DamageType::Fire,
            SpecialKind::CrystalShard => DamageType::Crystal,
            SpecialKind::ElectricShock => DamageType::Electric,
        }
    }

    /// Thrown as a projectile (the shock hits instantly).
    pub fn is_ranged(&self) -> bool {
        !matches!(self, SpecialKind::ElectricShock)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpecialAttack {
    pub kind: SpecialKind,
    pub damage: f32,
    pub cooldown: f32,
    pub range: f32,
    timer: f32,
}

impl SpecialAttack {
    pub fn new(kind: SpecialKind, damage: f32, cooldown: f32, range: f32) -> Self {
        Self { kind, damage, cooldown, range, timer: 0.0 }
    }

    pub fn is_ready(&self) -> bool {
        self.timer <= 0.0
    }
}

/// Stats and memory of one enemy. Ranges and melee cooldown live on its [`AIComponent`].
#[derive(Debug, Clone)]
pub struct Enemy {
    pub name: String,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub attack_damage: f32,
    pub stagger_duration: f32,
    /// Seconds it keeps chasing after losing sight.
    pub aggro_time: f32,
    pub patrol_wait: f32,
    pub min_patrol_distance: f32,
    pub max_patrol_distance: f32,
    /// Corpse lingers this long before despawning.
    pub destroy_delay: f32,
    pub specials: Vec<SpecialAttack>,
    pub home: Vec3,
    patrol_target: Option<Vec3>,
    aggro_remaining: f32,
    last_health: Option<f32>,
}

impl Enemy {
    /// The boss defaults.
    pub fn kevin(home: Vec3) -> Self {
        Self {
            name: "Kevin".to_string(),
            patrol_speed: 3.0,
            chase_speed: 6.0,
            attack_damage: 20.0,
            stagger_duration: 1.0,
            aggro_time: 10.0,
            patrol_wait: 2.0,
            min_patrol_distance: 5.0,
            max_patrol_distance: 15.0,
            destroy_delay: 3.0,
            specials: vec![
                SpecialAttack::new(SpecialKind::FireBlast, 30.0, 8.0, 15.0),
                SpecialAttack::new(SpecialKind::CrystalShard, 15.0, 6.0, 15.0),
                SpecialAttack::new(SpecialKind::ElectricShock, 25.0, 10.0, 8.0),
            ],
            home,
            patrol_target: None,
            aggro_remaining: 0.0,
            last_health: None,
        }
    }

    pub fn is_aggroed(&self) -> bool {
        self.aggro_remaining > 0.0
    }

    /// Patrol reach bounds, ordered and never negative.
    pub fn patrol_range(&self) -> RangeInclusive<f32> {
        let a = self.min_patrol_distance.max(0.0).min(f32::MAX);
        let b = self.max_patrol_distance.max(0.0).min(f32::MAX);
        a.min(b)..=a.max(b)
    }
}

/// Components for a fresh Kevin.
pub fn spawn_kevin(world: &mut World, home: Vec3) -> Entity {
    world.spawn((
        Transform::from_position(home),
        Enemy::kevin(home),
        AIComponent::new(15.0, 3.0, 2.0),
        Health::new(200.0),
    ))
}

/// What the enemies did this frame that affects the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    Melee { source: Entity, damage: f32 },
    Special { source: Entity, kind: SpecialKind, origin: Vec3, direction: Vec3, damage: f32 },
    Died { source: Entity, position: Vec3 },
}

/// Drives every [`Enemy`] towards one target (the active form).
pub struct EnemyAI {
    target: Vec3,
    rng: StdRng,
}

impl EnemyAI {
    pub fn new(seed: u64) -> Self {
        Self { target: Vec3::ZERO, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn update_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn update(&mut self, world: &mut World, physics: &PhysicsWorld, dt: f32) -> Vec<EnemyAction> {
        let mut actions = Vec::new();
        let mut dead = Vec::new();
        let target = self.target;

        for (entity, (transform, enemy, ai, health)) in
            world.query_mut::<(&mut Transform, &mut Enemy, &mut AIComponent, &Health)>()
        {
            if ai.state == AIState::Dead {
                continue;
            }
            if health.is_dead() {
                ai.enter(AIState::Dead, 0.0);
                log::info!("{} is down", enemy.name);
                actions.push(EnemyAction::Died { source: entity, position: transform.position });
                dead.push((entity, enemy.destroy_delay));
                continue;
            }

            if enemy.last_health.is_some_and(|last| health.current < last) {
                ai.enter(AIState::Staggered, enemy.stagger_duration);
                enemy.aggro_remaining = enemy.aggro_time;
            }
            enemy.last_health = Some(health.current);

            ai.update_cooldown(dt);
            for special in &mut enemy.specials {
                special.timer = (special.timer - dt).max(0.0);
            }

            let to_target = target - transform.position;
            let distance = to_target.length();
            let eye = transform.position + Vec3::Y * EYE_HEIGHT;
            let sees = distance <= ai.aggro_range
                && physics.line_of_sight(eye, target + Vec3::Y * EYE_HEIGHT);
            if sees {
                enemy.aggro_remaining = enemy.aggro_time;
            } else {
                enemy.aggro_remaining = (enemy.aggro_remaining - dt).max(0.0);
            }
            let aggroed = enemy.is_aggroed();

            match ai.state {
                AIState::Staggered => {
                    ai.state_timer -= dt;
                    if ai.state_timer <= 0.0 {
                        let next = if aggroed { AIState::Chasing } else { AIState::Idle };
                        ai.enter(next, enemy.patrol_wait);
                    }
                }
                AIState::Idle => {
                    ai.state_timer -= dt;
                    if aggroed {
                        ai.enter(AIState::Chasing, 0.0);
                    } else if ai.state_timer <= 0.0 {
                        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                        let reach = self.rng.gen_range(enemy.patrol_range());
                        enemy.patrol_target =
                            Some(enemy.home + Vec3::new(angle.cos(), 0.0, angle.sin()) * reach);
                        ai.enter(AIState::Patrolling, 0.0);
                    }
                }
                AIState::Patrolling => {
                    if aggroed {
                        enemy.patrol_target = None;
                        ai.enter(AIState::Chasing, 0.0);
                    } else if let Some(point) = enemy.patrol_target {
                        if step_towards(transform, point, enemy.patrol_speed, dt) <= ARRIVE_DISTANCE {
                            enemy.patrol_target = None;
                            ai.enter(AIState::Idle, enemy.patrol_wait);
                        }
                    } else {
                        ai.enter(AIState::Idle, enemy.patrol_wait);
                    }
                }
                AIState::Chasing => {
                    if !aggroed {
                        ai.enter(AIState::Idle, enemy.patrol_wait);
                    } else if distance <= ai.attack_range {
                        ai.enter(AIState::Attacking, 0.0);
                    } else {
                        if let Some(action) = try_special(entity, enemy, eye, to_target, distance, sees, &mut self.rng) {
                            actions.push(action);
                        }
                        step_towards(transform, target, enemy.chase_speed, dt);
                    }
                }
                AIState::Attacking => {
                    if distance > ai.attack_range * 1.5 {
                        ai.enter(AIState::Chasing, 0.0);
                    } else {
                        face(transform, to_target);
                        if ai.can_attack() {
                            ai.trigger_attack();
                            actions.push(EnemyAction::Melee { source: entity, damage: enemy.attack_damage });
                        }
                    }
                }
                AIState::Dead => {}
            }
        }

        for (entity, delay) in dead {
            if let Err(e) = world.insert_one(entity, Lifetime::new(delay)) {
                log::warn!("Cannot schedule removal of {:?}: {}", entity, e);
            }
        }
        actions
    }
}

/// Pick a random ready special in range.
fn try_special(
    source: Entity,
    enemy: &mut Enemy,
    eye: Vec3,
    to_target: Vec3,
    distance: f32,
    sees: bool,
    rng: &mut StdRng,
) -> Option<EnemyAction> {
    if !sees {
        return None;
    }
    let ready: Vec<usize> = enemy
        .specials
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_ready() && distance <= s.range)
        .map(|(i, _)| i)
        .collect();
    if ready.is_empty() {
        return None;
    }
    let special = &mut enemy.specials[ready[rng.gen_range(0..ready.len())]];
    special.timer = special.cooldown;
    log::debug!("{} uses {:?}", enemy.name, special.kind);
    Some(EnemyAction::Special {
        source,
        kind: special.kind,
        origin: eye,
        direction: to_target.normalize_or_zero(),
        damage: special.damage,
    })
}

/// Move flat towards `point`; returns the remaining distance.
fn step_towards(transform: &mut Transform, point: Vec3, speed: f32, dt: f32) -> f32 {
    let mut offset = point - transform.position;
    offset.y = 0.0;
    let distance = offset.length();
    if distance > 1e-4 {
        let step = (speed * dt).min(distance);
        transform.position += offset / distance * step;
        face(transform, offset);
        distance - step
    } else {
        0.0
    }
}

fn face(transform: &mut Transform, direction: Vec3) {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() > 1e-6 {
        transform.rotation = Quat::from_rotation_y((-flat.x).atan2(-flat.z));
    }
}
