//! Common ECS components used across the engine.

use glam::Vec3;

/// Velocity component for moving entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        self.current / self.max
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// AI state for enemies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AIState {
    #[default]
    Idle,
    Patrolling,
    Chasing,
    Attacking,
    /// Recoiling from a hit; no movement or attacks until the stagger ends.
    Staggered,
    Dead,
}

/// Component storing AI behavior state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AIComponent {
    pub state: AIState,
    pub target: Option<hecs::Entity>,
    pub aggro_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub current_cooldown: f32,
    /// Seconds left in the current state when it is timed (stagger, patrol wait).
    pub state_timer: f32,
}

impl AIComponent {
    pub fn new(aggro_range: f32, attack_range: f32, attack_cooldown: f32) -> Self {
        Self {
            state: AIState::Idle,
            target: None,
            aggro_range,
            attack_range,
            attack_cooldown,
            current_cooldown: 0.0,
            state_timer: 0.0,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.current_cooldown <= 0.0
    }

    pub fn trigger_attack(&mut self) {
        self.current_cooldown = self.attack_cooldown;
    }

    pub fn update_cooldown(&mut self, dt: f32) {
        self.current_cooldown = (self.current_cooldown - dt).max(0.0);
    }

    /// Enter `state`, holding it for `seconds` when the state is timed.
    pub fn enter(&mut self, state: AIState, seconds: f32) {
        if self.state != state {
            log::debug!("AI {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        self.state_timer = seconds;
    }
}

/// Lifetime component for temporary entities (projectiles, corpses, effects).
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// Damage component for projectiles and shockwaves.
#[derive(Debug, Clone, Copy)]
pub struct Damage {
    pub amount: f32,
    pub damage_type: DamageType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DamageType {
    #[default]
    Melee,
    Fire,
    Crystal,
    Electric,
    Shockwave,
    CosmicRay,
}

impl Damage {
    pub fn new(amount: f32, damage_type: DamageType) -> Self {
        Self { amount, damage_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_clamps_between_zero_and_max() {
        let mut h = Health::new(50.0);
        h.take_damage(80.0);
        assert_eq!(h.current, 0.0);
        assert!(h.is_dead());
        h.heal(500.0);
        assert_eq!(h.current, 50.0);
        assert_eq!(h.percentage(), 1.0);
    }

    #[test]
    fn ai_cooldown_gates_attacks() {
        let mut ai = AIComponent::new(15.0, 3.0, 2.0);
        assert!(ai.can_attack());
        ai.trigger_attack();
        assert!(!ai.can_attack());
        ai.update_cooldown(1.5);
        assert!(!ai.can_attack());
        ai.update_cooldown(1.0);
        assert!(ai.can_attack());
    }

    #[test]
    fn lifetime_expires() {
        let mut l = Lifetime::new(0.5);
        assert!(!l.update(0.25));
        assert!(l.update(0.25));
    }
}
