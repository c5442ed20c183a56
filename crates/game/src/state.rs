//! Scene wiring: owns every system and runs one frame of gameplay in a fixed order.

use std::time::Duration;

use anyhow::{Context, Result};
use camera::ThirdPersonCamera;
use engine_core::{Damage, DamageType, Health, Time, Transform};
use glam::Vec3;
use hecs::{Entity, World};
use input::InputState;
use physics::PhysicsWorld;

use crate::animation::{AnimationCue, Animator};
use crate::combat::{apply_area_damage, cleanup_expired, spawn_projectile, update_projectiles, Faction};
use crate::config::GameConfig;
use crate::effects::TransformationEffects;
use crate::enemy::{spawn_kevin, EnemyAI, EnemyAction};
use crate::locomotion::{update_locomotion, AbilityEvent, Locomotion};
use crate::omnitrix::{Collaborators, FormPresence, FormRegistry, FormScene, FormSpec, OmnitrixController};
use crate::wheel::AlienWheel;

/// Half size of the walled arena.
const ARENA_HALF: f32 = 40.0;
/// Alien bodies wait below the arena until they are switched in.
const PARK_DEPTH: f32 = -100.0;
const PLAYER_HEALTH: f32 = 100.0;
const ENEMY_SHOT_SPEED: f32 = 20.0;
const ENEMY_SHOT_LIFETIME: f32 = 3.0;
const KEVIN_HOME: Vec3 = Vec3::new(0.0, 0.0, -20.0);
const ENEMY_SEED: u64 = 0x0B10_7E11;

pub struct GameState {
    pub world: World,
    pub physics: PhysicsWorld,
    pub input: InputState,
    pub time: Time,
    pub camera: ThirdPersonCamera,
    pub omnitrix: OmnitrixController,
    pub effects: TransformationEffects,
    pub wheel: AlienWheel,
    enemy_ai: EnemyAI,
    /// Vitals shared by every form.
    pub player: Health,
    pub kills: u32,
    pub running: bool,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let mut world = World::new();
        let physics = build_arena();

        let specs: Vec<FormSpec> = config
            .forms
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let position = if i == 0 { Vec3::ZERO } else { Vec3::new(i as f32 * 3.0, PARK_DEPTH, 0.0) };
                let body = world.spawn((
                    Transform::from_position(position),
                    Locomotion::new(def.locomotion.clone(), Vec3::ONE),
                ));
                FormSpec::new(def.clone(), body)
            })
            .collect();
        let registry = FormRegistry::build(specs, &mut world).context("Invalid form roster")?;
        log::info!(
            "Omnitrix loaded with {} forms: {}",
            registry.len(),
            registry.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let mut camera = ThirdPersonCamera::new(Vec3::new(0.0, 3.0, 6.0));
        camera.sensitivity *= config.sensitivity;
        camera.min_pitch = config.camera.min_pitch_degrees.to_radians();
        camera.max_pitch = config.camera.max_pitch_degrees.to_radians();
        camera.follow_speed = config.camera.follow_speed;
        camera.min_distance = config.camera.min_distance;

        let mut effects = TransformationEffects::new();
        let mut omnitrix =
            OmnitrixController::new(registry, config.transformation.timing(), config.transformation.duration);
        omnitrix.start(&mut Collaborators { scene: &mut world, effects: &mut effects, camera: &mut camera });
        let sender = omnitrix.connect_selection();
        let wheel = AlienWheel::new(&omnitrix, sender, config.wheel.clone());

        spawn_kevin(&mut world, KEVIN_HOME);

        let mut time = Time::new();
        time.set_fixed_rate(config.tick_rate);
        let mut input = InputState::new();
        input.set_cursor_locked(true);

        let mut state = Self {
            world,
            physics,
            input,
            time,
            camera,
            omnitrix,
            effects,
            wheel,
            enemy_ai: EnemyAI::new(ENEMY_SEED),
            player: Health::new(PLAYER_HEALTH),
            kills: 0,
            running: true,
        };
        let anchor = state.active_position();
        let heading = state.world.get::<&Transform>(state.omnitrix.active_body()).map(|t| t.yaw()).unwrap_or(0.0);
        state.camera.reset_behind(heading);
        let physics = &state.physics;
        state.camera.snap(anchor, |o, d, m| physics.obstruction_distance(o, d, m));
        Ok(state)
    }

    /// Feet position of the form in control.
    pub fn active_position(&self) -> Vec3 {
        self.world
            .get::<&Transform>(self.omnitrix.active_body())
            .map(|t| t.position)
            .unwrap_or(Vec3::ZERO)
    }

    /// One-line status readout for the watch face and ability bar.
    pub fn hud(&self) -> String {
        let omnitrix = &self.omnitrix;
        let active = omnitrix.active_form();
        let camera = if omnitrix.is_camera_target(active.id) { "locked" } else { "free" };
        let mut line = format!(
            "{} | watch {:.0}% | next {} | camera {}",
            active.name,
            omnitrix.time_fraction() * 100.0,
            omnitrix.pending_name(),
            camera
        );
        if let Some(to) = omnitrix.transition_target().and_then(|id| omnitrix.registry().get(id)) {
            line.push_str(&format!(" | -> {}", to.name));
        }
        if self.effects.is_watch_lit() {
            line.push_str(" | flash");
        }
        if self.world.get::<&FormPresence>(active.body).is_ok_and(|p| !p.is_model_active()) {
            line.push_str(" | hidden");
        }
        if let Ok(animator) = self.world.get::<&Animator>(active.body) {
            line.push_str(&format!(" | {} x{:.1}", animator.locomotion(), animator.speed()));
            if let Some(cue) = animator.last_trigger() {
                line.push_str(&format!(" | cue {} #{}", cue, animator.trigger_count()));
            }
        }
        if let Ok(locomotion) = self.world.get::<&Locomotion>(active.body) {
            for slot in 0..locomotion.profile.abilities.len() {
                let cooldown = locomotion.ability_cooldown(slot);
                if cooldown > 0.0 {
                    line.push_str(&format!(" | ability {} {:.1}s", slot + 1, cooldown));
                }
            }
            if locomotion.is_super_speed() {
                line.push_str(" | super speed");
            }
            if (locomotion.size() - 1.0).abs() > 0.05 {
                line.push_str(&format!(" | size x{:.1}", locomotion.size()));
            }
        }
        if self.wheel.is_open() {
            let hovered = self
                .wheel
                .hovered()
                .and_then(|i| self.wheel.slots().get(i))
                .map_or("-", |slot| slot.name.as_str());
            let carousel = self.wheel.slots().get(self.wheel.carousel_slot()).map_or("-", |slot| slot.name.as_str());
            line.push_str(&format!(" | wheel on {} (carousel {})", hovered, carousel));
        }
        line
    }

    /// Step the clock by `delta` and run one frame.
    pub fn advance(&mut self, delta: Duration) {
        self.time.advance(delta);
        self.update();
    }

    /// One frame of gameplay using the clock's last delta.
    pub fn update(&mut self) {
        let real_dt = self.time.delta_seconds();

        self.wheel.update(&mut self.input, &self.omnitrix, real_dt);
        self.time.set_time_scale(self.wheel.time_scale());
        let dt = self.time.scaled_delta_seconds();

        {
            let mut io = Collaborators { scene: &mut self.world, effects: &mut self.effects, camera: &mut self.camera };
            if !self.wheel.is_open() {
                self.omnitrix.handle_input(&self.input, &mut io);
            }
            self.omnitrix.tick(dt, &mut io);
        }

        self.physics.update_query_pipeline();
        let forward = self.camera.planar_forward();
        let abilities = if self.wheel.is_open() {
            Vec::new()
        } else {
            update_locomotion(&mut self.world, &self.physics, &self.input, forward, dt)
        };
        self.resolve_abilities(abilities);

        let player_position = self.active_position();
        self.enemy_ai.update_target(player_position);
        let actions = self.enemy_ai.update(&mut self.world, &self.physics, dt);
        self.resolve_enemy_actions(actions);

        let report = update_projectiles(&mut self.world, &self.physics, player_position, dt);
        self.hurt_player(report.player_damage);
        for impact in report.impacts.iter().filter(|i| i.blast_radius > 0.0) {
            self.effects.spawn_impact(impact.position, impact.blast_radius);
        }

        self.effects.update(dt);

        if self.input.is_camera_mode_pressed() {
            self.camera.cycle_mode();
        }
        let look = if self.input.is_cursor_locked() { self.input.mouse_delta() } else { glam::Vec2::ZERO };
        let anchor = self
            .omnitrix
            .camera_target()
            .and_then(|e| self.world.get::<&Transform>(e).ok().map(|t| t.position))
            .unwrap_or(player_position);
        let physics = &self.physics;
        self.camera.update(anchor, look, real_dt, |o, d, m| physics.obstruction_distance(o, d, m));

        cleanup_expired(&mut self.world, dt);
        self.input.begin_frame();
    }

    fn resolve_abilities(&mut self, events: Vec<AbilityEvent>) {
        for event in events {
            match event {
                AbilityEvent::Shockwave { center, radius, damage, force, .. } => {
                    let hits =
                        apply_area_damage(&mut self.world, center, radius, Damage::new(damage, DamageType::Shockwave), force);
                    log::info!("Shockwave (r {:.0}) hit {} enemies", radius, hits);
                    self.effects.spawn_impact(center, radius);
                }
                AbilityEvent::Projectile { origin, direction, speed, damage, blast_radius, lifetime, .. } => {
                    spawn_projectile(
                        &mut self.world,
                        Faction::Player,
                        origin,
                        direction * speed,
                        Damage::new(damage, DamageType::CosmicRay),
                        blast_radius,
                        lifetime,
                    );
                    log::info!("Cosmic ray fired");
                }
            }
        }
    }

    fn resolve_enemy_actions(&mut self, actions: Vec<EnemyAction>) {
        for action in actions {
            match action {
                EnemyAction::Melee { damage, .. } => self.hurt_player(damage),
                EnemyAction::Special { kind, origin, direction, damage, .. } if kind.is_ranged() => {
                    spawn_projectile(
                        &mut self.world,
                        Faction::Enemy,
                        origin,
                        direction * ENEMY_SHOT_SPEED,
                        Damage::new(damage, kind.damage_type()),
                        0.0,
                        ENEMY_SHOT_LIFETIME,
                    );
                }
                EnemyAction::Special { damage, .. } => self.hurt_player(damage),
                EnemyAction::Died { position, .. } => {
                    self.kills += 1;
                    self.effects.spawn_impact(position, 2.0);
                }
            }
        }
    }

    fn hurt_player(&mut self, amount: f32) {
        if amount <= 0.0 || self.player.is_dead() {
            return;
        }
        self.player.take_damage(amount);
        let body: Entity = self.omnitrix.active_body();
        if self.player.is_dead() {
            FormScene::trigger_cue(&mut self.world, body, AnimationCue::Death);
            log::warn!("{} is down", self.omnitrix.active_name());
            self.running = false;
        } else {
            FormScene::trigger_cue(&mut self.world, body, AnimationCue::Hit);
            log::debug!("{} took {:.0} damage ({:.0} left)", self.omnitrix.active_name(), amount, self.player.current);
        }
    }
}

/// Flat ground, four walls and a few crates to hide behind.
fn build_arena() -> PhysicsWorld {
    let mut physics = PhysicsWorld::new();
    physics.add_ground_plane(0.0);
    for (center, half) in [
        (Vec3::new(0.0, 4.0, -ARENA_HALF), Vec3::new(ARENA_HALF, 4.0, 0.5)),
        (Vec3::new(0.0, 4.0, ARENA_HALF), Vec3::new(ARENA_HALF, 4.0, 0.5)),
        (Vec3::new(-ARENA_HALF, 4.0, 0.0), Vec3::new(0.5, 4.0, ARENA_HALF)),
        (Vec3::new(ARENA_HALF, 4.0, 0.0), Vec3::new(0.5, 4.0, ARENA_HALF)),
    ] {
        physics.add_static_cuboid(center, 0.0, half);
    }
    for (x, z, yaw) in [(-12.0, -8.0, 0.3), (10.0, -14.0, -0.5), (6.0, 12.0, 0.0)] {
        physics.add_static_cuboid(Vec3::new(x, 1.0, z), yaw, Vec3::splat(1.0));
    }
    physics.update_query_pipeline();
    physics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omnitrix::FormId;
    use input::{ElementState, KeyCode};

    const STEP: Duration = Duration::from_millis(250);

    fn game(duration: f32) -> GameState {
        let mut config = GameConfig::default();
        config.transformation.duration = duration;
        config.transformation.effect_lead = 0.5;
        config.transformation.settle = 0.5;
        GameState::new(&config).unwrap()
    }

    fn tap(state: &mut GameState, key: KeyCode) {
        state.input.process_keyboard(key, ElementState::Pressed);
        state.advance(STEP);
        state.input.process_keyboard(key, ElementState::Released);
    }

    fn settle(state: &mut GameState) {
        for _ in 0..100 {
            if !state.omnitrix.is_transitioning() {
                return;
            }
            state.advance(STEP);
        }
        panic!("transition never settled");
    }

    fn enabled_controllers(state: &GameState) -> usize {
        state
            .world
            .query::<&FormPresence>()
            .iter()
            .filter(|(_, p)| p.is_controller_enabled())
            .count()
    }

    fn rejected(text: &str) -> String {
        let config = GameConfig::from_ron_str(text).unwrap();
        match GameState::new(&config) {
            Ok(_) => panic!("{} was accepted", text),
            Err(e) => format!("{:#}", e),
        }
    }

    #[test]
    fn unusable_tick_rate_fails_startup() {
        assert!(rejected("(tick_rate: 0.0)").contains("tick_rate"));
        assert!(rejected("(tick_rate: -60.0)").contains("tick_rate"));
    }

    #[test]
    fn unusable_transformation_timing_fails_startup() {
        assert!(rejected("(transformation: (settle: NaN))").contains("settle"));
        assert!(rejected("(transformation: (duration: -5.0))").contains("duration"));
        assert!(rejected("(transformation: (effect_lead: -0.1))").contains("effect_lead"));
    }

    #[test]
    fn zero_duration_is_an_unlimited_watch() {
        let mut state = game(0.0);
        tap(&mut state, KeyCode::KeyT);
        settle(&mut state);
        for _ in 0..100 {
            state.advance(STEP);
        }
        assert_eq!(state.omnitrix.active_name(), "Four Arms");
        assert_eq!(state.omnitrix.time_remaining(), 0.0);
    }

    #[test]
    fn hud_tracks_the_active_form_and_its_abilities() {
        let mut state = game(15.0);
        assert!(state.hud().starts_with("Ben | watch 0% | next Four Arms | camera locked"));

        tap(&mut state, KeyCode::Digit2);
        settle(&mut state);
        let hud = state.hud();
        assert!(hud.starts_with("Humungousaur | watch 100%"), "{}", hud);
        assert!(hud.contains("next Humungousaur"));
        assert!(hud.contains("camera locked"));

        tap(&mut state, KeyCode::KeyE);
        assert!(state.hud().contains("ability 2"), "{}", state.hud());

        tap(&mut state, KeyCode::Tab);
        assert!(state.hud().contains("wheel on - (carousel Ben)"), "{}", state.hud());
    }

    #[test]
    fn hud_shows_the_transformation_in_flight() {
        let mut state = game(15.0);
        tap(&mut state, KeyCode::KeyT);
        let hud = state.hud();
        assert!(hud.starts_with("Ben"), "{}", hud);
        assert!(hud.contains("-> Four Arms"), "{}", hud);
        assert!(!hud.contains("hidden"), "{}", hud);

        // Past the effect lead the outgoing model is hidden before control moves.
        state.advance(STEP);
        state.advance(STEP);
        let hud = state.hud();
        assert!(hud.starts_with("Ben"), "{}", hud);
        assert!(hud.contains("hidden"), "{}", hud);
    }

    #[test]
    fn starts_as_ben_with_the_camera_on_him() {
        let state = game(15.0);
        assert_eq!(state.omnitrix.registry().len(), 6);
        assert_eq!(state.omnitrix.active_name(), "Ben");
        assert_eq!(enabled_controllers(&state), 1);
        assert_eq!(state.camera.target(), Some(state.omnitrix.active_body()));
        assert_eq!(state.active_position(), Vec3::ZERO);
    }

    #[test]
    fn transform_key_swaps_in_the_pending_alien() {
        let mut state = game(15.0);
        tap(&mut state, KeyCode::KeyT);
        settle(&mut state);
        assert_eq!(state.omnitrix.active_name(), "Four Arms");
        assert_eq!(state.effects.plays(), 1);
        assert_eq!(enabled_controllers(&state), 1);
        assert_eq!(state.camera.target(), Some(state.omnitrix.active_body()));
        assert!(state.active_position().y.abs() < 1e-3);
    }

    #[test]
    fn watch_times_out_and_starts_the_cooldown() {
        let mut state = game(2.0);
        tap(&mut state, KeyCode::KeyT);
        settle(&mut state);
        for _ in 0..12 {
            state.advance(STEP);
        }
        settle(&mut state);
        assert_eq!(state.omnitrix.active_name(), "Ben");
        assert!(state.omnitrix.cooldown_remaining(FormId(1)) > 0.0);
        assert!(!state.omnitrix.is_selectable(FormId(1)));
    }

    #[test]
    fn ground_pound_hurts_nearby_enemies() {
        let mut state = game(15.0);
        let kevin = spawn_kevin(&mut state.world, Vec3::new(2.0, 0.0, 0.0));
        tap(&mut state, KeyCode::Digit2);
        settle(&mut state);
        assert_eq!(state.omnitrix.active_name(), "Humungousaur");
        let before = state.world.get::<&Health>(kevin).unwrap().current;
        tap(&mut state, KeyCode::KeyE);
        assert_eq!(state.world.get::<&Health>(kevin).unwrap().current, before - 30.0);
    }

    #[test]
    fn open_wheel_slows_time_and_blocks_hotkeys() {
        let mut state = game(15.0);
        tap(&mut state, KeyCode::Tab);
        assert!(state.wheel.is_open());
        assert_eq!(state.time.time_scale(), 0.5);
        tap(&mut state, KeyCode::Digit1);
        assert!(!state.omnitrix.is_transitioning());
        tap(&mut state, KeyCode::Tab);
        assert_eq!(state.time.time_scale(), 1.0);
    }
}
