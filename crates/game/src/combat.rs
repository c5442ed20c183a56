//! Projectiles and area damage shared by the player forms and enemies.

use engine_core::{Damage, Health, Lifetime, Transform, Velocity, Vec3};
use hecs::{Entity, World};
use physics::PhysicsWorld;

use crate::enemy::Enemy;

/// Knockback distance per unit of shockwave force at the centre.
const KNOCKBACK_SCALE: f32 = 0.1;
/// Force of a projectile's splash.
const BLAST_FORCE: f32 = 10.0;
/// How close a projectile must pass to hit a body.
const HIT_RADIUS: f32 = 1.0;
/// Height of a body's centre above its feet, for hit tests.
const BODY_CENTER: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub faction: Faction,
    /// Splash radius on impact; 0 for a single-target hit.
    pub blast_radius: f32,
}

pub fn spawn_projectile(
    world: &mut World,
    faction: Faction,
    origin: Vec3,
    velocity: Vec3,
    damage: Damage,
    blast_radius: f32,
    lifetime: f32,
) -> Entity {
    world.spawn((
        Transform::from_position(origin),
        Velocity::new(velocity),
        Projectile { faction, blast_radius },
        damage,
        Lifetime::new(lifetime),
    ))
}

/// Damage every living enemy within `radius` of `center`, pushing them away.
/// Returns how many were hit.
pub fn apply_area_damage(world: &mut World, center: Vec3, radius: f32, damage: Damage, force: f32) -> usize {
    let mut hits = 0;
    for (_, (transform, health, _)) in world.query_mut::<(&mut Transform, &mut Health, &Enemy)>() {
        if health.is_dead() {
            continue;
        }
        let offset = transform.position - center;
        let distance = offset.length();
        if distance > radius {
            continue;
        }
        health.take_damage(damage.amount);
        let falloff = 1.0 - distance / radius.max(1e-3);
        let push = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
        transform.position += push * force * KNOCKBACK_SCALE * falloff;
        hits += 1;
    }
    if hits > 0 {
        log::debug!("{:?} hit {} enemies for {:.0}", damage.damage_type, hits, damage.amount);
    }
    hits
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub position: Vec3,
    pub blast_radius: f32,
    pub faction: Faction,
}

/// Outcome of one projectile step.
#[derive(Debug, Default)]
pub struct ProjectileReport {
    /// Damage dealt to the player this frame.
    pub player_damage: f32,
    pub impacts: Vec<Impact>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Hit {
    Player,
    Enemy(Entity),
    Wall,
}

/// Move projectiles, resolving hits against walls, enemies and the player.
pub fn update_projectiles(world: &mut World, physics: &PhysicsWorld, player: Vec3, dt: f32) -> ProjectileReport {
    let enemies: Vec<(Entity, Vec3)> = world
        .query::<(&Transform, &Health, &Enemy)>()
        .iter()
        .filter(|(_, (_, health, _))| !health.is_dead())
        .map(|(e, (t, _, _))| (e, t.position + Vec3::Y * BODY_CENTER))
        .collect();
    let player_center = player + Vec3::Y * BODY_CENTER;

    let mut report = ProjectileReport::default();
    let mut spent = Vec::new();
    let mut direct_hits = Vec::new();
    let mut blasts = Vec::new();

    for (entity, (transform, velocity, projectile, damage)) in
        world.query_mut::<(&mut Transform, &Velocity, &Projectile, &Damage)>()
    {
        let travel = velocity.linear * dt;
        let length = travel.length();
        if length <= 0.0 {
            continue;
        }
        let from = transform.position;
        let wall = physics.raycast(from, travel / length, length).map(|hit| hit.point);
        let end = wall.unwrap_or(from + travel);
        let passes = |center: Vec3| closest_point(from, end, center).distance(center) <= HIT_RADIUS;

        let target = match projectile.faction {
            Faction::Enemy => passes(player_center).then_some(Hit::Player),
            Faction::Player => enemies.iter().find(|(_, c)| passes(*c)).map(|(e, _)| Hit::Enemy(*e)),
        };
        transform.position = end;
        let Some(hit) = target.or(wall.map(|_| Hit::Wall)) else {
            continue;
        };

        match hit {
            Hit::Player => report.player_damage += damage.amount,
            Hit::Enemy(enemy) if projectile.blast_radius <= 0.0 => direct_hits.push((enemy, *damage)),
            _ => {}
        }
        if projectile.faction == Faction::Player && projectile.blast_radius > 0.0 {
            blasts.push((end, projectile.blast_radius, *damage));
        }
        report.impacts.push(Impact { position: end, blast_radius: projectile.blast_radius, faction: projectile.faction });
        spent.push(entity);
    }

    for (enemy, damage) in direct_hits {
        if let Ok(mut health) = world.get::<&mut Health>(enemy) {
            health.take_damage(damage.amount);
        }
    }
    for (center, radius, damage) in blasts {
        apply_area_damage(world, center, radius, damage, BLAST_FORCE);
    }
    for entity in spent {
        let _ = world.despawn(entity);
    }
    report
}

/// Count down [`Lifetime`]s and despawn what expired. Returns how many were removed.
pub fn cleanup_expired(world: &mut World, dt: f32) -> usize {
    let expired: Vec<Entity> = world
        .query_mut::<&mut Lifetime>()
        .into_iter()
        .filter_map(|(e, lifetime)| lifetime.update(dt).then_some(e))
        .collect();
    for &entity in &expired {
        let _ = world.despawn(entity);
    }
    expired.len()
}

fn closest_point(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= 1e-8 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::spawn_kevin;
    use engine_core::DamageType;

    fn arena() -> PhysicsWorld {
        let mut physics = PhysicsWorld::new();
        physics.add_ground_plane(0.0);
        physics.add_static_cuboid(Vec3::new(0.0, 2.0, -20.0), 0.0, Vec3::new(10.0, 4.0, 0.5));
        physics.update_query_pipeline();
        physics
    }

    fn health(world: &World, e: Entity) -> f32 {
        world.get::<&Health>(e).unwrap().current
    }

    #[test]
    fn area_damage_hits_only_inside_the_radius_and_pushes_out() {
        let mut world = World::new();
        let near = spawn_kevin(&mut world, Vec3::new(3.0, 0.0, 0.0));
        let far = spawn_kevin(&mut world, Vec3::new(9.0, 0.0, 0.0));
        let hits = apply_area_damage(&mut world, Vec3::ZERO, 6.0, Damage::new(30.0, DamageType::Shockwave), 10.0);
        assert_eq!(hits, 1);
        assert_eq!(health(&world, near), 170.0);
        assert_eq!(health(&world, far), 200.0);
        assert!(world.get::<&Transform>(near).unwrap().position.x > 3.0);
    }

    #[test]
    fn player_shot_hits_the_first_enemy_in_its_path() {
        let physics = arena();
        let mut world = World::new();
        let kevin = spawn_kevin(&mut world, Vec3::new(0.0, 0.0, -5.0));
        let shot = spawn_projectile(
            &mut world,
            Faction::Player,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -50.0),
            Damage::new(40.0, DamageType::Melee),
            0.0,
            5.0,
        );
        let report = update_projectiles(&mut world, &physics, Vec3::new(0.0, 0.0, 10.0), 0.25);
        assert_eq!(report.impacts.len(), 1);
        assert_eq!(health(&world, kevin), 160.0);
        assert!(!world.contains(shot));
    }

    #[test]
    fn cosmic_ray_bursts_on_the_wall_and_splashes() {
        let physics = arena();
        let mut world = World::new();
        let kevin = spawn_kevin(&mut world, Vec3::new(-3.0, 0.0, -18.0));
        spawn_projectile(
            &mut world,
            Faction::Player,
            Vec3::new(-6.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -50.0),
            Damage::new(100.0, DamageType::CosmicRay),
            5.0,
            5.0,
        );
        let report = update_projectiles(&mut world, &physics, Vec3::new(0.0, 0.0, 10.0), 0.5);
        let impact = report.impacts[0];
        assert!((impact.position.z + 19.5).abs() < 1e-3);
        assert_eq!(health(&world, kevin), 100.0);
    }

    #[test]
    fn enemy_shot_damages_the_player() {
        let physics = arena();
        let mut world = World::new();
        spawn_projectile(
            &mut world,
            Faction::Enemy,
            Vec3::new(0.0, 1.0, -10.0),
            Vec3::new(0.0, 0.0, 20.0),
            Damage::new(30.0, DamageType::Fire),
            0.0,
            5.0,
        );
        let mut taken = 0.0;
        for _ in 0..4 {
            taken += update_projectiles(&mut world, &physics, Vec3::ZERO, 0.25).player_damage;
        }
        assert_eq!(taken, 30.0);
    }

    #[test]
    fn expired_lifetimes_are_despawned() {
        let mut world = World::new();
        let short = world.spawn((Lifetime::new(0.5),));
        let long = world.spawn((Lifetime::new(2.0),));
        assert_eq!(cleanup_expired(&mut world, 0.25), 0);
        assert_eq!(cleanup_expired(&mut world, 0.25), 1);
        assert!(!world.contains(short));
        assert!(world.contains(long));
    }
}
