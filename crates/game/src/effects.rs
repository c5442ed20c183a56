//! Transformation flash and impact particles.

use glam::Vec3;

use crate::omnitrix::EffectPlayer;

/// Green burst particle from the watch, or dust from an impact.
pub struct FlashParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub life: f32,
}

/// The Omnitrix flash: a particle burst, a point light that fades out and a
/// brief glow on the watch face.
pub struct TransformationEffects {
    pub particles: Vec<FlashParticle>,
    /// Current point light intensity.
    pub light_intensity: f32,
    pub light_position: Vec3,
    pub max_light_intensity: f32,
    /// Seconds for the light to fade from max to zero.
    pub light_duration: f32,
    /// Seconds the watch face stays lit.
    pub flash_duration: f32,
    pub burst_count: usize,
    light_timer: f32,
    watch_flash: f32,
    plays: u32,
}

impl Default for TransformationEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationEffects {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            light_intensity: 0.0,
            light_position: Vec3::ZERO,
            max_light_intensity: 8.0,
            light_duration: 0.5,
            flash_duration: 0.2,
            burst_count: 24,
            light_timer: 0.0,
            watch_flash: 0.0,
            plays: 0,
        }
    }

    /// Number of transformation flashes played so far.
    pub fn plays(&self) -> u32 {
        self.plays
    }

    pub fn is_watch_lit(&self) -> bool {
        self.watch_flash > 0.0
    }

    /// Dust ring where a shockwave or projectile lands.
    pub fn spawn_impact(&mut self, position: Vec3, radius: f32) {
        let count = (radius * 4.0).clamp(4.0, 40.0) as usize;
        for i in 0..count {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let speed = radius * (0.8 + rand::random::<f32>() * 0.4);
            self.particles.push(FlashParticle {
                position: position + Vec3::Y * 0.1,
                velocity: Vec3::new(angle.cos() * speed, 1.0 + rand::random::<f32>(), angle.sin() * speed),
                life: 0.4 + rand::random::<f32>() * 0.3,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.position += p.velocity * dt;
            p.velocity *= 1.0 - (2.0 * dt).min(1.0);
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        self.watch_flash = (self.watch_flash - dt).max(0.0);
        if self.light_timer > 0.0 {
            self.light_timer = (self.light_timer - dt).max(0.0);
            self.light_intensity =
                self.max_light_intensity * (self.light_timer / self.light_duration.max(1e-3));
        } else {
            self.light_intensity = 0.0;
        }
    }
}

impl EffectPlayer for TransformationEffects {
    fn play_at(&mut self, position: Vec3) {
        let center = position + Vec3::Y;
        for _ in 0..self.burst_count {
            let dir = Vec3::new(
                rand::random::<f32>() - 0.5,
                rand::random::<f32>() - 0.2,
                rand::random::<f32>() - 0.5,
            )
            .normalize_or_zero();
            self.particles.push(FlashParticle {
                position: center,
                velocity: dir * (3.0 + rand::random::<f32>() * 3.0),
                life: 0.6 + rand::random::<f32>() * 0.4,
            });
        }
        self.light_position = center;
        self.light_intensity = self.max_light_intensity;
        self.light_timer = self.light_duration;
        self.watch_flash = self.flash_duration;
        self.plays += 1;
        log::debug!("Omnitrix flash at {:?}", center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_bursts_above_the_body_and_fades() {
        let mut fx = TransformationEffects::new();
        fx.play_at(Vec3::new(2.0, 0.0, 3.0));
        assert_eq!(fx.plays(), 1);
        assert_eq!(fx.particles.len(), 24);
        assert!(fx.particles.iter().all(|p| p.position == Vec3::new(2.0, 1.0, 3.0)));
        assert_eq!(fx.light_intensity, 8.0);
        assert!(fx.is_watch_lit());

        fx.update(0.25);
        assert!(!fx.is_watch_lit());
        assert!((fx.light_intensity - 4.0).abs() < 1e-5);

        fx.update(0.25);
        assert_eq!(fx.light_intensity, 0.0);
        for _ in 0..10 {
            fx.update(0.25);
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn impacts_scale_with_radius() {
        let mut fx = TransformationEffects::new();
        fx.spawn_impact(Vec3::ZERO, 0.5);
        assert_eq!(fx.particles.len(), 4);
        fx.spawn_impact(Vec3::ZERO, 6.0);
        assert_eq!(fx.particles.len(), 28);
        assert_eq!(fx.plays(), 0);
    }
}
