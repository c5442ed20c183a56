//! Critically damped smoothing helpers shared by the rig and gameplay code.

use glam::Vec3;

/// Move `current` towards `target` with a critically damped spring.
///
/// `velocity` carries the spring state between frames; `smooth_time` is roughly
/// the time to reach the target. Never overshoots.
pub fn smooth_damp(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * exp;
    let output = target + (change + temp) * exp;

    if (target - current).dot(output - target) > 0.0 {
        *velocity = Vec3::ZERO;
        return target;
    }
    output
}

/// Shortest signed difference between two angles in radians, in `[-PI, PI]`.
pub fn delta_angle(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut d = (to - from) % TAU;
    if d > PI {
        d -= TAU;
    } else if d < -PI {
        d += TAU;
    }
    d
}

/// Turn `current` towards `target` by at most the fraction `t` of the remaining arc.
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    current + delta_angle(current, target) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut pos = Vec3::ZERO;
        let mut vel = Vec3::ZERO;
        for _ in 0..600 {
            pos = smooth_damp(pos, target, &mut vel, 0.1, 1.0 / 60.0);
            assert!(pos.x <= 10.0 + 1e-4);
        }
        assert!((pos - target).length() < 1e-3);
    }

    #[test]
    fn delta_angle_wraps() {
        use std::f32::consts::PI;
        let d = delta_angle(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-5);
    }

    #[test]
    fn lerp_angle_full_step_reaches_target() {
        assert!((lerp_angle(0.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
        assert!((lerp_angle(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
