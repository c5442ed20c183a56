//! Time management for the game loop.

use std::time::{Duration, Instant};

/// Manages frame timing and delta time calculation.
///
/// Frames are driven either by the wall clock (`update`) or by a caller-supplied
/// step (`advance`), which is what the headless session and the tests use.
#[derive(Debug)]
pub struct Time {
    /// Time of the last wall-clock frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep for simulation (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
    /// Gameplay time multiplier (the selection wheel slows time down while open).
    time_scale: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
            time_scale: 1.0,
        }
    }

    /// Update timing at the start of a new frame from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Step the clock by an explicit delta.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Delta time multiplied by the current time scale.
    pub fn scaled_delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32() * self.time_scale
    }

    /// Get the delta time as a Duration.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz. Rates that give no usable step are ignored.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        match Duration::try_from_secs_f64(1.0 / hz) {
            Ok(step) if hz > 0.0 && !step.is_zero() => self.fixed_timestep = step,
            _ => log::warn!("Ignoring fixed rate of {} Hz", hz),
        }
    }

    /// Current gameplay time multiplier.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the gameplay time multiplier (clamped to be non-negative).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_elapsed_and_frames() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(250));
        time.advance(Duration::from_millis(250));
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.elapsed(), Duration::from_millis(500));
        assert_eq!(time.delta_seconds(), 0.25);
    }

    #[test]
    fn fixed_update_consumes_accumulator() {
        let mut time = Time::new();
        time.set_fixed_rate(4.0);
        time.advance(Duration::from_millis(600));
        assert!(time.should_fixed_update());
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
    }

    #[test]
    fn unusable_fixed_rate_keeps_the_previous_step() {
        let mut time = Time::new();
        time.set_fixed_rate(4.0);
        time.set_fixed_rate(0.0);
        time.set_fixed_rate(-30.0);
        time.set_fixed_rate(f64::NAN);
        time.advance(Duration::from_millis(300));
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
    }

    #[test]
    fn time_scale_applies_to_scaled_delta_only() {
        let mut time = Time::new();
        time.set_time_scale(0.5);
        time.advance(Duration::from_millis(500));
        assert_eq!(time.delta_seconds(), 0.5);
        assert_eq!(time.scaled_delta_seconds(), 0.25);
        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
    }
}
