//! Per-form recharge timers.

use super::form::FormId;

/// Seconds until each form can be selected again. Indexed by [`FormId`].
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    remaining: Vec<f32>,
}

impl CooldownTracker {
    pub fn new(form_count: usize) -> Self {
        Self { remaining: vec![0.0; form_count] }
    }

    /// Start (or restart) a form's cooldown.
    pub fn start(&mut self, form: FormId, seconds: f32) {
        if let Some(slot) = self.remaining.get_mut(form.index()) {
            *slot = seconds.max(0.0);
            if *slot > 0.0 {
                log::debug!("{} cooling down for {:.1}s", form, slot);
            }
        }
    }

    /// Seconds left; 0 for unknown forms.
    pub fn remaining(&self, form: FormId) -> f32 {
        self.remaining.get(form.index()).copied().unwrap_or(0.0)
    }

    pub fn is_ready(&self, form: FormId) -> bool {
        self.remaining(form) == 0.0
    }

    /// Count every timer down by `dt`, clamping at zero. Returns forms that became ready.
    pub fn tick(&mut self, dt: f32) -> Vec<FormId> {
        let mut ready = Vec::new();
        for (i, slot) in self.remaining.iter_mut().enumerate() {
            if *slot > 0.0 {
                *slot = (*slot - dt).max(0.0);
                if *slot == 0.0 {
                    ready.push(FormId(i));
                }
            }
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_exactly_zero() {
        let mut cooldowns = CooldownTracker::new(3);
        cooldowns.start(FormId(1), 1.0);
        assert!(!cooldowns.is_ready(FormId(1)));
        assert!(cooldowns.is_ready(FormId(2)));

        assert!(cooldowns.tick(0.75).is_empty());
        assert_eq!(cooldowns.remaining(FormId(1)), 0.25);
        assert_eq!(cooldowns.tick(0.75), vec![FormId(1)]);
        assert_eq!(cooldowns.remaining(FormId(1)), 0.0);
        assert!(cooldowns.is_ready(FormId(1)));
        assert!(cooldowns.tick(1.0).is_empty());
    }

    #[test]
    fn unknown_forms_are_always_ready() {
        let mut cooldowns = CooldownTracker::new(1);
        cooldowns.start(FormId(7), 10.0);
        assert_eq!(cooldowns.remaining(FormId(7)), 0.0);
    }

    #[test]
    fn negative_cooldown_is_ready_at_once() {
        let mut cooldowns = CooldownTracker::new(2);
        cooldowns.start(FormId(1), -3.0);
        assert!(cooldowns.is_ready(FormId(1)));
        assert_eq!(cooldowns.remaining(FormId(1)), 0.0);
    }
}
