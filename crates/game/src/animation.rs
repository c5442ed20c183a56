//! Animation cues for form bodies.
//!
//! Cue names in the roster are resolved to [`AnimationCue`] when forms are registered,
//! so a typo in `config.ron` fails at startup instead of silently doing nothing mid-game.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimationCue {
    Idle,
    Walk,
    Run,
    Jump,
    Fall,
    Land,
    Fly,
    /// Played once on arrival by forms with a rise-up pose.
    Standing,
    Attack,
    Hit,
    Death,
    GroundPound,
    Dash,
}

impl AnimationCue {
    pub const ALL: [AnimationCue; 13] = [
        AnimationCue::Idle,
        AnimationCue::Walk,
        AnimationCue::Run,
        AnimationCue::Jump,
        AnimationCue::Fall,
        AnimationCue::Land,
        AnimationCue::Fly,
        AnimationCue::Standing,
        AnimationCue::Attack,
        AnimationCue::Hit,
        AnimationCue::Death,
        AnimationCue::GroundPound,
        AnimationCue::Dash,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnimationCue::Idle => "Idle",
            AnimationCue::Walk => "Walk",
            AnimationCue::Run => "Run",
            AnimationCue::Jump => "Jump",
            AnimationCue::Fall => "Fall",
            AnimationCue::Land => "Land",
            AnimationCue::Fly => "Fly",
            AnimationCue::Standing => "Standing",
            AnimationCue::Attack => "Attack",
            AnimationCue::Hit => "Hit",
            AnimationCue::Death => "Death",
            AnimationCue::GroundPound => "GroundPound",
            AnimationCue::Dash => "Dash",
        }
    }
}

impl fmt::Display for AnimationCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown animation cue '{0}'")]
pub struct UnknownCue(pub String);

impl FromStr for AnimationCue {
    type Err = UnknownCue;

    /// Case-insensitive; underscores and spaces are ignored ("ground_pound" == "GroundPound").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        AnimationCue::ALL
            .iter()
            .copied()
            .find(|cue| cue.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| UnknownCue(s.to_string()))
    }
}

/// The cues one form body can play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationSet {
    cues: BTreeSet<AnimationCue>,
}

impl AnimationSet {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, UnknownCue> {
        let cues = names
            .iter()
            .map(|n| n.as_ref().parse::<AnimationCue>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { cues })
    }

    pub fn supports(&self, cue: AnimationCue) -> bool {
        self.cues.contains(&cue)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }
}

/// Animation driver attached to every form body.
///
/// Holds the looping locomotion cue plus the last one-shot trigger; a renderer
/// would sample these each frame.
#[derive(Debug, Clone)]
pub struct Animator {
    set: AnimationSet,
    locomotion: AnimationCue,
    speed: f32,
    last_trigger: Option<AnimationCue>,
    trigger_count: u32,
}

impl Animator {
    pub fn new(set: AnimationSet) -> Self {
        Self {
            set,
            locomotion: AnimationCue::Idle,
            speed: 0.0,
            last_trigger: None,
            trigger_count: 0,
        }
    }

    /// Switch the looping cue. Unsupported cues fall back to Idle.
    pub fn set_locomotion(&mut self, cue: AnimationCue, speed: f32) {
        let cue = if self.set.supports(cue) { cue } else { AnimationCue::Idle };
        self.locomotion = cue;
        self.speed = speed;
    }

    /// Fire a one-shot cue. Returns false (and does nothing) when the body lacks it.
    pub fn trigger(&mut self, cue: AnimationCue) -> bool {
        if !self.set.supports(cue) {
            log::trace!("Ignoring unsupported cue {}", cue);
            return false;
        }
        self.last_trigger = Some(cue);
        self.trigger_count += 1;
        true
    }

    pub fn locomotion(&self) -> AnimationCue {
        self.locomotion
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn last_trigger(&self) -> Option<AnimationCue> {
        self.last_trigger
    }

    pub fn trigger_count(&self) -> u32 {
        self.trigger_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_names_parse_loosely() {
        assert_eq!("standing".parse::<AnimationCue>(), Ok(AnimationCue::Standing));
        assert_eq!("ground_pound".parse::<AnimationCue>(), Ok(AnimationCue::GroundPound));
        assert_eq!(
            "Moonwalk".parse::<AnimationCue>(),
            Err(UnknownCue("Moonwalk".to_string()))
        );
    }

    #[test]
    fn set_rejects_unknown_names() {
        let set = AnimationSet::from_names(&["Idle", "Walk", "Walk"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.supports(AnimationCue::Walk));
        assert!(!set.supports(AnimationCue::Fly));
        assert!(AnimationSet::from_names(&["Idle", "Twirl"]).is_err());
    }

    #[test]
    fn animator_ignores_cues_the_body_lacks() {
        let set = AnimationSet::from_names(&["Idle", "Run", "Standing"]).unwrap();
        let mut animator = Animator::new(set);
        assert!(animator.trigger(AnimationCue::Standing));
        assert!(!animator.trigger(AnimationCue::GroundPound));
        assert_eq!(animator.last_trigger(), Some(AnimationCue::Standing));
        assert_eq!(animator.trigger_count(), 1);

        animator.set_locomotion(AnimationCue::Fly, 3.0);
        assert_eq!(animator.locomotion(), AnimationCue::Idle);
        animator.set_locomotion(AnimationCue::Run, 6.0);
        assert_eq!(animator.locomotion(), AnimationCue::Run);
    }
}
