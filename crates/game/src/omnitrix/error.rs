use thiserror::Error;

use super::FormId;
use crate::animation::{AnimationCue, UnknownCue};

/// Why a transformation request was refused. None of these change any state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransformError {
    #[error("no form registered as {0}")]
    UnknownForm(FormId),
    #[error("form slot {index} is out of range (roster has {count})")]
    InvalidFormIndex { index: usize, count: usize },
    #[error("{name} is recharging ({remaining:.1}s left)")]
    FormOnCooldown { name: String, remaining: f32 },
    #[error("a transformation is already in progress")]
    AlreadyTransitioning,
    #[error("{form} has no {part}")]
    MissingCollaborator { form: String, part: &'static str },
}

/// Roster problems found while registering forms. All of them stop startup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RosterError {
    #[error("roster is empty; the first entry must be the base form")]
    MissingBaseForm,
    #[error("base form {name} has no {part}")]
    IncompleteBaseForm { name: String, part: &'static str },
    #[error("form name '{0}' is registered twice")]
    DuplicateName(String),
    #[error("{form}: {field} must be a non-negative number, got {value}")]
    InvalidDuration { form: String, field: &'static str, value: f32 },
    #[error("{form}: {source}")]
    UnknownAnimation {
        form: String,
        #[source]
        source: UnknownCue,
    },
    #[error("{form}: arrival cue {cue} is not in its animation set")]
    UnsupportedCue { form: String, cue: AnimationCue },
}
