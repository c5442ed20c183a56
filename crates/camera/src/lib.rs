//! Third-person camera rig that follows whichever form is active.

pub mod follow;
pub mod smoothing;

pub use follow::*;
pub use smoothing::*;
