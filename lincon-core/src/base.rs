//! Core functionalities.
mod learner;
mod transition;
pub use learner::{Critic, Learner};
pub use transition::Transition;
