#![warn(missing_docs)]
//! Feature maps, linear function approximators and eligibility traces for on-line
//! reinforcement learning.
//!
//! Continuous states and actions ([`NamedVarSet`]) are discretized by [`Grid`]s and
//! mapped to sparse [`FeatureList`]s by a [`StateActionFeatureMap`], either with tile
//! coding or with Gaussian radial-basis functions. Linear functions
//! ([`LinearStateVfa`], [`LinearStateActionVfa`]) are evaluated and updated on those
//! features. Learning algorithms built on them implement [`Learner`] or [`Critic`] and
//! receive a [`LearningContext`] on every call.
pub mod error;
pub mod etraces;
pub mod feature_map;
pub mod features;
pub mod grid;
pub mod named_var;
pub mod noise;
pub mod policy;
pub mod record;
pub mod schedule;
pub mod vfa;

mod base;
pub use base::{Critic, Learner, Transition};

mod context;
pub use context::LearningContext;

pub use etraces::{ETraces, ETracesConfig};
pub use feature_map::{FeatureMap, FeatureMapConfig, FeatureMapKind, StateActionFeatureMap};
pub use features::{DuplicateMode, Feature, FeatureList};
pub use grid::{Grid, GridConfig};
pub use named_var::{Action, NamedVarSet, State, VarProperties};
pub use schedule::Schedule;
pub use vfa::{LinearStateActionVfa, LinearStateVfa, LinearVfa, LinearVfaConfig};
