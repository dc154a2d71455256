//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum LinconError {
    /// A grid could not be built from the given centers or range.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A structurally required configuration value is missing.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A configuration value is out of its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A variable name is not part of the state or action descriptor.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// A textual kind name is not in the registration table.
    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    /// Feature extraction was requested with neither a state nor an action.
    #[error("Features requested with neither a state nor an action")]
    NoStateNorAction,

    /// A feature map reads variables of a state or action that was not given.
    #[error("Feature map requires the {0} variables")]
    MissingInput(String),

    /// The destination buffer for action values has the wrong size.
    #[error("Action value buffer has {given} entries, {expected} are required")]
    ActionValueBuffer {
        /// Size of the given buffer.
        given: usize,
        /// Number of action features.
        expected: usize,
    },

    /// A feature index does not belong to the weight window of a function.
    #[error("Feature index {index} is out of range [{min}, {max})")]
    FeatureIndexOutOfRange {
        /// Requested feature.
        index: usize,
        /// First index of the window.
        min: usize,
        /// One past the last index of the window.
        max: usize,
    },

    /// Two vectors that must have the same length do not.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A tuple was added to a minibatch that is already full.
    #[error("Minibatch is full ({0} tuples)")]
    MinibatchFull(usize),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The algorithm needs minibatches filled by experience replay.
    #[error("{0} requires experience replay with a non-zero minibatch size")]
    ExperienceReplayRequired(String),
}
