//! Error handling for the chain walker and its collaborators

use std::time::Duration;
use thiserror::Error;

/// Errors reported while walking a chain, resolving frames or handling groups.
/// All structural errors are deterministic functions of the input. Frame lookup
/// errors come from the frame lookup service and are propagated unchanged; retries,
/// if any, belong to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TeleopError {
    #[error("Unknown joint: {0}")]
    UnknownJoint(String),

    #[error("Arity mismatch: {names} joint names but {values} joint values")]
    ArityMismatch { names: usize, values: usize },

    #[error("Invalid (zero or non-finite) rotation axis of joint {0}")]
    InvalidJointAxis(String),

    #[error("Timeout after {timeout:?} looking up transform from {from} to {to}")]
    FrameLookupTimeout {
        from: String,
        to: String,
        timeout: Duration,
    },

    #[error("Frame lookup service unavailable, cannot look up from {from} to {to}")]
    FrameLookupUnavailable { from: String, to: String },

    #[error("Duplicate joint name with different data found: {0}")]
    DuplicateJoint(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Group {0} is not an end effector")]
    NotAnEndEffector(String),

    #[error("Duplicate group: {0}")]
    DuplicateGroup(String),

    #[error("Group {group} has no stored state {state}")]
    UnknownGroupState { group: String, state: String },
}
