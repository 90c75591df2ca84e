//! Core error types for waypoint-core.
//!
//! The engine itself is pure and total, so the error surface is small:
//! store failures, and wizard transitions that the state machine refuses.

use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// Umbrella error for callers driving a whole session (the CLI); the
/// library itself returns the specific [`StoreError`]/[`WizardError`].
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Wizard-related errors
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing file
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Failed to flush the backing file
    #[error("Failed to write store at {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// No usable data directory on this platform
    #[error("Could not resolve a data directory")]
    NoDataDir,
}

/// Errors raised by wizard transitions.
///
/// `IncompleteStep` is the recoverable, user-facing condition: the caller
/// re-renders the current step with the named questions highlighted. The
/// state machine does not transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The current step has required questions without complete answers.
    #[error("Step is incomplete: {} unanswered question(s)", invalid.len())]
    IncompleteStep { invalid: BTreeSet<String> },

    /// Operation is not valid in the wizard's current state.
    #[error("Operation not allowed in state {state}")]
    InvalidState { state: String },

    /// The branch choice does not match any option of the branch gate.
    #[error("Unknown branch choice: {0}")]
    UnknownBranch(String),

    /// The branch was already chosen for this session.
    #[error("Branch already chosen for this session")]
    BranchAlreadyChosen,

    /// `advance()` was called on the final step; use `submit()` instead.
    #[error("Already on the final step")]
    AtFinalStep,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
