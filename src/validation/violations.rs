//! Configuration problems reported by machine validation.

use crate::core::CallbackKind;
use thiserror::Error;

/// A single problem found in a machine's configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("Transition '{trigger}' starts from unknown state '{state}'")]
    UnknownSource { trigger: String, state: String },

    #[error("Transition '{trigger}' leads to unknown state '{state}'")]
    UnknownDestination { trigger: String, state: String },

    #[error("Initial state '{0}' is not registered")]
    UnknownInitial(String),

    /// A named callback the resolver cannot provide. `owner` describes where
    /// it is referenced, e.g. `state 'open' on_enter`.
    #[error("No {kind} named '{name}' (referenced by {owner})")]
    UnresolvedCallback {
        kind: CallbackKind,
        name: String,
        owner: String,
    },
}
