//! Errors raised while registering or triggering transitions.

use crate::core::CallbackKind;
use thiserror::Error;

/// Errors that can occur when configuring or driving a [`Machine`](crate::Machine).
///
/// Two lanes exist. Resolution failures ([`UnresolvedCallback`] and
/// [`ContextNotSent`]) are configuration errors: they are returned
/// immediately and never reach on-exception callbacks. Everything raised
/// while a trigger runs (callback failures, unknown states hit during the
/// state change) is routed to on-exception callbacks when any are
/// configured, and returned to the caller otherwise.
///
/// [`UnresolvedCallback`]: MachineError::UnresolvedCallback
/// [`ContextNotSent`]: MachineError::ContextNotSent
#[derive(Debug, Error)]
pub enum MachineError {
    /// The trigger exists, but not from the model's current state.
    #[error("{machine}cannot trigger event '{trigger}' from state '{state}'")]
    InvalidTrigger {
        machine: String,
        trigger: String,
        state: String,
    },

    /// No event is registered under this trigger name.
    #[error("{machine}do not know event named '{trigger}'")]
    UnknownTrigger { machine: String, trigger: String },

    #[error("state '{0}' is not a registered state")]
    UnknownState(String),

    #[error("no {kind} is registered under the name '{name}'")]
    UnresolvedCallback { kind: CallbackKind, name: String },

    #[error("callback '{callback}' needs the event context, but send_event is disabled")]
    ContextNotSent { callback: String },

    /// A user callback returned an error.
    #[error("callback '{callback}' failed while processing '{trigger}': {source}")]
    Callback {
        trigger: String,
        callback: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("trigger name '{0}' cannot be the same as the state attribute name")]
    ReservedTrigger(String),

    #[error("no initial state configured for machine; specify one when adding models")]
    NoInitialState,
}

impl MachineError {
    /// Whether this error belongs to the fatal configuration lane.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MachineError::UnresolvedCallback { .. } | MachineError::ContextNotSent { .. }
        )
    }

    /// Whether this error signals a trigger that is not usable right now
    /// (unknown, or invalid from the current state).
    pub fn is_invalid_trigger(&self) -> bool {
        matches!(
            self,
            MachineError::InvalidTrigger { .. } | MachineError::UnknownTrigger { .. }
        )
    }
}
