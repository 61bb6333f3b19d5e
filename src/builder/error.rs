//! Build errors for machine and transition builders.

use crate::error::MachineError;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Trigger name is empty. Pass a name to TransitionBuilder::new")]
    EmptyTrigger,

    #[error("Transition '{trigger}' has no source state. Call .from(state) or .from_any()")]
    MissingSource { trigger: String },

    #[error("Transition '{trigger}' has no destination. Call .to(state), .to_same() or .internal()")]
    MissingDestination { trigger: String },

    #[error("Machine rejected the configuration: {0}")]
    Machine(#[from] MachineError),
}
