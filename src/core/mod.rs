//! Core dispatch types.
//!
//! This module contains the pieces a trigger flows through:
//! - callback handles and trigger arguments
//! - the `Model` capability the machine drives
//! - states, conditions, transitions and events
//!
//! Nothing here owns a model. Every type is parameterised over the model
//! type `M` so callbacks are checked against it at compile time.

mod callback;
mod condition;
mod event;
mod model;
mod state;
mod transition;

pub use callback::{
    Action, ActionHook, CallbackKind, Hook, HookList, Predicate, PredicateHook, TriggerArgs,
};
pub use condition::Condition;
pub use event::{Event, EventData};
pub use model::Model;
pub use state::{State, StateHook};
pub use transition::{Transition, TransitionHook};
