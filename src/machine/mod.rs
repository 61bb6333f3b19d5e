//! The state machine registry and its transition definitions.

mod definition;
mod engine;

pub use definition::{Dest, Source, TransitionSpec, WILDCARD_ALL, WILDCARD_SAME};
pub use engine::Machine;
