//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders, helper constructors and macros for
//! declaring machines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::{MachineBuilder, DEFAULT_INITIAL};
pub use transition::TransitionBuilder;

use crate::core::{HookList, Predicate};
use crate::machine::{Dest, Source, TransitionSpec};

/// Create an unconditional transition.
///
/// # Example
///
/// ```
/// use switchyard::builder::simple_transition;
/// use switchyard::{Dest, TransitionSpec};
///
/// struct Lamp;
///
/// let def: TransitionSpec<Lamp> = simple_transition("flip", "off", "on");
/// assert_eq!(def.dest, Dest::State("on".into()));
/// ```
pub fn simple_transition<M>(
    trigger: impl Into<String>,
    source: impl Into<Source>,
    dest: impl Into<Dest>,
) -> TransitionSpec<M> {
    TransitionSpec::new(trigger, source, dest)
}

/// Create a transition that only fires when every guard returns `true`.
///
/// # Example
///
/// ```
/// use switchyard::builder::guarded_transition;
/// use switchyard::{Predicate, TransitionSpec};
///
/// struct Lamp {
///     bulb_ok: bool,
/// }
///
/// let def: TransitionSpec<Lamp> = guarded_transition(
///     "flip",
///     "off",
///     "on",
///     Predicate::plain(|lamp: &Lamp, _| Ok(lamp.bulb_ok)),
/// );
/// assert_eq!(def.conditions.len(), 1);
/// ```
pub fn guarded_transition<M>(
    trigger: impl Into<String>,
    source: impl Into<Source>,
    dest: impl Into<Dest>,
    guards: impl Into<HookList<Predicate<M>>>,
) -> TransitionSpec<M> {
    TransitionSpec::new(trigger, source, dest).conditions(guards)
}

/// Create a transition that runs its callbacks but never changes state.
pub fn internal_transition<M>(
    trigger: impl Into<String>,
    source: impl Into<Source>,
) -> TransitionSpec<M> {
    TransitionSpec::new(trigger, source, Dest::Internal)
}
