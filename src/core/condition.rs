//! Polarity-qualified guards on transitions.
//!
//! A condition wraps one predicate handle and the value the predicate has to
//! return for the condition to pass. `conditions` on a transition pass when
//! their predicate returns `true`, `unless` entries pass when it returns
//! `false`.

use super::callback::{Predicate, PredicateHook};
use super::event::EventData;
use crate::error::MachineError;
use crate::Model;
use std::fmt;

/// A guard owned by exactly one transition.
pub struct Condition<M> {
    predicate: PredicateHook<M>,
    target: bool,
}

impl<M> Condition<M> {
    pub fn new(predicate: impl Into<PredicateHook<M>>, target: bool) -> Self {
        Self {
            predicate: predicate.into(),
            target,
        }
    }

    /// Condition that passes when the predicate returns `true`.
    pub fn when(predicate: impl Into<PredicateHook<M>>) -> Self {
        Self::new(predicate, true)
    }

    /// Condition that passes when the predicate returns `false`.
    pub fn unless(predicate: impl Into<PredicateHook<M>>) -> Self {
        Self::new(predicate, false)
    }

    pub fn predicate(&self) -> &PredicateHook<M> {
        &self.predicate
    }

    pub fn target(&self) -> bool {
        self.target
    }
}

impl<M: Model> Condition<M> {
    /// Evaluate the guard against the current attempt.
    ///
    /// Errors from resolving or running the predicate are propagated; a
    /// predicate that simply disagrees with the target is `Ok(false)`.
    pub fn check(&self, ctx: &EventData<'_, M>) -> Result<bool, MachineError> {
        let machine = ctx.machine();
        let predicate: Predicate<M> = machine.resolve_predicate(&self.predicate)?;
        let outcome = machine.invoke_predicate(&predicate, self.predicate.label(), ctx)?;
        Ok(outcome == self.target)
    }
}

impl<M> Clone for Condition<M> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            target: self.target,
        }
    }
}

impl<M> fmt::Debug for Condition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("predicate", &self.predicate.label())
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Machine, TransitionBuilder, TriggerArgs};

    #[derive(Debug, Default)]
    struct Valve {
        state: String,
        pressure: u32,
    }

    crate::impl_model!(Valve, state);

    fn machine() -> Machine<Valve> {
        let mut machine = Machine::new();
        machine.add_states(["closed", "open"]).unwrap();
        machine
            .add_transition(TransitionBuilder::new("release").from("closed").to("open").build().unwrap())
            .unwrap();
        machine
    }

    fn check(condition: &Condition<Valve>, machine: &Machine<Valve>, valve: &mut Valve) -> bool {
        let event = machine.event("release").unwrap();
        let state = machine.get_state("closed").unwrap();
        let ctx = EventData::new(state, event, machine, valve, TriggerArgs::new());
        condition.check(&ctx).unwrap()
    }

    #[test]
    fn when_passes_on_true() {
        let machine = machine();
        let mut valve = Valve { state: "closed".into(), pressure: 10 };

        let low = Condition::when(Predicate::plain(|v: &Valve, _| Ok(v.pressure < 50)));
        let high = Condition::when(Predicate::plain(|v: &Valve, _| Ok(v.pressure >= 50)));

        assert!(check(&low, &machine, &mut valve));
        assert!(!check(&high, &machine, &mut valve));
    }

    #[test]
    fn unless_inverts_polarity() {
        let machine = machine();
        let mut valve = Valve { state: "closed".into(), pressure: 80 };

        let not_low = Condition::unless(Predicate::plain(|v: &Valve, _| Ok(v.pressure < 50)));

        assert!(check(&not_low, &machine, &mut valve));
        assert!(!not_low.target());
    }

    #[test]
    fn unresolved_predicate_is_an_error() {
        let machine = machine();
        let mut valve = Valve { state: "closed".into(), pressure: 0 };
        let event = machine.event("release").unwrap();
        let state = machine.get_state("closed").unwrap();
        let ctx = EventData::new(state, event, &machine, &mut valve, TriggerArgs::new());

        let missing = Condition::<Valve>::when("is_safe");
        let err = missing.check(&ctx).unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn predicate_errors_propagate() {
        let machine = machine();
        let mut valve = Valve { state: "closed".into(), pressure: 0 };
        let event = machine.event("release").unwrap();
        let state = machine.get_state("closed").unwrap();
        let ctx = EventData::new(state, event, &machine, &mut valve, TriggerArgs::new());

        let failing = Condition::when(Predicate::plain(|_: &Valve, _| {
            Err(anyhow::anyhow!("sensor offline"))
        }));

        assert!(matches!(
            failing.check(&ctx),
            Err(MachineError::Callback { .. })
        ));
    }
}
