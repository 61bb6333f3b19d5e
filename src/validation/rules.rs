//! Validation checks over a configured machine.

use crate::core::{ActionHook, CallbackKind, Hook, PredicateHook, TransitionHook};
use crate::machine::Machine;
use crate::validation::violations::ConfigViolation;
use crate::Model;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

impl<M: Model> Machine<M> {
    /// Check the whole configuration, accumulating ALL violations.
    ///
    /// Returns `Validation::Success(())` when every transition connects
    /// registered states, the initial state exists, and every named callback
    /// resolves. Nothing here runs a callback.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Check> = Vec::new();

        if let Some(initial) = self.initial() {
            checks.push(ensure(self.has_state(initial), || {
                ConfigViolation::UnknownInitial(initial.to_string())
            }));
        }

        for state in self.states() {
            let owner = |list: &str| format!("state '{}' {}", state.name(), list);
            checks.extend(self.action_checks(state.enter_hooks(), || owner("on_enter")));
            checks.extend(self.action_checks(state.exit_hooks(), || owner("on_exit")));
        }

        for event in self.events() {
            for transition in event.transitions() {
                let trigger = event.name();
                checks.push(ensure(self.has_state(transition.source()), || {
                    ConfigViolation::UnknownSource {
                        trigger: trigger.to_string(),
                        state: transition.source().to_string(),
                    }
                }));
                if let Some(dest) = transition.dest() {
                    checks.push(ensure(self.has_state(dest), || {
                        ConfigViolation::UnknownDestination {
                            trigger: trigger.to_string(),
                            state: dest.to_string(),
                        }
                    }));
                }

                let owner = |list: &str| {
                    format!("transition '{}' from '{}' {}", trigger, transition.source(), list)
                };
                for condition in transition.conditions() {
                    checks.push(self.predicate_check(condition.predicate(), || owner("conditions")));
                }
                for (hook, list) in [
                    (TransitionHook::Prepare, "prepare"),
                    (TransitionHook::Before, "before"),
                    (TransitionHook::After, "after"),
                ] {
                    checks.extend(self.action_checks(transition.hooks(hook), || owner(list)));
                }
            }
        }

        for (hooks, list) in [
            (self.prepare_event(), "prepare_event"),
            (self.before_state_change(), "before_state_change"),
            (self.after_state_change(), "after_state_change"),
            (self.finalize_event(), "finalize_event"),
            (self.on_exception(), "on_exception"),
        ] {
            checks.extend(self.action_checks(hooks, || format!("machine {list}")));
        }

        // Accumulate ALL failures using all_vec
        Validation::all_vec(checks).map(|_| ())
    }

    fn action_checks<'h>(
        &'h self,
        hooks: &'h [ActionHook<M>],
        owner: impl Fn() -> String + 'h,
    ) -> impl Iterator<Item = Check> + 'h {
        hooks.iter().filter_map(Hook::name).map(move |name| {
            ensure(self.resolver().action(name).is_some(), || {
                ConfigViolation::UnresolvedCallback {
                    kind: CallbackKind::Action,
                    name: name.to_string(),
                    owner: owner(),
                }
            })
        })
    }

    fn predicate_check(&self, hook: &PredicateHook<M>, owner: impl Fn() -> String) -> Check {
        match hook.name() {
            Some(name) => ensure(self.resolver().predicate(name).is_some(), || {
                ConfigViolation::UnresolvedCallback {
                    kind: CallbackKind::Predicate,
                    name: name.to_string(),
                    owner: owner(),
                }
            }),
            None => Validation::success(()),
        }
    }
}

fn ensure(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, CallbackRegistry, Predicate, State, TransitionSpec};

    #[derive(Debug, Default)]
    struct Invoice {
        state: String,
    }

    crate::impl_model!(Invoice, state);

    fn failures(result: Validation<(), NonEmptyVec<ConfigViolation>>) -> Vec<ConfigViolation> {
        match result {
            Validation::Failure(errors) => errors.iter().cloned().collect(),
            Validation::Success(_) => Vec::new(),
        }
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut machine: Machine<Invoice> = Machine::new();
        machine.set_auto_transitions(false);
        machine
            .add_state(State::new("draft").on_enter("stamp_draft"))
            .unwrap();
        machine.set_initial("draft").unwrap();
        machine
            .add_transition(
                TransitionSpec::new("send", "draft", "sent")
                    .conditions("is_complete")
                    .after("email_customer"),
            )
            .unwrap();
        machine
            .add_transition(TransitionSpec::new("void", "ghost", "draft"))
            .unwrap();
        machine.set_finalize_event("audit");

        let errors = failures(machine.validate());

        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ConfigViolation::UnknownDestination {
            trigger: "send".into(),
            state: "sent".into(),
        }));
        assert!(errors.contains(&ConfigViolation::UnknownSource {
            trigger: "void".into(),
            state: "ghost".into(),
        }));
        assert!(errors.contains(&ConfigViolation::UnresolvedCallback {
            kind: CallbackKind::Predicate,
            name: "is_complete".into(),
            owner: "transition 'send' from 'draft' conditions".into(),
        }));
        assert!(errors.contains(&ConfigViolation::UnresolvedCallback {
            kind: CallbackKind::Action,
            name: "stamp_draft".into(),
            owner: "state 'draft' on_enter".into(),
        }));
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigViolation::UnresolvedCallback { name, .. } if name == "email_customer"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigViolation::UnresolvedCallback { owner, .. } if owner == "machine finalize_event"
        )));
    }

    #[test]
    fn validation_succeeds_when_everything_resolves() {
        let mut machine: Machine<Invoice> = Machine::new();
        machine.add_states(["draft", "sent"]).unwrap();
        machine.set_initial("draft").unwrap();
        machine
            .add_transition(
                TransitionSpec::new("send", "draft", "sent")
                    .conditions("is_complete")
                    .before(Action::plain(|_: &mut Invoice, _| Ok(()))),
            )
            .unwrap();
        machine.set_resolver(
            CallbackRegistry::new().with_predicate("is_complete", Predicate::constant(true)),
        );

        assert!(machine.validate().is_success());
    }

    #[test]
    fn inline_callbacks_are_never_reported() {
        let mut machine: Machine<Invoice> = Machine::new();
        machine.add_state("draft").unwrap();
        machine.set_after_state_change(Action::plain(|_: &mut Invoice, _| Ok(())));

        assert!(machine.validate().is_success());
    }
}
