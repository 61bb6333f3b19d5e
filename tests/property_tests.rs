//! Property-based tests for dispatch ordering and policies.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated machine configurations.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use switchyard::{
    Action, Machine, MachineError, Predicate, State, TransitionSpec, TriggerArgs,
};

#[derive(Debug, Default)]
struct Widget {
    state: String,
}

switchyard::impl_model!(Widget, state);

fn widget(state: &str) -> Widget {
    Widget {
        state: state.to_string(),
    }
}

fn state_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("s{i}")).collect()
}

fn counter() -> (Arc<AtomicUsize>, Action<Widget>) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    let action = Action::plain(move |_: &mut Widget, _| {
        handle.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (count, action)
}

proptest! {
    #[test]
    fn first_passing_candidate_fires(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_state("start").unwrap();
        let evaluated = Arc::new(Mutex::new(Vec::new()));

        for (i, pass) in outcomes.iter().copied().enumerate() {
            let dest = format!("d{i}");
            machine.add_state(dest.as_str()).unwrap();
            let log = Arc::clone(&evaluated);
            machine
                .add_transition(TransitionSpec::new("go", "start", dest).conditions(
                    Predicate::plain(move |_: &Widget, _| {
                        log.lock().unwrap().push(i);
                        Ok(pass)
                    }),
                ))
                .unwrap();
        }

        let mut w = widget("start");
        let fired = machine.trigger(&mut w, "go", TriggerArgs::new()).unwrap();

        match outcomes.iter().position(|pass| *pass) {
            Some(winner) => {
                prop_assert!(fired);
                prop_assert_eq!(w.state.clone(), format!("d{winner}"));
                prop_assert_eq!(evaluated.lock().unwrap().clone(), (0..=winner).collect::<Vec<_>>());
            }
            None => {
                prop_assert!(!fired);
                prop_assert_eq!(w.state.as_str(), "start");
                prop_assert_eq!(evaluated.lock().unwrap().len(), outcomes.len());
            }
        }
    }

    #[test]
    fn ignore_policy_is_deterministic(
        machine_default in any::<bool>(),
        state_override in prop::option::of(any::<bool>()),
    ) {
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        machine.set_ignore_invalid_triggers(machine_default);
        let (prepared, prepare) = counter();
        machine.set_prepare_event(prepare);

        let mut stuck = State::new("stuck");
        if let Some(ignore) = state_override {
            stuck = stuck.ignore_invalid_triggers(ignore);
        }
        machine.add_states([State::new("ready"), stuck, State::new("done")]).unwrap();
        machine.add_transition(TransitionSpec::new("finish", "ready", "done")).unwrap();

        let mut w = widget("stuck");
        let outcome = machine.trigger(&mut w, "finish", TriggerArgs::new());

        if state_override.unwrap_or(machine_default) {
            prop_assert!(matches!(outcome, Ok(false)));
        } else {
            let invalid = matches!(outcome, Err(MachineError::InvalidTrigger { .. }));
            prop_assert!(invalid);
        }
        prop_assert_eq!(w.state.as_str(), "stuck");
        prop_assert_eq!(prepared.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn finalize_runs_exactly_once(
        guard_passes in any::<bool>(),
        before_fails in any::<bool>(),
        with_handler in any::<bool>(),
    ) {
        let mut machine = Machine::new();
        machine.add_states(["a", "b"]).unwrap();
        let (finalized, finalize) = counter();
        let (handled, handler) = counter();
        machine.set_finalize_event(finalize);
        if with_handler {
            machine.set_on_exception(handler);
        }
        machine
            .add_transition(
                TransitionSpec::new("step", "a", "b")
                    .conditions(Predicate::constant(guard_passes))
                    .before(Action::plain(move |_: &mut Widget, _| {
                        if before_fails {
                            Err(anyhow::anyhow!("before failed"))
                        } else {
                            Ok(())
                        }
                    })),
            )
            .unwrap();

        let mut w = widget("a");
        let outcome = machine.trigger(&mut w, "step", TriggerArgs::new());
        let failed = guard_passes && before_fails;

        prop_assert_eq!(finalized.load(Ordering::SeqCst), 1);
        prop_assert_eq!(handled.load(Ordering::SeqCst), usize::from(failed && with_handler));
        match outcome {
            Ok(fired) => {
                prop_assert!(!failed || with_handler);
                prop_assert_eq!(fired, guard_passes && !before_fails);
            }
            Err(err) => {
                prop_assert!(failed && !with_handler);
                let is_callback_error = matches!(err, MachineError::Callback { .. });
                prop_assert!(is_callback_error);
            }
        }
        let expected = if guard_passes && !before_fails { "b" } else { "a" };
        prop_assert_eq!(w.state.as_str(), expected);
    }

    #[test]
    fn wildcard_source_only_covers_states_known_at_registration(
        before in 1usize..6,
        after in 0usize..4,
    ) {
        let names = state_names(before + after);
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_states(names[..before].iter().cloned()).unwrap();
        machine.add_state("home").unwrap();
        machine.add_transition(TransitionSpec::new("go_home", "*", "home")).unwrap();
        machine.add_states(names[before..].iter().cloned()).unwrap();

        for (i, name) in names.iter().enumerate() {
            let mut w = widget(name);
            let outcome = machine.trigger(&mut w, "go_home", TriggerArgs::new());
            if i < before {
                prop_assert!(matches!(outcome, Ok(true)));
                prop_assert_eq!(w.state.as_str(), "home");
            } else {
                let invalid = matches!(outcome, Err(MachineError::InvalidTrigger { .. }));
                prop_assert!(invalid);
            }
        }
    }

    #[test]
    fn auto_transitions_connect_every_pair(n in 1usize..6, from in 0usize..6, to in 0usize..6) {
        let names = state_names(n);
        let mut machine = Machine::new();
        machine.add_states(names.iter().cloned()).unwrap();

        let from = &names[from % n];
        let to = &names[to % n];
        let mut w = widget(from);

        let trigger = format!("to_{to}");
        let fired = machine.trigger(&mut w, &trigger, TriggerArgs::new()).unwrap();
        prop_assert!(fired);
        prop_assert_eq!(&w.state, to);
    }

    #[test]
    fn self_transitions_reenter(n in 1usize..5) {
        let names = state_names(n);
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        let (entered, on_enter) = counter();
        let (exited, on_exit) = counter();
        for name in &names {
            machine
                .add_state(
                    State::new(name.as_str())
                        .on_enter(on_enter.clone())
                        .on_exit(on_exit.clone()),
                )
                .unwrap();
        }
        machine.add_transition(TransitionSpec::new("refresh", "*", "=")).unwrap();

        for name in &names {
            let mut w = widget(name);
            prop_assert!(machine.trigger(&mut w, "refresh", TriggerArgs::new()).unwrap());
            prop_assert_eq!(&w.state, name);
        }
        prop_assert_eq!(entered.load(Ordering::SeqCst), n);
        prop_assert_eq!(exited.load(Ordering::SeqCst), n);
    }
}
