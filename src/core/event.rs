//! Events and the per-attempt context threaded through dispatch.
//!
//! An [`Event`] groups every transition that shares a trigger name, keyed by
//! source state. Triggering it builds a fresh [`EventData`], runs the
//! machine's prepare callbacks, tries the candidate transitions for the
//! model's current state in registration order, and always finishes with the
//! machine's finalize callbacks.

use super::callback::{ActionHook, TriggerArgs};
use super::state::State;
use super::transition::{Transition, TransitionHook};
use crate::error::MachineError;
use crate::machine::Machine;
use crate::Model;
use std::collections::HashMap;
use std::fmt;

/// All transitions registered under one trigger name.
pub struct Event<M> {
    name: String,
    transitions: HashMap<String, Vec<Transition<M>>>,
}

impl<M> Event<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a candidate. Candidates for the same source are tried in the
    /// order they were added.
    pub fn add_transition(&mut self, transition: Transition<M>) {
        self.transitions
            .entry(transition.source().to_string())
            .or_default()
            .push(transition);
    }

    /// Candidates for `source`, in evaluation order.
    pub fn transitions_from(&self, source: &str) -> &[Transition<M>] {
        self.transitions
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether any transition leaves `source`.
    pub fn has_source(&self, source: &str) -> bool {
        self.transitions.contains_key(source)
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition<M>> {
        self.transitions.values().flatten()
    }

    /// Append a prepare/before/after callback to every transition of this
    /// event.
    pub fn add_callback(&mut self, hook: TransitionHook, callback: impl Into<ActionHook<M>>) {
        let callback = callback.into();
        for transition in self.transitions.values_mut().flatten() {
            transition.add_callback(hook, callback.clone());
        }
    }
}

impl<M: Model> Event<M> {
    /// Attempt this event on `model`.
    ///
    /// Returns `Ok(true)` when a transition executed, `Ok(false)` when every
    /// candidate was rejected by its guards, when an error was handled by the
    /// machine's on-exception callbacks, or when the trigger is invalid for
    /// the current state and the ignore policy applies.
    pub fn trigger(
        &self,
        machine: &Machine<M>,
        model: &mut M,
        args: TriggerArgs,
    ) -> Result<bool, MachineError> {
        let state = machine.model_state(model)?;

        if !self.has_source(state.name()) {
            if machine.ignores_invalid_trigger(state) {
                tracing::debug!(
                    trigger = %self.name,
                    state = state.name(),
                    "ignoring trigger that is invalid for the current state"
                );
                return Ok(false);
            }
            return Err(MachineError::InvalidTrigger {
                machine: machine.label(),
                trigger: self.name.clone(),
                state: state.name().to_string(),
            });
        }

        let ctx = EventData::new(state, self, machine, model, args);
        self.process(ctx)
    }

    fn process<'a>(&'a self, mut ctx: EventData<'a, M>) -> Result<bool, MachineError> {
        let machine = ctx.machine();
        let mut reraise = false;

        if let Err(err) = self.run_candidates(&mut ctx) {
            let fatal = err.is_configuration();
            ctx.error = Some(err);

            if fatal || machine.on_exception().is_empty() {
                reraise = true;
            } else {
                tracing::warn!(
                    trigger = %self.name,
                    error = %ctx.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "routing trigger failure to on_exception callbacks"
                );
                if let Err(handler_err) = machine.callbacks(machine.on_exception(), &mut ctx) {
                    ctx.error = Some(handler_err);
                    reraise = true;
                }
            }
        }

        if let Err(err) = machine.callbacks(machine.finalize_event(), &mut ctx) {
            tracing::warn!(
                trigger = %self.name,
                error = %err,
                "finalize_event callback failed; error suppressed"
            );
        }

        if reraise {
            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }
        Ok(ctx.result)
    }

    fn run_candidates<'a>(&'a self, ctx: &mut EventData<'a, M>) -> Result<(), MachineError> {
        let machine = ctx.machine();
        machine.callbacks(machine.prepare_event(), ctx)?;

        for transition in self.transitions_from(ctx.state().name()) {
            ctx.transition = Some(transition);
            if transition.execute(ctx)? {
                ctx.result = true;
                break;
            }
        }
        Ok(())
    }
}

impl<M> fmt::Debug for Event<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish()
    }
}

/// Everything known about one trigger attempt.
///
/// Created fresh for every call and dropped when the call returns. Contextual
/// callbacks receive it and can inspect the active transition, the trigger
/// arguments, and (in on-exception and finalize callbacks) the error and
/// result.
pub struct EventData<'a, M> {
    state: &'a State<M>,
    event: &'a Event<M>,
    machine: &'a Machine<M>,
    model: &'a mut M,
    args: TriggerArgs,
    pub(crate) transition: Option<&'a Transition<M>>,
    pub(crate) error: Option<MachineError>,
    pub(crate) result: bool,
}

impl<'a, M> EventData<'a, M> {
    pub(crate) fn new(
        state: &'a State<M>,
        event: &'a Event<M>,
        machine: &'a Machine<M>,
        model: &'a mut M,
        args: TriggerArgs,
    ) -> Self {
        Self {
            state,
            event,
            machine,
            model,
            args,
            transition: None,
            error: None,
            result: false,
        }
    }

    /// The state the attempt is currently in. Refreshed right after a state
    /// change, so enter and after callbacks see the destination.
    pub fn state(&self) -> &'a State<M> {
        self.state
    }

    pub fn event(&self) -> &'a Event<M> {
        self.event
    }

    pub fn machine(&self) -> &'a Machine<M> {
        self.machine
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut *self.model
    }

    pub fn args(&self) -> &TriggerArgs {
        &self.args
    }

    /// The transition currently executing, if any.
    pub fn transition(&self) -> Option<&'a Transition<M>> {
        self.transition
    }

    /// The error raised during this attempt, if any.
    pub fn error(&self) -> Option<&MachineError> {
        self.error.as_ref()
    }

    /// Whether a transition executed successfully.
    pub fn result(&self) -> bool {
        self.result
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut M, &TriggerArgs) {
        (&mut *self.model, &self.args)
    }
}

impl<'a, M: Model> EventData<'a, M> {
    /// Re-resolve the held state by name.
    pub fn update(&mut self, state: &str) -> Result<(), MachineError> {
        self.state = self.machine.get_state(state)?;
        Ok(())
    }
}

impl<M> fmt::Debug for EventData<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventData")
            .field("state", &self.state.name())
            .field("event", &self.event.name())
            .field("transition", &self.transition)
            .field("args", &self.args)
            .field("error", &self.error)
            .field("result", &self.result)
            .finish()
    }
}
