//! A single candidate edge of an event.

use super::callback::{ActionHook, HookList, Predicate};
use super::condition::Condition;
use super::event::EventData;
use crate::error::MachineError;
use crate::Model;
use std::fmt;

/// Which callback list of a [`Transition`] to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionHook {
    /// Runs before the guards, whether or not they pass
    Prepare,
    Before,
    After,
}

/// One edge from a source state, optionally to a destination state.
///
/// A transition without a destination is internal: its callbacks run but
/// the model's state is left alone and no exit/enter callbacks fire.
pub struct Transition<M> {
    source: String,
    dest: Option<String>,
    conditions: Vec<Condition<M>>,
    before: Vec<ActionHook<M>>,
    after: Vec<ActionHook<M>>,
    prepare: Vec<ActionHook<M>>,
}

impl<M> Transition<M> {
    /// Create a transition. Conditions are evaluated in the order given:
    /// every `conditions` entry (must be true) followed by every `unless`
    /// entry (must be false).
    pub fn new(
        source: impl Into<String>,
        dest: Option<String>,
        conditions: impl Into<HookList<Predicate<M>>>,
        unless: impl Into<HookList<Predicate<M>>>,
    ) -> Self {
        let conditions: HookList<Predicate<M>> = conditions.into();
        let unless: HookList<Predicate<M>> = unless.into();
        let conditions = conditions
            .into_iter()
            .map(Condition::when)
            .chain(unless.into_iter().map(Condition::unless))
            .collect();

        Self {
            source: source.into(),
            dest,
            conditions,
            before: Vec::new(),
            after: Vec::new(),
            prepare: Vec::new(),
        }
    }

    pub fn with_callbacks(
        mut self,
        before: Vec<ActionHook<M>>,
        after: Vec<ActionHook<M>>,
        prepare: Vec<ActionHook<M>>,
    ) -> Self {
        self.before = before;
        self.after = after;
        self.prepare = prepare;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Destination state, `None` for an internal transition.
    pub fn dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    pub fn is_internal(&self) -> bool {
        self.dest.is_none()
    }

    pub fn conditions(&self) -> &[Condition<M>] {
        &self.conditions
    }

    pub fn hooks(&self, hook: TransitionHook) -> &[ActionHook<M>] {
        match hook {
            TransitionHook::Prepare => &self.prepare,
            TransitionHook::Before => &self.before,
            TransitionHook::After => &self.after,
        }
    }

    pub fn add_callback(&mut self, hook: TransitionHook, callback: impl Into<ActionHook<M>>) {
        let callback = callback.into();
        match hook {
            TransitionHook::Prepare => self.prepare.push(callback),
            TransitionHook::Before => self.before.push(callback),
            TransitionHook::After => self.after.push(callback),
        }
    }
}

impl<M: Model> Transition<M> {
    /// Run this transition against the attempt in `ctx`.
    ///
    /// Returns `Ok(false)` when a guard rejects the transition. In that case
    /// only the prepare callbacks have run.
    pub fn execute<'a>(&'a self, ctx: &mut EventData<'a, M>) -> Result<bool, MachineError> {
        let machine = ctx.machine();
        machine.callbacks(&self.prepare, ctx)?;

        if !self.eval_conditions(ctx)? {
            tracing::debug!(
                trigger = ctx.event().name(),
                source = %self.source,
                "transition guards rejected"
            );
            return Ok(false);
        }

        machine.callbacks(machine.before_state_change(), ctx)?;
        machine.callbacks(&self.before, ctx)?;

        if let Some(dest) = &self.dest {
            self.change_to(dest, ctx)?;
        }

        machine.callbacks(machine.after_state_change(), ctx)?;
        machine.callbacks(&self.after, ctx)?;

        tracing::debug!(
            trigger = ctx.event().name(),
            source = %self.source,
            dest = self.dest.as_deref().unwrap_or("<internal>"),
            "transition executed"
        );
        Ok(true)
    }

    fn eval_conditions(&self, ctx: &EventData<'_, M>) -> Result<bool, MachineError> {
        for condition in &self.conditions {
            if !condition.check(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn change_to(&self, dest: &str, ctx: &mut EventData<'_, M>) -> Result<(), MachineError> {
        let machine = ctx.machine();
        machine.get_state(&self.source)?.exit(ctx)?;
        machine.set_state(ctx.model_mut(), dest)?;
        ctx.update(dest)?;
        machine.get_state(dest)?.enter(ctx)
    }
}

impl<M> Clone for Transition<M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            dest: self.dest.clone(),
            conditions: self.conditions.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            prepare: self.prepare.clone(),
        }
    }
}

impl<M> fmt::Debug for Transition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}
