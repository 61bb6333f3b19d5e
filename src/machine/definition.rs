//! Declarative transition descriptions, before wildcard expansion.

use crate::core::{Action, ActionHook, HookList, Predicate, PredicateHook};
use std::fmt;

/// Source wildcard: every state registered when the transition is added.
pub const WILDCARD_ALL: &str = "*";

/// Destination wildcard: the source state itself (self transition).
pub const WILDCARD_SAME: &str = "=";

/// Where a transition may start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Expands to the states registered at the time the transition is added.
    /// States added later are not included.
    All,
    States(Vec<String>),
}

impl Source {
    pub fn states<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Source::States(states.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        if name == WILDCARD_ALL {
            Source::All
        } else {
            Source::States(vec![name.to_string()])
        }
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Source::from(name.as_str())
    }
}

impl From<Vec<&str>> for Source {
    fn from(names: Vec<&str>) -> Self {
        Source::states(names)
    }
}

impl From<Vec<String>> for Source {
    fn from(names: Vec<String>) -> Self {
        Source::States(names)
    }
}

impl<const N: usize> From<[&str; N]> for Source {
    fn from(names: [&str; N]) -> Self {
        Source::states(names)
    }
}

/// Where a transition leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dest {
    State(String),
    /// Resolved to each expanded source, producing self transitions.
    Same,
    /// No state change and no exit/enter callbacks.
    Internal,
}

impl From<&str> for Dest {
    fn from(name: &str) -> Self {
        if name == WILDCARD_SAME {
            Dest::Same
        } else {
            Dest::State(name.to_string())
        }
    }
}

impl From<String> for Dest {
    fn from(name: String) -> Self {
        Dest::from(name.as_str())
    }
}

impl From<Option<&str>> for Dest {
    fn from(name: Option<&str>) -> Self {
        name.map_or(Dest::Internal, Dest::from)
    }
}

/// Everything `Machine::add_transition` needs to register one trigger edge
/// (possibly expanding to several transitions).
pub struct TransitionSpec<M> {
    pub trigger: String,
    pub source: Source,
    pub dest: Dest,
    /// Predicates that must return `true`
    pub conditions: Vec<PredicateHook<M>>,
    /// Predicates that must return `false`
    pub unless: Vec<PredicateHook<M>>,
    pub before: Vec<ActionHook<M>>,
    pub after: Vec<ActionHook<M>>,
    pub prepare: Vec<ActionHook<M>>,
}

impl<M> TransitionSpec<M> {
    pub fn new(trigger: impl Into<String>, source: impl Into<Source>, dest: impl Into<Dest>) -> Self {
        Self {
            trigger: trigger.into(),
            source: source.into(),
            dest: dest.into(),
            conditions: Vec::new(),
            unless: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            prepare: Vec::new(),
        }
    }

    pub fn conditions(mut self, hooks: impl Into<HookList<Predicate<M>>>) -> Self {
        let hooks: HookList<Predicate<M>> = hooks.into();
        self.conditions.extend(hooks);
        self
    }

    pub fn unless(mut self, hooks: impl Into<HookList<Predicate<M>>>) -> Self {
        let hooks: HookList<Predicate<M>> = hooks.into();
        self.unless.extend(hooks);
        self
    }

    pub fn before(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        let hooks: HookList<Action<M>> = hooks.into();
        self.before.extend(hooks);
        self
    }

    pub fn after(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        let hooks: HookList<Action<M>> = hooks.into();
        self.after.extend(hooks);
        self
    }

    pub fn prepare(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        let hooks: HookList<Action<M>> = hooks.into();
        self.prepare.extend(hooks);
        self
    }
}

impl<M> Clone for TransitionSpec<M> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger.clone(),
            source: self.source.clone(),
            dest: self.dest.clone(),
            conditions: self.conditions.clone(),
            unless: self.unless.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            prepare: self.prepare.clone(),
        }
    }
}

impl<M> fmt::Debug for TransitionSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSpec")
            .field("trigger", &self.trigger)
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("conditions", &self.conditions)
            .field("unless", &self.unless)
            .finish_non_exhaustive()
    }
}
