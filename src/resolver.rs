//! Name-based callback lookup.
//!
//! Named hooks are resolved every time they run, so a registry can be filled
//! in after transitions referencing it were declared.

use crate::core::{Action, Predicate};
use std::collections::HashMap;
use std::fmt;

/// Maps callback names to invocable callbacks.
pub trait CallbackResolver<M>: Send + Sync {
    fn action(&self, name: &str) -> Option<Action<M>>;

    fn predicate(&self, name: &str) -> Option<Predicate<M>>;
}

/// A handle table filled at configuration time.
///
/// # Example
///
/// ```rust
/// use switchyard::{Action, CallbackRegistry, CallbackResolver, Predicate};
///
/// struct Door {
///     locked: bool,
/// }
///
/// let registry = CallbackRegistry::new()
///     .with_action("lock", Action::plain(|door: &mut Door, _| {
///         door.locked = true;
///         Ok(())
///     }))
///     .with_predicate("is_unlocked", Predicate::plain(|door: &Door, _| Ok(!door.locked)));
///
/// assert!(registry.action("lock").is_some());
/// assert!(registry.predicate("lock").is_none());
/// ```
pub struct CallbackRegistry<M> {
    actions: HashMap<String, Action<M>>,
    predicates: HashMap<String, Predicate<M>>,
}

impl<M> CallbackRegistry<M> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            predicates: HashMap::new(),
        }
    }

    /// Register an action, replacing any previous one with the same name.
    pub fn register_action(&mut self, name: impl Into<String>, action: Action<M>) {
        self.actions.insert(name.into(), action);
    }

    /// Register a predicate, replacing any previous one with the same name.
    pub fn register_predicate(&mut self, name: impl Into<String>, predicate: Predicate<M>) {
        self.predicates.insert(name.into(), predicate);
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Action<M>) -> Self {
        self.register_action(name, action);
        self
    }

    pub fn with_predicate(mut self, name: impl Into<String>, predicate: Predicate<M>) -> Self {
        self.register_predicate(name, predicate);
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len() + self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.predicates.is_empty()
    }
}

impl<M> Default for CallbackRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> CallbackResolver<M> for CallbackRegistry<M> {
    fn action(&self, name: &str) -> Option<Action<M>> {
        self.actions.get(name).cloned()
    }

    fn predicate(&self, name: &str) -> Option<Predicate<M>> {
        self.predicates.get(name).cloned()
    }
}

impl<M> fmt::Debug for CallbackRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        let mut predicates: Vec<_> = self.predicates.keys().collect();
        actions.sort();
        predicates.sort();
        f.debug_struct("CallbackRegistry")
            .field("actions", &actions)
            .field("predicates", &predicates)
            .finish()
    }
}
