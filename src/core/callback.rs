//! Callback handles and the arguments they receive.
//!
//! Callbacks come in two flavours: actions, which run side effects, and
//! predicates, which decide whether a transition may fire. Both can be
//! written against the full [`EventData`] context or against the plain
//! `(model, args)` pair. Transitions and states never hold callables
//! directly; they hold [`Hook`]s, which are either inline callables or names
//! resolved through the machine's [`CallbackResolver`](crate::CallbackResolver).

use super::event::EventData;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

type ContextualAction<M> = dyn Fn(&mut EventData<'_, M>) -> anyhow::Result<()> + Send + Sync;
type PlainAction<M> = dyn Fn(&mut M, &TriggerArgs) -> anyhow::Result<()> + Send + Sync;
type ContextualPredicate<M> = dyn Fn(&EventData<'_, M>) -> anyhow::Result<bool> + Send + Sync;
type PlainPredicate<M> = dyn Fn(&M, &TriggerArgs) -> anyhow::Result<bool> + Send + Sync;

/// Raw positional and keyword arguments passed along with a trigger.
///
/// # Example
///
/// ```rust
/// use switchyard::TriggerArgs;
/// use serde_json::json;
///
/// let args = TriggerArgs::new().arg(3).kwarg("reason", "manual");
///
/// assert_eq!(args.get(0), Some(&json!(3)));
/// assert_eq!(args.kwarg_value("reason"), Some(&json!("manual")));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerArgs {
    /// Positional arguments, in call order
    pub args: Vec<Value>,
    /// Keyword arguments
    pub kwargs: Map<String, Value>,
}

impl TriggerArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn kwarg_value(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

/// A side-effect callback.
pub enum Action<M> {
    /// Receives the full per-attempt context. Only invocable when the
    /// machine sends the event context.
    Contextual(Arc<ContextualAction<M>>),
    /// Receives the model and the raw trigger arguments.
    Plain(Arc<PlainAction<M>>),
}

impl<M> Action<M> {
    pub fn contextual<F>(f: F) -> Self
    where
        F: Fn(&mut EventData<'_, M>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Action::Contextual(Arc::new(f))
    }

    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&mut M, &TriggerArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Action::Plain(Arc::new(f))
    }

    pub fn needs_context(&self) -> bool {
        matches!(self, Action::Contextual(_))
    }
}

impl<M> Clone for Action<M> {
    fn clone(&self) -> Self {
        match self {
            Action::Contextual(f) => Action::Contextual(Arc::clone(f)),
            Action::Plain(f) => Action::Plain(Arc::clone(f)),
        }
    }
}

impl<M> fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Contextual(_) => f.write_str("Action::Contextual"),
            Action::Plain(_) => f.write_str("Action::Plain"),
        }
    }
}

/// A guard callback deciding whether a transition may fire.
///
/// Predicates only get shared access to the model: guards are expected to
/// be free of side effects.
pub enum Predicate<M> {
    Contextual(Arc<ContextualPredicate<M>>),
    Plain(Arc<PlainPredicate<M>>),
}

impl<M> Predicate<M> {
    pub fn contextual<F>(f: F) -> Self
    where
        F: Fn(&EventData<'_, M>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Predicate::Contextual(Arc::new(f))
    }

    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&M, &TriggerArgs) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Predicate::Plain(Arc::new(f))
    }

    /// Predicate that ignores its input and returns `value`.
    pub fn constant(value: bool) -> Self {
        Predicate::plain(move |_, _| Ok(value))
    }

    pub fn needs_context(&self) -> bool {
        matches!(self, Predicate::Contextual(_))
    }
}

impl<M> Clone for Predicate<M> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Contextual(f) => Predicate::Contextual(Arc::clone(f)),
            Predicate::Plain(f) => Predicate::Plain(Arc::clone(f)),
        }
    }
}

impl<M> fmt::Debug for Predicate<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Contextual(_) => f.write_str("Predicate::Contextual"),
            Predicate::Plain(_) => f.write_str("Predicate::Plain"),
        }
    }
}

/// Which kind of callable a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Action,
    Predicate,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackKind::Action => write!(f, "action"),
            CallbackKind::Predicate => write!(f, "predicate"),
        }
    }
}

/// An opaque callback handle: a registered name or an inline callable.
#[derive(Clone, Debug)]
pub enum Hook<F> {
    /// Looked up through the machine's resolver every time it runs
    Named(String),
    Inline(F),
}

pub type ActionHook<M> = Hook<Action<M>>;
pub type PredicateHook<M> = Hook<Predicate<M>>;

impl<F> Hook<F> {
    pub fn named(name: impl Into<String>) -> Self {
        Hook::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Hook::Named(name) => Some(name),
            Hook::Inline(_) => None,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    /// Human readable label for logs and errors.
    pub fn label(&self) -> &str {
        self.name().unwrap_or("<inline>")
    }
}

impl<F> From<&str> for Hook<F> {
    fn from(name: &str) -> Self {
        Hook::Named(name.to_string())
    }
}

impl<F> From<String> for Hook<F> {
    fn from(name: String) -> Self {
        Hook::Named(name)
    }
}

impl<M> From<Action<M>> for Hook<Action<M>> {
    fn from(action: Action<M>) -> Self {
        Hook::Inline(action)
    }
}

impl<M> From<Predicate<M>> for Hook<Predicate<M>> {
    fn from(predicate: Predicate<M>) -> Self {
        Hook::Inline(predicate)
    }
}

/// An ordered list of hooks.
///
/// Every place that accepts callbacks takes `impl Into<HookList<_>>`, so a
/// single name, a single callable, a `Vec` or an array all work.
///
/// # Example
///
/// ```rust
/// use switchyard::{Action, ActionHook, HookList};
///
/// struct Door;
///
/// let single: HookList<Action<Door>> = "log".into();
/// let many: HookList<Action<Door>> = vec!["log", "notify"].into();
/// let hooks: Vec<ActionHook<Door>> = many.into_vec();
///
/// assert_eq!(single.len(), 1);
/// assert_eq!(hooks.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct HookList<F>(Vec<Hook<F>>);

impl<F> HookList<F> {
    pub fn empty() -> Self {
        HookList(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Hook<F>> {
        self.0
    }
}

impl<F> Default for HookList<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F> From<&str> for HookList<F> {
    fn from(name: &str) -> Self {
        HookList(vec![Hook::from(name)])
    }
}

impl<F> From<String> for HookList<F> {
    fn from(name: String) -> Self {
        HookList(vec![Hook::Named(name)])
    }
}

impl<F> From<Hook<F>> for HookList<F> {
    fn from(hook: Hook<F>) -> Self {
        HookList(vec![hook])
    }
}

impl<M> From<Action<M>> for HookList<Action<M>> {
    fn from(action: Action<M>) -> Self {
        HookList(vec![Hook::Inline(action)])
    }
}

impl<M> From<Predicate<M>> for HookList<Predicate<M>> {
    fn from(predicate: Predicate<M>) -> Self {
        HookList(vec![Hook::Inline(predicate)])
    }
}

impl<F, H: Into<Hook<F>>> From<Vec<H>> for HookList<F> {
    fn from(hooks: Vec<H>) -> Self {
        HookList(hooks.into_iter().map(Into::into).collect())
    }
}

impl<F, H: Into<Hook<F>>, const N: usize> From<[H; N]> for HookList<F> {
    fn from(hooks: [H; N]) -> Self {
        HookList(hooks.into_iter().map(Into::into).collect())
    }
}

impl<F> IntoIterator for HookList<F> {
    type Item = Hook<F>;
    type IntoIter = std::vec::IntoIter<Hook<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
