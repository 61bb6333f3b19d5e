//! Builder for constructing transition definitions.

use crate::builder::error::BuildError;
use crate::core::{Action, HookList, Predicate};
use crate::machine::{Dest, Source, TransitionSpec};

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```
/// use switchyard::{Predicate, TransitionBuilder, TransitionSpec};
///
/// struct Kettle {
///     litres: f32,
/// }
///
/// let def: TransitionSpec<Kettle> = TransitionBuilder::new("boil")
///     .from("idle")
///     .to("heating")
///     .when(Predicate::plain(|k: &Kettle, _| Ok(k.litres > 0.2)))
///     .unless("is_lid_open")
///     .after("start_timer")
///     .build()
///     .unwrap();
///
/// assert_eq!(def.conditions.len(), 1);
/// assert_eq!(def.unless.len(), 1);
/// ```
pub struct TransitionBuilder<M> {
    trigger: String,
    source: Option<Source>,
    dest: Option<Dest>,
    conditions: HookList<Predicate<M>>,
    unless: HookList<Predicate<M>>,
    before: HookList<Action<M>>,
    after: HookList<Action<M>>,
    prepare: HookList<Action<M>>,
}

impl<M> TransitionBuilder<M> {
    /// Create a new transition builder for `trigger`.
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            source: None,
            dest: None,
            conditions: HookList::empty(),
            unless: HookList::empty(),
            before: HookList::empty(),
            after: HookList::empty(),
            prepare: HookList::empty(),
        }
    }

    /// Set the source state(s) (required). `"*"` means every state
    /// registered when the transition is added.
    pub fn from(mut self, source: impl Into<Source>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Allow the transition from every registered state.
    pub fn from_any(mut self) -> Self {
        self.source = Some(Source::All);
        self
    }

    /// Set the destination state (required unless `to_same` or `internal`).
    pub fn to(mut self, dest: impl Into<Dest>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Re-enter the source state.
    pub fn to_same(mut self) -> Self {
        self.dest = Some(Dest::Same);
        self
    }

    /// Run callbacks without leaving the source state.
    pub fn internal(mut self) -> Self {
        self.dest = Some(Dest::Internal);
        self
    }

    /// Add guards that must return `true`.
    pub fn when(mut self, predicates: impl Into<HookList<Predicate<M>>>) -> Self {
        let predicates: HookList<Predicate<M>> = predicates.into();
        self.conditions = concat(self.conditions, predicates);
        self
    }

    /// Add guards that must return `false`.
    pub fn unless(mut self, predicates: impl Into<HookList<Predicate<M>>>) -> Self {
        let predicates: HookList<Predicate<M>> = predicates.into();
        self.unless = concat(self.unless, predicates);
        self
    }

    pub fn before(mut self, actions: impl Into<HookList<Action<M>>>) -> Self {
        let actions: HookList<Action<M>> = actions.into();
        self.before = concat(self.before, actions);
        self
    }

    pub fn after(mut self, actions: impl Into<HookList<Action<M>>>) -> Self {
        let actions: HookList<Action<M>> = actions.into();
        self.after = concat(self.after, actions);
        self
    }

    /// Add callbacks run before the guards are evaluated.
    pub fn prepare(mut self, actions: impl Into<HookList<Action<M>>>) -> Self {
        let actions: HookList<Action<M>> = actions.into();
        self.prepare = concat(self.prepare, actions);
        self
    }

    /// Build the transition definition.
    pub fn build(self) -> Result<TransitionSpec<M>, BuildError> {
        if self.trigger.is_empty() {
            return Err(BuildError::EmptyTrigger);
        }
        let source = match self.source {
            Some(Source::States(states)) if states.is_empty() => None,
            other => other,
        }
        .ok_or_else(|| BuildError::MissingSource {
            trigger: self.trigger.clone(),
        })?;
        let dest = self.dest.ok_or_else(|| BuildError::MissingDestination {
            trigger: self.trigger.clone(),
        })?;

        Ok(TransitionSpec::new(self.trigger, source, dest)
            .conditions(self.conditions)
            .unless(self.unless)
            .before(self.before)
            .after(self.after)
            .prepare(self.prepare))
    }
}

fn concat<F>(head: HookList<F>, tail: HookList<F>) -> HookList<F> {
    let mut hooks = head.into_vec();
    hooks.extend(tail);
    hooks.into()
}
