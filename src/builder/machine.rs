//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Action, HookList, State};
use crate::machine::{Machine, TransitionSpec};
use crate::resolver::CallbackResolver;
use crate::Model;
use std::sync::Arc;

/// Initial state used when none is configured.
pub const DEFAULT_INITIAL: &str = "initial";

/// Builder for constructing machines with a fluent API.
///
/// Unlike [`Machine::new`], the builder starts with an initial state named
/// `"initial"`, which is registered automatically unless replaced with
/// [`initial`](Self::initial) or removed with [`no_initial`](Self::no_initial).
///
/// # Example
///
/// ```
/// use switchyard::{MachineBuilder, TransitionBuilder, TriggerArgs};
///
/// #[derive(Default)]
/// struct Build {
///     state: String,
/// }
///
/// switchyard::impl_model!(Build, state);
///
/// let machine = MachineBuilder::new()
///     .name("ci")
///     .states(["queued", "running", "passed", "failed"])
///     .initial("queued")
///     .transition(TransitionBuilder::new("start").from("queued").to("running"))
///     .unwrap()
///     .transition(TransitionBuilder::new("finish").from("running").to("passed"))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let mut build = Build::default();
/// machine.add_model(&mut build).unwrap();
/// machine.trigger(&mut build, "start", TriggerArgs::new()).unwrap();
/// assert_eq!(build.state, "running");
/// ```
pub struct MachineBuilder<M> {
    name: String,
    initial: Option<String>,
    states: Vec<State<M>>,
    transitions: Vec<TransitionSpec<M>>,
    send_event: bool,
    auto_transitions: bool,
    ignore_invalid_triggers: bool,
    state_attribute: Option<String>,
    resolver: Option<Arc<dyn CallbackResolver<M>>>,
    prepare_event: HookList<Action<M>>,
    before_state_change: HookList<Action<M>>,
    after_state_change: HookList<Action<M>>,
    finalize_event: HookList<Action<M>>,
    on_exception: HookList<Action<M>>,
}

impl<M: Model> MachineBuilder<M> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            initial: Some(DEFAULT_INITIAL.to_string()),
            states: Vec::new(),
            transitions: Vec::new(),
            send_event: false,
            auto_transitions: true,
            ignore_invalid_triggers: false,
            state_attribute: None,
            resolver: None,
            prepare_event: HookList::empty(),
            before_state_change: HookList::empty(),
            after_state_change: HookList::empty(),
            finalize_event: HookList::empty(),
            on_exception: HookList::empty(),
        }
    }

    /// Name used as a prefix in error messages.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Build without an initial state; models must then be added with an
    /// explicit one.
    pub fn no_initial(mut self) -> Self {
        self.initial = None;
        self
    }

    pub fn state(mut self, state: impl Into<State<M>>) -> Self {
        self.states.push(state.into());
        self
    }

    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State<M>>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<M>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionSpec<M>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<TransitionSpec<M>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    pub fn send_event(mut self, send: bool) -> Self {
        self.send_event = send;
        self
    }

    pub fn auto_transitions(mut self, enabled: bool) -> Self {
        self.auto_transitions = enabled;
        self
    }

    pub fn ignore_invalid_triggers(mut self, ignore: bool) -> Self {
        self.ignore_invalid_triggers = ignore;
        self
    }

    pub fn state_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.state_attribute = Some(attribute.into());
        self
    }

    pub fn resolver<R>(self, resolver: R) -> Self
    where
        R: CallbackResolver<M> + 'static,
    {
        self.shared_resolver(Arc::new(resolver))
    }

    pub fn shared_resolver(mut self, resolver: Arc<dyn CallbackResolver<M>>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn prepare_event(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        self.prepare_event = hooks.into();
        self
    }

    pub fn before_state_change(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        self.before_state_change = hooks.into();
        self
    }

    pub fn after_state_change(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        self.after_state_change = hooks.into();
        self
    }

    pub fn finalize_event(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        self.finalize_event = hooks.into();
        self
    }

    pub fn on_exception(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        self.on_exception = hooks.into();
        self
    }

    /// Build the machine.
    ///
    /// States are registered first, then the initial state (added if it was
    /// not among them), then the transitions. The resolver is installed
    /// before any state so conventional callbacks bind on registration.
    pub fn build(self) -> Result<Machine<M>, BuildError> {
        let mut machine = Machine::new();
        machine.set_name(self.name);
        machine.set_send_event(self.send_event);
        machine.set_auto_transitions(self.auto_transitions);
        machine.set_ignore_invalid_triggers(self.ignore_invalid_triggers);
        if let Some(attribute) = self.state_attribute {
            machine.set_state_attribute(attribute);
        }
        if let Some(resolver) = self.resolver {
            machine.set_shared_resolver(resolver);
        }

        machine.set_prepare_event(self.prepare_event);
        machine.set_before_state_change(self.before_state_change);
        machine.set_after_state_change(self.after_state_change);
        machine.set_finalize_event(self.finalize_event);
        machine.set_on_exception(self.on_exception);

        machine.add_states(self.states)?;
        if let Some(initial) = self.initial {
            machine.set_initial(initial)?;
        }
        machine.add_transitions(self.transitions)?;

        Ok(machine)
    }
}

impl<M: Model> Default for MachineBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}
