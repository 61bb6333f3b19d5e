//! The machine: state and event registries plus global callbacks.

use super::definition::{Dest, Source, TransitionSpec};
use crate::core::{
    Action, ActionHook, CallbackKind, Event, EventData, Hook, HookList, Predicate, PredicateHook,
    State, StateHook, Transition, TriggerArgs,
};
use crate::error::MachineError;
use crate::resolver::{CallbackRegistry, CallbackResolver};
use crate::Model;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

const DEFAULT_STATE_ATTRIBUTE: &str = "state";

/// Registry of states and events driving caller-owned models.
///
/// The machine never owns models. Every trigger call borrows the model
/// mutably for the duration of the pipeline and reads/writes its state
/// through [`Model`]. There is no attached-model set: [`add_model`] only
/// stamps the initial state, and [`dispatch`] fires on a slice the caller
/// owns.
///
/// [`add_model`]: Machine::add_model
/// [`dispatch`]: Machine::dispatch
///
/// # Example
///
/// ```rust
/// use switchyard::{Machine, TransitionSpec, TriggerArgs};
///
/// #[derive(Default)]
/// struct Door {
///     state: String,
/// }
///
/// switchyard::impl_model!(Door, state);
///
/// let mut machine = Machine::new();
/// machine.add_states(["closed", "open"]).unwrap();
/// machine.set_initial("closed").unwrap();
/// machine
///     .add_transition(TransitionSpec::new("push", "closed", "open"))
///     .unwrap();
///
/// let mut door = Door::default();
/// machine.add_model(&mut door).unwrap();
///
/// assert!(machine.trigger(&mut door, "push", TriggerArgs::new()).unwrap());
/// assert_eq!(door.state, "open");
///
/// // auto transitions are on by default
/// assert!(machine.trigger(&mut door, "to_closed", TriggerArgs::new()).unwrap());
/// assert_eq!(door.state, "closed");
/// ```
pub struct Machine<M> {
    name: String,
    states: Vec<State<M>>,
    state_index: HashMap<String, usize>,
    events: BTreeMap<String, Event<M>>,
    prepare_event: Vec<ActionHook<M>>,
    before_state_change: Vec<ActionHook<M>>,
    after_state_change: Vec<ActionHook<M>>,
    finalize_event: Vec<ActionHook<M>>,
    on_exception: Vec<ActionHook<M>>,
    initial: Option<String>,
    send_event: bool,
    auto_transitions: bool,
    ignore_invalid_triggers: bool,
    state_attribute: String,
    resolver: Arc<dyn CallbackResolver<M>>,
}

impl<M: Model> Machine<M> {
    /// An empty machine: no states, no initial state, auto transitions on,
    /// invalid triggers raise, and an empty callback registry.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            states: Vec::new(),
            state_index: HashMap::new(),
            events: BTreeMap::new(),
            prepare_event: Vec::new(),
            before_state_change: Vec::new(),
            after_state_change: Vec::new(),
            finalize_event: Vec::new(),
            on_exception: Vec::new(),
            initial: None,
            send_event: false,
            auto_transitions: true,
            ignore_invalid_triggers: false,
            state_attribute: DEFAULT_STATE_ATTRIBUTE.to_string(),
            resolver: Arc::new(CallbackRegistry::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Prefix used in error messages: empty, or `"<name>: "`.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            String::new()
        } else {
            format!("{}: ", self.name)
        }
    }

    /// Whether contextual callbacks receive the [`EventData`].
    pub fn send_event(&self) -> bool {
        self.send_event
    }

    /// A callback's own form decides what it is called with: plain
    /// callbacks always get `(model, args)`, contextual ones the
    /// [`EventData`]. This toggle only gates the contextual form; while it
    /// is off, running one fails with [`MachineError::ContextNotSent`].
    pub fn set_send_event(&mut self, send: bool) {
        self.send_event = send;
    }

    pub fn auto_transitions(&self) -> bool {
        self.auto_transitions
    }

    /// Only affects states added after the call.
    pub fn set_auto_transitions(&mut self, enabled: bool) {
        self.auto_transitions = enabled;
    }

    /// Machine-wide default for the invalid trigger policy.
    pub fn ignore_invalid_triggers(&self) -> bool {
        self.ignore_invalid_triggers
    }

    pub fn set_ignore_invalid_triggers(&mut self, ignore: bool) {
        self.ignore_invalid_triggers = ignore;
    }

    pub fn state_attribute(&self) -> &str {
        &self.state_attribute
    }

    /// Name of the model attribute holding the state. Triggers may not use
    /// it, and auto transitions are named `to_<attribute>_<state>` when it
    /// differs from `state`.
    pub fn set_state_attribute(&mut self, attribute: impl Into<String>) {
        self.state_attribute = attribute.into();
    }

    pub fn resolver(&self) -> &dyn CallbackResolver<M> {
        self.resolver.as_ref()
    }

    /// Replace the resolver used for named callbacks. Conventional
    /// `on_enter_<state>`/`on_exit_<state>` actions it provides are bound
    /// to the registered states.
    pub fn set_resolver<R>(&mut self, resolver: R)
    where
        R: CallbackResolver<M> + 'static,
    {
        self.set_shared_resolver(Arc::new(resolver));
    }

    pub fn set_shared_resolver(&mut self, resolver: Arc<dyn CallbackResolver<M>>) {
        self.resolver = resolver;
        for state in &mut self.states {
            bind_conventional(self.resolver.as_ref(), state);
        }
    }

    pub fn prepare_event(&self) -> &[ActionHook<M>] {
        &self.prepare_event
    }

    /// Runs once per trigger attempt, before any candidate is tried.
    pub fn set_prepare_event(&mut self, hooks: impl Into<HookList<Action<M>>>) {
        self.prepare_event = action_hooks(hooks);
    }

    pub fn before_state_change(&self) -> &[ActionHook<M>] {
        &self.before_state_change
    }

    pub fn set_before_state_change(&mut self, hooks: impl Into<HookList<Action<M>>>) {
        self.before_state_change = action_hooks(hooks);
    }

    pub fn after_state_change(&self) -> &[ActionHook<M>] {
        &self.after_state_change
    }

    pub fn set_after_state_change(&mut self, hooks: impl Into<HookList<Action<M>>>) {
        self.after_state_change = action_hooks(hooks);
    }

    pub fn finalize_event(&self) -> &[ActionHook<M>] {
        &self.finalize_event
    }

    /// Runs exactly once at the end of every processed trigger. Failures are
    /// logged and never replace the trigger's own outcome.
    pub fn set_finalize_event(&mut self, hooks: impl Into<HookList<Action<M>>>) {
        self.finalize_event = action_hooks(hooks);
    }

    pub fn on_exception(&self) -> &[ActionHook<M>] {
        &self.on_exception
    }

    /// When non-empty, errors raised while a trigger runs are handed to
    /// these callbacks and the trigger returns `Ok(false)`.
    pub fn set_on_exception(&mut self, hooks: impl Into<HookList<Action<M>>>) {
        self.on_exception = action_hooks(hooks);
    }

    /// Register a state. Re-adding a name replaces the state in place and
    /// keeps its position.
    pub fn add_state(&mut self, state: impl Into<State<M>>) -> Result<(), MachineError> {
        let mut state: State<M> = state.into();
        bind_conventional(self.resolver.as_ref(), &mut state);
        let name = state.name().to_string();

        if let Some(&index) = self.state_index.get(&name) {
            self.states[index] = state;
            tracing::debug!(state = %name, "replaced state");
            return Ok(());
        }

        self.state_index.insert(name.clone(), self.states.len());
        self.states.push(state);
        tracing::debug!(state = %name, "added state");

        if self.auto_transitions {
            self.add_auto_transitions(&name)?;
        }
        Ok(())
    }

    pub fn add_states<I, S>(&mut self, states: I) -> Result<(), MachineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<State<M>>,
    {
        for state in states {
            self.add_state(state)?;
        }
        Ok(())
    }

    fn add_auto_transitions(&mut self, added: &str) -> Result<(), MachineError> {
        let names: Vec<String> = self.state_names().map(str::to_string).collect();
        for other in names {
            let trigger = self.auto_trigger_name(&other);
            let def = if other == added {
                TransitionSpec::new(trigger, Source::All, Dest::State(other))
            } else {
                TransitionSpec::new(trigger, added, Dest::State(other))
            };
            self.add_transition(def)?;
        }
        Ok(())
    }

    fn auto_trigger_name(&self, state: &str) -> String {
        if self.state_attribute == DEFAULT_STATE_ATTRIBUTE {
            format!("to_{state}")
        } else {
            format!("to_{}_{}", self.state_attribute, state)
        }
    }

    /// Register a transition, expanding wildcards against the states known
    /// right now. Each expanded source gets its own [`Transition`], appended
    /// after any existing candidates for that source.
    pub fn add_transition(&mut self, def: TransitionSpec<M>) -> Result<(), MachineError> {
        if def.trigger == self.state_attribute {
            return Err(MachineError::ReservedTrigger(def.trigger));
        }

        let sources = match def.source {
            Source::All => self.state_names().map(str::to_string).collect(),
            Source::States(states) => states,
        };

        let event = self
            .events
            .entry(def.trigger.clone())
            .or_insert_with(|| Event::new(def.trigger.clone()));

        for source in sources {
            let dest = match &def.dest {
                Dest::State(dest) => Some(dest.clone()),
                Dest::Same => Some(source.clone()),
                Dest::Internal => None,
            };
            let transition = Transition::new(
                source,
                dest,
                def.conditions.clone(),
                def.unless.clone(),
            )
            .with_callbacks(def.before.clone(), def.after.clone(), def.prepare.clone());
            event.add_transition(transition);
        }
        Ok(())
    }

    pub fn add_transitions<I>(&mut self, definitions: I) -> Result<(), MachineError>
    where
        I: IntoIterator<Item = TransitionSpec<M>>,
    {
        for def in definitions {
            self.add_transition(def)?;
        }
        Ok(())
    }

    pub fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    /// Designate the initial state, registering it first if needed.
    pub fn set_initial(&mut self, state: impl Into<State<M>>) -> Result<(), MachineError> {
        let state: State<M> = state.into();
        let name = state.name().to_string();
        if !self.state_index.contains_key(&name) {
            self.add_state(state)?;
        }
        self.initial = Some(name);
        Ok(())
    }

    /// Put a fresh model into the initial state.
    pub fn add_model(&self, model: &mut M) -> Result<(), MachineError> {
        let initial = self.initial.as_deref().ok_or(MachineError::NoInitialState)?;
        self.set_state(model, initial)
    }

    /// Put a fresh model into `initial` instead of the machine's initial state.
    pub fn add_model_with_initial(&self, model: &mut M, initial: &str) -> Result<(), MachineError> {
        self.set_state(model, initial)
    }

    pub fn get_state(&self, name: &str) -> Result<&State<M>, MachineError> {
        self.state_index
            .get(name)
            .map(|&index| &self.states[index])
            .ok_or_else(|| MachineError::UnknownState(name.to_string()))
    }

    /// Mutable access, e.g. to append callbacks after registration.
    pub fn get_state_mut(&mut self, name: &str) -> Result<&mut State<M>, MachineError> {
        match self.state_index.get(name) {
            Some(&index) => Ok(&mut self.states[index]),
            None => Err(MachineError::UnknownState(name.to_string())),
        }
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.state_index.contains_key(name)
    }

    /// The registered state the model is currently in.
    pub fn model_state(&self, model: &M) -> Result<&State<M>, MachineError> {
        self.get_state(model.current_state())
    }

    /// Force the model into `name` without running any callbacks.
    pub fn set_state(&self, model: &mut M, name: &str) -> Result<(), MachineError> {
        let state = self.get_state(name)?;
        model.set_current_state(state.name());
        Ok(())
    }

    pub fn is_state(&self, model: &M, name: &str) -> bool {
        model.current_state() == name
    }

    /// Effective invalid trigger policy for `state`: its own override, else
    /// the machine default.
    pub fn ignores_invalid_trigger(&self, state: &State<M>) -> bool {
        state
            .ignores_invalid_triggers()
            .unwrap_or(self.ignore_invalid_triggers)
    }

    /// Fire `trigger` on `model`.
    ///
    /// Returns whether a transition executed. See [`Event::trigger`] for the
    /// full outcome table.
    pub fn trigger(
        &self,
        model: &mut M,
        trigger: &str,
        args: TriggerArgs,
    ) -> Result<bool, MachineError> {
        let Some(event) = self.events.get(trigger) else {
            let ignore = match self.model_state(model) {
                Ok(state) => self.ignores_invalid_trigger(state),
                Err(_) => self.ignore_invalid_triggers,
            };
            if ignore {
                tracing::debug!(trigger, "ignoring unknown trigger");
                return Ok(false);
            }
            return Err(MachineError::UnknownTrigger {
                machine: self.label(),
                trigger: trigger.to_string(),
            });
        };

        tracing::debug!(
            trigger,
            state = model.current_state(),
            machine = %self.name,
            "processing trigger"
        );
        event.trigger(self, model, args)
    }

    /// Fire `trigger` on every model in turn. Returns `Ok(true)` only if it
    /// succeeded on all of them; stops at the first error.
    pub fn dispatch(
        &self,
        models: &mut [M],
        trigger: &str,
        args: TriggerArgs,
    ) -> Result<bool, MachineError> {
        let mut all = true;
        for model in models.iter_mut() {
            all &= self.trigger(model, trigger, args.clone())?;
        }
        Ok(all)
    }

    /// Names of the triggers with at least one transition leaving any of
    /// `states`, in name order.
    pub fn triggers_from(&self, states: &[&str]) -> Vec<&str> {
        self.events
            .values()
            .filter(|event| states.iter().any(|state| event.has_source(state)))
            .map(Event::name)
            .collect()
    }

    pub fn event(&self, trigger: &str) -> Option<&Event<M>> {
        self.events.get(trigger)
    }

    pub fn event_mut(&mut self, trigger: &str) -> Option<&mut Event<M>> {
        self.events.get_mut(trigger)
    }

    /// Registered states, in registration order.
    pub fn states(&self) -> impl Iterator<Item = &State<M>> {
        self.states.iter()
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(State::name)
    }

    /// Registered events, in trigger-name order.
    pub fn events(&self) -> impl Iterator<Item = &Event<M>> {
        self.events.values()
    }

    /// Run `hooks` in order, stopping at the first failure.
    pub fn callbacks(
        &self,
        hooks: &[ActionHook<M>],
        ctx: &mut EventData<'_, M>,
    ) -> Result<(), MachineError> {
        for hook in hooks {
            self.callback(hook, ctx)?;
        }
        Ok(())
    }

    /// Resolve and run a single action hook.
    pub fn callback(
        &self,
        hook: &ActionHook<M>,
        ctx: &mut EventData<'_, M>,
    ) -> Result<(), MachineError> {
        let action = self.resolve_action(hook)?;
        let label = hook.label();

        let outcome = match &action {
            Action::Contextual(f) => {
                if !self.send_event {
                    return Err(MachineError::ContextNotSent {
                        callback: label.to_string(),
                    });
                }
                f(&mut *ctx)
            }
            Action::Plain(f) => {
                let (model, args) = ctx.parts_mut();
                f(model, args)
            }
        };

        outcome.map_err(|source| MachineError::Callback {
            trigger: ctx.event().name().to_string(),
            callback: label.to_string(),
            source: source.into(),
        })
    }

    pub fn resolve_action(&self, hook: &ActionHook<M>) -> Result<Action<M>, MachineError> {
        match hook {
            Hook::Inline(action) => Ok(action.clone()),
            Hook::Named(name) => {
                self.resolver
                    .action(name)
                    .ok_or_else(|| MachineError::UnresolvedCallback {
                        kind: CallbackKind::Action,
                        name: name.clone(),
                    })
            }
        }
    }

    pub fn resolve_predicate(
        &self,
        hook: &PredicateHook<M>,
    ) -> Result<Predicate<M>, MachineError> {
        match hook {
            Hook::Inline(predicate) => Ok(predicate.clone()),
            Hook::Named(name) => {
                self.resolver
                    .predicate(name)
                    .ok_or_else(|| MachineError::UnresolvedCallback {
                        kind: CallbackKind::Predicate,
                        name: name.clone(),
                    })
            }
        }
    }

    /// Run a resolved predicate with the argument shape it expects.
    pub fn invoke_predicate(
        &self,
        predicate: &Predicate<M>,
        label: &str,
        ctx: &EventData<'_, M>,
    ) -> Result<bool, MachineError> {
        let outcome = match predicate {
            Predicate::Contextual(f) => {
                if !self.send_event {
                    return Err(MachineError::ContextNotSent {
                        callback: label.to_string(),
                    });
                }
                f(ctx)
            }
            Predicate::Plain(f) => f(ctx.model(), ctx.args()),
        };

        outcome.map_err(|source| MachineError::Callback {
            trigger: ctx.event().name().to_string(),
            callback: label.to_string(),
            source: source.into(),
        })
    }
}

impl<M: Model> Default for Machine<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for Machine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("name", &self.name)
            .field("states", &self.states)
            .field("events", &self.events)
            .field("initial", &self.initial)
            .field("send_event", &self.send_event)
            .field("auto_transitions", &self.auto_transitions)
            .field("ignore_invalid_triggers", &self.ignore_invalid_triggers)
            .field("state_attribute", &self.state_attribute)
            .finish_non_exhaustive()
    }
}

fn action_hooks<M>(hooks: impl Into<HookList<Action<M>>>) -> Vec<ActionHook<M>> {
    let hooks: HookList<Action<M>> = hooks.into();
    hooks.into_vec()
}

/// Keep resolver-provided `on_enter_<state>`/`on_exit_<state>` actions in
/// step with `resolver`: bind the ones it provides, drop earlier automatic
/// bindings it no longer resolves.
fn bind_conventional<M>(resolver: &dyn CallbackResolver<M>, state: &mut State<M>) {
    for hook in [StateHook::Enter, StateHook::Exit] {
        let name = hook.conventional_name(state.name());
        state.sync_conventional(hook, resolver.action(&name).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Robot {
        state: String,
        charge: u32,
    }

    crate::impl_model!(Robot, state);

    fn robot(state: &str) -> Robot {
        Robot {
            state: state.to_string(),
            charge: 100,
        }
    }

    fn go(machine: &Machine<Robot>, robot: &mut Robot, trigger: &str) -> Result<bool, MachineError> {
        machine.trigger(robot, trigger, TriggerArgs::new())
    }

    #[test]
    fn auto_transitions_reach_every_state() {
        let mut machine = Machine::new();
        machine.add_states(["idle", "moving", "docked"]).unwrap();

        for from in ["idle", "moving", "docked"] {
            for to in ["idle", "moving", "docked"] {
                let mut r = robot(from);
                assert!(go(&machine, &mut r, &format!("to_{to}")).unwrap());
                assert_eq!(r.state, to);
            }
        }
    }

    #[test]
    fn auto_transition_names_use_custom_attribute() {
        let mut machine: Machine<Robot> = Machine::new();
        machine.set_state_attribute("status");
        machine.add_states(["a", "b"]).unwrap();

        assert!(machine.event("to_status_b").is_some());
        assert!(machine.event("to_b").is_none());
    }

    #[test]
    fn disabled_auto_transitions_register_no_events() {
        let mut machine: Machine<Robot> = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_states(["a", "b"]).unwrap();

        assert_eq!(machine.events().count(), 0);
    }

    #[test]
    fn wildcard_source_expands_at_registration_time() {
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_states(["a", "b"]).unwrap();
        machine
            .add_transition(TransitionSpec::new("reset", "*", "a"))
            .unwrap();
        machine.add_state("c").unwrap();

        let mut from_b = robot("b");
        assert!(go(&machine, &mut from_b, "reset").unwrap());

        let mut from_c = robot("c");
        let err = go(&machine, &mut from_c, "reset").unwrap_err();
        assert!(matches!(err, MachineError::InvalidTrigger { .. }));
    }

    #[test]
    fn same_destination_resolves_per_source() {
        let mut machine: Machine<Robot> = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_states(["a", "b", "c"]).unwrap();
        machine
            .add_transition(TransitionSpec::new("stay", Source::from(["a", "b"]), "="))
            .unwrap();

        let event = machine.event("stay").unwrap();
        assert_eq!(event.transitions_from("a")[0].dest(), Some("a"));
        assert_eq!(event.transitions_from("b")[0].dest(), Some("b"));
    }

    #[test]
    fn trigger_named_like_state_attribute_is_rejected() {
        let mut machine: Machine<Robot> = Machine::new();
        machine.add_state("a").unwrap();

        let err = machine
            .add_transition(TransitionSpec::new("state", "a", "a"))
            .unwrap_err();
        assert!(matches!(err, MachineError::ReservedTrigger(t) if t == "state"));
    }

    #[test]
    fn unknown_trigger_follows_ignore_policy() {
        let mut machine = Machine::new();
        machine.set_name("rover");
        machine.add_state("idle").unwrap();

        let mut r = robot("idle");
        let err = go(&machine, &mut r, "fly").unwrap_err();
        assert_eq!(err.to_string(), "rover: do not know event named 'fly'");

        machine.set_ignore_invalid_triggers(true);
        assert!(!go(&machine, &mut r, "fly").unwrap());
        assert_eq!(r.state, "idle");
    }

    #[test]
    fn add_model_requires_initial_state() {
        let mut machine = Machine::new();
        machine.add_state("idle").unwrap();

        let mut r = Robot::default();
        assert!(matches!(
            machine.add_model(&mut r),
            Err(MachineError::NoInitialState)
        ));

        machine.set_initial("parked").unwrap();
        machine.add_model(&mut r).unwrap();
        assert_eq!(r.state, "parked");
        assert!(machine.has_state("parked"));

        machine.add_model_with_initial(&mut r, "idle").unwrap();
        assert!(machine.is_state(&r, "idle"));
        assert!(machine.add_model_with_initial(&mut r, "flying").is_err());
    }

    #[test]
    fn re_adding_a_state_replaces_it_in_place() {
        let mut machine: Machine<Robot> = Machine::new();
        machine.add_states(["a", "b"]).unwrap();
        machine
            .add_state(State::new("a").ignore_invalid_triggers(true))
            .unwrap();

        let names: Vec<_> = machine.state_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            machine.get_state("a").unwrap().ignores_invalid_triggers(),
            Some(true)
        );
        assert_eq!(machine.event("to_a").unwrap().transitions_from("b").len(), 1);
    }

    #[test]
    fn conventional_callbacks_bind_from_resolver() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let registry = CallbackRegistry::new().with_action(
            "on_enter_docked",
            Action::plain(move |r: &mut Robot, _| {
                r.charge = 100;
                sink.lock().unwrap().push("docked");
                Ok(())
            }),
        );

        let mut machine = Machine::new();
        machine.add_states(["moving", "docked"]).unwrap();
        machine.set_resolver(registry);
        machine.set_resolver(
            CallbackRegistry::new().with_action("on_enter_docked", Action::plain(|_: &mut Robot, _| Ok(()))),
        );

        let docked = machine.get_state("docked").unwrap();
        assert_eq!(docked.enter_hooks().len(), 1);
        assert!(docked.has_named(StateHook::Enter, "on_enter_docked"));

        let mut r = Robot { state: "moving".into(), charge: 3 };
        assert!(go(&machine, &mut r, "to_docked").unwrap());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn replacing_the_resolver_drops_stale_conventional_callbacks() {
        let registry = || {
            CallbackRegistry::new().with_action(
                "on_enter_docked",
                Action::plain(|r: &mut Robot, _| {
                    r.charge = 100;
                    Ok(())
                }),
            )
        };

        let mut machine = Machine::new();
        machine.set_resolver(registry());
        machine.add_states(["moving", "docked"]).unwrap();
        machine
            .get_state_mut("docked")
            .unwrap()
            .add_callback(StateHook::Exit, "on_exit_docked");
        machine.set_resolver(CallbackRegistry::new());

        let docked = machine.get_state("docked").unwrap();
        assert!(docked.enter_hooks().is_empty());
        // listed by hand, so it stays even though nothing resolves it
        assert!(docked.has_named(StateHook::Exit, "on_exit_docked"));

        let mut r = Robot { state: "moving".into(), charge: 3 };
        assert!(go(&machine, &mut r, "to_docked").unwrap());
        assert_eq!(r.state, "docked");
        assert_eq!(r.charge, 3);

        machine.set_resolver(registry());
        assert_eq!(machine.get_state("docked").unwrap().enter_hooks().len(), 1);
        let mut r = Robot { state: "moving".into(), charge: 3 };
        assert!(go(&machine, &mut r, "to_docked").unwrap());
        assert_eq!(r.charge, 100);
    }

    #[test]
    fn triggers_from_lists_sorted_names() {
        let mut machine: Machine<Robot> = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_states(["idle", "moving", "docked"]).unwrap();
        machine
            .add_transitions([
                TransitionSpec::new("start", "idle", "moving"),
                TransitionSpec::new("dock", "moving", "docked"),
                TransitionSpec::new("abort", "moving", "idle"),
            ])
            .unwrap();

        assert_eq!(machine.triggers_from(&["moving"]), vec!["abort", "dock"]);
        assert_eq!(
            machine.triggers_from(&["idle", "moving"]),
            vec!["abort", "dock", "start"]
        );
        assert!(machine.triggers_from(&["docked"]).is_empty());
    }

    #[test]
    fn dispatch_triggers_every_model() {
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_states(["idle", "moving"]).unwrap();
        machine
            .add_transition(
                TransitionSpec::new("start", "idle", "moving")
                    .conditions(Predicate::plain(|r: &Robot, _| Ok(r.charge > 10))),
            )
            .unwrap();

        let mut fleet = vec![robot("idle"), Robot { state: "idle".into(), charge: 5 }, robot("idle")];
        let all = machine
            .dispatch(&mut fleet, "start", TriggerArgs::new())
            .unwrap();

        assert!(!all);
        let states: Vec<_> = fleet.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["moving", "idle", "moving"]);
    }

    #[test]
    fn contextual_callbacks_need_send_event() {
        let mut machine = Machine::new();
        machine.add_states(["a", "b"]).unwrap();
        machine.set_before_state_change(Action::contextual(|_: &mut EventData<'_, Robot>| Ok(())));

        let mut r = robot("a");
        let err = go(&machine, &mut r, "to_b").unwrap_err();
        assert!(matches!(err, MachineError::ContextNotSent { .. }));
        assert_eq!(r.state, "a");

        machine.set_send_event(true);
        assert!(go(&machine, &mut r, "to_b").unwrap());
    }

    #[test]
    fn trigger_args_reach_plain_callbacks() {
        let mut machine = Machine::new();
        machine.add_states(["idle", "moving"]).unwrap();
        machine.set_after_state_change(Action::plain(|r: &mut Robot, args: &TriggerArgs| {
            let cost = args.get(0).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            r.charge -= cost;
            Ok(())
        }));

        let mut r = robot("idle");
        machine
            .trigger(&mut r, "to_moving", TriggerArgs::new().arg(15))
            .unwrap();
        assert_eq!(r.charge, 85);
    }

    #[test]
    fn unknown_destination_surfaces_at_trigger_time() {
        let mut machine = Machine::new();
        machine.set_auto_transitions(false);
        machine.add_state("a").unwrap();
        machine
            .add_transition(TransitionSpec::new("jump", "a", "nowhere"))
            .unwrap();

        let mut r = robot("a");
        let err = go(&machine, &mut r, "jump").unwrap_err();
        assert!(matches!(err, MachineError::UnknownState(s) if s == "nowhere"));
        assert_eq!(r.state, "a");
    }
}
