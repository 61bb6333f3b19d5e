//! Named states with entry and exit callbacks.

use super::callback::{Action, ActionHook, HookList};
use super::event::EventData;
use crate::error::MachineError;
use std::fmt;

/// Which callback list of a [`State`] to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateHook {
    Enter,
    Exit,
}

impl StateHook {
    /// Prefix of the conventional callback name for this hook,
    /// e.g. `on_enter` for `on_enter_<state>`.
    pub fn prefix(&self) -> &'static str {
        match self {
            StateHook::Enter => "on_enter",
            StateHook::Exit => "on_exit",
        }
    }

    /// Conventional callback name bound automatically for `state`.
    pub fn conventional_name(&self, state: &str) -> String {
        format!("{}_{}", self.prefix(), state)
    }
}

/// A state registered with a [`Machine`](crate::Machine).
///
/// States are identified by name. Their callback lists can grow after
/// registration, but a state never references another state.
///
/// # Example
///
/// ```rust
/// use switchyard::State;
///
/// struct Door;
///
/// let open: State<Door> = State::new("open")
///     .on_enter("light_on")
///     .on_exit(["light_off", "log_exit"])
///     .ignore_invalid_triggers(true);
///
/// assert_eq!(open.name(), "open");
/// assert_eq!(open.enter_hooks().len(), 1);
/// assert_eq!(open.exit_hooks().len(), 2);
/// assert_eq!(open.ignores_invalid_triggers(), Some(true));
/// ```
pub struct State<M> {
    name: String,
    on_enter: Vec<ActionHook<M>>,
    on_exit: Vec<ActionHook<M>>,
    ignore_invalid_triggers: Option<bool>,
    /// Lists holding a conventional callback bound from the resolver
    auto_bound: Vec<StateHook>,
}

impl<M> State<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_enter: Vec::new(),
            on_exit: Vec::new(),
            ignore_invalid_triggers: None,
            auto_bound: Vec::new(),
        }
    }

    /// Append callbacks run when the state is entered.
    pub fn on_enter(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        let hooks: HookList<Action<M>> = hooks.into();
        self.on_enter.extend(hooks);
        self
    }

    /// Append callbacks run when the state is exited.
    pub fn on_exit(mut self, hooks: impl Into<HookList<Action<M>>>) -> Self {
        let hooks: HookList<Action<M>> = hooks.into();
        self.on_exit.extend(hooks);
        self
    }

    /// Override the machine-wide policy for triggers that are not valid in
    /// this state.
    pub fn ignore_invalid_triggers(mut self, ignore: bool) -> Self {
        self.ignore_invalid_triggers = Some(ignore);
        self
    }

    pub(crate) fn with_ignore_policy(mut self, ignore: Option<bool>) -> Self {
        self.ignore_invalid_triggers = ignore;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enter_hooks(&self) -> &[ActionHook<M>] {
        &self.on_enter
    }

    pub fn exit_hooks(&self) -> &[ActionHook<M>] {
        &self.on_exit
    }

    /// The state-level override, `None` when the machine default applies.
    pub fn ignores_invalid_triggers(&self) -> Option<bool> {
        self.ignore_invalid_triggers
    }

    /// Append a callback to the enter or exit list.
    pub fn add_callback(&mut self, hook: StateHook, callback: impl Into<ActionHook<M>>) {
        match hook {
            StateHook::Enter => self.on_enter.push(callback.into()),
            StateHook::Exit => self.on_exit.push(callback.into()),
        }
    }

    pub(crate) fn has_named(&self, hook: StateHook, name: &str) -> bool {
        self.hook_list(hook).iter().any(|h| h.is_named(name))
    }

    fn hook_list(&self, hook: StateHook) -> &[ActionHook<M>] {
        match hook {
            StateHook::Enter => &self.on_enter,
            StateHook::Exit => &self.on_exit,
        }
    }

    /// Bind or unbind the conventional `on_enter_<name>`/`on_exit_<name>`
    /// callback depending on whether the resolver provides it. Only hooks
    /// added here are ever removed; explicitly listed ones stay.
    pub(crate) fn sync_conventional(&mut self, hook: StateHook, resolvable: bool) {
        let name = hook.conventional_name(&self.name);
        let bound = self.auto_bound.contains(&hook);

        if resolvable && !bound && !self.has_named(hook, &name) {
            self.add_callback(hook, name);
            self.auto_bound.push(hook);
        } else if !resolvable && bound {
            let hooks = match hook {
                StateHook::Enter => &mut self.on_enter,
                StateHook::Exit => &mut self.on_exit,
            };
            if let Some(index) = hooks.iter().rposition(|h| h.is_named(&name)) {
                hooks.remove(index);
            }
            self.auto_bound.retain(|h| *h != hook);
        }
    }

    /// Run the enter callbacks.
    pub fn enter(&self, ctx: &mut EventData<'_, M>) -> Result<(), MachineError>
    where
        M: crate::Model,
    {
        let machine = ctx.machine();
        machine.callbacks(&self.on_enter, ctx)
    }

    /// Run the exit callbacks.
    pub fn exit(&self, ctx: &mut EventData<'_, M>) -> Result<(), MachineError>
    where
        M: crate::Model,
    {
        let machine = ctx.machine();
        machine.callbacks(&self.on_exit, ctx)
    }
}

impl<M> Clone for State<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
            ignore_invalid_triggers: self.ignore_invalid_triggers,
            auto_bound: self.auto_bound.clone(),
        }
    }
}

impl<M> fmt::Debug for State<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("on_enter", &self.on_enter)
            .field("on_exit", &self.on_exit)
            .field("ignore_invalid_triggers", &self.ignore_invalid_triggers)
            .finish()
    }
}

impl<M> From<&str> for State<M> {
    fn from(name: &str) -> Self {
        State::new(name)
    }
}

impl<M> From<String> for State<M> {
    fn from(name: String) -> Self {
        State::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Door;

    #[test]
    fn new_state_has_no_callbacks_and_no_override() {
        let state: State<Door> = State::new("closed");

        assert_eq!(state.name(), "closed");
        assert!(state.enter_hooks().is_empty());
        assert!(state.exit_hooks().is_empty());
        assert_eq!(state.ignores_invalid_triggers(), None);
    }

    #[test]
    fn add_callback_appends_in_order() {
        let mut state: State<Door> = State::new("open").on_enter("first");
        state.add_callback(StateHook::Enter, "second");
        state.add_callback(StateHook::Exit, Action::plain(|_: &mut Door, _| Ok(())));

        let labels: Vec<_> = state.enter_hooks().iter().map(|h| h.label()).collect();
        assert_eq!(labels, vec!["first", "second"]);
        assert_eq!(state.exit_hooks()[0].label(), "<inline>");
    }

    #[test]
    fn has_named_only_matches_the_requested_list() {
        let state: State<Door> = State::new("open").on_exit("on_exit_open");

        assert!(state.has_named(StateHook::Exit, "on_exit_open"));
        assert!(!state.has_named(StateHook::Enter, "on_exit_open"));
    }

    #[test]
    fn sync_conventional_only_removes_what_it_bound() {
        let mut state: State<Door> = State::new("open").on_exit("on_exit_open");

        state.sync_conventional(StateHook::Enter, true);
        state.sync_conventional(StateHook::Enter, true);
        assert_eq!(state.enter_hooks().len(), 1);

        state.sync_conventional(StateHook::Enter, false);
        state.sync_conventional(StateHook::Exit, false);
        assert!(state.enter_hooks().is_empty());
        assert!(state.has_named(StateHook::Exit, "on_exit_open"));
    }

    #[test]
    fn conventional_names_use_hook_prefix() {
        assert_eq!(StateHook::Enter.conventional_name("idle"), "on_enter_idle");
        assert_eq!(StateHook::Exit.conventional_name("idle"), "on_exit_idle");
    }

    #[test]
    fn states_convert_from_names() {
        let from_str: State<Door> = "a".into();
        let from_string: State<Door> = String::from("b").into();

        assert_eq!(from_str.name(), "a");
        assert_eq!(from_string.name(), "b");
    }
}
