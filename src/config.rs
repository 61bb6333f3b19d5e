//! Declarative machine configuration.
//!
//! A [`MachineConfig`] describes states, transitions and global callbacks by
//! name, so a whole machine can be loaded from JSON. Callback names resolve
//! through the resolver passed to [`MachineConfig::build`].
//!
//! ```json
//! {
//!   "name": "turnstile",
//!   "initial": "locked",
//!   "states": ["locked", {"name": "unlocked", "on_enter": "start_timer"}],
//!   "transitions": [
//!     ["coin", "locked", "unlocked"],
//!     {"trigger": "push", "source": "unlocked", "dest": "locked", "after": "count"}
//!   ],
//!   "finalize_event": "flush_metrics"
//! }
//! ```

use crate::builder::{BuildError, MachineBuilder, DEFAULT_INITIAL};
use crate::core::State;
use crate::machine::{Dest, Machine, Source, TransitionSpec};
use crate::resolver::CallbackResolver;
use crate::validation::ConfigViolation;
use crate::Model;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stillwater::validation::Validation;
use thiserror::Error;

/// Errors that can occur while loading a machine from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// Every problem found by [`Machine::validate`].
    #[error("Configuration validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<ConfigViolation>),
}

fn summarize(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single name or a list of names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(name) => vec![name],
            OneOrMany::Many(names) => names,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, OneOrMany::Many(names) if names.is_empty())
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl From<OneOrMany> for Source {
    fn from(names: OneOrMany) -> Self {
        match names {
            OneOrMany::One(name) => Source::from(name),
            OneOrMany::Many(names) => Source::States(names),
        }
    }
}

/// A state given either by name or with its callbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateConfig {
    Name(String),
    Detailed(StateDetail),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDetail {
    pub name: String,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub on_enter: OneOrMany,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub on_exit: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_invalid_triggers: Option<bool>,
}

impl StateConfig {
    pub fn name(&self) -> &str {
        match self {
            StateConfig::Name(name) => name,
            StateConfig::Detailed(detail) => &detail.name,
        }
    }

    fn into_state<M>(self) -> State<M> {
        match self {
            StateConfig::Name(name) => State::new(name),
            StateConfig::Detailed(detail) => State::new(detail.name)
                .on_enter(detail.on_enter.into_vec())
                .on_exit(detail.on_exit.into_vec())
                .with_ignore_policy(detail.ignore_invalid_triggers),
        }
    }
}

/// A transition given as `[trigger, source, dest]` or with its callbacks.
///
/// A `null` or missing destination makes the transition internal; `"="`
/// makes it a self transition and `"*"` as source means every state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionConfig {
    Short(String, OneOrMany, Option<String>),
    Detailed(TransitionDetail),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionDetail {
    pub trigger: String,
    pub source: OneOrMany,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub conditions: OneOrMany,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub unless: OneOrMany,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub before: OneOrMany,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub after: OneOrMany,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub prepare: OneOrMany,
}

impl TransitionConfig {
    fn into_definition<M>(self) -> TransitionSpec<M> {
        match self {
            TransitionConfig::Short(trigger, source, dest) => {
                TransitionSpec::new(trigger, source, Dest::from(dest.as_deref()))
            }
            TransitionConfig::Detailed(detail) => {
                TransitionSpec::new(detail.trigger, detail.source, Dest::from(detail.dest.as_deref()))
                    .conditions(detail.conditions.into_vec())
                    .unless(detail.unless.into_vec())
                    .before(detail.before.into_vec())
                    .after(detail.after.into_vec())
                    .prepare(detail.prepare.into_vec())
            }
        }
    }
}

/// Serializable description of a whole machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    pub name: String,
    /// `null` builds a machine without an initial state.
    pub initial: Option<String>,
    pub states: Vec<StateConfig>,
    pub transitions: Vec<TransitionConfig>,
    pub send_event: bool,
    pub auto_transitions: bool,
    pub ignore_invalid_triggers: bool,
    pub state_attribute: String,
    pub prepare_event: OneOrMany,
    pub before_state_change: OneOrMany,
    pub after_state_change: OneOrMany,
    pub finalize_event: OneOrMany,
    pub on_exception: OneOrMany,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            initial: Some(DEFAULT_INITIAL.to_string()),
            states: Vec::new(),
            transitions: Vec::new(),
            send_event: false,
            auto_transitions: true,
            ignore_invalid_triggers: false,
            state_attribute: "state".to_string(),
            prepare_event: OneOrMany::default(),
            before_state_change: OneOrMany::default(),
            after_state_change: OneOrMany::default(),
            finalize_event: OneOrMany::default(),
            on_exception: OneOrMany::default(),
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a machine whose named callbacks resolve through `resolver`.
    ///
    /// The result is validated before it is returned, so a configuration
    /// naming unknown states or callbacks fails here rather than on some
    /// later trigger.
    pub fn build<M, R>(self, resolver: R) -> Result<Machine<M>, ConfigError>
    where
        M: Model,
        R: CallbackResolver<M> + 'static,
    {
        self.build_shared(Arc::new(resolver))
    }

    pub fn build_shared<M: Model>(
        self,
        resolver: Arc<dyn CallbackResolver<M>>,
    ) -> Result<Machine<M>, ConfigError> {
        let mut builder = MachineBuilder::new()
            .name(self.name)
            .send_event(self.send_event)
            .auto_transitions(self.auto_transitions)
            .ignore_invalid_triggers(self.ignore_invalid_triggers)
            .state_attribute(self.state_attribute)
            .shared_resolver(resolver)
            .states(self.states.into_iter().map(StateConfig::into_state::<M>))
            .transitions(
                self.transitions
                    .into_iter()
                    .map(TransitionConfig::into_definition::<M>)
                    .collect(),
            )
            .prepare_event(self.prepare_event.into_vec())
            .before_state_change(self.before_state_change.into_vec())
            .after_state_change(self.after_state_change.into_vec())
            .finalize_event(self.finalize_event.into_vec())
            .on_exception(self.on_exception.into_vec());
        builder = match self.initial {
            Some(initial) => builder.initial(initial),
            None => builder.no_initial(),
        };

        let machine = builder.build()?;
        match machine.validate() {
            Validation::Success(_) => Ok(machine),
            Validation::Failure(errors) => Err(ConfigError::ValidationFailed(
                errors.iter().cloned().collect(),
            )),
        }
    }
}

impl<M: Model> Machine<M> {
    /// Load and validate a machine from a JSON [`MachineConfig`].
    pub fn from_json<R>(json: &str, resolver: R) -> Result<Self, ConfigError>
    where
        R: CallbackResolver<M> + 'static,
    {
        MachineConfig::from_json(json)?.build(resolver)
    }
}
