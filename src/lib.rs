//! Switchyard: a synchronous finite-state-machine engine
//!
//! A [`Machine`] holds named states and the events (triggers) that move a
//! model between them. Firing a trigger runs a fixed pipeline on the
//! caller's stack: prepare callbacks, guards, before callbacks, the state
//! change with exit/enter callbacks, after callbacks, and finally the
//! finalize callbacks, which run exactly once per call.
//!
//! # Core Concepts
//!
//! - **Model**: anything implementing [`Model`], owned by the caller
//! - **Callbacks**: [`Action`]s and [`Predicate`]s, given inline or by name
//!   through a [`CallbackResolver`]
//! - **Transitions**: ordered candidates per source state; the first whose
//!   guards pass fires
//! - **Errors**: callback failures are routed to on-exception callbacks when
//!   configured, resolution failures are always returned
//!
//! # Example
//!
//! ```rust
//! use switchyard::{Action, MachineBuilder, Predicate, TransitionBuilder, TriggerArgs};
//!
//! #[derive(Default)]
//! struct Order {
//!     state: String,
//!     paid: bool,
//!     emails: Vec<String>,
//! }
//!
//! switchyard::impl_model!(Order, state);
//!
//! let machine = MachineBuilder::new()
//!     .states(["cart", "placed", "shipped"])
//!     .initial("cart")
//!     .transition(
//!         TransitionBuilder::new("place")
//!             .from("cart")
//!             .to("placed")
//!             .when(Predicate::plain(|order: &Order, _| Ok(order.paid))),
//!     )
//!     .unwrap()
//!     .transition(
//!         TransitionBuilder::new("ship")
//!             .from("placed")
//!             .to("shipped")
//!             .after(Action::plain(|order: &mut Order, args: &TriggerArgs| {
//!                 let carrier = args.kwarg_value("carrier").and_then(|v| v.as_str());
//!                 order.emails.push(format!("shipped via {}", carrier.unwrap_or("post")));
//!                 Ok(())
//!             })),
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut order = Order::default();
//! machine.add_model(&mut order).unwrap();
//!
//! // guard rejects: nothing changes
//! assert!(!machine.trigger(&mut order, "place", TriggerArgs::new()).unwrap());
//! assert_eq!(order.state, "cart");
//!
//! order.paid = true;
//! assert!(machine.trigger(&mut order, "place", TriggerArgs::new()).unwrap());
//! machine
//!     .trigger(&mut order, "ship", TriggerArgs::new().kwarg("carrier", "rail"))
//!     .unwrap();
//! assert_eq!(order.state, "shipped");
//! assert_eq!(order.emails, vec!["shipped via rail"]);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod machine;
pub mod resolver;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use config::{ConfigError, MachineConfig};
pub use core::{
    Action, ActionHook, CallbackKind, Condition, Event, EventData, Hook, HookList, Model,
    Predicate, PredicateHook, State, StateHook, Transition, TransitionHook, TriggerArgs,
};
pub use error::MachineError;
pub use machine::{Dest, Machine, Source, TransitionSpec};
pub use resolver::{CallbackRegistry, CallbackResolver};
pub use validation::ConfigViolation;
