//! Validation-based configuration checks.
//!
//! Registration is lenient: transitions may name states that
//! do not exist yet, and named callbacks are only resolved when they run.
//! [`Machine::validate`](crate::Machine::validate) uses Stillwater's
//! `Validation` type to report every such problem in one pass instead of
//! stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use switchyard::{ConfigViolation, Machine, TransitionSpec};
//! use stillwater::validation::Validation;
//!
//! #[derive(Default)]
//! struct Job {
//!     state: String,
//! }
//!
//! switchyard::impl_model!(Job, state);
//!
//! let mut machine: Machine<Job> = Machine::new();
//! machine.add_state("queued").unwrap();
//! machine
//!     .add_transition(TransitionSpec::new("run", "queued", "running").before("log_start"))
//!     .unwrap();
//!
//! match machine.validate() {
//!     Validation::Failure(errors) => assert_eq!(errors.len(), 2),
//!     Validation::Success(_) => panic!("expected violations"),
//! }
//! ```

pub mod rules;
pub mod violations;

pub use violations::ConfigViolation;
