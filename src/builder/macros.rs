//! Macros for ergonomic model definitions.

/// Implement [`Model`](crate::Model) for a struct that keeps its state name
/// in a `String` field.
///
/// # Example
///
/// ```
/// use switchyard::Model;
///
/// struct Ticket {
///     status: String,
/// }
///
/// switchyard::impl_model!(Ticket, status);
///
/// let mut ticket = Ticket { status: "new".into() };
/// ticket.set_current_state("done");
/// assert_eq!(ticket.current_state(), "done");
/// ```
#[macro_export]
macro_rules! impl_model {
    ($ty:ty, $field:ident) => {
        impl $crate::Model for $ty {
            fn current_state(&self) -> &str {
                &self.$field
            }

            fn set_current_state(&mut self, state: &str) {
                self.$field = state.to_string();
            }
        }
    };
}
