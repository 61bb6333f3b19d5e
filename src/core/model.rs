//! The capability a model exposes to the machine.
//!
//! The machine never inspects a model beyond reading and writing its current
//! state name. Everything else about the model is the embedding layer's
//! business.

/// Read/write access to a model's current state.
///
/// Implementations must behave atomically from the machine's point of view:
/// a read after a write observes the written value.
///
/// # Example
///
/// ```rust
/// use switchyard::Model;
///
/// struct Order {
///     status: String,
///     total_cents: u64,
/// }
///
/// impl Model for Order {
///     fn current_state(&self) -> &str {
///         &self.status
///     }
///
///     fn set_current_state(&mut self, state: &str) {
///         self.status = state.to_string();
///     }
/// }
///
/// let mut order = Order { status: "cart".into(), total_cents: 1200 };
/// order.set_current_state("paid");
/// assert_eq!(order.current_state(), "paid");
/// ```
pub trait Model: 'static {
    /// Name of the state the model is currently in.
    fn current_state(&self) -> &str;

    /// Overwrite the current state name.
    fn set_current_state(&mut self, state: &str);
}
