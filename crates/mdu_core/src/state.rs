//! State transition contract for small widget state machines

use std::hash::Hash;

/// Trait for state enums that transition on events
///
/// Implement this trait on a state enum to define how events cause
/// state transitions. Returning `None` means the event is ignored in the
/// current state.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// enum Toggle {
///     #[default]
///     Off,
///     On,
/// }
///
/// impl StateTransitions for Toggle {
///     fn on_event(&self, event: u32) -> Option<Self> {
///         match (self, event) {
///             (Toggle::Off, FLIP) => Some(Toggle::On),
///             (Toggle::On, FLIP) => Some(Toggle::Off),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + std::fmt::Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;
}
