//! Aggregate root trait for stateful domain models.

/// Aggregate root marker + minimal interface.
///
/// A product inventory is the aggregate here: every quantity mutation goes
/// through it, and its version counts the mutations it has accepted.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Starts at 0 on creation and grows by 1 per successful mutation; a
    /// rejected mutation never bumps it.
    fn version(&self) -> u64;
}
