//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A store is an entity: its contents change over time, its id never does.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
