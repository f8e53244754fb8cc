//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity** and are **immutable**: a unit conversion
/// or a stock movement record is fully described by its fields. To "modify"
/// one, build a new one.
///
/// Quantities are `f64`, so implementors only promise `PartialEq`.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct UnitConversion {
///     unit: Unit,
///     conversion_factor: f64,
/// }
///
/// impl ValueObject for UnitConversion {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
