//! Inventory domain module: the unit-aware quantity engine.
//!
//! This crate contains the business rules for one product's stock, implemented
//! purely as deterministic domain logic (no IO, no clock reads, no storage).
//! Callers pass timestamps in explicitly.

pub mod change;
pub mod conversion;
pub mod item;
pub mod movement;
pub mod unit;

pub use change::ChangeType;
pub use conversion::{ConversionTable, UnitConversion};
pub use item::ProductInventory;
pub use movement::{PendingMovement, StockLedger, StockMovement};
pub use unit::Unit;
