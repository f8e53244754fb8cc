//! Store orchestration over product inventories and their ledgers.
//!
//! A [`Store`] maps skus to inventories, validates receipt/issue batches and
//! keeps each product's ledger in step with its balance. Batches are applied
//! all-or-nothing.

pub mod batch;
pub mod shared;
pub mod store;

pub use batch::{BatchLine, IssueBatch, ReceiptBatch, StockBatch};
pub use shared::SharedStore;
pub use store::{StockLevel, Store};
