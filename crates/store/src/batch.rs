use serde::{Deserialize, Serialize};

use storekeep_core::{Sku, StoreId};
use storekeep_inventory::{ChangeType, Unit};

/// One product line of a batch: `qty` of `unit` for `sku`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchLine {
    pub sku: Sku,
    pub qty: f64,
    pub unit: Unit,
}

impl BatchLine {
    pub fn new(sku: Sku, qty: f64, unit: Unit) -> Self {
        Self { sku, qty, unit }
    }
}

/// Goods received into a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptBatch {
    /// Target store; when set it must match the receiving store.
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub received_from: String,
    pub received_products: Vec<BatchLine>,
}

/// Goods issued out of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueBatch {
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub issued_to: String,
    pub issued_products: Vec<BatchLine>,
}

/// What the store needs from a batch to apply it.
pub trait StockBatch {
    /// Direction every line of this batch applies in.
    const CHANGE_TYPE: ChangeType;

    fn store_id(&self) -> Option<&StoreId>;

    /// Supplier or recipient, recorded as the ledger location.
    fn counterparty(&self) -> &str;

    fn lines(&self) -> &[BatchLine];
}

impl StockBatch for ReceiptBatch {
    const CHANGE_TYPE: ChangeType = ChangeType::Increase;

    fn store_id(&self) -> Option<&StoreId> {
        self.store_id.as_ref()
    }

    fn counterparty(&self) -> &str {
        &self.received_from
    }

    fn lines(&self) -> &[BatchLine] {
        &self.received_products
    }
}

impl StockBatch for IssueBatch {
    const CHANGE_TYPE: ChangeType = ChangeType::Decrease;

    fn store_id(&self) -> Option<&StoreId> {
        self.store_id.as_ref()
    }

    fn counterparty(&self) -> &str {
        &self.issued_to
    }

    fn lines(&self) -> &[BatchLine] {
        &self.issued_products
    }
}
