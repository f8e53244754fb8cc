//! JSON scripts of store operations.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use storekeep_core::{Sku, StoreId};
use storekeep_inventory::{StockMovement, Unit};
use storekeep_store::{IssueBatch, ReceiptBatch, StockLevel, Store};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub store_name: String,
    #[serde(default)]
    pub products: Vec<ProductSpec>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductSpec {
    pub sku: Sku,
    pub product_name: String,
    pub base_unit: Unit,
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitSpec {
    pub unit: Unit,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Receive(ReceiptBatch),
    Issue(IssueBatch),
    Adjust(Adjustment),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Adjustment {
    pub sku: Sku,
    pub qty: f64,
    pub unit: Unit,
    pub reason: String,
}

/// What a script run leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub store_id: StoreId,
    pub store_name: String,
    pub inventory: BTreeMap<Sku, StockLevel>,
    pub movements: BTreeMap<Sku, Vec<StockMovement>>,
}

impl Script {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("failed to parse store script")
    }

    /// Build the store, then apply operations in order.
    ///
    /// Stops at the first failing operation; earlier operations stay applied.
    pub fn run(&self, store_id: Option<StoreId>, store_name: Option<String>) -> anyhow::Result<Report> {
        let store_id = store_id
            .or_else(|| self.store_id.clone())
            .unwrap_or_else(StoreId::generate);
        let store_name = store_name.unwrap_or_else(|| self.store_name.clone());
        let mut store = Store::new(store_id, store_name);

        for product in &self.products {
            store
                .create_product_inventory(
                    product.sku.clone(),
                    product.product_name.as_str(),
                    product.base_unit,
                    product.opening_balance,
                )
                .with_context(|| format!("creating product {}", product.sku))?;
            for unit in &product.units {
                store
                    .add_supported_unit(&product.sku, unit.unit, unit.factor)
                    .with_context(|| format!("adding unit {} to {}", unit.unit, product.sku))?;
            }
        }

        for (i, operation) in self.operations.iter().enumerate() {
            let result = match operation {
                Operation::Receive(batch) => store.receive(batch),
                Operation::Issue(batch) => store.issue(batch),
                Operation::Adjust(adj) => store.adjust_stock(&adj.sku, adj.qty, adj.unit, adj.reason.as_str()),
            };
            result.with_context(|| format!("operation #{} failed", i + 1))?;
        }

        info!(products = store.len(), operations = self.operations.len(), "script applied");
        report(&store)
    }
}

fn report(store: &Store) -> anyhow::Result<Report> {
    let mut movements = BTreeMap::new();
    for sku in store.skus() {
        let ledger = store.get_product_stock_movement_snapshot(sku)?;
        movements.insert(sku.clone(), ledger.to_vec());
    }
    Ok(Report {
        store_id: store.store_id().clone(),
        store_name: store.name().to_string(),
        inventory: store.get_inventory_snapshot(),
        movements,
    })
}
