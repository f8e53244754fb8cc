use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use storekeep_core::{DomainError, DomainResult, Sku};
use storekeep_inventory::{StockMovement, Unit};

use crate::batch::{IssueBatch, ReceiptBatch};
use crate::store::{StockLevel, Store};

/// A store shared between threads.
///
/// Every mutation runs under the write lock, so concurrent receipts touching
/// the same sku cannot interleave their read-modify-write of the balance.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store.
    pub fn write<T>(&self, f: impl FnOnce(&mut Store) -> DomainResult<T>) -> DomainResult<T> {
        let mut store = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("store lock poisoned"))?;
        f(&mut *store)
    }

    /// Run `f` with shared access to the store.
    pub fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> DomainResult<T> {
        let store = self
            .inner
            .read()
            .map_err(|_| DomainError::invariant("store lock poisoned"))?;
        Ok(f(&*store))
    }

    pub fn create_product_inventory(
        &self,
        sku: Sku,
        product_name: impl Into<String>,
        base_unit: Unit,
        opening_balance: f64,
    ) -> DomainResult<()> {
        self.write(|store| store.create_product_inventory(sku, product_name, base_unit, opening_balance))
    }

    pub fn add_supported_unit(&self, sku: &Sku, unit: Unit, conversion_factor: f64) -> DomainResult<()> {
        self.write(|store| store.add_supported_unit(sku, unit, conversion_factor))
    }

    pub fn receive(&self, batch: &ReceiptBatch) -> DomainResult<()> {
        self.write(|store| store.receive(batch))
    }

    pub fn issue(&self, batch: &IssueBatch) -> DomainResult<()> {
        self.write(|store| store.issue(batch))
    }

    pub fn adjust_stock(&self, sku: &Sku, qty: f64, unit: Unit, reason: impl Into<String>) -> DomainResult<()> {
        self.write(|store| store.adjust_stock(sku, qty, unit, reason))
    }

    pub fn get_inventory_snapshot(&self) -> DomainResult<BTreeMap<Sku, StockLevel>> {
        self.read(Store::get_inventory_snapshot)
    }

    pub fn get_stock_level(&self, sku: &Sku, unit: Unit) -> DomainResult<f64> {
        self.read(|store| store.get_stock_level(sku, unit))?
    }

    /// Owned copy of a product's ledger (the lock is released on return).
    pub fn get_product_stock_movement_snapshot(&self, sku: &Sku) -> DomainResult<Vec<StockMovement>> {
        self.read(|store| {
            store
                .get_product_stock_movement_snapshot(sku)
                .map(<[StockMovement]>::to_vec)
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchLine;
    use std::thread;
    use storekeep_core::StoreId;

    #[test]
    fn concurrent_receipts_are_all_applied() {
        let shared = SharedStore::new(Store::new(StoreId::new("main").unwrap(), "Main"));
        let rice = Sku::new("rice").unwrap();
        shared.create_product_inventory(rice.clone(), "Rice", Unit::Kg, 0.0).unwrap();
        shared.add_supported_unit(&rice, Unit::Bag, 50.0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                let rice = rice.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let batch = ReceiptBatch {
                            store_id: None,
                            received_from: format!("supplier-{i}"),
                            received_products: vec![BatchLine::new(rice.clone(), 1.0, Unit::Bag)],
                        };
                        shared.receive(&batch).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.get_stock_level(&rice, Unit::Bag).unwrap(), 200.0);
        assert_eq!(shared.get_product_stock_movement_snapshot(&rice).unwrap().len(), 201);
        shared.read(|store| store.audit_ledger(&rice)).unwrap().unwrap();
    }

    #[test]
    fn adjustments_run_under_the_write_lock() {
        let shared = SharedStore::new(Store::new(StoreId::new("main").unwrap(), "Main"));
        let milk = Sku::new("milk").unwrap();
        shared.create_product_inventory(milk.clone(), "Coconut Milk", Unit::Tin, 30.0).unwrap();
        shared.add_supported_unit(&milk, Unit::Ctn, 24.0).unwrap();

        shared.adjust_stock(&milk, 1.0, Unit::Ctn, "Stock count").unwrap();
        let err = shared.adjust_stock(&milk, -1.0, Unit::Tin, "Stock count").unwrap_err();
        assert!(matches!(err, DomainError::InvalidQty(_)));

        assert_eq!(shared.get_stock_level(&milk, Unit::Tin).unwrap(), 24.0);
        let movements = shared.get_product_stock_movement_snapshot(&milk).unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[1].adjusted, Some(-6.0));
        shared.read(|store| store.audit_ledger(&milk)).unwrap().unwrap();
    }
}
