use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use storekeep_core::{DomainError, DomainResult, Entity, Sku, StoreId};
use storekeep_inventory::{ChangeType, PendingMovement, ProductInventory, StockLedger, StockMovement, Unit};

use crate::batch::{IssueBatch, ReceiptBatch, StockBatch};

/// Relative tolerance used when replaying a ledger.
const AUDIT_TOLERANCE: f64 = 1e-9;

/// Current balance of one product, in its base unit.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct StockLevel {
    pub unit: Unit,
    pub qty: f64,
}

/// An inventory and its ledger. Created together, stored together.
#[derive(Debug, Clone)]
struct StockEntry {
    inventory: ProductInventory,
    ledger: StockLedger,
}

/// Inventories staged by a batch, plus the ledger record for each line.
struct StagedBatch {
    inventories: BTreeMap<Sku, ProductInventory>,
    movements: Vec<(Sku, PendingMovement)>,
}

/// A single store: products keyed by sku, each with its own ledger.
///
/// All mutation is synchronous. A host sharing a store across threads must
/// serialize access, see [`crate::SharedStore`].
#[derive(Debug, Clone)]
pub struct Store {
    id: StoreId,
    name: String,
    products: BTreeMap<Sku, StockEntry>,
}

impl Store {
    pub fn new(id: StoreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            products: BTreeMap::new(),
        }
    }

    /// Store with a freshly generated id.
    pub fn with_generated_id(name: impl Into<String>) -> Self {
        Self::new(StoreId::generate(), name)
    }

    pub fn store_id(&self) -> &StoreId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skus(&self) -> impl Iterator<Item = &Sku> {
        self.products.keys()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Create a product inventory and its ledger, opened at `opening_balance`
    /// base units.
    #[instrument(skip(self, product_name), fields(store_id = %self.id))]
    pub fn create_product_inventory(
        &mut self,
        sku: Sku,
        product_name: impl Into<String>,
        base_unit: Unit,
        opening_balance: f64,
    ) -> DomainResult<()> {
        let slot = match self.products.entry(sku) {
            Entry::Occupied(e) => {
                return Err(DomainError::already_existing_product(e.key().as_str()));
            }
            Entry::Vacant(e) => e,
        };

        let sku = slot.key().clone();
        let inventory =
            ProductInventory::new(sku.clone(), product_name, base_unit, opening_balance)?;
        let ledger = StockLedger::open(sku, opening_balance, base_unit, Utc::now());
        slot.insert(StockEntry { inventory, ledger });

        info!("product inventory created");
        Ok(())
    }

    #[instrument(skip(self), fields(store_id = %self.id))]
    pub fn add_supported_unit(
        &mut self,
        sku: &Sku,
        unit: Unit,
        conversion_factor: f64,
    ) -> DomainResult<()> {
        self.entry_mut(sku)?
            .inventory
            .add_supported_unit(unit, conversion_factor)?;
        debug!("supported unit added");
        Ok(())
    }

    /// Receive a batch of goods.
    ///
    /// All-or-nothing: every line is validated against staged copies of the
    /// affected inventories before anything is committed.
    pub fn receive(&mut self, batch: &ReceiptBatch) -> DomainResult<()> {
        self.apply_batch(batch, Utc::now())
    }

    /// Issue a batch of goods. All-or-nothing, like [`Store::receive`].
    pub fn issue(&mut self, batch: &IssueBatch) -> DomainResult<()> {
        self.apply_batch(batch, Utc::now())
    }

    /// Set a product's balance to an absolute count, e.g. after a stock take.
    #[instrument(skip(self, reason), fields(store_id = %self.id))]
    pub fn adjust_stock(
        &mut self,
        sku: &Sku,
        qty: f64,
        unit: Unit,
        reason: impl Into<String>,
    ) -> DomainResult<()> {
        let entry = self.entry_mut(sku)?;
        let mut inventory = entry.inventory.clone();
        inventory.change_quantity(qty, ChangeType::Adjust, unit)?;

        let bal = inventory.quantity();
        let pending = StockLedger::prepare(
            reason,
            qty,
            ChangeType::Adjust,
            unit,
            bal,
            inventory.base_unit(),
            Utc::now(),
        )?;

        entry.inventory = inventory;
        entry.ledger.commit(pending);

        info!(bal, "stock adjusted");
        Ok(())
    }

    /// Base-unit balance of every product, ordered by sku.
    pub fn get_inventory_snapshot(&self) -> BTreeMap<Sku, StockLevel> {
        self.products
            .iter()
            .map(|(sku, entry)| {
                let level = StockLevel {
                    unit: entry.inventory.base_unit(),
                    qty: entry.inventory.quantity(),
                };
                (sku.clone(), level)
            })
            .collect()
    }

    pub fn get_stock_level(&self, sku: &Sku, unit: Unit) -> DomainResult<f64> {
        self.entry(sku)?.inventory.get_quantity(unit)
    }

    pub fn get_product_stock_movement_snapshot(&self, sku: &Sku) -> DomainResult<&[StockMovement]> {
        Ok(self.entry(sku)?.ledger.snapshot())
    }

    pub fn product(&self, sku: &Sku) -> DomainResult<&ProductInventory> {
        Ok(&self.entry(sku)?.inventory)
    }

    /// Replay a product's ledger and check it against itself and the inventory.
    ///
    /// Each record's `bal` must equal the previous `bal` plus its converted
    /// delta, timestamps must not decrease, and the last `bal` must match the
    /// inventory's current balance.
    pub fn audit_ledger(&self, sku: &Sku) -> DomainResult<()> {
        let entry = self.entry(sku)?;
        let movements = entry.ledger.snapshot();

        for (i, pair) in movements.windows(2).enumerate() {
            let (prev, cur) = (&pair[0], &pair[1]);
            if cur.timestamp < prev.timestamp {
                return Err(DomainError::invariant(format!(
                    "ledger for {sku} goes back in time at record {}",
                    i + 1
                )));
            }

            let delta = movement_delta(&entry.inventory, cur)?;
            let expected = prev.bal + delta;
            if !close(expected, cur.bal) {
                return Err(DomainError::invariant(format!(
                    "ledger for {sku} diverges at record {}: expected bal {expected}, found {}",
                    i + 1,
                    cur.bal
                )));
            }
        }

        let last = entry.ledger.latest().bal;
        if !close(last, entry.inventory.quantity()) {
            return Err(DomainError::invariant(format!(
                "ledger for {sku} ends at {last} but inventory holds {}",
                entry.inventory.quantity()
            )));
        }
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(store_id = %self.id, change_type = %B::CHANGE_TYPE, lines = batch.lines().len())
    )]
    fn apply_batch<B: StockBatch>(&mut self, batch: &B, at: DateTime<Utc>) -> DomainResult<()> {
        let staged = match self.stage_batch(batch, at) {
            Ok(staged) => staged,
            Err(err) => {
                warn!(error = %err, "batch rejected; store unchanged");
                return Err(err);
            }
        };

        for (sku, inventory) in staged.inventories {
            if let Some(entry) = self.products.get_mut(&sku) {
                entry.inventory = inventory;
            }
        }

        for (sku, pending) in staged.movements {
            if let Some(entry) = self.products.get_mut(&sku) {
                entry.ledger.commit(pending);
            }
        }

        info!(counterparty = batch.counterparty(), "batch committed");
        Ok(())
    }

    /// Apply every line of `batch` to copies of the inventories it touches and
    /// build its ledger records. Nothing fallible is left for the commit.
    ///
    /// Lines for the same sku see each other's effect, so a batch issuing the
    /// same product twice is checked against the running balance.
    fn stage_batch<B: StockBatch>(&self, batch: &B, at: DateTime<Utc>) -> DomainResult<StagedBatch> {
        self.ensure_target(batch.store_id())?;

        let mut inventories: BTreeMap<Sku, ProductInventory> = BTreeMap::new();
        let mut movements = Vec::with_capacity(batch.lines().len());

        for line in batch.lines() {
            let inventory = match inventories.entry(line.sku.clone()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(self.entry(&line.sku)?.inventory.clone()),
            };
            inventory.change_quantity(line.qty, B::CHANGE_TYPE, line.unit)?;
            let pending = StockLedger::prepare(
                batch.counterparty(),
                line.qty,
                B::CHANGE_TYPE,
                line.unit,
                inventory.quantity(),
                inventory.base_unit(),
                at,
            )?;
            movements.push((line.sku.clone(), pending));
        }

        Ok(StagedBatch {
            inventories,
            movements,
        })
    }

    fn ensure_target(&self, requested: Option<&StoreId>) -> DomainResult<()> {
        match requested {
            Some(requested) if requested != &self.id => Err(DomainError::StoreIdentityMismatch {
                requested: requested.to_string(),
                actual: self.id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn entry(&self, sku: &Sku) -> DomainResult<&StockEntry> {
        self.products
            .get(sku)
            .ok_or_else(|| DomainError::unexisting_product(sku.as_str()))
    }

    fn entry_mut(&mut self, sku: &Sku) -> DomainResult<&mut StockEntry> {
        self.products
            .get_mut(sku)
            .ok_or_else(|| DomainError::unexisting_product(sku.as_str()))
    }
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Signed base-unit effect of one non-opening ledger record.
fn movement_delta(inventory: &ProductInventory, movement: &StockMovement) -> DomainResult<f64> {
    if let Some(adjusted) = movement.adjusted {
        return Ok(adjusted);
    }
    let unit = movement
        .unit
        .ok_or_else(|| DomainError::invariant("movement record without a unit"))?;
    let received = movement.received.unwrap_or(0.0);
    let issued = movement.issued.unwrap_or(0.0);
    inventory.to_base(received - issued, unit)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= AUDIT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
