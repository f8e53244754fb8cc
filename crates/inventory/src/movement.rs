use chrono::{DateTime, Utc};
use serde::Serialize;

use storekeep_core::{DomainError, DomainResult, Sku, ValueObject};

use crate::change::ChangeType;
use crate::unit::Unit;

/// One balance-affecting event for a product (immutable).
///
/// `received`/`issued` are in the transaction `unit`; `adjusted` and `bal` are
/// in `base_unit`. The opening record has no unit and no movement fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMovement {
    pub timestamp: DateTime<Utc>,
    /// Who/where the goods came from or went to.
    pub location: String,
    pub received: Option<f64>,
    pub issued: Option<f64>,
    /// Signed base-unit delta of an absolute adjustment.
    pub adjusted: Option<f64>,
    pub unit: Option<Unit>,
    pub bal: f64,
    pub base_unit: Unit,
}

impl StockMovement {
    pub fn is_opening(&self) -> bool {
        self.unit.is_none()
    }
}

impl ValueObject for StockMovement {}

/// A validated movement, built by [`StockLedger::prepare`].
///
/// The timestamp clamp and the adjustment delta depend on the ledger's last
/// record, so they are settled by [`StockLedger::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMovement {
    location: String,
    qty: f64,
    change_type: ChangeType,
    unit: Unit,
    bal: f64,
    base_unit: Unit,
    at: DateTime<Utc>,
}

/// Append-only ledger of stock movements for one product.
///
/// The first record is always the opening balance. Records are never edited
/// or removed, and timestamps never go backwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLedger {
    sku: Sku,
    movements: Vec<StockMovement>,
}

impl StockLedger {
    /// Start a ledger with its opening-balance record.
    pub fn open(sku: Sku, opening_balance: f64, base_unit: Unit, at: DateTime<Utc>) -> Self {
        let opening = StockMovement {
            timestamp: at,
            location: format!("Balance as at {}", at.date_naive()),
            received: None,
            issued: None,
            adjusted: None,
            unit: None,
            bal: opening_balance,
            base_unit,
        };
        Self {
            sku,
            movements: vec![opening],
        }
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    /// Append a movement.
    ///
    /// `resulting_balance` is the inventory's base-unit balance after the
    /// change; it is taken as given. For adjustments the signed delta is
    /// derived from the previous record's balance.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        location: impl Into<String>,
        qty: f64,
        change_type: ChangeType,
        unit: Unit,
        resulting_balance: f64,
        base_unit: Unit,
        at: DateTime<Utc>,
    ) -> DomainResult<&StockMovement> {
        let pending =
            Self::prepare(location, qty, change_type, unit, resulting_balance, base_unit, at)?;
        Ok(self.commit(pending))
    }

    /// Validate a movement without appending it.
    ///
    /// Every check `record` makes happens here, so a caller can prepare all
    /// the movements of a batch before mutating anything.
    pub fn prepare(
        location: impl Into<String>,
        qty: f64,
        change_type: ChangeType,
        unit: Unit,
        resulting_balance: f64,
        base_unit: Unit,
        at: DateTime<Utc>,
    ) -> DomainResult<PendingMovement> {
        DomainError::check_qty(qty)?;
        if !resulting_balance.is_finite() || resulting_balance < 0.0 {
            return Err(DomainError::invalid_qty(format!(
                "resulting balance must be finite and non-negative ({resulting_balance})"
            )));
        }

        Ok(PendingMovement {
            location: location.into(),
            qty,
            change_type,
            unit,
            bal: resulting_balance,
            base_unit,
            at,
        })
    }

    /// Append a prepared movement. Cannot fail.
    pub fn commit(&mut self, pending: PendingMovement) -> &StockMovement {
        let previous = self.latest();
        let timestamp = pending.at.max(previous.timestamp);
        let qty = pending.qty;
        let (received, issued, adjusted) = match pending.change_type {
            ChangeType::Increase => (Some(qty), None, None),
            ChangeType::Decrease => (None, Some(qty), None),
            ChangeType::Adjust => (None, None, Some(pending.bal - previous.bal)),
        };

        self.movements.push(StockMovement {
            timestamp,
            location: pending.location,
            received,
            issued,
            adjusted,
            unit: Some(pending.unit),
            bal: pending.bal,
            base_unit: pending.base_unit,
        });
        self.latest()
    }

    /// Every record, oldest first.
    pub fn snapshot(&self) -> &[StockMovement] {
        &self.movements
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockMovement> {
        self.movements.iter()
    }

    pub fn latest(&self) -> &StockMovement {
        // `open` guarantees at least one record.
        &self.movements[self.movements.len() - 1]
    }

    pub fn opening(&self) -> &StockMovement {
        &self.movements[0]
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }
}
