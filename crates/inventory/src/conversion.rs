use serde::Serialize;

use storekeep_core::{DomainError, DomainResult, ValueObject};

use crate::unit::Unit;

/// "1 `unit` equals `conversion_factor` of the product's base unit."
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct UnitConversion {
    unit: Unit,
    conversion_factor: f64,
}

impl UnitConversion {
    pub fn new(unit: Unit, conversion_factor: f64) -> DomainResult<Self> {
        // `is_normal` also rules out zero, subnormals, NaN and infinities.
        if !conversion_factor.is_normal() || conversion_factor < 0.0 {
            return Err(DomainError::InvalidConversionFactor(conversion_factor));
        }
        Ok(Self {
            unit,
            conversion_factor,
        })
    }

    /// Identity entry for a base unit.
    pub fn base(unit: Unit) -> Self {
        Self {
            unit,
            conversion_factor: 1.0,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }
}

impl ValueObject for UnitConversion {}

/// Per-product conversion table, base unit first, in registration order.
///
/// At most one entry per unit. The base entry is created with the table and
/// always has factor 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionTable {
    entries: Vec<UnitConversion>,
}

impl ConversionTable {
    pub fn new(base_unit: Unit) -> Self {
        Self {
            entries: vec![UnitConversion::base(base_unit)],
        }
    }

    pub fn base_unit(&self) -> Unit {
        self.entries[0].unit()
    }

    /// Register `unit` at `conversion_factor` base units per unit.
    ///
    /// `owner` only feeds error messages.
    pub fn add(&mut self, unit: Unit, conversion_factor: f64, owner: &str) -> DomainResult<()> {
        let conversion = UnitConversion::new(unit, conversion_factor)?;
        if self.factor_of(unit).is_some() {
            return Err(DomainError::duplicate_unit(unit, owner));
        }
        self.entries.push(conversion);
        Ok(())
    }

    pub fn factor_of(&self, unit: Unit) -> Option<f64> {
        self.entries
            .iter()
            .find(|c| c.unit() == unit)
            .map(UnitConversion::conversion_factor)
    }

    pub fn contains(&self, unit: Unit) -> bool {
        self.factor_of(unit).is_some()
    }

    /// `qty` of `unit` expressed in base units (multiplies by the factor).
    pub fn to_base(&self, qty: f64, unit: Unit) -> Option<f64> {
        self.factor_of(unit).map(|factor| qty * factor)
    }

    /// A base-unit `qty` expressed in `unit` (divides by the factor).
    pub fn from_base(&self, qty: f64, unit: Unit) -> Option<f64> {
        self.factor_of(unit).map(|factor| qty / factor)
    }

    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        self.entries.iter().map(UnitConversion::unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitConversion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
