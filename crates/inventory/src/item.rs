use serde::Serialize;

use storekeep_core::{AggregateRoot, DomainError, DomainResult, Sku};

use crate::change::ChangeType;
use crate::conversion::{ConversionTable, UnitConversion};
use crate::unit::Unit;

/// Aggregate root: one product's stock in one store.
///
/// The quantity is held in base units only. Every other unit is a view over
/// it through the conversion table, so a read in unit `u` divides by `u`'s
/// factor and a write in unit `u` multiplies by it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInventory {
    sku: Sku,
    product_name: String,
    base_unit: Unit,
    qty: f64,
    conversions: ConversionTable,
    version: u64,
}

impl ProductInventory {
    /// Create an inventory holding `opening_qty` base units.
    pub fn new(
        sku: Sku,
        product_name: impl Into<String>,
        base_unit: Unit,
        opening_qty: f64,
    ) -> DomainResult<Self> {
        DomainError::check_qty(opening_qty)?;
        Ok(Self {
            sku,
            product_name: product_name.into(),
            base_unit,
            qty: opening_qty,
            conversions: ConversionTable::new(base_unit),
            version: 0,
        })
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn base_unit(&self) -> Unit {
        self.base_unit
    }

    /// Current balance in base units.
    pub fn quantity(&self) -> f64 {
        self.qty
    }

    pub fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }

    pub fn supported_units(&self) -> impl Iterator<Item = &UnitConversion> {
        self.conversions.iter()
    }

    pub fn is_supported(&self, unit: Unit) -> bool {
        self.conversions.contains(unit)
    }

    /// Register `unit` as `conversion_factor` base units per unit.
    pub fn add_supported_unit(&mut self, unit: Unit, conversion_factor: f64) -> DomainResult<()> {
        self.conversions
            .add(unit, conversion_factor, &self.product_name)?;
        self.version += 1;
        Ok(())
    }

    /// Current balance expressed in `unit`.
    pub fn get_quantity(&self, unit: Unit) -> DomainResult<f64> {
        let qty = self
            .conversions
            .from_base(self.qty, unit)
            .ok_or_else(|| self.unsupported(unit))?;
        if !qty.is_finite() {
            return Err(DomainError::invalid_qty(format!(
                "balance of {} {} is not representable in {unit}",
                self.qty, self.base_unit
            )));
        }
        Ok(qty)
    }

    /// Convert `qty` of `unit` into base units.
    pub fn to_base(&self, qty: f64, unit: Unit) -> DomainResult<f64> {
        let qty_base = self
            .conversions
            .to_base(qty, unit)
            .ok_or_else(|| self.unsupported(unit))?;
        if !qty_base.is_finite() {
            return Err(DomainError::invalid_qty(format!(
                "{qty} {unit} overflows when converted to {}",
                self.base_unit
            )));
        }
        Ok(qty_base)
    }

    /// The base-unit balance `change_quantity` would leave, without applying it.
    pub fn preview_change(&self, qty: f64, change_type: ChangeType, unit: Unit) -> DomainResult<f64> {
        DomainError::check_qty(qty)?;
        let qty_base = self.to_base(qty, unit)?;

        let next = match change_type {
            ChangeType::Increase => self.qty + qty_base,
            ChangeType::Decrease => {
                let remaining = self.qty - qty_base;
                if remaining < 0.0 {
                    return Err(DomainError::invalid_qty(format!(
                        "cannot remove {qty} {unit} of {}: only {} {} available",
                        self.product_name, self.qty, self.base_unit
                    )));
                }
                remaining
            }
            ChangeType::Adjust => qty_base,
        };

        // Keep the balance finite: `inf - inf` is NaN and would slip past the
        // sign check above.
        if !next.is_finite() {
            return Err(DomainError::invalid_qty(format!(
                "{change_type} of {qty} {unit} would overflow the balance of {}",
                self.product_name
            )));
        }
        Ok(next)
    }

    /// Apply a quantity change expressed in `unit`.
    ///
    /// Atomic: on error the balance and version are untouched.
    pub fn change_quantity(&mut self, qty: f64, change_type: ChangeType, unit: Unit) -> DomainResult<()> {
        let next = self.preview_change(qty, change_type, unit)?;
        self.qty = next;
        self.version += 1;
        Ok(())
    }

    fn unsupported(&self, unit: Unit) -> DomainError {
        DomainError::unsupported_unit(unit, self.product_name.as_str())
    }
}

impl AggregateRoot for ProductInventory {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.sku
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KG_PER_BAG: f64 = 50.0;
    const KG_PER_BSKT: f64 = 3.6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn rice() -> ProductInventory {
        let mut inv =
            ProductInventory::new(Sku::new("test_rice").unwrap(), "Rice (test)", Unit::Kg, 0.0)
                .unwrap();
        inv.add_supported_unit(Unit::Bag, KG_PER_BAG).unwrap();
        inv.add_supported_unit(Unit::Bskt, KG_PER_BSKT).unwrap();
        inv
    }

    #[test]
    fn increase_and_decrease_in_base_unit() {
        let mut inv = rice();
        assert_eq!(inv.get_quantity(Unit::Kg).unwrap(), 0.0);

        inv.change_quantity(20.0, ChangeType::Increase, Unit::Kg).unwrap();
        assert!(approx_eq(inv.quantity(), 20.0));

        inv.change_quantity(5.0, ChangeType::Decrease, Unit::Kg).unwrap();
        assert!(approx_eq(inv.quantity(), 15.0));

        inv.change_quantity(10.0, ChangeType::Increase, Unit::Kg).unwrap();
        assert!(approx_eq(inv.quantity(), 25.0));
    }

    #[test]
    fn bag_and_basket_scenario() {
        let mut inv = rice();

        inv.change_quantity(2.0, ChangeType::Increase, Unit::Bag).unwrap();
        assert!(approx_eq(inv.get_quantity(Unit::Kg).unwrap(), 100.0));
        assert!(approx_eq(inv.get_quantity(Unit::Bskt).unwrap(), 100.0 / KG_PER_BSKT));

        inv.change_quantity(3.0, ChangeType::Increase, Unit::Bskt).unwrap();
        assert!(approx_eq(inv.get_quantity(Unit::Kg).unwrap(), 110.8));

        inv.change_quantity(3.0, ChangeType::Decrease, Unit::Bskt).unwrap();
        assert!(approx_eq(inv.get_quantity(Unit::Kg).unwrap(), 100.0));
        assert!(approx_eq(inv.get_quantity(Unit::Bag).unwrap(), 2.0));

        let version = inv.version();
        let err = inv.change_quantity(3.0, ChangeType::Decrease, Unit::Bag).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQty(_)));
        assert!(approx_eq(inv.quantity(), 100.0));
        assert_eq!(inv.version(), version);
    }

    #[test]
    fn tiny_values_survive_conversion() {
        let mut inv = rice();
        let kg = 0.0003;

        inv.change_quantity(kg / KG_PER_BAG, ChangeType::Increase, Unit::Bag).unwrap();
        assert!(approx_eq(inv.get_quantity(Unit::Kg).unwrap(), kg));

        inv.change_quantity(0.00009, ChangeType::Decrease, Unit::Kg).unwrap();
        assert!(approx_eq(inv.quantity(), kg - 0.00009));
        assert!(approx_eq(inv.get_quantity(Unit::Bag).unwrap(), (kg - 0.00009) / KG_PER_BAG));
    }

    #[test]
    fn adjust_sets_an_absolute_balance() {
        let mut inv = rice();
        inv.change_quantity(2.0, ChangeType::Adjust, Unit::Bskt).unwrap();
        inv.change_quantity(2.0, ChangeType::Adjust, Unit::Bag).unwrap();
        assert!(approx_eq(inv.quantity(), 2.0 * KG_PER_BAG));

        inv.change_quantity(0.0, ChangeType::Adjust, Unit::Kg).unwrap();
        assert_eq!(inv.quantity(), 0.0);
    }

    #[test]
    fn unsupported_units_are_rejected_for_reads_and_writes() {
        let mut inv = rice();
        assert!(matches!(
            inv.get_quantity(Unit::Ctn),
            Err(DomainError::UnsupportedUnit { .. })
        ));
        assert!(matches!(
            inv.change_quantity(10.0, ChangeType::Adjust, Unit::Ctn),
            Err(DomainError::UnsupportedUnit { .. })
        ));
        assert_eq!(inv.quantity(), 0.0);
    }

    #[test]
    fn negative_quantities_are_rejected_for_every_change_type() {
        let mut inv = rice();
        for change_type in [ChangeType::Increase, ChangeType::Decrease, ChangeType::Adjust] {
            let err = inv.change_quantity(-50.0, change_type, Unit::Bag).unwrap_err();
            assert!(matches!(err, DomainError::InvalidQty(_)));
        }
        let err = inv.change_quantity(50.0, ChangeType::Decrease, Unit::Bag).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQty(_)));
    }

    #[test]
    fn overflowing_changes_are_rejected_and_balance_stays_finite() {
        let mut inv = rice();
        inv.change_quantity(1e307, ChangeType::Increase, Unit::Kg).unwrap();

        let version = inv.version();
        for change_type in [ChangeType::Increase, ChangeType::Adjust] {
            let err = inv.change_quantity(1e307, change_type, Unit::Bag).unwrap_err();
            assert!(matches!(err, DomainError::InvalidQty(_)));
        }
        let err = inv.change_quantity(f64::MAX, ChangeType::Increase, Unit::Kg).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQty(_)));
        let err = inv.change_quantity(1e307, ChangeType::Decrease, Unit::Bag).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQty(_)));

        assert_eq!(inv.quantity(), 1e307);
        assert_eq!(inv.version(), version);
        assert_eq!(inv.get_quantity(Unit::Kg).unwrap(), 1e307);
    }

    #[test]
    fn reads_that_overflow_in_a_small_unit_are_rejected() {
        let mut inv =
            ProductInventory::new(Sku::new("salt").unwrap(), "Salt", Unit::Kg, 1e300).unwrap();
        inv.add_supported_unit(Unit::Pkt, 1e-300).unwrap();

        assert!(matches!(inv.get_quantity(Unit::Pkt), Err(DomainError::InvalidQty(_))));
        assert_eq!(inv.get_quantity(Unit::Kg).unwrap(), 1e300);
    }

    #[test]
    fn opening_quantity_must_be_valid() {
        let sku = Sku::new("oil").unwrap();
        assert!(ProductInventory::new(sku.clone(), "Oil", Unit::Btl, -1.0).is_err());
        let inv = ProductInventory::new(sku, "Oil", Unit::Btl, 12.0).unwrap();
        assert_eq!(inv.quantity(), 12.0);
        assert_eq!(inv.version(), 0);
    }

    #[test]
    fn duplicate_and_invalid_units_are_rejected() {
        let mut inv = rice();
        assert!(matches!(
            inv.add_supported_unit(Unit::Bag, 25.0),
            Err(DomainError::DuplicateUnit { .. })
        ));
        assert!(matches!(
            inv.add_supported_unit(Unit::Ctn, 0.0),
            Err(DomainError::InvalidConversionFactor(_))
        ));
        assert!(!inv.is_supported(Unit::Ctn));
        assert_eq!(inv.supported_units().count(), 3);
    }

    fn unit_and_factor() -> impl Strategy<Value = (Unit, f64)> {
        prop_oneof![
            Just((Unit::Kg, 1.0)),
            Just((Unit::Bag, KG_PER_BAG)),
            Just((Unit::Bskt, KG_PER_BSKT)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: reading back in the unit written gives the same amount,
        /// and the base balance is amount * factor.
        #[test]
        fn increase_round_trips_through_any_supported_unit(
            x in 0.0f64..1_000_000.0,
            (unit, factor) in unit_and_factor(),
        ) {
            let mut inv = rice();
            inv.change_quantity(x, ChangeType::Increase, unit).unwrap();
            prop_assert!(approx_eq(inv.get_quantity(unit).unwrap(), x));
            prop_assert!(approx_eq(inv.get_quantity(Unit::Kg).unwrap(), x * factor));
        }

        /// Property: the base balance is the signed sum of accepted deltas,
        /// it never goes negative, and rejected decreases change nothing.
        #[test]
        fn balance_is_conserved_and_never_negative(
            ops in prop::collection::vec((any::<bool>(), 0.0f64..100.0, unit_and_factor()), 1..40)
        ) {
            let mut inv = rice();
            let mut expected = 0.0f64;

            for (is_increase, qty, (unit, factor)) in ops {
                let before = inv.quantity();
                let change_type = if is_increase { ChangeType::Increase } else { ChangeType::Decrease };
                match inv.change_quantity(qty, change_type, unit) {
                    Ok(()) if is_increase => expected += qty * factor,
                    Ok(()) => expected -= qty * factor,
                    Err(DomainError::InvalidQty(_)) => {
                        prop_assert!(!is_increase);
                        prop_assert_eq!(inv.quantity(), before);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {other}"),
                }
                prop_assert!(inv.quantity() >= 0.0);
            }

            prop_assert!((inv.quantity() - expected).abs() <= 1e-6);
        }

        /// Property: repeating an adjustment is a no-op.
        #[test]
        fn adjust_is_idempotent(
            start in 0.0f64..1_000.0,
            x in 0.0f64..1_000.0,
            (unit, _factor) in unit_and_factor(),
        ) {
            let mut once = rice();
            once.change_quantity(start, ChangeType::Increase, Unit::Kg).unwrap();
            let mut twice = once.clone();

            once.change_quantity(x, ChangeType::Adjust, unit).unwrap();
            twice.change_quantity(x, ChangeType::Adjust, unit).unwrap();
            twice.change_quantity(x, ChangeType::Adjust, unit).unwrap();

            prop_assert_eq!(once.quantity(), twice.quantity());
        }
    }
}
