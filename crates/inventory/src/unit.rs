use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storekeep_core::{DomainError, ValueObject};

/// Measurement unit symbol.
///
/// Units carry no relationship to each other; a product decides which units
/// it supports and at what factor relative to its base unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    #[serde(alias = "BASKET")]
    Bskt,
    Bag,
    Kg,
    Ctn,
    Pcs,
    Btl,
    Pkt,
    Tuber,
    Bunch,
    Tin,
}

impl Unit {
    pub const ALL: [Unit; 10] = [
        Unit::Bskt,
        Unit::Bag,
        Unit::Kg,
        Unit::Ctn,
        Unit::Pcs,
        Unit::Btl,
        Unit::Pkt,
        Unit::Tuber,
        Unit::Bunch,
        Unit::Tin,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Bskt => "BSKT",
            Unit::Bag => "BAG",
            Unit::Kg => "KG",
            Unit::Ctn => "CTN",
            Unit::Pcs => "PCS",
            Unit::Btl => "BTL",
            Unit::Pkt => "PKT",
            Unit::Tuber => "TUBER",
            Unit::Bunch => "BUNCH",
            Unit::Tin => "TIN",
        }
    }
}

impl ValueObject for Unit {}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper == "BASKET" {
            return Ok(Unit::Bskt);
        }
        Unit::ALL
            .into_iter()
            .find(|u| u.symbol() == upper)
            .ok_or_else(|| DomainError::unsupported_unit(s, "unit registry"))
    }
}
