use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storekeep_core::DomainError;

/// How a quantity change applies to the current balance.
///
/// The sign of a change comes from this variant, never from the quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Add to the balance (goods received).
    #[serde(alias = "receive", alias = "INCREASE", alias = "RECEIVE")]
    Increase,
    /// Remove from the balance (goods issued). Cannot go below zero.
    #[serde(alias = "issue", alias = "DECREASE", alias = "ISSUE")]
    Decrease,
    /// Replace the balance with an absolute count.
    #[serde(alias = "ADJUST")]
    Adjust,
}

impl core::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ChangeType::Increase => "increase",
            ChangeType::Decrease => "decrease",
            ChangeType::Adjust => "adjust",
        })
    }
}

impl FromStr for ChangeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increase" | "receive" => Ok(ChangeType::Increase),
            "decrease" | "issue" => Ok(ChangeType::Decrease),
            "adjust" => Ok(ChangeType::Adjust),
            _ => Err(DomainError::UnsupportedChangeType(s.to_string())),
        }
    }
}
