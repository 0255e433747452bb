//! # Coins
//!
//! Item prices in the host's four-denomination currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};

/// A currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    /// Platinum pieces (1000 cp)
    Pp,
    /// Gold pieces (100 cp)
    Gp,
    /// Silver pieces (10 cp)
    Sp,
    /// Copper pieces
    Cp,
}

impl Denomination {
    /// Value of one coin of this denomination in copper.
    pub fn copper_per_unit(self) -> u64 {
        match self {
            Denomination::Pp => 1000,
            Denomination::Gp => 100,
            Denomination::Sp => 10,
            Denomination::Cp => 1,
        }
    }
}

impl Default for Denomination {
    fn default() -> Self {
        Denomination::Gp
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// A price expressed as a purse of coins.
///
/// Coins are kept as written by the host (a price of `{gp: 45}` stays in gold)
/// until arithmetic normalizes them through [`Coins::from_copper`].
///
/// # Examples
///
/// ```
/// use loot_forge::{Coins, Denomination};
///
/// let price = Coins::gp(10) + Coins::of(Denomination::Sp, 5);
/// assert_eq!(price.copper_value(), 1050);
/// assert_eq!(price.to_string(), "10 gp, 5 sp");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coins {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub pp: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub gp: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sp: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cp: u64,
}

impl Coins {
    /// A price of nothing.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A price in gold pieces.
    pub fn gp(amount: u64) -> Self {
        Self::of(Denomination::Gp, amount)
    }

    /// A price of `amount` coins of a single denomination.
    pub fn of(denomination: Denomination, amount: u64) -> Self {
        let mut coins = Self::zero();
        match denomination {
            Denomination::Pp => coins.pp = amount,
            Denomination::Gp => coins.gp = amount,
            Denomination::Sp => coins.sp = amount,
            Denomination::Cp => coins.cp = amount,
        }
        coins
    }

    /// Normalizes a copper amount into gold, silver and copper.
    ///
    /// Platinum is never produced; the host prices equipment in gold.
    pub fn from_copper(copper: u64) -> Self {
        Self {
            pp: 0,
            gp: copper / 100,
            sp: (copper % 100) / 10,
            cp: copper % 10,
        }
    }

    /// Total value in copper pieces.
    pub fn copper_value(&self) -> u64 {
        self.pp * 1000 + self.gp * 100 + self.sp * 10 + self.cp
    }

    /// Whether the purse is empty.
    pub fn is_zero(&self) -> bool {
        self.copper_value() == 0
    }
}

impl Add for Coins {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::from_copper(self.copper_value() + other.copper_value())
    }
}

impl AddAssign for Coins {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Mul<u64> for Coins {
    type Output = Self;

    fn mul(self, factor: u64) -> Self {
        Self::from_copper(self.copper_value() * factor)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.pp, "pp"),
            (self.gp, "gp"),
            (self.sp, "sp"),
            (self.cp, "cp"),
        ]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{} {}", amount, unit))
        .collect();

        if parts.is_empty() {
            write!(f, "0 gp")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_value() {
        let coins = Coins {
            pp: 1,
            gp: 2,
            sp: 3,
            cp: 4,
        };
        assert_eq!(coins.copper_value(), 1234);
    }

    #[test]
    fn test_addition_normalizes() {
        let total = Coins::of(Denomination::Pp, 1) + Coins::gp(35);
        assert_eq!(total, Coins::gp(45));
    }

    #[test]
    fn test_multiplication() {
        assert_eq!(Coins::gp(35) * 2, Coins::gp(70));
        assert_eq!(Coins::of(Denomination::Sp, 5) * 3, Coins::from_copper(150));
    }

    #[test]
    fn test_serialization_skips_empty_denominations() {
        let json = serde_json::to_string(&Coins::gp(4)).unwrap();
        assert_eq!(json, r#"{"gp":4}"#);

        let parsed: Coins = serde_json::from_str(r#"{"sp":7}"#).unwrap();
        assert_eq!(parsed, Coins::of(Denomination::Sp, 7));
    }

    #[test]
    fn test_display() {
        assert_eq!(Coins::zero().to_string(), "0 gp");
        assert_eq!(Coins::from_copper(4505).to_string(), "45 gp, 5 cp");
    }
}
