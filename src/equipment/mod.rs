//! # Equipment Module
//!
//! Price and level computation for weapons, armor and shields built from a base
//! item, a precious material and runes.
//!
//! ## Pricing
//!
//! [`calculate_final_price_and_level`] starts from the base item's own level,
//! price and durability, then layers the material, the potency rune, each
//! property rune and the fundamental rune on top. Levels combine as a running
//! maximum and prices as a running sum. Any table miss contributes nothing.

pub mod builder;
pub mod materials;
pub mod runes;

pub use builder::*;
pub use materials::*;
pub use runes::*;

use crate::config::MAX_PROPERTY_RUNES;
use crate::{Coins, ItemRecord, ItemType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tier of a precious material's effect.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MaterialGrade {
    Low,
    #[default]
    Standard,
    High,
}

impl MaterialGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialGrade::Low => "low",
            MaterialGrade::Standard => "standard",
            MaterialGrade::High => "high",
        }
    }
}

impl fmt::Display for MaterialGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MaterialGrade {
    type Err = crate::LootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(MaterialGrade::Low),
            "standard" => Ok(MaterialGrade::Standard),
            "high" => Ok(MaterialGrade::High),
            other => Err(crate::LootError::Configuration(format!(
                "unknown material grade '{}'",
                other
            ))),
        }
    }
}

/// Equipment category used to key the material tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    Weapon,
    Armor,
    Shield,
    Buckler,
    Tower,
}

impl EquipmentCategory {
    /// Infers the category of an item.
    ///
    /// Shields with an AC bonus of exactly 1 are bucklers; other shields heavier
    /// than 1 Bulk are tower shields. Non-equipment items have no category.
    pub fn of(item: &ItemRecord) -> Option<Self> {
        match item.item_type {
            ItemType::Weapon => Some(EquipmentCategory::Weapon),
            ItemType::Armor => Some(EquipmentCategory::Armor),
            ItemType::Shield => {
                if item.system.ac_bonus == 1 {
                    Some(EquipmentCategory::Buckler)
                } else if item.system.bulk > 1.0 {
                    Some(EquipmentCategory::Tower)
                } else {
                    Some(EquipmentCategory::Shield)
                }
            }
            _ => None,
        }
    }

    /// Whether material prices scale with the item's Bulk.
    pub fn is_bulk_priced(self) -> bool {
        matches!(self, EquipmentCategory::Weapon | EquipmentCategory::Armor)
    }
}

/// Material and rune choices applied to a base item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentSelection {
    pub material_type: Option<String>,
    pub material_grade: MaterialGrade,
    pub potency: u8,
    pub fundamental_rune: Option<String>,
    pub property_runes: [Option<String>; MAX_PROPERTY_RUNES],
}

/// Computed level, price and durability of a finished item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub level: u32,
    pub price: Coins,
    pub hardness: u32,
    pub hit_points: u32,
    pub broken_threshold: u32,
}

impl PricingResult {
    fn from_base(item: &ItemRecord) -> Self {
        Self {
            level: item.system.level,
            price: item.system.price,
            hardness: item.system.hardness,
            hit_points: item.system.hit_points,
            broken_threshold: item.system.broken_threshold,
        }
    }

    fn raise(&mut self, level: u32, price: Coins) {
        self.level = self.level.max(level);
        self.price += price;
    }
}

/// Bulk factor for per-Bulk material prices. Light and negligible items are
/// priced as one Bulk.
pub fn bulk_multiplier(bulk: f64) -> f64 {
    if bulk.is_finite() {
        bulk.max(1.0)
    } else {
        1.0
    }
}

/// Computes the final level, price and durability of `item` with `selection`
/// applied.
///
/// Items without an equipment category yield an all-zero result.
///
/// # Examples
///
/// ```
/// use loot_forge::{
///     calculate_final_price_and_level, Coins, EquipmentSelection, ItemRecord, ItemType,
/// };
///
/// let sword = ItemRecord::new("Longsword", ItemType::Weapon)
///     .with_level(1)
///     .with_price(Coins::gp(10));
/// let selection = EquipmentSelection { potency: 1, ..Default::default() };
///
/// let result = calculate_final_price_and_level(&sword, &selection);
/// assert_eq!(result.level, 2);
/// assert_eq!(result.price, Coins::gp(45));
/// ```
pub fn calculate_final_price_and_level(
    item: &ItemRecord,
    selection: &EquipmentSelection,
) -> PricingResult {
    let Some(category) = EquipmentCategory::of(item) else {
        return PricingResult::default();
    };
    let rune_category = RuneCategory::from(category);
    let runes = rune_table();
    let mut result = PricingResult::from_base(item);

    if let Some(material) = selection.material_type.as_deref() {
        if let Some(entry) = material_table().lookup(material, category, selection.material_grade) {
            result.raise(entry.level, entry.price);
            if let Some(per_bulk) = entry.bulk_price {
                if category.is_bulk_priced() {
                    let copper = per_bulk.copper_value() as f64 * bulk_multiplier(item.system.bulk);
                    result.price += Coins::from_copper(copper.round() as u64);
                }
            }
            if let Some(durability) = entry.durability {
                result.hardness = durability.hardness;
                result.hit_points = durability.hit_points;
                result.broken_threshold = durability.broken_threshold;
            }
        } else {
            log::debug!(
                "No {} entry for material '{}' on {:?}",
                selection.material_grade,
                material,
                category
            );
        }
    }

    if let Some(entry) = runes.potency(rune_category, selection.potency) {
        result.raise(entry.level, entry.price);
    }

    for rune in selection.property_runes.iter().flatten() {
        if let Some(entry) = runes.property(rune_category, rune) {
            result.raise(entry.level, entry.price);
        }
    }

    if let Some(rune) = selection.fundamental_rune.as_deref() {
        if let Some(entry) = runes.fundamental(rune_category, rune) {
            result.raise(entry.level, entry.price);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn longsword() -> ItemRecord {
        let mut sword = ItemRecord::new("Longsword", ItemType::Weapon)
            .with_level(1)
            .with_price(Coins::gp(10));
        sword.system.bulk = 1.0;
        sword.system.hardness = 5;
        sword.system.hit_points = 20;
        sword.system.broken_threshold = 10;
        sword
    }

    fn shield(ac_bonus: i32, bulk: f64) -> ItemRecord {
        let mut shield = ItemRecord::new("Shield", ItemType::Shield).with_price(Coins::gp(2));
        shield.system.ac_bonus = ac_bonus;
        shield.system.bulk = bulk;
        shield
    }

    #[test]
    fn test_category_inference() {
        assert_eq!(EquipmentCategory::of(&longsword()), Some(EquipmentCategory::Weapon));
        assert_eq!(EquipmentCategory::of(&shield(1, 1.0)), Some(EquipmentCategory::Buckler));
        assert_eq!(EquipmentCategory::of(&shield(2, 4.0)), Some(EquipmentCategory::Tower));
        assert_eq!(EquipmentCategory::of(&shield(2, 1.0)), Some(EquipmentCategory::Shield));
        assert_eq!(
            EquipmentCategory::of(&ItemRecord::new("Ruby", ItemType::Treasure)),
            None
        );
    }

    #[test]
    fn test_no_selection_keeps_base_values() {
        let result = calculate_final_price_and_level(&longsword(), &EquipmentSelection::default());
        assert_eq!(result.level, 1);
        assert_eq!(result.price, Coins::gp(10));
        assert_eq!(result.hardness, 5);
    }

    #[test]
    fn test_potency_raises_level_and_adds_price() {
        let selection = EquipmentSelection {
            potency: 1,
            ..Default::default()
        };
        let result = calculate_final_price_and_level(&longsword(), &selection);
        assert_eq!(result.level, 2);
        assert_eq!(result.price, Coins::gp(45));
    }

    #[test]
    fn test_levels_max_and_prices_sum() {
        let selection = EquipmentSelection {
            material_type: Some("cold-iron".to_string()),
            material_grade: MaterialGrade::Low,
            potency: 1,
            fundamental_rune: Some("striking".to_string()),
            property_runes: [Some("flaming".to_string()), None, None, None],
        };
        let result = calculate_final_price_and_level(&longsword(), &selection);

        // cold iron 2, potency 2, flaming 8, striking 4
        assert_eq!(result.level, 8);
        // 10 base + 40 + 4 per Bulk + 35 + 500 + 65
        assert_eq!(result.price, Coins::gp(654));
        // weapons keep their own durability
        assert_eq!(result.hardness, 5);
    }

    #[test]
    fn test_duplicate_property_runes_priced_separately() {
        let selection = EquipmentSelection {
            potency: 2,
            property_runes: [Some("frost".to_string()), Some("frost".to_string()), None, None],
            ..Default::default()
        };
        let result = calculate_final_price_and_level(&longsword(), &selection);
        assert_eq!(result.price, Coins::gp(10 + 935 + 500 + 500));
        assert_eq!(result.level, 10);
    }

    #[test]
    fn test_bulk_multiplier_floors_at_one() {
        assert_eq!(bulk_multiplier(0.1), 1.0);
        assert_eq!(bulk_multiplier(2.0), 2.0);
        assert_eq!(bulk_multiplier(f64::NAN), 1.0);

        let mut dagger = longsword();
        dagger.system.bulk = 0.1;
        let mut greatsword = longsword();
        greatsword.system.bulk = 2.0;
        let selection = EquipmentSelection {
            material_type: Some("silver".to_string()),
            material_grade: MaterialGrade::Standard,
            ..Default::default()
        };

        assert_eq!(
            calculate_final_price_and_level(&dagger, &selection).price,
            Coins::gp(10 + 300 + 30)
        );
        assert_eq!(
            calculate_final_price_and_level(&greatsword, &selection).price,
            Coins::gp(10 + 300 + 60)
        );
    }

    #[test]
    fn test_shield_material_overwrites_durability() {
        let selection = EquipmentSelection {
            material_type: Some("adamantine".to_string()),
            material_grade: MaterialGrade::Standard,
            ..Default::default()
        };
        let result = calculate_final_price_and_level(&shield(2, 1.0), &selection);
        assert_eq!(result.level, 8);
        assert_eq!(result.price, Coins::gp(442));
        assert_eq!(
            (result.hardness, result.hit_points, result.broken_threshold),
            (10, 40, 20)
        );
    }

    #[test]
    fn test_lookup_misses_contribute_nothing() {
        let selection = EquipmentSelection {
            material_type: Some("orichalcum".to_string()),
            material_grade: MaterialGrade::Low,
            potency: 4,
            fundamental_rune: Some("resilient".to_string()),
            property_runes: [Some("vorpal-ish".to_string()), None, None, None],
        };
        let result = calculate_final_price_and_level(&longsword(), &selection);
        assert_eq!(result, PricingResult::from_base(&longsword()));
    }

    #[test]
    fn test_non_equipment_is_all_zero() {
        let ruby = ItemRecord::new("Ruby", ItemType::Treasure)
            .with_level(3)
            .with_price(Coins::gp(50));
        let selection = EquipmentSelection {
            potency: 1,
            ..Default::default()
        };
        assert_eq!(
            calculate_final_price_and_level(&ruby, &selection),
            PricingResult::default()
        );
    }

    #[test]
    fn test_grade_parsing() {
        assert_eq!("high".parse::<MaterialGrade>().unwrap(), MaterialGrade::High);
        assert!("legendary".parse::<MaterialGrade>().is_err());
    }
}
