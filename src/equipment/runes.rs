//! # Runes
//!
//! Potency, fundamental and property rune tables. Runes are keyed by the
//! category of equipment they are etched into; bucklers and tower shields share
//! the shield table.

use crate::{Coins, EquipmentCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Equipment family a rune is etched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuneCategory {
    Weapon,
    Armor,
    Shield,
}

impl From<EquipmentCategory> for RuneCategory {
    fn from(category: EquipmentCategory) -> Self {
        match category {
            EquipmentCategory::Weapon => RuneCategory::Weapon,
            EquipmentCategory::Armor => RuneCategory::Armor,
            EquipmentCategory::Shield | EquipmentCategory::Buckler | EquipmentCategory::Tower => {
                RuneCategory::Shield
            }
        }
    }
}

/// Level and price contributed by a rune.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuneEntry {
    pub slug: &'static str,
    pub name: &'static str,
    pub level: u32,
    pub price: Coins,
}

impl RuneEntry {
    fn new(slug: &'static str, name: &'static str, level: u32, price_gp: u64) -> Self {
        Self {
            slug,
            name,
            level,
            price: Coins::gp(price_gp),
        }
    }
}

/// The process-wide rune table.
#[derive(Debug, Default)]
pub struct RuneTable {
    potency: HashMap<(RuneCategory, u8), RuneEntry>,
    fundamental: HashMap<RuneCategory, Vec<RuneEntry>>,
    property: HashMap<RuneCategory, Vec<RuneEntry>>,
}

impl RuneTable {
    /// Potency rune of the given value. Values run 1 to 3; zero and anything
    /// above 3 have no entry.
    pub fn potency(&self, category: RuneCategory, value: u8) -> Option<&RuneEntry> {
        self.potency.get(&(category, value))
    }

    /// Striking, resilient or reinforcing rune by slug.
    pub fn fundamental(&self, category: RuneCategory, slug: &str) -> Option<&RuneEntry> {
        self.fundamental
            .get(&category)
            .and_then(|runes| runes.iter().find(|r| r.slug == slug))
    }

    /// Property rune by slug.
    pub fn property(&self, category: RuneCategory, slug: &str) -> Option<&RuneEntry> {
        self.property
            .get(&category)
            .and_then(|runes| runes.iter().find(|r| r.slug == slug))
    }

    pub fn property_runes(&self, category: RuneCategory) -> &[RuneEntry] {
        self.property
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Returns the shared rune table, building it on first use.
pub fn rune_table() -> &'static RuneTable {
    static TABLE: OnceLock<RuneTable> = OnceLock::new();
    TABLE.get_or_init(build_rune_table)
}

fn build_rune_table() -> RuneTable {
    let mut table = RuneTable::default();

    for (value, level, price) in [(1u8, 2, 35), (2, 10, 935), (3, 16, 8935)] {
        table.potency.insert(
            (RuneCategory::Weapon, value),
            RuneEntry::new("weapon-potency", "Weapon Potency", level, price),
        );
    }
    for (value, level, price) in [(1u8, 5, 160), (2, 11, 1060), (3, 18, 20560)] {
        table.potency.insert(
            (RuneCategory::Armor, value),
            RuneEntry::new("armor-potency", "Armor Potency", level, price),
        );
    }

    table.fundamental.insert(
        RuneCategory::Weapon,
        vec![
            RuneEntry::new("striking", "Striking", 4, 65),
            RuneEntry::new("greater-striking", "Greater Striking", 12, 1065),
            RuneEntry::new("major-striking", "Major Striking", 19, 31065),
        ],
    );
    table.fundamental.insert(
        RuneCategory::Armor,
        vec![
            RuneEntry::new("resilient", "Resilient", 8, 340),
            RuneEntry::new("greater-resilient", "Greater Resilient", 14, 3440),
            RuneEntry::new("major-resilient", "Major Resilient", 20, 49440),
        ],
    );
    table.fundamental.insert(
        RuneCategory::Shield,
        vec![
            RuneEntry::new("minor-reinforcing", "Minor Reinforcing", 4, 75),
            RuneEntry::new("lesser-reinforcing", "Lesser Reinforcing", 7, 300),
            RuneEntry::new("moderate-reinforcing", "Moderate Reinforcing", 10, 900),
            RuneEntry::new("greater-reinforcing", "Greater Reinforcing", 13, 2500),
            RuneEntry::new("major-reinforcing", "Major Reinforcing", 16, 8000),
            RuneEntry::new("supreme-reinforcing", "Supreme Reinforcing", 19, 32000),
        ],
    );

    table.property.insert(
        RuneCategory::Weapon,
        vec![
            RuneEntry::new("returning", "Returning", 3, 55),
            RuneEntry::new("ghost-touch", "Ghost Touch", 4, 75),
            RuneEntry::new("disrupting", "Disrupting", 5, 150),
            RuneEntry::new("shifting", "Shifting", 6, 225),
            RuneEntry::new("wounding", "Wounding", 7, 340),
            RuneEntry::new("corrosive", "Corrosive", 8, 500),
            RuneEntry::new("flaming", "Flaming", 8, 500),
            RuneEntry::new("frost", "Frost", 8, 500),
            RuneEntry::new("shock", "Shock", 8, 500),
            RuneEntry::new("thundering", "Thundering", 8, 500),
            RuneEntry::new("anarchic", "Anarchic", 11, 1400),
            RuneEntry::new("axiomatic", "Axiomatic", 11, 1400),
            RuneEntry::new("holy", "Holy", 11, 1400),
            RuneEntry::new("unholy", "Unholy", 11, 1400),
            RuneEntry::new("keen", "Keen", 13, 3000),
            RuneEntry::new("greater-corrosive", "Greater Corrosive", 15, 6500),
            RuneEntry::new("greater-flaming", "Greater Flaming", 15, 6500),
            RuneEntry::new("greater-frost", "Greater Frost", 15, 6500),
            RuneEntry::new("greater-shock", "Greater Shock", 15, 6500),
            RuneEntry::new("greater-thundering", "Greater Thundering", 15, 6500),
            RuneEntry::new("speed", "Speed", 16, 10000),
            RuneEntry::new("vorpal", "Vorpal", 17, 15000),
        ],
    );
    table.property.insert(
        RuneCategory::Armor,
        vec![
            RuneEntry::new("slick", "Slick", 5, 45),
            RuneEntry::new("shadow", "Shadow", 5, 55),
            RuneEntry::new("glamered", "Glamered", 5, 140),
            RuneEntry::new("ready", "Ready", 6, 200),
            RuneEntry::new("acid-resistant", "Acid-Resistant", 8, 420),
            RuneEntry::new("cold-resistant", "Cold-Resistant", 8, 420),
            RuneEntry::new("electricity-resistant", "Electricity-Resistant", 8, 420),
            RuneEntry::new("fire-resistant", "Fire-Resistant", 8, 420),
            RuneEntry::new("greater-slick", "Greater Slick", 8, 450),
            RuneEntry::new("invisibility", "Invisibility", 8, 500),
            RuneEntry::new("greater-shadow", "Greater Shadow", 9, 650),
            RuneEntry::new("greater-invisibility", "Greater Invisibility", 10, 1000),
            RuneEntry::new("greater-ready", "Greater Ready", 11, 1200),
            RuneEntry::new("fortification", "Fortification", 12, 2000),
            RuneEntry::new("major-slick", "Major Slick", 16, 9000),
            RuneEntry::new("ethereal", "Ethereal", 17, 13500),
            RuneEntry::new("major-shadow", "Major Shadow", 17, 14000),
            RuneEntry::new("greater-fortification", "Greater Fortification", 19, 24000),
        ],
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potency_lookup() {
        let table = rune_table();
        let weapon = table.potency(RuneCategory::Weapon, 1).unwrap();
        assert_eq!(weapon.level, 2);
        assert_eq!(weapon.price, Coins::gp(35));

        let armor = table.potency(RuneCategory::Armor, 3).unwrap();
        assert_eq!(armor.level, 18);

        assert!(table.potency(RuneCategory::Weapon, 0).is_none());
        assert!(table.potency(RuneCategory::Weapon, 4).is_none());
        assert!(table.potency(RuneCategory::Shield, 1).is_none());
    }

    #[test]
    fn test_fundamental_runes_are_category_specific() {
        let table = rune_table();
        assert!(table.fundamental(RuneCategory::Weapon, "striking").is_some());
        assert!(table.fundamental(RuneCategory::Armor, "striking").is_none());
        assert!(table
            .fundamental(RuneCategory::Shield, "minor-reinforcing")
            .is_some());
    }

    #[test]
    fn test_shield_family_shares_rune_table() {
        assert_eq!(RuneCategory::from(EquipmentCategory::Buckler), RuneCategory::Shield);
        assert_eq!(RuneCategory::from(EquipmentCategory::Tower), RuneCategory::Shield);
        assert_eq!(RuneCategory::from(EquipmentCategory::Weapon), RuneCategory::Weapon);
    }

    #[test]
    fn test_property_lookup() {
        let table = rune_table();
        let flaming = table.property(RuneCategory::Weapon, "flaming").unwrap();
        assert_eq!((flaming.level, flaming.price), (8, Coins::gp(500)));
        assert!(table.property(RuneCategory::Armor, "flaming").is_none());
        assert!(table.property_runes(RuneCategory::Shield).is_empty());
    }
}
