//! # Precious Materials
//!
//! Static material table keyed by material, equipment category and grade.
//!
//! Weapons and armor pay a base price plus a price per Bulk; shields, bucklers
//! and tower shields pay a flat price and take their durability from the
//! material. A (material, category, grade) combination missing from the table
//! has no effect.

use crate::{Coins, EquipmentCategory, MaterialGrade};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Hardness, hit points and broken threshold of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Durability {
    pub hardness: u32,
    pub hit_points: u32,
    pub broken_threshold: u32,
}

/// Effect of one grade of a material on one equipment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialEntry {
    /// Minimum item level
    pub level: u32,
    /// Flat price added to the item
    pub price: Coins,
    /// Price added per Bulk of the item
    pub bulk_price: Option<Coins>,
    /// Durability replacing the item's own
    pub durability: Option<Durability>,
}

/// A precious material and all of its table entries.
#[derive(Debug, Clone)]
pub struct Material {
    pub slug: &'static str,
    pub name: &'static str,
    entries: HashMap<(EquipmentCategory, MaterialGrade), MaterialEntry>,
}

impl Material {
    fn new(slug: &'static str, name: &'static str) -> Self {
        Self {
            slug,
            name,
            entries: HashMap::new(),
        }
    }

    fn per_bulk(
        mut self,
        category: EquipmentCategory,
        grade: MaterialGrade,
        level: u32,
        price_gp: u64,
        bulk_gp: u64,
    ) -> Self {
        self.entries.insert(
            (category, grade),
            MaterialEntry {
                level,
                price: Coins::gp(price_gp),
                bulk_price: Some(Coins::gp(bulk_gp)),
                durability: None,
            },
        );
        self
    }

    fn fixed(
        mut self,
        category: EquipmentCategory,
        grade: MaterialGrade,
        level: u32,
        price_gp: u64,
        durability: (u32, u32, u32),
    ) -> Self {
        let (hardness, hit_points, broken_threshold) = durability;
        self.entries.insert(
            (category, grade),
            MaterialEntry {
                level,
                price: Coins::gp(price_gp),
                bulk_price: None,
                durability: Some(Durability {
                    hardness,
                    hit_points,
                    broken_threshold,
                }),
            },
        );
        self
    }

    /// Entry for a category and grade.
    pub fn entry(
        &self,
        category: EquipmentCategory,
        grade: MaterialGrade,
    ) -> Option<&MaterialEntry> {
        self.entries.get(&(category, grade))
    }

    /// Whether any grade of this material applies to `category`.
    pub fn supports(&self, category: EquipmentCategory) -> bool {
        self.entries.keys().any(|(c, _)| *c == category)
    }

    /// Grades available for `category`, lowest first.
    pub fn grades(&self, category: EquipmentCategory) -> Vec<MaterialGrade> {
        let mut grades: Vec<MaterialGrade> = self
            .entries
            .keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, g)| *g)
            .collect();
        grades.sort();
        grades
    }
}

/// The process-wide material table.
#[derive(Debug)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    /// Looks up a material by slug.
    pub fn material(&self, slug: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.slug == slug)
    }

    /// Entry for (material, category, grade), if the table has one.
    pub fn lookup(
        &self,
        slug: &str,
        category: EquipmentCategory,
        grade: MaterialGrade,
    ) -> Option<&MaterialEntry> {
        self.material(slug).and_then(|m| m.entry(category, grade))
    }

    /// Slugs of the materials usable on any of `categories`, in table order.
    pub fn valid_for(&self, categories: &[EquipmentCategory]) -> Vec<&'static str> {
        self.materials
            .iter()
            .filter(|m| categories.iter().any(|c| m.supports(*c)))
            .map(|m| m.slug)
            .collect()
    }
}

/// Returns the shared material table, building it on first use.
pub fn material_table() -> &'static MaterialTable {
    static TABLE: OnceLock<MaterialTable> = OnceLock::new();
    TABLE.get_or_init(build_material_table)
}

fn build_material_table() -> MaterialTable {
    use EquipmentCategory::{Armor, Buckler, Shield, Tower, Weapon};
    use MaterialGrade::{High, Low, Standard};

    let materials = vec![
        Material::new("adamantine", "Adamantine")
            .per_bulk(Weapon, Standard, 8, 350, 35)
            .per_bulk(Weapon, High, 16, 6000, 600)
            .per_bulk(Armor, Standard, 12, 1600, 160)
            .per_bulk(Armor, High, 19, 32000, 3200)
            .fixed(Buckler, Standard, 8, 400, (8, 32, 16))
            .fixed(Buckler, High, 16, 8000, (11, 44, 22))
            .fixed(Shield, Standard, 8, 440, (10, 40, 20))
            .fixed(Shield, High, 16, 8800, (13, 52, 26)),
        Material::new("cold-iron", "Cold Iron")
            .per_bulk(Weapon, Low, 2, 40, 4)
            .per_bulk(Weapon, Standard, 7, 300, 30)
            .per_bulk(Weapon, High, 15, 4500, 450)
            .per_bulk(Armor, Low, 5, 140, 14)
            .per_bulk(Armor, Standard, 11, 1200, 120)
            .per_bulk(Armor, High, 18, 20000, 2000)
            .fixed(Buckler, Low, 2, 30, (3, 12, 6))
            .fixed(Buckler, Standard, 7, 300, (5, 20, 10))
            .fixed(Buckler, High, 15, 5000, (8, 32, 16))
            .fixed(Shield, Low, 2, 34, (5, 20, 10))
            .fixed(Shield, Standard, 7, 340, (7, 28, 14))
            .fixed(Shield, High, 15, 5500, (10, 40, 20)),
        Material::new("darkwood", "Darkwood")
            .per_bulk(Weapon, Standard, 8, 350, 35)
            .per_bulk(Weapon, High, 16, 6000, 600)
            .per_bulk(Armor, Standard, 12, 1600, 160)
            .per_bulk(Armor, High, 19, 32000, 3200)
            .fixed(Buckler, Standard, 8, 400, (3, 12, 6))
            .fixed(Buckler, High, 16, 8000, (5, 20, 10))
            .fixed(Shield, Standard, 8, 440, (5, 20, 10))
            .fixed(Shield, High, 16, 8800, (8, 32, 16))
            .fixed(Tower, Standard, 8, 560, (5, 20, 10))
            .fixed(Tower, High, 16, 11200, (8, 32, 16)),
        Material::new("dragonhide", "Dragonhide")
            .per_bulk(Armor, Standard, 12, 1600, 160)
            .per_bulk(Armor, High, 19, 32000, 3200)
            .fixed(Buckler, Standard, 8, 400, (2, 8, 4))
            .fixed(Buckler, High, 16, 8000, (5, 20, 10))
            .fixed(Shield, Standard, 8, 440, (4, 16, 8))
            .fixed(Shield, High, 16, 8800, (8, 32, 16)),
        Material::new("mithral", "Mithral")
            .per_bulk(Weapon, Standard, 8, 350, 35)
            .per_bulk(Weapon, High, 16, 6000, 600)
            .per_bulk(Armor, Standard, 12, 1600, 160)
            .per_bulk(Armor, High, 19, 32000, 3200)
            .fixed(Buckler, Standard, 8, 400, (3, 12, 6))
            .fixed(Buckler, High, 16, 8000, (6, 24, 12))
            .fixed(Shield, Standard, 8, 440, (5, 20, 10))
            .fixed(Shield, High, 16, 8800, (8, 32, 16)),
        Material::new("orichalcum", "Orichalcum")
            .per_bulk(Weapon, High, 17, 10000, 1000)
            .per_bulk(Armor, High, 20, 55000, 5500)
            .fixed(Buckler, High, 17, 12000, (14, 56, 28))
            .fixed(Shield, High, 17, 13200, (16, 64, 32)),
        Material::new("silver", "Silver")
            .per_bulk(Weapon, Low, 2, 40, 4)
            .per_bulk(Weapon, Standard, 7, 300, 30)
            .per_bulk(Weapon, High, 15, 4500, 450)
            .per_bulk(Armor, Low, 5, 140, 14)
            .per_bulk(Armor, Standard, 11, 1200, 120)
            .per_bulk(Armor, High, 18, 20000, 2000)
            .fixed(Buckler, Low, 2, 30, (1, 4, 2))
            .fixed(Buckler, Standard, 7, 300, (3, 12, 6))
            .fixed(Buckler, High, 15, 5000, (5, 20, 10))
            .fixed(Shield, Low, 2, 34, (3, 12, 6))
            .fixed(Shield, Standard, 7, 340, (5, 20, 10))
            .fixed(Shield, High, 15, 5500, (8, 32, 16)),
        Material::new("sovereign-steel", "Sovereign Steel")
            .per_bulk(Weapon, Standard, 9, 500, 50)
            .per_bulk(Weapon, High, 17, 8000, 800)
            .per_bulk(Armor, Standard, 13, 2400, 240)
            .per_bulk(Armor, High, 20, 50000, 5000),
    ];

    MaterialTable { materials }
}
