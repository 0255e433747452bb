//! # Item Builder
//!
//! Chainable construction of a finished weapon, armor or shield from a base item.
//!
//! Setters validate their input while checks are enabled and leave the builder
//! untouched when they refuse. [`ItemBuilder::build`] never mutates the base
//! item; each call returns a fresh record.

use crate::config::{MAX_POTENCY, MAX_PROPERTY_RUNES};
use crate::{
    calculate_final_price_and_level, material_table, rune_table, slugify, EquipmentCategory,
    EquipmentSelection, ItemRecord, ItemType, LootError, LootResult, MaterialGrade,
    MaterialSelection, RuneCategory, RuneSelection,
};

/// The three equipment families the builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    Weapon,
    Armor,
    Shield,
}

impl BuilderKind {
    /// Selects the family for a base item type.
    pub fn for_item_type(item_type: ItemType) -> Option<Self> {
        match item_type {
            ItemType::Weapon => Some(BuilderKind::Weapon),
            ItemType::Armor => Some(BuilderKind::Armor),
            ItemType::Shield => Some(BuilderKind::Shield),
            _ => None,
        }
    }

    pub fn rune_category(self) -> RuneCategory {
        match self {
            BuilderKind::Weapon => RuneCategory::Weapon,
            BuilderKind::Armor => RuneCategory::Armor,
            BuilderKind::Shield => RuneCategory::Shield,
        }
    }

    fn material_categories(self) -> &'static [EquipmentCategory] {
        match self {
            BuilderKind::Weapon => &[EquipmentCategory::Weapon],
            BuilderKind::Armor => &[EquipmentCategory::Armor],
            BuilderKind::Shield => &[
                EquipmentCategory::Shield,
                EquipmentCategory::Buckler,
                EquipmentCategory::Tower,
            ],
        }
    }

    fn fundamental_name(self) -> &'static str {
        match self {
            BuilderKind::Weapon => "striking",
            BuilderKind::Armor => "resilient",
            BuilderKind::Shield => "reinforcing",
        }
    }
}

/// Material slugs usable by an equipment family.
pub fn valid_materials(kind: BuilderKind) -> Vec<&'static str> {
    material_table().valid_for(kind.material_categories())
}

/// Builds one finished equipment item from a base item.
///
/// # Examples
///
/// ```
/// use loot_forge::{Coins, ItemBuilder, ItemRecord, ItemType, MaterialGrade};
///
/// let base = ItemRecord::new("Longsword", ItemType::Weapon)
///     .with_level(0)
///     .with_price(Coins::gp(1));
///
/// let mut builder = ItemBuilder::new(base).unwrap();
/// builder.set_potency(1).unwrap();
/// builder.set_striking_rune("striking").unwrap();
///
/// let sword = builder.build().unwrap();
/// assert_eq!(sword.name, "+1 Striking Longsword");
/// assert_eq!(sword.system.level, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    base: ItemRecord,
    kind: BuilderKind,
    checks: bool,
    material: Option<(String, MaterialGrade)>,
    potency: Option<u8>,
    fundamental: Option<String>,
    property: [Option<String>; MAX_PROPERTY_RUNES],
}

impl ItemBuilder {
    /// Starts a builder for `base`, which must be a weapon, armor or shield.
    pub fn new(base: ItemRecord) -> LootResult<Self> {
        let kind = BuilderKind::for_item_type(base.item_type).ok_or_else(|| {
            LootError::Validation(format!(
                "'{}' is not a weapon, armor or shield",
                base.name
            ))
        })?;

        Ok(Self {
            base,
            kind,
            checks: true,
            material: None,
            potency: None,
            fundamental: None,
            property: Default::default(),
        })
    }

    pub fn kind(&self) -> BuilderKind {
        self.kind
    }

    pub fn base(&self) -> &ItemRecord {
        &self.base
    }

    /// Current potency; zero until one is set.
    pub fn potency(&self) -> u8 {
        self.potency.unwrap_or(0)
    }

    pub fn checks_enabled(&self) -> bool {
        self.checks
    }

    /// Enables or disables validation of later setter calls.
    pub fn set_checks(&mut self, enabled: bool) -> &mut Self {
        self.checks = enabled;
        self
    }

    /// Sets the precious material. With checks on, the material must support
    /// this family and come in `grade` for it.
    pub fn set_material(&mut self, slug: &str, grade: MaterialGrade) -> LootResult<&mut Self> {
        if self.checks {
            if !valid_materials(self.kind).contains(&slug) {
                return Err(LootError::Validation(format!(
                    "'{}' is not a valid material for {:?}",
                    slug, self.kind
                )));
            }
            let table = material_table();
            let graded = self
                .kind
                .material_categories()
                .iter()
                .any(|category| table.lookup(slug, *category, grade).is_some());
            if !graded {
                return Err(LootError::Validation(format!(
                    "'{}' has no {} grade for {:?}",
                    slug, grade, self.kind
                )));
            }
        }
        self.material = Some((slug.to_string(), grade));
        Ok(self)
    }

    pub fn clear_material(&mut self) -> &mut Self {
        self.material = None;
        self
    }

    /// Sets the potency rune value. Potency 4 is accepted but has no table
    /// entry, so it prices like no potency rune.
    ///
    /// With checks on, a potency that would close an occupied property rune
    /// slot is refused.
    pub fn set_potency(&mut self, potency: u8) -> LootResult<&mut Self> {
        if self.checks {
            if potency > MAX_POTENCY {
                return Err(LootError::Validation(format!(
                    "potency {} is outside 0..={}",
                    potency, MAX_POTENCY
                )));
            }
            let occupied = self
                .property
                .iter()
                .enumerate()
                .rev()
                .find_map(|(slot, rune)| rune.as_ref().map(|rune| (slot, rune)));
            if let Some((slot, rune)) = occupied {
                if slot >= usize::from(potency) {
                    return Err(LootError::Validation(format!(
                        "potency {} would close property rune slot {} holding '{}'",
                        potency, slot, rune
                    )));
                }
            }
        }
        self.potency = Some(potency);
        Ok(self)
    }

    /// Sets the striking rune of a weapon.
    pub fn set_striking_rune(&mut self, rune: &str) -> LootResult<&mut Self> {
        self.set_fundamental(BuilderKind::Weapon, rune)
    }

    /// Sets the resilient rune of an armor.
    pub fn set_resiliency_rune(&mut self, rune: &str) -> LootResult<&mut Self> {
        self.set_fundamental(BuilderKind::Armor, rune)
    }

    /// Sets the reinforcing rune of a shield.
    pub fn set_reinforcing_rune(&mut self, rune: &str) -> LootResult<&mut Self> {
        self.set_fundamental(BuilderKind::Shield, rune)
    }

    pub fn clear_fundamental_rune(&mut self) -> &mut Self {
        self.fundamental = None;
        self
    }

    /// Sets the property rune in `slot`. A rune in slot `i` needs a potency
    /// above `i`.
    pub fn set_property_rune(&mut self, slot: usize, rune: &str) -> LootResult<&mut Self> {
        if slot >= MAX_PROPERTY_RUNES {
            return Err(LootError::Validation(format!(
                "property rune slot {} does not exist",
                slot
            )));
        }

        if self.checks {
            let potency = self.require_potency(rune)?;
            if slot >= usize::from(potency) {
                return Err(LootError::Validation(format!(
                    "potency {} does not open property rune slot {}",
                    potency, slot
                )));
            }
            if rune_table()
                .property(self.kind.rune_category(), rune)
                .is_none()
            {
                return Err(LootError::Validation(format!(
                    "'{}' is not a valid {:?} property rune",
                    rune, self.kind
                )));
            }
        }

        self.property[slot] = Some(rune.to_string());
        Ok(self)
    }

    pub fn clear_property_rune(&mut self, slot: usize) -> &mut Self {
        if let Some(entry) = self.property.get_mut(slot) {
            *entry = None;
        }
        self
    }

    /// The material and rune choices currently held.
    pub fn selection(&self) -> EquipmentSelection {
        let (material_type, material_grade) = match &self.material {
            Some((slug, grade)) => (Some(slug.clone()), *grade),
            None => (None, MaterialGrade::default()),
        };

        EquipmentSelection {
            material_type,
            material_grade,
            potency: self.potency(),
            fundamental_rune: self.fundamental.clone(),
            property_runes: self.property.clone(),
        }
    }

    /// Produces the finished item.
    ///
    /// The record is a copy of the base item with a fresh id, the chosen
    /// material and runes stored on it, and the computed level, price and
    /// durability written back.
    pub fn build(&self) -> LootResult<ItemRecord> {
        let selection = self.selection();
        let pricing = calculate_final_price_and_level(&self.base, &selection);
        let mut item = self.base.duplicate();

        item.system.material = self.material.as_ref().map(|(slug, grade)| MaterialSelection {
            material_type: slug.clone(),
            grade: *grade,
        });
        item.system.runes = RuneSelection {
            potency: selection.potency,
            fundamental: selection.fundamental_rune.clone(),
            property: selection.property_runes.iter().flatten().cloned().collect(),
        };

        if EquipmentCategory::of(&self.base).is_some() {
            item.system.level = pricing.level;
            item.system.price = pricing.price;
            item.system.hardness = pricing.hardness;
            item.system.hit_points = pricing.hit_points;
            item.system.broken_threshold = pricing.broken_threshold;
        }

        let modified = item.system.material.is_some() || !item.system.runes.is_empty();
        if modified {
            item.name = self.display_name();
            item.system.slug = Some(slugify(&item.name));
        }

        log::debug!(
            "Built '{}' (level {}, {})",
            item.name,
            item.system.level,
            item.system.price
        );
        Ok(item)
    }

    /// Name of the finished item, e.g. `+1 Striking Flaming Cold Iron Longsword`.
    pub fn display_name(&self) -> String {
        let category = self.kind.rune_category();
        let runes = rune_table();
        let mut parts = Vec::new();

        let potency = self.potency();
        if potency > 0 {
            parts.push(format!("+{}", potency));
        }
        if let Some(rune) = &self.fundamental {
            parts.push(
                runes
                    .fundamental(category, rune)
                    .map(|r| r.name.to_string())
                    .unwrap_or_else(|| title_case(rune)),
            );
        }
        for rune in self.property.iter().flatten() {
            parts.push(
                runes
                    .property(category, rune)
                    .map(|r| r.name.to_string())
                    .unwrap_or_else(|| title_case(rune)),
            );
        }
        if let Some((slug, _)) = &self.material {
            parts.push(
                material_table()
                    .material(slug)
                    .map(|m| m.name.to_string())
                    .unwrap_or_else(|| title_case(slug)),
            );
        }
        parts.push(self.base.name.clone());

        parts.join(" ")
    }

    fn set_fundamental(&mut self, kind: BuilderKind, rune: &str) -> LootResult<&mut Self> {
        if self.checks {
            if kind != self.kind {
                return Err(LootError::Validation(format!(
                    "{} runes only apply to {:?} items",
                    kind.fundamental_name(),
                    kind
                )));
            }
            self.require_potency(rune)?;
            if rune_table()
                .fundamental(kind.rune_category(), rune)
                .is_none()
            {
                return Err(LootError::Validation(format!(
                    "'{}' is not a valid {} rune",
                    rune,
                    kind.fundamental_name()
                )));
            }
        }

        self.fundamental = Some(rune.to_string());
        Ok(self)
    }

    fn require_potency(&self, rune: &str) -> LootResult<u8> {
        self.potency.ok_or_else(|| {
            LootError::Validation(format!("set a potency before adding the '{}' rune", rune))
        })
    }
}

fn title_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
