//! # Item Module
//!
//! Item records as the host stores them, plus identity and slug helpers.
//!
//! An [`ItemRecord`] is a plain structured document: the fields this crate
//! reasons about are typed, and everything else the host attaches is kept in
//! flattened `extra` maps so records survive a round trip through the host's
//! flag store untouched.

pub mod coins;

pub use coins::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The host's document type for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Shield,
    Equipment,
    Consumable,
    Treasure,
    Backpack,
    Spell,
    Feat,
    Action,
    /// Any document type the host knows and this crate does not
    #[serde(other)]
    Other,
}

impl ItemType {
    /// Whether records of this type occupy inventory space and can stack.
    pub fn is_physical(self) -> bool {
        matches!(
            self,
            ItemType::Weapon
                | ItemType::Armor
                | ItemType::Shield
                | ItemType::Equipment
                | ItemType::Consumable
                | ItemType::Treasure
                | ItemType::Backpack
        )
    }
}

/// Item rarity trait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Unique,
}

/// Trait list and rarity of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Trait slugs, in host order
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default)]
    pub rarity: Rarity,
}

impl Traits {
    /// Appends a trait unless it is already present.
    pub fn add(&mut self, value: &str) {
        if !self.value.iter().any(|existing| existing == value) {
            self.value.push(value.to_string());
        }
    }

    /// Whether the trait list contains `value`.
    pub fn contains(&self, value: &str) -> bool {
        self.value.iter().any(|existing| existing == value)
    }
}

/// Precious material applied to an equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSelection {
    /// Material slug, e.g. `cold-iron`
    #[serde(rename = "type")]
    pub material_type: String,
    pub grade: crate::equipment::MaterialGrade,
}

/// Runes etched onto an equipment item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneSelection {
    #[serde(default)]
    pub potency: u8,
    /// Striking, resilient or reinforcing rune slug, depending on the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamental: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property: Vec<String>,
}

impl RuneSelection {
    /// Whether no rune is selected.
    pub fn is_empty(&self) -> bool {
        self.potency == 0 && self.fundamental.is_none() && self.property.is_empty()
    }
}

/// Spell-specific data carried by spell records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellDetails {
    /// Magical traditions (arcane, divine, occult, primal)
    #[serde(default)]
    pub traditions: Vec<String>,
    /// Damage types dealt by the spell
    #[serde(default)]
    pub damage_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    /// Level the spell was drawn at, when above its base level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heightened_level: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

/// The `system` block of an item document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSystem {
    /// Canonical identity slug; derived from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub price: Coins,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub traits: Traits,
    #[serde(default)]
    pub description: String,
    /// Bulk, with light items at 0.1
    #[serde(default)]
    pub bulk: f64,
    #[serde(default)]
    pub hardness: u32,
    #[serde(default)]
    pub hit_points: u32,
    #[serde(default)]
    pub broken_threshold: u32,
    /// Armor or shield bonus to AC
    #[serde(default)]
    pub ac_bonus: i32,
    /// Consumable or weapon category, e.g. `scroll`, `wand`, `martial`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialSelection>,
    #[serde(default, skip_serializing_if = "RuneSelection::is_empty")]
    pub runes: RuneSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell: Option<SpellDetails>,
    /// The spell stored in a scroll or wand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_spell: Option<Box<ItemRecord>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ItemSystem {
    fn default() -> Self {
        Self {
            slug: None,
            level: 0,
            price: Coins::zero(),
            quantity: 1,
            traits: Traits::default(),
            description: String::new(),
            bulk: 0.0,
            hardness: 0,
            hit_points: 0,
            broken_threshold: 0,
            ac_bonus: 0,
            category: None,
            material: None,
            runes: RuneSelection::default(),
            spell: None,
            embedded_spell: None,
            extra: Map::new(),
        }
    }
}

/// An item document as exchanged with the host.
///
/// # Examples
///
/// ```
/// use loot_forge::{ItemRecord, ItemType};
///
/// let item = ItemRecord::new("Ruby Ring", ItemType::Treasure);
/// assert_eq!(item.slug(), "ruby-ring");
/// assert_eq!(item.system.quantity, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(rename = "_id", default = "new_item_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default)]
    pub system: ItemSystem,
    /// Compendium reference of the document this record was drawn from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemRecord {
    /// Creates a record with a fresh identity and default system data.
    pub fn new(name: &str, item_type: ItemType) -> Self {
        Self {
            id: new_item_id(),
            name: name.to_string(),
            item_type,
            img: None,
            system: ItemSystem::default(),
            source_id: None,
            extra: Map::new(),
        }
    }

    /// Sets the level, returning the record for chaining.
    pub fn with_level(mut self, level: u32) -> Self {
        self.system.level = level;
        self
    }

    /// Sets the price, returning the record for chaining.
    pub fn with_price(mut self, price: Coins) -> Self {
        self.system.price = price;
        self
    }

    /// Sets the quantity, returning the record for chaining.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.system.quantity = quantity;
        self
    }

    /// Sets an explicit slug, returning the record for chaining.
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.system.slug = Some(slug.to_string());
        self
    }

    /// Canonical identity slug: the stored slug, or one derived from the name.
    pub fn slug(&self) -> String {
        match &self.system.slug {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => slugify(&self.name),
        }
    }

    /// Whether the record is a physical, stackable item.
    pub fn is_physical(&self) -> bool {
        self.item_type.is_physical()
    }

    /// Effective level of a spell record: its heightened level when set.
    pub fn spell_level(&self) -> u32 {
        self.system
            .spell
            .as_ref()
            .and_then(|spell| spell.heightened_level)
            .unwrap_or(self.system.level)
            .max(1)
    }

    /// Returns a deep copy carrying a fresh identity.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = new_item_id();
        copy
    }
}

/// Creates a new unique item id.
pub fn new_item_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Converts a display name into a slug.
///
/// # Examples
///
/// ```
/// use loot_forge::slugify;
///
/// assert_eq!(slugify("Scroll of Fireball (Level 3)"), "scroll-of-fireball-level-3");
/// assert_eq!(slugify("  Bag o' Holding "), "bag-o-holding");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch != '\'' {
            pending_dash = true;
        }
    }

    slug
}
