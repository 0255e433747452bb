//! # Source Module
//!
//! Configured origins for drawable items.
//!
//! A [`DataSource`] is a closed sum over the places items come from: a roll
//! table inside a compendium pack, a treasure table with a rolled value, a whole
//! pack, or an in-memory pool of concrete records. The common metadata (weight,
//! enabled flag, category) lives on the outer struct; the per-variant payload is
//! internally tagged by `sourceType` to match what the host stores.

use crate::{ItemRecord, LootError, LootResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Category of item a source or filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Treasure,
    Permanent,
    Consumable,
    Spell,
}

impl ItemCategory {
    /// Flag-path segment for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Treasure => "treasure",
            ItemCategory::Permanent => "permanent",
            ItemCategory::Consumable => "consumable",
            ItemCategory::Spell => "spell",
        }
    }

    /// All categories, in settings order.
    pub fn all() -> [ItemCategory; 4] {
        [
            ItemCategory::Treasure,
            ItemCategory::Permanent,
            ItemCategory::Consumable,
            ItemCategory::Spell,
        ]
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = LootError;

    fn from_str(value: &str) -> LootResult<Self> {
        ItemCategory::all()
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| LootError::Configuration(format!("Unknown item category '{}'", value)))
    }
}

/// Reference to a compendium pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackReference {
    /// Pack identifier, e.g. `pf2e.equipment-srd`
    pub id: String,
}

impl PackReference {
    /// Creates a pack reference.
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

/// Variant payload of a [`DataSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sourceType", rename_all = "camelCase")]
pub enum SourceKind {
    /// A roll table stored in a compendium pack
    #[serde(rename_all = "camelCase")]
    Table {
        /// Pack containing the table
        table_source: PackReference,
    },
    /// A roll table whose draws get a rolled monetary value
    #[serde(rename_all = "camelCase")]
    Treasure {
        /// Pack containing the table
        table_source: PackReference,
        /// Dice expression, e.g. `1d4*50`
        value: String,
        /// Currency unit of the rolled value
        denomination: crate::Denomination,
    },
    /// Every document of a compendium pack, equally likely
    Pack,
    /// An in-memory list of records
    Pool {
        /// Candidate records
        #[serde(default)]
        elements: Vec<ItemRecord>,
    },
}

/// A configured origin for drawable items.
///
/// # Examples
///
/// ```
/// use loot_forge::{DataSource, ItemCategory, SourceKind};
///
/// let json = r#"{
///     "id": "pf2e.equipment-srd",
///     "name": "Equipment",
///     "weight": 2,
///     "enabled": true,
///     "itemType": "permanent",
///     "sourceType": "pack"
/// }"#;
/// let source: DataSource = serde_json::from_str(json).unwrap();
/// assert_eq!(source.kind, SourceKind::Pack);
/// assert_eq!(source.item_type, ItemCategory::Permanent);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    /// Table or pack identifier; `None` for pools
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Relative draw probability
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub item_type: ItemCategory,
    #[serde(flatten)]
    pub kind: SourceKind,
}

fn default_weight() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

impl DataSource {
    /// A roll table in `pack`.
    pub fn table(id: &str, name: &str, pack: &str, item_type: ItemCategory) -> Self {
        Self::with_kind(
            Some(id),
            name,
            item_type,
            SourceKind::Table {
                table_source: PackReference::new(pack),
            },
        )
    }

    /// A treasure table whose draws are valued by `value` in `denomination`.
    pub fn treasure(
        id: &str,
        name: &str,
        pack: &str,
        value: &str,
        denomination: crate::Denomination,
    ) -> Self {
        Self::with_kind(
            Some(id),
            name,
            ItemCategory::Treasure,
            SourceKind::Treasure {
                table_source: PackReference::new(pack),
                value: value.to_string(),
                denomination,
            },
        )
    }

    /// A whole compendium pack.
    pub fn pack(id: &str, name: &str, item_type: ItemCategory) -> Self {
        Self::with_kind(Some(id), name, item_type, SourceKind::Pack)
    }

    /// An in-memory pool of records.
    pub fn pool(name: &str, item_type: ItemCategory, elements: Vec<ItemRecord>) -> Self {
        Self::with_kind(None, name, item_type, SourceKind::Pool { elements })
    }

    fn with_kind(id: Option<&str>, name: &str, item_type: ItemCategory, kind: SourceKind) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.to_string(),
            weight: default_weight(),
            enabled: true,
            item_type,
            kind,
        }
    }

    /// Sets the weight, returning the source for chaining.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Name for log and error messages.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.id.as_deref().unwrap_or("pool")
        }
    }

    /// Identifier of a table or pack source.
    ///
    /// Pools carry no identifier; every other variant must, so a missing id
    /// is a configuration error.
    pub fn require_id(&self) -> LootResult<&str> {
        self.id.as_deref().filter(|id| !id.is_empty()).ok_or_else(|| {
            LootError::Configuration(format!(
                "Source '{}' of type {} has no id",
                self.display_name(),
                self.kind_name()
            ))
        })
    }

    /// The `sourceType` discriminant.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SourceKind::Table { .. } => "table",
            SourceKind::Treasure { .. } => "treasure",
            SourceKind::Pack => "pack",
            SourceKind::Pool { .. } => "pool",
        }
    }

    /// Checks the invariants a source must hold before it can be drawn from.
    pub fn validate(&self) -> LootResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(LootError::Configuration(format!(
                "Source '{}' has invalid weight {}",
                self.display_name(),
                self.weight
            )));
        }

        match &self.kind {
            SourceKind::Pool { .. } => Ok(()),
            SourceKind::Table { table_source } | SourceKind::Treasure { table_source, .. } => {
                self.require_id()?;
                if table_source.id.is_empty() {
                    return Err(LootError::Configuration(format!(
                        "Table source '{}' names no pack",
                        self.display_name()
                    )));
                }
                Ok(())
            }
            SourceKind::Pack => self.require_id().map(|_| ()),
        }
    }

    /// Parses a source from a host record, mapping parse failures
    /// (including unknown `sourceType` values) to configuration errors.
    pub fn from_value(value: serde_json::Value) -> LootResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| LootError::Configuration(format!("Invalid data source: {}", e)))
    }
}

/// One drawn item paired with the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawResult {
    pub item: ItemRecord,
    pub source: Arc<DataSource>,
}

impl DrawResult {
    /// Creates a draw result.
    pub fn new(item: ItemRecord, source: Arc<DataSource>) -> Self {
        Self { item, source }
    }
}
