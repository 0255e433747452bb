//! # Configured Filters
//!
//! User-configured filters and their translation into specification trees.

use crate::{
    And, BoxedSpecification, DataSource, DocumentStore, HasTrait, HasTradition, ItemCategory,
    LevelRange, LootError, LootResult, Or, RarityIs, SchoolIs, Specification,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a filter compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    School,
    Level,
    Tradition,
    Rarity,
    Trait,
}

impl FilterType {
    /// Flag-path segment for this filter type.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::School => "school",
            FilterType::Level => "level",
            FilterType::Tradition => "tradition",
            FilterType::Rarity => "rarity",
            FilterType::Trait => "trait",
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

/// A filter as configured by the user and stored in actor flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppFilter {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub filter_type: FilterType,
    pub filter_category: ItemCategory,
    /// Comparison operand: a level number, or a school/tradition/rarity/trait slug
    pub desired_value: Value,
}

impl AppFilter {
    /// Creates an enabled filter.
    pub fn new(
        id: &str,
        name: &str,
        filter_type: FilterType,
        filter_category: ItemCategory,
        desired_value: Value,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            weight: default_weight(),
            enabled: true,
            filter_type,
            filter_category,
            desired_value,
        }
    }

    fn desired_str(&self) -> LootResult<String> {
        self.desired_value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.operand_error("a string"))
    }

    fn operand_error(&self, expected: &str) -> LootError {
        LootError::Configuration(format!(
            "Filter '{}' ({}) expects {}, got {}",
            self.id,
            self.filter_type.as_str(),
            expected,
            self.desired_value
        ))
    }

    /// The leaf specification this filter stands for.
    pub fn specification(&self) -> LootResult<BoxedSpecification> {
        let spec: BoxedSpecification = match self.filter_type {
            FilterType::Level => {
                let level = match &self.desired_value {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| self.operand_error("a level number"))?;
                Box::new(LevelRange::exactly(level as u32))
            }
            FilterType::School => Box::new(SchoolIs(self.desired_str()?)),
            FilterType::Tradition => Box::new(HasTradition(self.desired_str()?)),
            FilterType::Trait => Box::new(HasTrait(self.desired_str()?)),
            FilterType::Rarity => {
                let rarity = serde_json::from_value(self.desired_value.clone())
                    .map_err(|_| self.operand_error("a rarity"))?;
                Box::new(RarityIs(rarity))
            }
        };
        Ok(spec)
    }
}

/// Builds the specification for `category` from a set of configured filters.
///
/// Enabled filters of the same type are alternatives (OR); different types must
/// all hold (AND). With no enabled filter the result accepts every record.
///
/// # Examples
///
/// ```
/// use loot_forge::{
///     build_specification, AppFilter, FilterType, ItemCategory, ItemRecord, ItemType,
/// };
/// use loot_forge::Specification;
/// use serde_json::json;
///
/// let filters = vec![
///     AppFilter::new("l1", "Level 1", FilterType::Level, ItemCategory::Spell, json!(1)),
///     AppFilter::new("l2", "Level 2", FilterType::Level, ItemCategory::Spell, json!(2)),
/// ];
/// let spec = build_specification(&filters, ItemCategory::Spell).unwrap();
///
/// let spell = ItemRecord::new("Light", ItemType::Spell).with_level(2);
/// assert!(spec.is_satisfied_by(&spell));
/// ```
pub fn build_specification(
    filters: &[AppFilter],
    category: ItemCategory,
) -> LootResult<BoxedSpecification> {
    let mut groups: Vec<(FilterType, Vec<BoxedSpecification>)> = Vec::new();

    for filter in filters
        .iter()
        .filter(|f| f.enabled && f.filter_category == category)
    {
        let leaf = filter.specification()?;
        match groups.iter_mut().find(|(t, _)| *t == filter.filter_type) {
            Some((_, leaves)) => leaves.push(leaf),
            None => groups.push((filter.filter_type, vec![leaf])),
        }
    }

    let children = groups
        .into_iter()
        .map(|(_, leaves)| Box::new(Or::new(leaves)) as BoxedSpecification)
        .collect();

    Ok(Box::new(And::new(children)))
}

/// Materializes a pool source holding the documents of `pack` accepted by `spec`.
///
/// Missing documents are skipped. The pool can be empty; drawing from an empty
/// pool misses until the draw engine's retry cap.
pub async fn filtered_pool(
    documents: &dyn DocumentStore,
    pack: &str,
    spec: &dyn Specification,
    name: &str,
    category: ItemCategory,
) -> LootResult<DataSource> {
    let mut elements = Vec::new();

    for id in documents.list_ids(pack).await? {
        if let Some(item) = documents.get(pack, &id).await? {
            if spec.is_satisfied_by(&item) {
                elements.push(item);
            }
        }
    }

    log::debug!(
        "Filtered pool '{}' kept {} documents from {}",
        name,
        elements.len(),
        pack
    );

    Ok(DataSource::pool(name, category, elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemRecord, ItemType, MemoryDocumentStore, Rarity, SourceKind, SpellDetails};
    use serde_json::json;

    fn spell(name: &str, level: u32, tradition: &str, rarity: Rarity) -> ItemRecord {
        let mut item = ItemRecord::new(name, ItemType::Spell).with_level(level);
        item.system.traits.rarity = rarity;
        item.system.spell = Some(SpellDetails {
            traditions: vec![tradition.to_string()],
            ..SpellDetails::default()
        });
        item
    }

    #[test]
    fn test_filter_parses_from_flag_record() {
        let filter: AppFilter = serde_json::from_value(json!({
            "id": "arcane",
            "name": "Arcane",
            "weight": 1,
            "enabled": true,
            "filterType": "tradition",
            "filterCategory": "spell",
            "desiredValue": "arcane"
        }))
        .unwrap();
        assert_eq!(filter.filter_type, FilterType::Tradition);
        assert_eq!(filter.filter_category, ItemCategory::Spell);
    }

    #[test]
    fn test_same_type_filters_are_alternatives() {
        let filters = vec![
            AppFilter::new(
                "a",
                "Arcane",
                FilterType::Tradition,
                ItemCategory::Spell,
                json!("arcane"),
            ),
            AppFilter::new(
                "d",
                "Divine",
                FilterType::Tradition,
                ItemCategory::Spell,
                json!("divine"),
            ),
        ];
        let spec = build_specification(&filters, ItemCategory::Spell).unwrap();

        assert!(spec.is_satisfied_by(&spell("Heal", 1, "divine", Rarity::Common)));
        assert!(spec.is_satisfied_by(&spell("Shield", 1, "arcane", Rarity::Common)));
        assert!(!spec.is_satisfied_by(&spell("Tanglefoot", 1, "primal", Rarity::Common)));
    }

    #[test]
    fn test_different_types_must_all_hold() {
        let filters = vec![
            AppFilter::new(
                "a",
                "Arcane",
                FilterType::Tradition,
                ItemCategory::Spell,
                json!("arcane"),
            ),
            AppFilter::new(
                "l3",
                "Level 3",
                FilterType::Level,
                ItemCategory::Spell,
                json!("3"),
            ),
        ];
        let spec = build_specification(&filters, ItemCategory::Spell).unwrap();

        assert!(spec.is_satisfied_by(&spell("Fireball", 3, "arcane", Rarity::Common)));
        assert!(!spec.is_satisfied_by(&spell("Shield", 1, "arcane", Rarity::Common)));
    }

    #[test]
    fn test_disabled_and_foreign_filters_ignored() {
        let mut disabled =
            AppFilter::new("r", "Rare", FilterType::Rarity, ItemCategory::Spell, json!("rare"));
        disabled.enabled = false;
        let foreign =
            AppFilter::new("t", "Gem", FilterType::Trait, ItemCategory::Treasure, json!("gem"));

        let spec = build_specification(&[disabled, foreign], ItemCategory::Spell).unwrap();
        assert!(spec.is_satisfied_by(&spell("Heal", 1, "divine", Rarity::Common)));
    }

    #[test]
    fn test_bad_operand_is_configuration_error() {
        let filter =
            AppFilter::new("l", "Level", FilterType::Level, ItemCategory::Spell, json!("high"));
        assert!(matches!(
            filter.specification(),
            Err(LootError::Configuration(_))
        ));

        let rarity =
            AppFilter::new("r", "Rarity", FilterType::Rarity, ItemCategory::Spell, json!("epic"));
        assert!(rarity.specification().is_err());
    }

    #[tokio::test]
    async fn test_filtered_pool_keeps_matching_documents() {
        let store = MemoryDocumentStore::new();
        store.insert("spells", spell("Heal", 1, "divine", Rarity::Common));
        store.insert("spells", spell("Fireball", 3, "arcane", Rarity::Common));
        store.insert("spells", spell("Wish", 10, "arcane", Rarity::Rare));

        let spec = RarityIs(Rarity::Common);
        let pool = filtered_pool(&store, "spells", &spec, "Common spells", ItemCategory::Spell)
            .await
            .unwrap();

        match pool.kind {
            SourceKind::Pool { elements } => {
                let mut names: Vec<_> = elements.iter().map(|e| e.name.clone()).collect();
                names.sort();
                assert_eq!(names, vec!["Fireball", "Heal"]);
            }
            other => panic!("expected pool, got {:?}", other),
        }
    }
}
