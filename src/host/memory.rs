//! # In-Memory Host
//!
//! A self-contained host used by the CLI and the test suite: compendium packs,
//! roll tables, a dice evaluator, notifications, actor flags and an inventory,
//! all held in memory and loadable from one JSON "world" file.

use crate::{
    select_weighted, DiceEvaluator, DocumentRef, DocumentStore, FlagStore, HostServices,
    Inventory, ItemRecord, LootError, LootResult, Notifier, RandomSource, StdRandom, TableRef,
    TableRoll, TableRoller,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Compendium packs held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    packs: Mutex<BTreeMap<String, Vec<ItemRecord>>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from pack contents.
    pub fn with_packs(packs: BTreeMap<String, Vec<ItemRecord>>) -> Self {
        Self {
            packs: Mutex::new(packs),
        }
    }

    /// Adds a document to a pack, creating the pack if needed.
    pub fn insert(&self, pack: &str, item: ItemRecord) {
        lock(&self.packs)
            .entry(pack.to_string())
            .or_default()
            .push(item);
    }

    /// Looks up a document synchronously.
    pub fn find(&self, pack: &str, document_id: &str) -> Option<ItemRecord> {
        lock(&self.packs)
            .get(pack)
            .and_then(|docs| docs.iter().find(|d| d.id == document_id).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, pack: &str, document_id: &str) -> LootResult<Option<ItemRecord>> {
        let mut item = match self.find(pack, document_id) {
            Some(item) => item,
            None => return Ok(None),
        };
        item.source_id = Some(DocumentRef::new(pack, document_id).uuid());
        Ok(Some(item))
    }

    async fn list_ids(&self, pack: &str) -> LootResult<Vec<String>> {
        Ok(lock(&self.packs)
            .get(pack)
            .map(|docs| docs.iter().map(|d| d.id.clone()).collect())
            .unwrap_or_default())
    }
}

/// One row of a roll table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    #[serde(default = "default_result_weight")]
    pub weight: f64,
    /// Document this row points at; `None` for text rows
    #[serde(default)]
    pub document: Option<DocumentRef>,
    #[serde(default)]
    pub text: String,
}

fn default_result_weight() -> f64 {
    1.0
}

/// A roll table stored in a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollTable {
    pub pack: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub results: Vec<TableResult>,
}

/// Rolls in-memory tables with weighted rows.
#[derive(Debug)]
pub struct MemoryTableRoller {
    tables: Vec<RollTable>,
    random: Mutex<StdRandom>,
}

impl MemoryTableRoller {
    /// Creates a roller over `tables`, seeded for reproducible rolls.
    pub fn new(tables: Vec<RollTable>, seed: u64) -> Self {
        Self {
            tables,
            random: Mutex::new(StdRandom::seeded(seed)),
        }
    }
}

#[async_trait]
impl TableRoller for MemoryTableRoller {
    async fn roll(&self, table: &TableRef) -> LootResult<TableRoll> {
        let found = self
            .tables
            .iter()
            .find(|t| t.pack == table.pack && t.id == table.table_id)
            .ok_or_else(|| {
                LootError::Host(format!(
                    "Table {} not found in pack {}",
                    table.table_id, table.pack
                ))
            })?;

        let mut random = lock(&self.random);
        let row = select_weighted(&found.results, |r| r.weight, &mut *random)?;

        Ok(TableRoll {
            result_ref: row.document.clone(),
            raw_result: row.text.clone(),
        })
    }
}

/// Largest number of dice one `NdM` term may roll.
const MAX_DICE_PER_ROLL: u64 = 10_000;

/// Minimal dice evaluator for `NdM` terms, integers, `+`, `-` and `*`.
///
/// Multiplication binds tighter than addition. This stands in for the host's
/// evaluator when running outside the host.
#[derive(Debug)]
pub struct ExpressionDice {
    random: Mutex<StdRandom>,
}

impl ExpressionDice {
    /// Creates an evaluator seeded for reproducible rolls.
    pub fn new(seed: u64) -> Self {
        Self {
            random: Mutex::new(StdRandom::seeded(seed)),
        }
    }

    fn roll_expression(&self, expression: &str) -> LootResult<f64> {
        let error = |reason: &str| LootError::Dice {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };
        let compact: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(error("empty expression"));
        }

        let mut random = lock(&self.random);
        let mut total = 0.0;
        let mut sign = 1.0;
        let mut term = String::new();

        for ch in compact.chars().chain(std::iter::once('+')) {
            if ch == '+' || ch == '-' {
                if term.is_empty() {
                    return Err(error("dangling operator"));
                }
                let value =
                    Self::roll_term(&term, &mut *random).map_err(|r| error(r.as_str()))?;
                total += sign * value;
                sign = if ch == '-' { -1.0 } else { 1.0 };
                term.clear();
            } else {
                term.push(ch);
            }
        }

        Ok(total)
    }

    fn roll_term(term: &str, random: &mut dyn RandomSource) -> Result<f64, String> {
        let mut product = 1.0;
        for factor in term.split('*') {
            product *= Self::roll_factor(factor, random)?;
        }
        Ok(product)
    }

    fn roll_factor(factor: &str, random: &mut dyn RandomSource) -> Result<f64, String> {
        let parse = |text: &str| {
            text.parse::<u64>()
                .map_err(|_| format!("'{}' is not a number", text))
        };

        match factor.split_once(|c: char| c == 'd' || c == 'D') {
            None => parse(factor).map(|n| n as f64),
            Some((count, faces)) => {
                let count = if count.is_empty() { 1 } else { parse(count)? };
                let faces = parse(faces)?;
                if faces == 0 {
                    return Err("dice need at least one face".to_string());
                }
                if count > MAX_DICE_PER_ROLL {
                    return Err(format!(
                        "{} dice exceed the limit of {}",
                        count, MAX_DICE_PER_ROLL
                    ));
                }
                let faces = usize::try_from(faces)
                    .map_err(|_| format!("{} faces do not fit a die", faces))?;
                let mut rolled: u64 = 0;
                for _ in 0..count {
                    let face = random.index(faces) as u64 + 1;
                    rolled = rolled
                        .checked_add(face)
                        .ok_or_else(|| "dice total overflows".to_string())?;
                }
                Ok(rolled as f64)
            }
        }
    }
}

#[async_trait]
impl DiceEvaluator for ExpressionDice {
    async fn evaluate(&self, expression: &str) -> LootResult<f64> {
        self.roll_expression(expression)
    }
}

/// Notifier that records messages and mirrors them to the log.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings shown so far.
    pub fn warnings(&self) -> Vec<String> {
        lock(&self.warnings).clone()
    }

    /// Errors shown so far.
    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }
}

impl Notifier for CollectingNotifier {
    fn warn(&self, message: &str) {
        log::warn!("{}", message);
        lock(&self.warnings).push(message.to_string());
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
        lock(&self.errors).push(message.to_string());
    }
}

/// Flag store over a JSON object, addressed by dotted paths.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    root: Mutex<Map<String, Value>>,
}

impl MemoryFlagStore {
    /// Creates a store from a JSON value; non-objects start empty.
    pub fn new(root: Value) -> Self {
        let map = match root {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            root: Mutex::new(map),
        }
    }

    /// Snapshot of all stored flags.
    pub fn snapshot(&self) -> Value {
        Value::Object(lock(&self.root).clone())
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get_flag(&self, key: &str) -> LootResult<Option<Value>> {
        let root = lock(&self.root);
        let mut segments = key.split('.');
        let mut current = match segments.next().and_then(|first| root.get(first)) {
            Some(value) => value,
            None => return Ok(None),
        };
        for segment in segments {
            current = match current.get(segment) {
                Some(value) => value,
                None => return Ok(None),
            };
        }
        Ok(Some(current.clone()))
    }

    async fn set_flag(&self, key: &str, value: Value) -> LootResult<()> {
        let segments: Vec<&str> = key.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| LootError::Configuration("Empty flag key".to_string()))?;

        let mut root = lock(&self.root);
        let mut current = &mut *root;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry
                .as_object_mut()
                .ok_or_else(|| LootError::Host(format!("Flag path '{}' is not an object", key)))?;
        }
        current.insert(last.to_string(), value);
        Ok(())
    }
}

/// An actor inventory held in memory.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    items: Mutex<Vec<ItemRecord>>,
}

impl MemoryInventory {
    /// Creates an inventory holding `items`.
    pub fn new(items: Vec<ItemRecord>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Snapshot of the current items.
    pub fn snapshot(&self) -> Vec<ItemRecord> {
        lock(&self.items).clone()
    }
}

#[async_trait]
impl Inventory for MemoryInventory {
    async fn items(&self) -> LootResult<Vec<ItemRecord>> {
        Ok(self.snapshot())
    }

    async fn update_items(&self, updates: Vec<ItemRecord>) -> LootResult<()> {
        let mut items = lock(&self.items);
        for update in updates {
            match items.iter_mut().find(|item| item.id == update.id) {
                Some(existing) => *existing = update,
                None => {
                    return Err(LootError::Host(format!(
                        "Cannot update missing item {}",
                        update.id
                    )))
                }
            }
        }
        Ok(())
    }

    async fn create_items(&self, created: Vec<ItemRecord>) -> LootResult<()> {
        lock(&self.items).extend(created);
        Ok(())
    }
}

/// Everything an in-memory host holds, as stored in a world file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryWorld {
    #[serde(default)]
    pub packs: BTreeMap<String, Vec<ItemRecord>>,
    #[serde(default)]
    pub tables: Vec<RollTable>,
    /// Actor flags (sources and filters)
    #[serde(default)]
    pub flags: Value,
    /// The actor's current items
    #[serde(default)]
    pub inventory: Vec<ItemRecord>,
}

impl MemoryWorld {
    /// Loads a world from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> LootResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Turns the world into a live host, seeding its table and dice rolls.
    pub fn into_host(self, seed: u64) -> MemoryHost {
        MemoryHost {
            documents: MemoryDocumentStore::with_packs(self.packs),
            tables: MemoryTableRoller::new(self.tables, seed),
            dice: ExpressionDice::new(seed.wrapping_add(1)),
            notifier: CollectingNotifier::new(),
            flags: MemoryFlagStore::new(self.flags),
            inventory: MemoryInventory::new(self.inventory),
        }
    }
}

/// A complete in-memory host.
#[derive(Debug)]
pub struct MemoryHost {
    pub documents: MemoryDocumentStore,
    pub tables: MemoryTableRoller,
    pub dice: ExpressionDice,
    pub notifier: CollectingNotifier,
    pub flags: MemoryFlagStore,
    pub inventory: MemoryInventory,
}

impl MemoryHost {
    /// Borrows the collaborators the engine needs.
    pub fn services(&self) -> HostServices<'_> {
        HostServices {
            tables: &self.tables,
            documents: &self.documents,
            dice: &self.dice,
            notifier: &self.notifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemType;
    use serde_json::json;

    #[test]
    fn test_dice_constant_and_arithmetic() {
        let dice = ExpressionDice::new(1);
        assert_eq!(dice.roll_expression("50").unwrap(), 50.0);
        assert_eq!(dice.roll_expression("2*3+4").unwrap(), 10.0);
        assert_eq!(dice.roll_expression("10 - 4").unwrap(), 6.0);
    }

    #[test]
    fn test_dice_rolls_stay_in_range() {
        let dice = ExpressionDice::new(7);
        for _ in 0..200 {
            let total = dice.roll_expression("1d4*50").unwrap();
            assert!([50.0, 100.0, 150.0, 200.0].contains(&total));
            let sum = dice.roll_expression("3d6").unwrap();
            assert!((3.0..=18.0).contains(&sum));
        }
    }

    #[test]
    fn test_dice_limits_count_and_total() {
        let dice = ExpressionDice::new(1);
        assert!(matches!(
            dice.roll_expression("99999999999d6"),
            Err(LootError::Dice { .. })
        ));
        assert!(matches!(
            dice.roll_expression("100d18446744073709551615"),
            Err(LootError::Dice { .. })
        ));
        let total = dice.roll_expression("10000d1").unwrap();
        assert_eq!(total, 10000.0);
    }

    #[test]
    fn test_dice_rejects_garbage() {
        let dice = ExpressionDice::new(1);
        assert!(matches!(
            dice.roll_expression("1d"),
            Err(LootError::Dice { .. })
        ));
        assert!(dice.roll_expression("").is_err());
        assert!(dice.roll_expression("2+").is_err());
        assert!(dice.roll_expression("1d0").is_err());
    }

    #[test]
    fn test_document_store_sets_source_id() {
        let store = MemoryDocumentStore::new();
        let item = ItemRecord::new("Longsword", ItemType::Weapon);
        let id = item.id.clone();
        store.insert("equipment", item);

        let fetched = tokio_test::block_on(store.get("equipment", &id)).unwrap().unwrap();
        assert_eq!(
            fetched.source_id.as_deref(),
            Some(format!("Compendium.equipment.Item.{}", id).as_str())
        );
        assert!(tokio_test::block_on(store.get("equipment", "missing"))
            .unwrap()
            .is_none());
        assert!(tokio_test::block_on(store.list_ids("empty")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flag_store_paths() {
        let store = MemoryFlagStore::default();
        store
            .set_flag("sources.treasure.gems", json!({"id": "gems"}))
            .await
            .unwrap();
        assert_eq!(
            store.get_flag("sources.treasure.gems.id").await.unwrap(),
            Some(json!("gems"))
        );
        assert!(store.get_flag("sources.spell").await.unwrap().is_none());
        assert_eq!(
            store.snapshot(),
            json!({"sources": {"treasure": {"gems": {"id": "gems"}}}})
        );
    }

    #[tokio::test]
    async fn test_table_roller_follows_weights() {
        let doc = DocumentRef::new("equipment", "sword");
        let roller = MemoryTableRoller::new(
            vec![RollTable {
                pack: "tables".to_string(),
                id: "weapons".to_string(),
                name: "Weapons".to_string(),
                results: vec![
                    TableResult {
                        weight: 0.0,
                        document: None,
                        text: "Create a new item".to_string(),
                    },
                    TableResult {
                        weight: 1.0,
                        document: Some(doc.clone()),
                        text: "Longsword".to_string(),
                    },
                ],
            }],
            3,
        );

        let roll = roller.roll(&TableRef::new("tables", "weapons")).await.unwrap();
        assert_eq!(roll.result_ref, Some(doc));

        let missing = roller.roll(&TableRef::new("tables", "nope")).await;
        assert!(matches!(missing, Err(LootError::Host(_))));
    }

    #[tokio::test]
    async fn test_inventory_update_and_create() {
        let sword = ItemRecord::new("Longsword", ItemType::Weapon);
        let inventory = MemoryInventory::new(vec![sword.clone()]);

        let updated = sword.clone().with_quantity(3);
        inventory.update_items(vec![updated]).await.unwrap();
        inventory
            .create_items(vec![ItemRecord::new("Dagger", ItemType::Weapon)])
            .await
            .unwrap();

        let items = inventory.items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].system.quantity, 3);

        let ghost = ItemRecord::new("Ghost", ItemType::Weapon);
        assert!(inventory.update_items(vec![ghost]).await.is_err());
    }

    #[test]
    fn test_notifier_collects() {
        let notifier = CollectingNotifier::new();
        notifier.warn("careful");
        notifier.error("broken");
        assert_eq!(notifier.warnings(), vec!["careful"]);
        assert_eq!(notifier.errors(), vec!["broken"]);
    }
}
