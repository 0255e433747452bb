//! # Host Module
//!
//! Collaborator interfaces through which the engine talks to the host application.
//!
//! The host owns roll tables, compendium packs, dice, notifications, actor flags
//! and inventories. Each concern is a small trait so the engine can be driven by
//! the real host, by the in-memory host in [`memory`], or by test doubles.
//! Every I/O-bound call is async; the engine awaits them one at a time.

pub mod flags;
pub mod memory;
pub mod random;

pub use flags::*;
pub use memory::*;
pub use random::*;

use crate::{ItemRecord, LootResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a document inside a compendium pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub pack: String,
    pub document_id: String,
}

impl DocumentRef {
    /// Creates a document reference.
    pub fn new(pack: &str, document_id: &str) -> Self {
        Self {
            pack: pack.to_string(),
            document_id: document_id.to_string(),
        }
    }

    /// Host UUID of the referenced document.
    pub fn uuid(&self) -> String {
        format!("Compendium.{}.Item.{}", self.pack, self.document_id)
    }
}

/// Reference to a roll table inside a compendium pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub pack: String,
    pub table_id: String,
}

impl TableRef {
    /// Creates a table reference.
    pub fn new(pack: &str, table_id: &str) -> Self {
        Self {
            pack: pack.to_string(),
            table_id: table_id.to_string(),
        }
    }
}

/// Outcome of rolling a table once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRoll {
    /// The document the result points at, if it points at one
    pub result_ref: Option<DocumentRef>,
    /// Raw result text, e.g. a "create new item" directive
    pub raw_result: String,
}

/// Rolls the host's roll tables.
#[async_trait]
pub trait TableRoller: Send + Sync {
    /// Rolls `table` once.
    async fn roll(&self, table: &TableRef) -> LootResult<TableRoll>;
}

/// Reads documents from compendium packs.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches one document, or `None` if it does not exist.
    async fn get(&self, pack: &str, document_id: &str) -> LootResult<Option<ItemRecord>>;

    /// Lists the document ids in a pack's index.
    async fn list_ids(&self, pack: &str) -> LootResult<Vec<String>>;
}

/// Evaluates dice expressions such as `1d4*50`.
#[async_trait]
pub trait DiceEvaluator: Send + Sync {
    /// Rolls `expression` and returns its numeric total.
    async fn evaluate(&self, expression: &str) -> LootResult<f64>;
}

/// User-facing notification surface.
pub trait Notifier: Send + Sync {
    /// Shows a warning.
    fn warn(&self, message: &str);

    /// Shows an error.
    fn error(&self, message: &str);
}

/// Persistent per-actor key-value flags, addressed by dotted key paths.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Reads the value stored at `key`.
    async fn get_flag(&self, key: &str) -> LootResult<Option<Value>>;

    /// Writes `value` at `key`.
    async fn set_flag(&self, key: &str, value: Value) -> LootResult<()>;
}

/// An actor's item collection.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Current items.
    async fn items(&self) -> LootResult<Vec<ItemRecord>>;

    /// Persists changes to existing items, matched by id.
    async fn update_items(&self, items: Vec<ItemRecord>) -> LootResult<()>;

    /// Creates new items.
    async fn create_items(&self, items: Vec<ItemRecord>) -> LootResult<()>;
}

/// Source of uniform random numbers.
pub trait RandomSource {
    /// A uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// A uniform index in `0..len`. `len` must be positive.
    fn index(&mut self, len: usize) -> usize {
        let scaled = (self.uniform() * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

/// The host collaborators a generation run needs, borrowed for its duration.
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    pub tables: &'a dyn TableRoller,
    pub documents: &'a dyn DocumentStore,
    pub dice: &'a dyn DiceEvaluator,
    pub notifier: &'a dyn Notifier,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn uniform(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_index_scales_uniform() {
        assert_eq!(Fixed(0.0).index(4), 0);
        assert_eq!(Fixed(0.5).index(4), 2);
        assert_eq!(Fixed(0.999_999).index(4), 3);
    }

    #[test]
    fn test_index_never_reaches_len() {
        assert_eq!(Fixed(1.0).index(3), 2);
    }

    #[test]
    fn test_document_uuid() {
        let doc = DocumentRef::new("pf2e.spells-srd", "abc");
        assert_eq!(doc.uuid(), "Compendium.pf2e.spells-srd.Item.abc");
    }
}
