//! # Draw Engine
//!
//! Repeated weighted source selection and per-source item retrieval.
//!
//! Each draw slot picks a source by weight and resolves one concrete record from
//! it. A resolution that yields nothing (a table row that is a text directive, a
//! missing document, an empty pack or pool) is a transient miss: the slot is
//! retried with a fresh source selection, up to a per-slot cap.

use crate::{
    config, select_weighted, DataSource, DocumentStore, DrawResult, HostServices, ItemRecord,
    LootError, LootResult, RandomSource, SourceKind, TableRef, TableRoller,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options for one draw call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOptions {
    /// Whether the host should announce the draw in chat; not used by the engine
    pub display_chat: bool,
    /// Consecutive misses tolerated for one slot
    pub max_misses_per_draw: u32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            display_chat: false,
            max_misses_per_draw: config::DEFAULT_MAX_MISSES_PER_DRAW,
        }
    }
}

/// Draws item records from configured sources.
#[derive(Clone, Copy)]
pub struct DrawEngine<'a> {
    tables: &'a dyn TableRoller,
    documents: &'a dyn DocumentStore,
}

impl<'a> DrawEngine<'a> {
    /// Creates an engine over the given collaborators.
    pub fn new(tables: &'a dyn TableRoller, documents: &'a dyn DocumentStore) -> Self {
        Self { tables, documents }
    }

    /// Creates an engine from a host service bundle.
    pub fn from_services(services: &HostServices<'a>) -> Self {
        Self::new(services.tables, services.documents)
    }

    /// Draws `count` records from `sources`.
    ///
    /// Sources are expected to be enabled already. Returns an empty list when
    /// `count` is zero or there are no sources; otherwise exactly `count`
    /// results, in draw order.
    ///
    /// # Errors
    ///
    /// - [`LootError::Configuration`] for a malformed source (checked up front)
    /// - [`LootError::NoPositiveWeight`] when every source weighs zero
    /// - [`LootError::DrawExhausted`] when a slot misses too many times in a row
    /// - any error a host collaborator returns
    pub async fn draw(
        &self,
        count: usize,
        sources: &[DataSource],
        options: &DrawOptions,
        random: &mut dyn RandomSource,
    ) -> LootResult<Vec<DrawResult>> {
        if count == 0 || sources.is_empty() {
            return Ok(Vec::new());
        }

        for source in sources {
            source.validate()?;
        }

        let sources: Vec<Arc<DataSource>> = sources.iter().cloned().map(Arc::new).collect();
        let max_misses = options.max_misses_per_draw.max(1);
        let mut results = Vec::with_capacity(count);

        for slot in 0..count {
            let mut misses = 0;

            loop {
                let source = select_weighted(&sources, |s| s.weight, &mut *random)?;

                match self.resolve(source, &mut *random).await? {
                    Some(item) => {
                        log::debug!(
                            "Slot {} drew '{}' from {}",
                            slot,
                            item.name,
                            source.display_name()
                        );
                        results.push(DrawResult::new(item, Arc::clone(source)));
                        break;
                    }
                    None => {
                        misses += 1;
                        log::debug!(
                            "Slot {} missed on {} ({}/{})",
                            slot,
                            source.display_name(),
                            misses,
                            max_misses
                        );
                        if misses >= max_misses {
                            log::warn!(
                                "Giving up on slot {} after {} misses",
                                slot,
                                misses
                            );
                            return Err(LootError::DrawExhausted {
                                slot,
                                attempts: misses,
                                source_name: source.display_name().to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(results)
    }

    /// Resolves one record from `source`, or `None` on a transient miss.
    async fn resolve(
        &self,
        source: &DataSource,
        random: &mut dyn RandomSource,
    ) -> LootResult<Option<ItemRecord>> {
        match &source.kind {
            SourceKind::Table { table_source } | SourceKind::Treasure { table_source, .. } => {
                let table = TableRef::new(&table_source.id, source.require_id()?);
                let roll = self.tables.roll(&table).await?;
                match roll.result_ref {
                    Some(document) => {
                        self.documents
                            .get(&document.pack, &document.document_id)
                            .await
                    }
                    None => {
                        log::debug!(
                            "Table {} returned a non-document result: {}",
                            table.table_id,
                            roll.raw_result
                        );
                        Ok(None)
                    }
                }
            }
            SourceKind::Pack => {
                let pack = source.require_id()?;
                let ids = self.documents.list_ids(pack).await?;
                if ids.is_empty() {
                    return Ok(None);
                }
                // Uniform per document: rarity does not bias pack draws.
                let id = &ids[random.index(ids.len())];
                self.documents.get(pack, id).await
            }
            SourceKind::Pool { elements } => {
                if elements.is_empty() {
                    return Ok(None);
                }
                Ok(Some(elements[random.index(elements.len())].duplicate()))
            }
        }
    }
}
