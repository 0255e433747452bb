//! # Generation Module
//!
//! The end-to-end loot generation pipeline.
//!
//! A run draws records from the configured sources, rolls treasure values,
//! turns spell draws into scrolls and wands, and merges everything into the
//! actor's inventory. Existing stacks that absorbed new quantities are written
//! back through [`Inventory::update_items`]; the rest is created through
//! [`Inventory::create_items`].

use crate::{
    config, create_spell_items, load_sources, merge_existing_stacks, roll_treasure_values,
    DataSource, DrawEngine, DrawOptions, FlagStore, HostServices, Inventory, ItemCategory,
    ItemRecord, LootError, LootResult, MergeOptions, RandomSource, SpellItemType,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for loot generation.
///
/// Controls the random seed, the per-slot retry cap, stack identity and which
/// consumables spells may become.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Consecutive misses tolerated for one draw slot
    pub max_misses_per_draw: u32,
    /// Whether stack identity includes the price
    pub compare_values: bool,
    /// Consumables drawn spells may become
    pub spell_item_types: Vec<SpellItemType>,
    /// Whether the host should announce draws in chat
    pub display_chat: bool,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use loot_forge::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert_eq!(config.max_misses_per_draw, 10);
    /// assert_eq!(config.spell_item_types.len(), 2);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_misses_per_draw: config::DEFAULT_MAX_MISSES_PER_DRAW,
            compare_values: false,
            spell_item_types: SpellItemType::all(),
            display_chat: false,
        }
    }

    /// Creates a configuration for testing with a tight retry cap.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            max_misses_per_draw: 3,
            compare_values: false,
            spell_item_types: vec![SpellItemType::Scroll],
            display_chat: false,
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> LootResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> LootResult<()> {
        if self.max_misses_per_draw == 0 {
            return Err(LootError::Configuration(
                "maxMissesPerDraw must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            display_chat: self.display_chat,
            max_misses_per_draw: self.max_misses_per_draw,
        }
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            compare_values: self.compare_values,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// One generation request: how many records to draw for a category, and from
/// which sources.
#[derive(Debug, Clone, PartialEq)]
pub struct LootRequest {
    pub category: ItemCategory,
    pub count: usize,
    pub sources: Vec<DataSource>,
}

impl LootRequest {
    pub fn new(category: ItemCategory, count: usize, sources: Vec<DataSource>) -> Self {
        Self {
            category,
            count,
            sources,
        }
    }

    /// Builds a request from the enabled sources stored in actor flags.
    pub async fn from_flags(
        store: &dyn FlagStore,
        category: ItemCategory,
        count: usize,
    ) -> LootResult<Self> {
        let sources = load_sources(store, category).await?;
        Ok(Self::new(category, count, sources))
    }
}

/// Inventory changes produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedLoot {
    /// Existing records whose quantity grew
    pub updated: Vec<ItemRecord>,
    /// Records that did not match any existing stack
    pub created: Vec<ItemRecord>,
}

impl GeneratedLoot {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.created.is_empty()
    }
}

/// Runs the loot generation pipeline against a host.
pub struct LootGenerator<'a> {
    services: HostServices<'a>,
    config: GenerationConfig,
}

impl<'a> LootGenerator<'a> {
    pub fn new(services: HostServices<'a>, config: GenerationConfig) -> Self {
        Self { services, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generates loot for `request` and writes it into `inventory`.
    ///
    /// A failure is reported once through the host notifier and returned; no
    /// inventory write happens after a failed step.
    pub async fn generate(
        &self,
        request: &LootRequest,
        inventory: &dyn Inventory,
        random: &mut dyn RandomSource,
    ) -> LootResult<GeneratedLoot> {
        match self.run(request, inventory, random).await {
            Ok(loot) => Ok(loot),
            Err(error) => {
                log::error!("Loot generation for {} failed: {}", request.category, error);
                self.services.notifier.error(&error.to_string());
                Err(error)
            }
        }
    }

    /// Draws and finishes records for `request` without touching an inventory.
    pub async fn draw_items(
        &self,
        request: &LootRequest,
        random: &mut dyn RandomSource,
    ) -> LootResult<Vec<ItemRecord>> {
        self.config.validate()?;

        let engine = DrawEngine::from_services(&self.services);
        let draws = engine
            .draw(
                request.count,
                &request.sources,
                &self.config.draw_options(),
                &mut *random,
            )
            .await?;
        let draws = roll_treasure_values(&draws, self.services.dice).await?;

        let items = if request.category == ItemCategory::Spell {
            create_spell_items(
                &draws,
                &self.config.spell_item_types,
                self.services.notifier,
                &mut *random,
            )
        } else {
            draws.into_iter().map(|draw| draw.item).collect()
        };

        log::info!(
            "Drew {} {} record(s) from {} source(s)",
            items.len(),
            request.category,
            request.sources.len()
        );
        Ok(items)
    }

    async fn run(
        &self,
        request: &LootRequest,
        inventory: &dyn Inventory,
        random: &mut dyn RandomSource,
    ) -> LootResult<GeneratedLoot> {
        let items = self.draw_items(request, random).await?;
        if items.is_empty() {
            return Ok(GeneratedLoot::default());
        }

        let existing = inventory.items().await?;
        let previous: Vec<u32> = existing.iter().map(|i| i.system.quantity).collect();
        let (merged, created) =
            merge_existing_stacks(existing, items, &self.config.merge_options());

        let updated: Vec<ItemRecord> = merged
            .into_iter()
            .zip(previous)
            .filter(|(item, quantity)| item.system.quantity != *quantity)
            .map(|(item, _)| item)
            .collect();

        if !updated.is_empty() {
            inventory.update_items(updated.clone()).await?;
        }
        if !created.is_empty() {
            inventory.create_items(created.clone()).await?;
        }

        log::info!(
            "Merged loot: {} stack(s) updated, {} item(s) created",
            updated.len(),
            created.len()
        );
        Ok(GeneratedLoot { updated, created })
    }
}
