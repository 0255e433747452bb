//! # Spell Module
//!
//! Turns drawn spells into scrolls and wands.
//!
//! Each spell draw yields at most one consumable, built from the template for
//! the spell's effective level. Tenth-level spells only fit on scrolls.

pub mod templates;

pub use templates::*;

use crate::config::MAX_SPELL_LEVEL;
use crate::{DrawResult, ItemRecord, ItemType, Notifier, RandomSource, SpellDetails};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consumable a spell can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellItemType {
    Scroll,
    Wand,
}

impl SpellItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            SpellItemType::Scroll => "scroll",
            SpellItemType::Wand => "wand",
        }
    }

    fn title(self) -> &'static str {
        match self {
            SpellItemType::Scroll => "Scroll",
            SpellItemType::Wand => "Wand",
        }
    }

    /// Both consumable types.
    pub fn all() -> Vec<SpellItemType> {
        vec![SpellItemType::Scroll, SpellItemType::Wand]
    }
}

impl fmt::Display for SpellItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creates one scroll or wand per spell draw.
///
/// Non-spell draws produce nothing. A tenth-level spell is skipped when scrolls
/// are not allowed, and a single warning is sent through `notifier` for the
/// whole call however many spells were skipped. Output order follows input
/// order.
pub fn create_spell_items(
    results: &[DrawResult],
    allowed: &[SpellItemType],
    notifier: &dyn Notifier,
    random: &mut dyn RandomSource,
) -> Vec<ItemRecord> {
    let mut allowed_types: Vec<SpellItemType> = Vec::with_capacity(allowed.len());
    for item_type in allowed {
        if !allowed_types.contains(item_type) {
            allowed_types.push(*item_type);
        }
    }

    let mut items = Vec::with_capacity(results.len());
    let mut warned = false;

    for result in results {
        let spell = &result.item;
        if spell.item_type != ItemType::Spell {
            log::debug!("Skipping non-spell '{}' in spell synthesis", spell.name);
            continue;
        }

        let level = spell.spell_level().min(MAX_SPELL_LEVEL);
        let candidates: Vec<SpellItemType> = if level >= MAX_SPELL_LEVEL {
            allowed_types
                .iter()
                .copied()
                .filter(|t| *t == SpellItemType::Scroll)
                .collect()
        } else {
            allowed_types.clone()
        };

        if candidates.is_empty() {
            if level >= MAX_SPELL_LEVEL && !warned {
                let message = format!(
                    "Wands cannot hold level {} spells and scrolls are disabled; skipped '{}'",
                    MAX_SPELL_LEVEL, spell.name
                );
                log::warn!("{}", message);
                notifier.warn(&message);
                warned = true;
            } else {
                log::debug!("No spell item type allowed for '{}'", spell.name);
            }
            continue;
        }

        let item_type = candidates[random.index(candidates.len())];
        match build_spell_item(spell, item_type, level) {
            Some(item) => items.push(item),
            None => log::warn!("No {} template for level {}", item_type, level),
        }
    }

    items
}

fn build_spell_item(
    spell: &ItemRecord,
    item_type: SpellItemType,
    level: u32,
) -> Option<ItemRecord> {
    let mut item = spell_item_template(item_type, level)?;

    if let Some(details) = &spell.system.spell {
        for tradition in &details.traditions {
            item.system.traits.add(tradition);
        }
        for damage_type in &details.damage_types {
            item.system.traits.add(damage_type);
        }
    }
    item.system.traits.rarity = spell.system.traits.rarity;

    item.name = format!("{} of {} (Level {})", item_type.title(), spell.name, level);
    item.system.slug = Some(crate::slugify(&item.name));

    let link = spell
        .source_id
        .clone()
        .unwrap_or_else(|| format!("Item.{}", spell.id));
    item.system.description = format!(
        "@UUID[{}]{{{}}}\n<hr />{}",
        link, spell.name, item.system.description
    );

    let mut embedded = spell.clone();
    embedded
        .system
        .spell
        .get_or_insert_with(SpellDetails::default)
        .heightened_level = Some(level);
    item.system.embedded_spell = Some(Box::new(embedded));
    item.system.quantity = 1;

    Some(item)
}
