//! # Stack Module
//!
//! Quantity merging for item records that share an identity key.
//!
//! Two physical records are the same stack when their keys match. The key is the
//! record's slug, extended with its price in copper when values are compared.
//! Merging adds the absorbed record's quantity to the surviving one and leaves
//! every other field of the survivor alone. Non-physical records (spells, feats)
//! never merge.

use crate::ItemRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How stack identity is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOptions {
    /// Include the price in the identity key
    pub compare_values: bool,
}

/// The identity key of a record's stack.
///
/// # Examples
///
/// ```
/// use loot_forge::{stack_key, Coins, ItemRecord, ItemType, MergeOptions};
///
/// let ruby = ItemRecord::new("Ruby", ItemType::Treasure).with_price(Coins::gp(50));
/// assert_eq!(stack_key(&ruby, &MergeOptions::default()), "ruby");
/// assert_eq!(stack_key(&ruby, &MergeOptions { compare_values: true }), "ruby-5000");
/// ```
pub fn stack_key(item: &ItemRecord, options: &MergeOptions) -> String {
    let slug = item.slug();
    if options.compare_values {
        format!("{}-{}", slug, item.system.price.copper_value())
    } else {
        slug
    }
}

/// Absorbs `other`'s quantity into `target`.
///
/// Returns `false`, changing nothing, when either record is not stackable.
pub fn merge_into(target: &mut ItemRecord, other: &ItemRecord) -> bool {
    if !target.is_physical() || !other.is_physical() {
        return false;
    }
    target.system.quantity = target.system.quantity.saturating_add(other.system.quantity);
    true
}

/// Merges records sharing a stack key.
///
/// The first record of each key absorbs the quantities of the later ones, which
/// are dropped. Survivors keep first-occurrence order; non-physical records are
/// kept as they are, in place.
///
/// # Examples
///
/// ```
/// use loot_forge::{merge_stacks, ItemRecord, ItemType, MergeOptions};
///
/// let items = vec![
///     ItemRecord::new("A", ItemType::Treasure).with_quantity(1),
///     ItemRecord::new("A", ItemType::Treasure).with_quantity(2),
///     ItemRecord::new("B", ItemType::Treasure).with_quantity(1),
/// ];
/// let merged = merge_stacks(items, &MergeOptions::default());
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].system.quantity, 3);
/// ```
pub fn merge_stacks(items: Vec<ItemRecord>, options: &MergeOptions) -> Vec<ItemRecord> {
    let mut merged: Vec<ItemRecord> = Vec::with_capacity(items.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for item in items {
        if !item.is_physical() {
            merged.push(item);
            continue;
        }

        let key = stack_key(&item, options);
        match positions.get(&key) {
            Some(&index) => {
                merge_into(&mut merged[index], &item);
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(item);
            }
        }
    }

    merged
}

/// Merges newly drawn records into an existing inventory.
///
/// Each new record matching an existing stack is absorbed into it; the rest are
/// merged among themselves. Returns the existing records (with updated
/// quantities) and the new records that still need to be created.
pub fn merge_existing_stacks(
    old_items: Vec<ItemRecord>,
    new_items: Vec<ItemRecord>,
    options: &MergeOptions,
) -> (Vec<ItemRecord>, Vec<ItemRecord>) {
    let mut old_items = old_items;
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, item) in old_items.iter().enumerate() {
        if item.is_physical() {
            positions.entry(stack_key(item, options)).or_insert(index);
        }
    }

    let mut remaining = Vec::with_capacity(new_items.len());
    for item in new_items {
        let target = if item.is_physical() {
            positions.get(&stack_key(&item, options)).copied()
        } else {
            None
        };

        match target {
            Some(index) => {
                merge_into(&mut old_items[index], &item);
            }
            None => remaining.push(item),
        }
    }

    let remaining = merge_stacks(remaining, options);
    (old_items, remaining)
}
