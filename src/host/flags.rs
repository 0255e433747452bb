//! # Actor Flags
//!
//! Key layout for sources and filters persisted in the host's flag store.
//!
//! Sources live at `sources.<category>.<id>` and filters at
//! `filters.<category>.<type>.<id>`. Reading a category prefix yields an object
//! keyed by the next path segment.

use crate::{AppFilter, DataSource, FlagStore, ItemCategory, LootError, LootResult};
use serde_json::Value;

/// Flag key holding one source.
pub fn source_key(category: ItemCategory, id: &str) -> String {
    format!("sources.{}.{}", category, id)
}

/// Flag key holding one filter.
pub fn filter_key(category: ItemCategory, filter_type: &str, id: &str) -> String {
    format!("filters.{}.{}.{}", category, filter_type, id)
}

fn object_values(value: Option<Value>, key: &str) -> LootResult<Vec<Value>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map.into_iter().map(|(_, v)| v).collect()),
        Some(other) => Err(LootError::Configuration(format!(
            "Flag '{}' should be an object, found {}",
            key, other
        ))),
    }
}

/// Loads the enabled sources configured for `category`.
///
/// Disabled sources are dropped here so the draw engine only ever sees
/// candidates it may select.
pub async fn load_sources(
    store: &dyn FlagStore,
    category: ItemCategory,
) -> LootResult<Vec<DataSource>> {
    let key = format!("sources.{}", category);
    let mut sources = Vec::new();

    for value in object_values(store.get_flag(&key).await?, &key)? {
        let source = DataSource::from_value(value)?;
        if source.item_type != category {
            log::warn!(
                "Source '{}' stored under {} has category {}",
                source.display_name(),
                key,
                source.item_type
            );
        }
        if source.enabled {
            sources.push(source);
        }
    }

    Ok(sources)
}

/// Persists a source under its category and id.
///
/// Pools have no id; they are keyed by their slugified name instead.
pub async fn save_source(store: &dyn FlagStore, source: &DataSource) -> LootResult<()> {
    let id = match &source.id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => crate::slugify(source.display_name()),
    };
    let value = serde_json::to_value(source)?;
    store.set_flag(&source_key(source.item_type, &id), value).await
}

/// Loads every filter configured for `category`, enabled or not.
pub async fn load_filters(
    store: &dyn FlagStore,
    category: ItemCategory,
) -> LootResult<Vec<AppFilter>> {
    let key = format!("filters.{}", category);
    let mut filters = Vec::new();

    for by_type in object_values(store.get_flag(&key).await?, &key)? {
        for value in object_values(Some(by_type), &key)? {
            let filter: AppFilter = serde_json::from_value(value)
                .map_err(|e| LootError::Configuration(format!("Invalid filter: {}", e)))?;
            filters.push(filter);
        }
    }

    Ok(filters)
}

/// Persists a filter under its category, type and id.
pub async fn save_filter(store: &dyn FlagStore, filter: &AppFilter) -> LootResult<()> {
    let key = filter_key(filter.filter_category, filter.filter_type.as_str(), &filter.id);
    store.set_flag(&key, serde_json::to_value(filter)?).await
}
