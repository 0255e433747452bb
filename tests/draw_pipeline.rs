//! End-to-end loot generation over the in-memory host.

use loot_forge::{
    build_specification, filtered_pool, load_filters, save_filter, save_source, AppFilter,
    DataSource, FilterType, GenerationConfig, ItemCategory, LootError, LootGenerator, LootRequest,
    MemoryWorld, StdRandom,
};
use serde_json::json;
use std::io::Write;

fn world_json() -> serde_json::Value {
    json!({
        "packs": {
            "treasure-items": [
                {"_id": "ruby", "name": "Ruby", "type": "treasure", "system": {"slug": "ruby"}},
                {"_id": "opal", "name": "Opal", "type": "treasure", "system": {"slug": "opal"}}
            ],
            "spells-srd": [
                {
                    "_id": "fireball",
                    "name": "Fireball",
                    "type": "spell",
                    "system": {
                        "level": 3,
                        "traits": {"value": ["fire"], "rarity": "common"},
                        "spell": {"traditions": ["arcane", "primal"]}
                    }
                },
                {
                    "_id": "heal",
                    "name": "Heal",
                    "type": "spell",
                    "system": {
                        "level": 1,
                        "traits": {"value": ["healing"], "rarity": "common"},
                        "spell": {"traditions": ["divine", "primal"]}
                    }
                }
            ]
        },
        "tables": [
            {
                "pack": "tables",
                "id": "gems",
                "name": "Gems",
                "results": [
                    {"weight": 1, "document": {"pack": "treasure-items", "documentId": "ruby"}}
                ]
            }
        ],
        "flags": {
            "sources": {
                "treasure": {
                    "gems": {
                        "id": "gems",
                        "name": "Gem Table",
                        "weight": 1,
                        "enabled": true,
                        "itemType": "treasure",
                        "sourceType": "treasure",
                        "tableSource": {"id": "tables"},
                        "value": "2d6*10",
                        "denomination": "gp"
                    },
                    "broken": {
                        "id": "broken",
                        "name": "Disabled",
                        "enabled": false,
                        "itemType": "treasure",
                        "sourceType": "pack"
                    }
                }
            }
        },
        "inventory": [
            {
                "_id": "held-ruby",
                "name": "Ruby",
                "type": "treasure",
                "system": {"slug": "ruby", "quantity": 2}
            }
        ]
    })
}

fn load_world() -> MemoryWorld {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", world_json()).unwrap();
    MemoryWorld::from_json_file(file.path()).unwrap()
}

#[tokio::test]
async fn test_treasure_draws_merge_into_inventory() {
    let host = load_world().into_host(11);
    let request = LootRequest::from_flags(&host.flags, ItemCategory::Treasure, 3)
        .await
        .unwrap();
    assert_eq!(request.sources.len(), 1);

    let generator = LootGenerator::new(host.services(), GenerationConfig::new(11));
    let loot = generator
        .generate(&request, &host.inventory, &mut StdRandom::seeded(11))
        .await
        .unwrap();

    assert!(loot.created.is_empty());
    assert_eq!(loot.updated.len(), 1);
    assert_eq!(loot.updated[0].id, "held-ruby");
    assert_eq!(loot.updated[0].system.quantity, 5);

    let inventory = host.inventory.snapshot();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory[0].system.quantity, 5);
}

#[tokio::test]
async fn test_compare_values_keeps_rolled_treasure_apart() {
    let host = load_world().into_host(5);
    let request = LootRequest::from_flags(&host.flags, ItemCategory::Treasure, 4)
        .await
        .unwrap();

    let mut config = GenerationConfig::new(5);
    config.compare_values = true;
    let generator = LootGenerator::new(host.services(), config);
    let loot = generator
        .draw_items(&request, &mut StdRandom::seeded(5))
        .await
        .unwrap();

    assert_eq!(loot.len(), 4);
    for item in &loot {
        let gold = item.system.price.copper_value() / 100;
        assert!((20..=120).contains(&gold), "rolled {} gp", gold);
        assert_eq!(gold % 10, 0);
    }
}

#[tokio::test]
async fn test_filtered_spell_pool_becomes_scrolls() {
    let host = load_world().into_host(3);
    let filter = AppFilter::new(
        "divine",
        "Divine spells",
        FilterType::Tradition,
        ItemCategory::Spell,
        json!("divine"),
    );
    save_filter(&host.flags, &filter).await.unwrap();

    let filters = load_filters(&host.flags, ItemCategory::Spell).await.unwrap();
    assert_eq!(filters, vec![filter]);

    let spec = build_specification(&filters, ItemCategory::Spell).unwrap();
    let pool = filtered_pool(
        &host.documents,
        "spells-srd",
        spec.as_ref(),
        "Divine Spells",
        ItemCategory::Spell,
    )
    .await
    .unwrap();
    save_source(&host.flags, &pool).await.unwrap();

    let request = LootRequest::from_flags(&host.flags, ItemCategory::Spell, 2)
        .await
        .unwrap();
    let generator = LootGenerator::new(host.services(), GenerationConfig::for_testing(3));
    let loot = generator
        .generate(&request, &host.inventory, &mut StdRandom::seeded(3))
        .await
        .unwrap();

    assert_eq!(loot.created.len(), 1);
    let scroll = &loot.created[0];
    assert_eq!(scroll.name, "Scroll of Heal (Level 1)");
    assert_eq!(scroll.system.quantity, 2);
    assert!(scroll.system.traits.contains("divine"));
    assert!(scroll
        .system
        .description
        .starts_with("@UUID[Compendium.spells-srd.Item.heal]{Heal}"));
}

#[tokio::test]
async fn test_missing_table_is_reported_once() {
    let host = load_world().into_host(1);
    let source = DataSource::table("nowhere", "Missing", "tables", ItemCategory::Permanent);
    let request = LootRequest::new(ItemCategory::Permanent, 2, vec![source]);

    let generator = LootGenerator::new(host.services(), GenerationConfig::default());
    let result = generator
        .generate(&request, &host.inventory, &mut StdRandom::seeded(1))
        .await;

    assert!(matches!(result, Err(LootError::Host(_))));
    assert_eq!(host.notifier.errors().len(), 1);
    assert_eq!(host.inventory.snapshot()[0].system.quantity, 2);
}

#[tokio::test]
async fn test_world_round_trips_through_file() {
    let world = load_world();
    let text = serde_json::to_string(&world).unwrap();
    let reloaded: MemoryWorld = serde_json::from_str(&text).unwrap();
    assert_eq!(reloaded.packs.len(), 2);
    assert_eq!(reloaded.tables[0].results.len(), 1);
    assert_eq!(reloaded.inventory[0].system.quantity, 2);
}
