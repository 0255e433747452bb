//! Equipment pricing and the item builder, driven through the public API.

use loot_forge::{
    calculate_final_price_and_level, Coins, EquipmentSelection, ItemBuilder, ItemRecord, ItemType,
    LootError, MaterialGrade, PricingResult,
};

fn base_weapon() -> ItemRecord {
    let mut item = ItemRecord::new("Longsword", ItemType::Weapon)
        .with_level(1)
        .with_price(Coins::gp(10))
        .with_slug("longsword");
    item.system.bulk = 1.0;
    item
}

fn base_armor() -> ItemRecord {
    let mut item = ItemRecord::new("Breastplate", ItemType::Armor)
        .with_level(0)
        .with_price(Coins::gp(8))
        .with_slug("breastplate");
    item.system.bulk = 2.0;
    item.system.ac_bonus = 4;
    item
}

#[test]
fn test_base_weapon_without_upgrades_is_unchanged() {
    let result = calculate_final_price_and_level(&base_weapon(), &EquipmentSelection::default());
    assert_eq!(result.level, 1);
    assert_eq!(result.price, Coins::gp(10));
}

#[test]
fn test_potency_one_weapon() {
    let selection = EquipmentSelection {
        potency: 1,
        ..Default::default()
    };
    let result = calculate_final_price_and_level(&base_weapon(), &selection);
    assert_eq!(result.level, 2);
    assert_eq!(result.price, Coins::gp(45));
}

#[test]
fn test_armor_material_scales_with_bulk() {
    let selection = EquipmentSelection {
        material_type: Some("mithral".to_string()),
        material_grade: MaterialGrade::Standard,
        potency: 1,
        fundamental_rune: Some("resilient".to_string()),
        ..Default::default()
    };
    let result = calculate_final_price_and_level(&base_armor(), &selection);
    assert_eq!(result.level, 12);
    assert_eq!(result.price, Coins::gp(8 + 1600 + 160 * 2 + 160 + 340));
}

#[test]
fn test_non_equipment_prices_to_zero() {
    let potion = ItemRecord::new("Healing Potion", ItemType::Consumable)
        .with_level(1)
        .with_price(Coins::gp(4));
    let selection = EquipmentSelection {
        potency: 2,
        ..Default::default()
    };
    assert_eq!(
        calculate_final_price_and_level(&potion, &selection),
        PricingResult::default()
    );
}

#[test]
fn test_builder_rejects_then_accepts_potency_five() {
    let mut builder = ItemBuilder::new(base_weapon()).unwrap();
    builder.set_potency(0).unwrap();

    let rejected = builder.set_potency(5);
    assert!(matches!(rejected, Err(LootError::Validation(_))));
    assert_eq!(builder.potency(), 0);

    builder.set_checks(false).set_potency(5).unwrap();
    let item = builder.build().unwrap();
    assert_eq!(item.system.runes.potency, 5);
}

#[test]
fn test_builder_output_matches_pricing_engine() {
    let base = base_weapon();
    let mut builder = ItemBuilder::new(base.clone()).unwrap();
    builder
        .set_material("silver", MaterialGrade::Standard)
        .unwrap()
        .set_potency(2)
        .unwrap()
        .set_striking_rune("greater-striking")
        .unwrap()
        .set_property_rune(0, "holy")
        .unwrap()
        .set_property_rune(1, "keen")
        .unwrap();

    let expected = calculate_final_price_and_level(&base, &builder.selection());
    let item = builder.build().unwrap();

    assert_eq!(item.name, "+2 Greater Striking Holy Keen Silver Longsword");
    assert_eq!(item.system.level, expected.level);
    assert_eq!(item.system.price, expected.price);
    assert_eq!(item.system.level, 13);
    assert_eq!(builder.base(), &base);
    assert_eq!(builder.base().system.level, 1);
}

#[test]
fn test_builder_reused_between_builds() {
    let mut builder = ItemBuilder::new(base_armor()).unwrap();
    builder.set_potency(1).unwrap();
    let plain = builder.build().unwrap();

    builder.set_resiliency_rune("resilient").unwrap();
    let resilient = builder.build().unwrap();

    assert_eq!(plain.name, "+1 Breastplate");
    assert_eq!(resilient.name, "+1 Resilient Breastplate");
    assert!(resilient.system.price.copper_value() > plain.system.price.copper_value());
    assert_ne!(plain.id, resilient.id);
}

#[test]
fn test_built_item_serializes_selections() {
    let mut builder = ItemBuilder::new(base_weapon()).unwrap();
    builder
        .set_material("cold-iron", MaterialGrade::Low)
        .unwrap()
        .set_potency(1)
        .unwrap();
    let item = builder.build().unwrap();

    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["system"]["material"]["type"], "cold-iron");
    assert_eq!(value["system"]["material"]["grade"], "low");
    assert_eq!(value["system"]["runes"]["potency"], 1);

    let parsed: ItemRecord = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, item);
}
