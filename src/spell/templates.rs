//! Level-indexed scroll and wand templates.

use crate::config::{MAX_SPELL_LEVEL, MAX_WAND_LEVEL};
use crate::{Coins, ItemRecord, ItemType, SpellItemType};

/// Item level and gold price of a scroll for spell levels 1 through 10.
const SCROLLS: [(u32, u64); MAX_SPELL_LEVEL as usize] = [
    (1, 4),
    (3, 12),
    (5, 30),
    (7, 70),
    (9, 150),
    (11, 300),
    (13, 600),
    (15, 1300),
    (17, 3000),
    (19, 8000),
];

/// Item level and gold price of a wand for spell levels 1 through 9.
const WANDS: [(u32, u64); MAX_WAND_LEVEL as usize] = [
    (3, 60),
    (5, 160),
    (7, 360),
    (9, 700),
    (11, 1500),
    (13, 3000),
    (15, 6500),
    (17, 15000),
    (19, 40000),
];

fn ordinal(level: u32) -> String {
    let suffix = match (level % 10, level % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    };
    format!("{}{}", level, suffix)
}

/// The template record for a consumable of `item_type` holding a spell of
/// `level`, or `None` when no such consumable exists.
pub fn spell_item_template(item_type: SpellItemType, level: u32) -> Option<ItemRecord> {
    let index = level.checked_sub(1)? as usize;
    let (item_level, price, table_name, traits) = match item_type {
        SpellItemType::Scroll => {
            let (item_level, price) = *SCROLLS.get(index)?;
            (item_level, price, "Scroll", &["consumable", "magical", "scroll"][..])
        }
        SpellItemType::Wand => {
            let (item_level, price) = *WANDS.get(index)?;
            (item_level, price, "Wand", &["magical", "wand"][..])
        }
    };

    let name = format!("{} of {}-Level Spell", table_name, ordinal(level));
    let mut template = ItemRecord::new(&name, ItemType::Consumable)
        .with_level(item_level)
        .with_price(Coins::gp(price));
    template.system.slug = Some(crate::slugify(&name));
    template.system.category = Some(item_type.as_str().to_string());
    template.system.bulk = 0.1;
    template.system.description = match item_type {
        SpellItemType::Scroll => "<p>A scroll contains a single spell that can be cast once.</p>",
        SpellItemType::Wand => {
            "<p>A wand contains a spell that can be cast once per day, or overcharged.</p>"
        }
    }
    .to_string();
    for value in traits {
        template.system.traits.add(value);
    }

    Some(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_templates_cover_all_levels() {
        for level in 1..=MAX_SPELL_LEVEL {
            assert!(spell_item_template(SpellItemType::Scroll, level).is_some());
        }
        let tenth = spell_item_template(SpellItemType::Scroll, 10).unwrap();
        assert_eq!(tenth.system.level, 19);
        assert_eq!(tenth.system.price, Coins::gp(8000));
        assert_eq!(tenth.name, "Scroll of 10th-Level Spell");
    }

    #[test]
    fn test_wands_stop_below_tenth_level() {
        assert_eq!(
            spell_item_template(SpellItemType::Wand, 9).unwrap().system.level,
            19
        );
        assert!(spell_item_template(SpellItemType::Wand, 10).is_none());
        assert!(spell_item_template(SpellItemType::Wand, 0).is_none());
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
    }
}
