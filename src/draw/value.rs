//! # Value Roller
//!
//! Assigns rolled monetary values to treasure drawn from treasure tables.

use crate::{Coins, DiceEvaluator, DrawResult, ItemType, LootResult, SourceKind};

/// Rolls values for treasure draws.
///
/// Every result whose source is a treasure table and whose item is a treasure
/// record gets its price replaced by the rolled total of the source's dice
/// expression, in the source's denomination. Other results pass through
/// untouched. The input is left unchanged; a new list is returned.
pub async fn roll_treasure_values(
    results: &[DrawResult],
    dice: &dyn DiceEvaluator,
) -> LootResult<Vec<DrawResult>> {
    let mut rolled = Vec::with_capacity(results.len());

    for result in results {
        let mut result = result.clone();

        if let SourceKind::Treasure {
            value,
            denomination,
            ..
        } = &result.source.kind
        {
            if result.item.item_type == ItemType::Treasure {
                let total = dice.evaluate(value).await?;
                let amount = if total.is_finite() && total > 0.0 {
                    total.round() as u64
                } else {
                    0
                };
                log::debug!(
                    "Rolled {} for '{}': {} {:?}",
                    value,
                    result.item.name,
                    amount,
                    denomination
                );
                result.item.system.price = Coins::of(*denomination, amount);
            }
        }

        rolled.push(result);
    }

    Ok(rolled)
}
