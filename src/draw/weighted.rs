//! # Weighted Selection
//!
//! Chooses one candidate with probability proportional to its weight.

use crate::{LootError, LootResult, RandomSource};

/// Selects one of `candidates`, weighted by `weight`.
///
/// Draws `r` uniformly from `[0, W)` where `W` is the total weight and returns
/// the first candidate whose cumulative weight exceeds `r`. Zero-weight
/// candidates are never chosen.
///
/// # Errors
///
/// [`LootError::NoPositiveWeight`] when the slice is empty or every weight is
/// zero, and [`LootError::Configuration`] for negative or non-finite weights.
///
/// # Examples
///
/// ```
/// use loot_forge::{select_weighted, StdRandom};
///
/// let candidates = [("common", 9.0), ("rare", 1.0), ("never", 0.0)];
/// let mut random = StdRandom::seeded(1);
/// let (name, _) = select_weighted(&candidates, |c| c.1, &mut random).unwrap();
/// assert_ne!(*name, "never");
/// ```
pub fn select_weighted<'a, T, F>(
    candidates: &'a [T],
    weight: F,
    random: &mut dyn RandomSource,
) -> LootResult<&'a T>
where
    F: Fn(&T) -> f64,
{
    let mut total = 0.0;
    for candidate in candidates {
        let w = weight(candidate);
        if !w.is_finite() || w < 0.0 {
            return Err(LootError::Configuration(format!(
                "Invalid selection weight {}",
                w
            )));
        }
        total += w;
    }

    if total <= 0.0 {
        return Err(LootError::NoPositiveWeight);
    }

    let target = random.uniform() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;

    for candidate in candidates {
        let w = weight(candidate);
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        if cumulative > target {
            return Ok(candidate);
        }
        last_positive = Some(candidate);
    }

    // Rounding can leave the target at the very end of the range.
    last_positive.ok_or(LootError::NoPositiveWeight)
}
