use crate::token::TokenId;
use itertools::{Itertools, MinMaxResult};

/// An entity whose `(max - min) - count` is below this threshold is read as one unbroken run of
/// tokens. The value is a fixed policy, it is not derived from the data.
pub const GAP_FILL_THRESHOLD: i128 = 5;

/// Returns the canonical identifiers of one entity.
///
/// Small interruptions (annotation artifacts, skipped punctuation, ...) are filled: every
/// identifier between the smallest and the largest one is returned. Entities with larger gaps
/// are genuinely discontinuous and are returned sorted and deduplicated, as they are.
///
/// * `ids`: Identifiers of the tokens of the entity, in any order.
pub fn normalize_range<I>(ids: I) -> Vec<TokenId>
where
    I: IntoIterator<Item = TokenId>,
{
    let sorted: Vec<TokenId> = ids.into_iter().sorted_unstable().dedup().collect();
    let (min, max) = match sorted.iter().minmax() {
        MinMaxResult::NoElements => return sorted,
        MinMaxResult::OneElement(id) => return vec![*id],
        MinMaxResult::MinMax(min, max) => (min.value(), max.value()),
    };
    let span = i128::from(max - min);
    let count = sorted.len() as i128;
    if span - count < GAP_FILL_THRESHOLD {
        (min..=max).map(TokenId).collect()
    } else {
        sorted
    }
}
