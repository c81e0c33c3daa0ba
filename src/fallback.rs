use rand::Rng;
use rand::seq::index;

/// Simple random sample of up to `amount` items from a fully materialized pool.
///
/// Draws without replacement; the result is in draw order. When the pool is
/// smaller than `amount` every item is returned (in random order).
pub fn draw_without_replacement<T: Clone, R: Rng>(
    pool: &[T],
    amount: usize,
    rng: &mut R,
) -> Vec<T> {
    let amount = amount.min(pool.len());
    if amount == 0 {
        return Vec::new();
    }
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|idx| pool[idx].clone())
        .collect()
}
