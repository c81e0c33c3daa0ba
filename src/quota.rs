//! Proportional integer quotas that sum exactly to the target.

use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::errors::SamplerError;
use crate::types::BucketName;

/// Quota per bucket, in declaration order.
pub type QuotaTable = IndexMap<BucketName, usize>;

/// Split `target` across buckets in proportion to their populations.
///
/// Each share is rounded half-to-even, then the signed remainder is settled
/// one unit at a time on the largest populations. Among equal populations a
/// surplus goes to the earliest-declared bucket and a deficit is taken from
/// the latest-declared one. Empty buckets always get zero.
pub fn allocate_quotas(
    populations: &IndexMap<BucketName, u64>,
    target: usize,
) -> Result<QuotaTable, SamplerError> {
    let total: u128 = populations.values().map(|&pop| u128::from(pop)).sum();
    if total == 0 {
        if target == 0 {
            return Ok(populations.keys().map(|name| (name.clone(), 0)).collect());
        }
        return Err(SamplerError::Configuration(format!(
            "cannot allocate {target} samples over an empty census"
        )));
    }

    let mut quotas: Vec<usize> = populations
        .values()
        .map(|&pop| rounded_share(target as u128 * u128::from(pop), total))
        .collect();

    let assigned: usize = quotas.iter().sum();
    let eligible: Vec<(usize, u64)> = populations
        .values()
        .enumerate()
        .filter(|(_, pop)| **pop > 0)
        .map(|(idx, pop)| (idx, *pop))
        .collect();

    if assigned < target {
        let surplus = target - assigned;
        let mut order = eligible.clone();
        order.sort_by_key(|&(idx, pop)| (Reverse(pop), idx));
        if surplus > order.len() {
            return Err(SamplerError::InvariantViolation(format!(
                "rounding surplus {surplus} exceeds {} non-empty buckets",
                order.len()
            )));
        }
        for (idx, _) in order.into_iter().take(surplus) {
            quotas[idx] += 1;
        }
    } else if assigned > target {
        let deficit = assigned - target;
        let mut order = eligible;
        order.sort_by_key(|&(idx, pop)| (Reverse(pop), Reverse(idx)));
        if deficit > order.len() {
            return Err(SamplerError::InvariantViolation(format!(
                "rounding deficit {deficit} exceeds {} non-empty buckets",
                order.len()
            )));
        }
        for (idx, _) in order.into_iter().take(deficit) {
            quotas[idx] = quotas[idx].checked_sub(1).ok_or_else(|| {
                SamplerError::InvariantViolation(format!(
                    "rounding deficit drove bucket #{idx} below zero"
                ))
            })?;
        }
    }

    let settled: usize = quotas.iter().sum();
    if settled != target {
        return Err(SamplerError::InvariantViolation(format!(
            "quotas sum to {settled}, expected {target}"
        )));
    }

    Ok(populations.keys().cloned().zip(quotas).collect())
}

/// `numerator / denominator` rounded half-to-even, in exact integer math.
fn rounded_share(numerator: u128, denominator: u128) -> usize {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    let rounded = if twice_remainder > denominator
        || (twice_remainder == denominator && quotient % 2 == 1)
    {
        quotient + 1
    } else {
        quotient
    };
    rounded as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn table(entries: &[(&str, u64)]) -> IndexMap<BucketName, u64> {
        entries
            .iter()
            .map(|(name, pop)| ((*name).to_string(), *pop))
            .collect()
    }

    #[test]
    fn proportional_split_without_remainder() {
        let quotas = allocate_quotas(&table(&[("A", 80), ("B", 20)]), 10).unwrap();
        assert_eq!(quotas["A"], 8);
        assert_eq!(quotas["B"], 2);
    }

    #[test]
    fn tied_populations_favor_earlier_declarations() {
        let quotas = allocate_quotas(&table(&[("A", 1), ("B", 1), ("C", 1)]), 2).unwrap();
        assert_eq!(quotas.values().copied().collect::<Vec<_>>(), vec![1, 1, 0]);

        let quotas = allocate_quotas(&table(&[("A", 1), ("B", 1), ("C", 1)]), 1).unwrap();
        assert_eq!(quotas.values().copied().collect::<Vec<_>>(), vec![1, 0, 0]);
    }

    #[test]
    fn deficit_comes_off_the_latest_tied_bucket() {
        // 1.5 rounds to 2 for both, one unit has to go.
        let quotas = allocate_quotas(&table(&[("A", 1), ("B", 1)]), 3).unwrap();
        assert_eq!(quotas.values().copied().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn surplus_lands_on_largest_population() {
        // Shares 3.33/3.33/3.33 round to 3 each; the spare unit goes to the largest.
        let quotas = allocate_quotas(&table(&[("A", 333), ("B", 334), ("C", 333)]), 10).unwrap();
        assert_eq!(quotas["B"], 4);
        assert_eq!(quotas["A"], 3);
        assert_eq!(quotas["C"], 3);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(rounded_share(5, 2), 2);
        assert_eq!(rounded_share(7, 2), 4);
        assert_eq!(rounded_share(3, 4), 1);
        assert_eq!(rounded_share(1, 4), 0);
    }

    #[test]
    fn empty_buckets_get_zero_and_are_never_adjusted() {
        let quotas = allocate_quotas(&table(&[("A", 0), ("B", 1), ("C", 1)]), 3).unwrap();
        assert_eq!(quotas["A"], 0);
        assert_eq!(quotas["B"] + quotas["C"], 3);
    }

    #[test]
    fn empty_census_is_a_configuration_error() {
        let err = allocate_quotas(&table(&[("A", 0)]), 5).unwrap_err();
        assert!(matches!(err, SamplerError::Configuration(_)));
        let quotas = allocate_quotas(&table(&[("A", 0)]), 0).unwrap();
        assert_eq!(quotas["A"], 0);
    }

    #[test]
    fn default_census_allocates_the_mini_corpus() {
        let config = SamplerConfig::default();
        let quotas = allocate_quotas(&config.populations, config.target).unwrap();
        assert_eq!(quotas.values().sum::<usize>(), 1400);
        assert_eq!(quotas.get_index(0).unwrap().0, "natural_reasoning");
        assert!(quotas["natural_reasoning"] > quotas["MetaMathQA"]);
    }

    #[test]
    fn quotas_always_sum_to_target() {
        let mut rng = StdRng::seed_from_u64(0x51A7A);
        for round in 0..2_000 {
            let buckets = rng.random_range(1..12);
            let populations: IndexMap<BucketName, u64> = (0..buckets)
                .map(|idx| {
                    // Mix heavy ties, zeros, and wide ranges.
                    let pop = match round % 3 {
                        0 => rng.random_range(0..4),
                        1 => 7,
                        _ => rng.random_range(0..1_000_000),
                    };
                    (format!("b{idx}"), pop)
                })
                .collect();
            let target = rng.random_range(0..5_000);
            let total: u64 = populations.values().sum();
            match allocate_quotas(&populations, target) {
                Ok(quotas) => {
                    assert_eq!(quotas.values().sum::<usize>(), target, "{populations:?}");
                    for (name, pop) in &populations {
                        if *pop == 0 {
                            assert_eq!(quotas[name], 0);
                        }
                    }
                }
                Err(err) => {
                    assert!(total == 0 && target > 0, "unexpected {err} for {populations:?}");
                }
            }
        }
    }
}
