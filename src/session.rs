//! Per-run sampling state.
//!
//! Lifecycle: construct from a quota table, `admit` every classified record
//! in stream order, then `finalize` once to settle the fallback fill. The
//! session owns every reservoir, the fallback pool, and the RNG; nothing
//! outlives it except the returned [`Selection`].
//!
//! Reservoirs track records by stream ordinal, so byte-identical lines are
//! separate records there. The fallback fill compares text instead and never
//! tops up with a line that is already in the output.

use std::collections::HashSet;

use indexmap::IndexMap;
use rand::Rng;
use tracing::{debug, warn};

use crate::errors::SamplerError;
use crate::fallback::draw_without_replacement;
use crate::quota::QuotaTable;
use crate::reservoir::{Admission, Reservoir};
use crate::types::{BucketName, RawLine, RecordOrdinal};

/// Stratified reservoir sampler over one logical input stream.
pub struct SamplingSession<R: Rng> {
    target: usize,
    buckets: IndexMap<BucketName, Reservoir<RecordOrdinal>>,
    /// Every admitted record with its bucket position; the ordinal is the index.
    pool: Vec<(usize, RawLine)>,
    /// Ordinals currently held by some reservoir.
    selected: HashSet<RecordOrdinal>,
    rng: R,
}

impl<R: Rng> SamplingSession<R> {
    /// Session whose target is the sum of `quotas`.
    pub fn new(quotas: QuotaTable, rng: R) -> Self {
        let target = quotas.values().sum();
        let buckets = quotas
            .into_iter()
            .map(|(name, quota)| (name, Reservoir::new(quota)))
            .collect();
        Self {
            target,
            buckets,
            pool: Vec::new(),
            selected: HashSet::new(),
            rng,
        }
    }

    /// Session for an explicit target; the quotas must add up to it.
    pub fn with_target(quotas: QuotaTable, target: usize, rng: R) -> Result<Self, SamplerError> {
        let sum: usize = quotas.values().sum();
        if sum != target {
            return Err(SamplerError::InvariantViolation(format!(
                "quotas sum to {sum}, expected {target}"
            )));
        }
        Ok(Self::new(quotas, rng))
    }

    /// Total records the output should contain.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Reservoir state of a declared bucket.
    pub fn bucket(&self, name: &str) -> Option<&Reservoir<RecordOrdinal>> {
        self.buckets.get(name)
    }

    /// Records admitted so far across all buckets.
    pub fn admitted(&self) -> usize {
        self.pool.len()
    }

    /// Records currently held by reservoirs.
    pub fn selected(&self) -> usize {
        self.selected.len()
    }

    /// Feed the next record of `bucket` into its reservoir.
    ///
    /// The record also joins the fallback pool, whatever the reservoir decides.
    pub fn admit(
        &mut self,
        bucket: &str,
        line: RawLine,
    ) -> Result<Admission<RecordOrdinal>, SamplerError> {
        let (position, _, reservoir) = self
            .buckets
            .get_full_mut(bucket)
            .ok_or_else(|| SamplerError::UnknownBucket(bucket.to_string()))?;
        let ordinal = self.pool.len();
        self.pool.push((position, line));
        let admission = reservoir.offer(ordinal, &mut self.rng);
        match &admission {
            Admission::Appended => {
                self.selected.insert(ordinal);
            }
            Admission::Replaced { evicted, .. } => {
                self.selected.remove(evicted);
                self.selected.insert(ordinal);
            }
            Admission::Skipped => {}
        }
        Ok(admission)
    }

    /// Unselected ordinals whose text no reservoir holds, first copy of each
    /// text only.
    fn fallback_candidates(&self) -> Vec<RecordOrdinal> {
        let mut seen_text: HashSet<&str> = self
            .selected
            .iter()
            .map(|&ordinal| self.pool[ordinal].1.as_ref())
            .collect();
        (0..self.pool.len())
            .filter(|ordinal| !self.selected.contains(ordinal))
            .filter(|&ordinal| seen_text.insert(self.pool[ordinal].1.as_ref()))
            .collect()
    }

    /// Close the stream: collect reservoirs and top up from the fallback pool.
    pub fn finalize(mut self) -> Result<Selection, SamplerError> {
        let reserved: usize = self.buckets.values().map(Reservoir::len).sum();
        if reserved != self.selected.len() {
            return Err(SamplerError::InvariantViolation(format!(
                "reservoirs hold {reserved} records but the selection set tracks {}",
                self.selected.len()
            )));
        }
        let missing = self.target.checked_sub(reserved).ok_or_else(|| {
            SamplerError::InvariantViolation(format!(
                "reservoirs hold {reserved} records, more than the target {}",
                self.target
            ))
        })?;

        let picks: Vec<RecordOrdinal> = if missing > 0 {
            let candidates = self.fallback_candidates();
            debug!(
                "[strata:session] filling {} vacancies from {} fallback candidates",
                missing,
                candidates.len()
            );
            draw_without_replacement(&candidates, missing, &mut self.rng)
        } else {
            Vec::new()
        };

        let mut topped_up = vec![0usize; self.buckets.len()];
        let fallback: Vec<RawLine> = picks
            .into_iter()
            .map(|ordinal| {
                let (position, line) = &self.pool[ordinal];
                topped_up[*position] += 1;
                line.clone()
            })
            .collect();

        let shortfall = missing - fallback.len();
        if shortfall > 0 {
            warn!(
                "[strata:session] filtered corpus exhausted; output is {} short of {}",
                shortfall, self.target
            );
        }

        let pool = &self.pool;
        let buckets = self
            .buckets
            .into_iter()
            .zip(topped_up)
            .map(|((name, reservoir), topped_up)| {
                let quota = reservoir.quota();
                let seen = reservoir.seen();
                let lines = reservoir
                    .into_slots()
                    .into_iter()
                    .map(|ordinal| pool[ordinal].1.clone())
                    .collect();
                let selection = BucketSelection {
                    quota,
                    seen,
                    lines,
                    topped_up,
                };
                (name, selection)
            })
            .collect();

        Ok(Selection {
            target: self.target,
            buckets,
            fallback,
            shortfall,
        })
    }
}

/// Final contents of one bucket.
#[derive(Clone, Debug)]
pub struct BucketSelection {
    /// Allocated quota.
    pub quota: usize,
    /// Records of this bucket seen over the whole stream.
    pub seen: u64,
    /// Reservoir contents in slot order.
    pub lines: Vec<RawLine>,
    /// Records of this bucket drawn by the fallback fill.
    pub topped_up: usize,
}

/// Output of a finalized session, in write order.
#[derive(Clone, Debug)]
pub struct Selection {
    /// Requested sample size.
    pub target: usize,
    /// Per-bucket contents in declaration order.
    pub buckets: IndexMap<BucketName, BucketSelection>,
    /// Top-up records in draw order.
    pub fallback: Vec<RawLine>,
    /// How far the output falls short of `target`.
    pub shortfall: usize,
}

impl Selection {
    /// Every selected line: buckets in declaration order, then fallback.
    pub fn lines(&self) -> impl Iterator<Item = &RawLine> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.lines.iter())
            .chain(self.fallback.iter())
    }

    /// Selected records, reservoirs plus fallback.
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .map(|bucket| bucket.lines.len())
            .sum::<usize>()
            + self.fallback.len()
    }

    /// True when nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
