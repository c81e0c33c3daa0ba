//! End-to-end stratified sampling run: read, filter, classify, sample, write.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::BucketClassifier;
use crate::config::SamplerConfig;
use crate::errors::SamplerError;
use crate::filter::RecordFilter;
use crate::quota::{QuotaTable, allocate_quotas};
use crate::record::RecordView;
use crate::session::{SamplingSession, Selection};
use crate::source::JsonlSource;
use crate::types::BucketName;
use crate::writer::write_selection;

/// Per-bucket outcome of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BucketReport {
    /// Census population from the config.
    pub population: u64,
    /// Allocated quota.
    pub quota: usize,
    /// Filtered records of this bucket seen in the stream.
    pub seen: u64,
    /// Records kept by the bucket's reservoir.
    pub reserved: usize,
    /// Records of this bucket added by the fallback fill.
    pub topped_up: usize,
}

/// Counters describing one sampling run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SampleReport {
    /// Requested sample size.
    pub target: usize,
    /// Seed used, `None` when drawn from OS entropy.
    pub seed: Option<u64>,
    /// Input files streamed.
    pub files: usize,
    /// Every line read, including blank and malformed ones.
    pub lines_read: u64,
    /// Whitespace-only lines.
    pub blank_lines: u64,
    /// Lines that were not valid UTF-8 or not a decodable record.
    pub malformed_lines: u64,
    /// Rejections keyed by reason label.
    pub rejected: BTreeMap<String, u64>,
    /// Accepted records whose source tag maps to no declared bucket.
    pub unclassified: u64,
    /// Records that passed the filter and landed in a bucket.
    pub admitted: usize,
    /// Per-bucket outcome in declaration order.
    pub buckets: IndexMap<BucketName, BucketReport>,
    /// Records added by the fallback fill.
    pub fallback: usize,
    /// Records written.
    pub selected: usize,
    /// How far the output falls short of `target`.
    pub shortfall: usize,
}

impl SampleReport {
    /// Total rejections across all reasons.
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// Stratified sampler configured for one population table and target.
pub struct StratifiedSampler {
    config: SamplerConfig,
    filter: RecordFilter,
    classifier: BucketClassifier,
    quotas: QuotaTable,
}

impl StratifiedSampler {
    /// Validate the config and allocate quotas up front.
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        let quotas = allocate_quotas(&config.populations, config.target)?;
        debug!("[strata:pipeline] quotas {:?}", quotas);
        Ok(Self {
            filter: RecordFilter::new(config.text_policy),
            classifier: BucketClassifier::from_config(&config),
            quotas,
            config,
        })
    }

    /// Validated configuration of this sampler.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Quotas allocated from the config.
    pub fn quotas(&self) -> &QuotaTable {
        &self.quotas
    }

    /// Sample with an RNG seeded from the config (or the OS when unseeded).
    pub fn sample(&self, source: &JsonlSource) -> Result<(Selection, SampleReport), SamplerError> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.sample_with_rng(source, rng)
    }

    /// Sample with a caller-supplied random source.
    pub fn sample_with_rng<R: Rng>(
        &self,
        source: &JsonlSource,
        rng: R,
    ) -> Result<(Selection, SampleReport), SamplerError> {
        let mut session =
            SamplingSession::with_target(self.quotas.clone(), self.config.target, rng)?;
        let mut report = SampleReport {
            target: self.config.target,
            seed: self.config.seed,
            ..SampleReport::default()
        };

        let stats = source.for_each_line(|line| {
            let Some(record) = RecordView::parse(line) else {
                report.malformed_lines += 1;
                return Ok(());
            };
            if let Err(rejection) = self.filter.inspect(&record) {
                *report
                    .rejected
                    .entry(rejection.as_str().to_string())
                    .or_insert(0) += 1;
                return Ok(());
            }
            let Some(bucket) = self.classifier.classify(record.source_tag()) else {
                report.unclassified += 1;
                return Ok(());
            };
            session.admit(bucket, Arc::from(line))?;
            Ok(())
        })?;

        report.files = stats.files;
        report.lines_read = stats.lines + stats.blank_lines + stats.undecodable_lines;
        report.blank_lines = stats.blank_lines;
        report.malformed_lines += stats.undecodable_lines;
        report.admitted = session.admitted();

        let selection = session.finalize()?;
        report.buckets = selection
            .buckets
            .iter()
            .map(|(name, bucket)| {
                let population = self.config.populations.get(name).copied().unwrap_or(0);
                let entry = BucketReport {
                    population,
                    quota: bucket.quota,
                    seen: bucket.seen,
                    reserved: bucket.lines.len(),
                    topped_up: bucket.topped_up,
                };
                (name.clone(), entry)
            })
            .collect();
        report.fallback = selection.fallback.len();
        report.selected = selection.len();
        report.shortfall = selection.shortfall;
        Ok((selection, report))
    }

    /// Sample `source` and write the selection to `output`.
    pub fn run(&self, source: &JsonlSource, output: &Path) -> Result<SampleReport, SamplerError> {
        let (selection, report) = self.sample(source)?;
        let written = write_selection(output, &selection)?;
        if written != report.selected {
            return Err(SamplerError::InvariantViolation(format!(
                "wrote {written} records but selected {}",
                report.selected
            )));
        }
        info!(
            "[strata:pipeline] wrote {} records to {} (target={}, fallback={}, shortfall={})",
            written,
            output.display(),
            report.target,
            report.fallback,
            report.shortfall
        );
        Ok(report)
    }
}
