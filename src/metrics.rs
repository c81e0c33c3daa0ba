use crate::pipeline::SampleReport;
use crate::types::BucketName;

/// Census share versus achieved share for one bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketShare {
    /// Bucket name.
    pub bucket: BucketName,
    /// Records of this bucket in the output (reservoir plus fallback).
    pub count: usize,
    /// Fraction of the census population held by this bucket.
    pub census_share: f64,
    /// Fraction of the output held by this bucket.
    pub sample_share: f64,
}

impl BucketShare {
    /// Signed gap between achieved and census share.
    pub fn drift(&self) -> f64 {
        self.sample_share - self.census_share
    }
}

/// Aggregate drift of an output against its census.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketSkew {
    /// Records in the output across all buckets.
    pub total: usize,
    /// Largest absolute drift across buckets.
    pub max_drift: f64,
    /// Buckets sorted by absolute drift, largest first.
    pub per_bucket: Vec<BucketShare>,
}

/// Compare each bucket's share of the output with its census share.
/// `None` when the run selected nothing.
pub fn bucket_skew(report: &SampleReport) -> Option<BucketSkew> {
    let total: usize = report
        .buckets
        .values()
        .map(|bucket| bucket.reserved + bucket.topped_up)
        .sum();
    if total == 0 {
        return None;
    }
    let population: u64 = report.buckets.values().map(|bucket| bucket.population).sum();
    let mut per_bucket: Vec<BucketShare> = report
        .buckets
        .iter()
        .map(|(name, bucket)| {
            let count = bucket.reserved + bucket.topped_up;
            BucketShare {
                bucket: name.clone(),
                count,
                census_share: if population == 0 {
                    0.0
                } else {
                    bucket.population as f64 / population as f64
                },
                sample_share: count as f64 / total as f64,
            }
        })
        .collect();
    per_bucket.sort_by(|a, b| {
        b.drift()
            .abs()
            .total_cmp(&a.drift().abs())
            .then_with(|| a.bucket.cmp(&b.bucket))
    });
    let max_drift = per_bucket
        .first()
        .map(|share| share.drift().abs())
        .unwrap_or(0.0);
    Some(BucketSkew {
        total,
        max_drift,
        per_bucket,
    })
}
