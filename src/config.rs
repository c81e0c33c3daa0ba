use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::sampling::DEFAULT_TARGET;
use crate::errors::SamplerError;
use crate::presets::{AM_DEEPSEEK_PARENT_MAP, AM_DEEPSEEK_POPULATIONS};
use crate::types::{BucketName, SourceTag};

/// How message text is screened for non-English content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPolicy {
    /// Reject on any code point outside ASCII.
    #[default]
    StrictAscii,
    /// Like `StrictAscii`, but tolerate typographic punctuation such as
    /// curly quotes or no-break spaces.
    AllowTypographic,
}

/// Top-level configuration for a stratified sampling run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerConfig {
    /// Total number of records the output should contain.
    #[serde(default = "default_target")]
    pub target: usize,
    /// RNG seed; `None` draws entropy from the OS and runs are not reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Census population per bucket. Declaration order is the output order
    /// and the tie-break order for quota rounding.
    pub populations: IndexMap<BucketName, u64>,
    /// Raw provenance tag to parent bucket. Unmapped tags are used as-is.
    #[serde(default)]
    pub parent_map: HashMap<SourceTag, BucketName>,
    /// Non-ASCII screening applied by the filter stage.
    #[serde(default)]
    pub text_policy: TextPolicy,
}

fn default_target() -> usize {
    DEFAULT_TARGET
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            seed: None,
            populations: AM_DEEPSEEK_POPULATIONS
                .iter()
                .map(|(bucket, count)| ((*bucket).to_string(), *count))
                .collect(),
            parent_map: AM_DEEPSEEK_PARENT_MAP
                .iter()
                .map(|(tag, bucket)| ((*tag).to_string(), (*bucket).to_string()))
                .collect(),
            text_policy: TextPolicy::default(),
        }
    }
}

impl SamplerConfig {
    /// Build a config from an explicit population table with no parent mapping.
    pub fn with_populations<I, K>(populations: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<BucketName>,
    {
        Self {
            target: DEFAULT_TARGET,
            seed: None,
            populations: populations
                .into_iter()
                .map(|(bucket, count)| (bucket.into(), count))
                .collect(),
            parent_map: HashMap::new(),
            text_policy: TextPolicy::default(),
        }
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self, SamplerError> {
        let raw = std::fs::read_to_string(path).map_err(|err| SamplerError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            SamplerError::Configuration(format!(
                "failed decoding config {}: {err}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override the target sample size.
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Add a raw tag to parent bucket mapping.
    pub fn with_parent(mut self, tag: impl Into<SourceTag>, bucket: impl Into<BucketName>) -> Self {
        self.parent_map.insert(tag.into(), bucket.into());
        self
    }

    /// Override the non-ASCII screening policy.
    pub fn with_text_policy(mut self, text_policy: TextPolicy) -> Self {
        self.text_policy = text_policy;
        self
    }

    /// Reject tables that cannot produce a meaningful run.
    ///
    /// Parent-map entries pointing at undeclared buckets are only logged;
    /// records carrying those tags are dropped as unclassified.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.populations.is_empty() {
            return Err(SamplerError::Configuration(
                "population table declares no buckets".to_string(),
            ));
        }
        let mut dangling: Vec<&str> = self
            .parent_map
            .iter()
            .filter(|(_, bucket)| !self.populations.contains_key(*bucket))
            .map(|(tag, _)| tag.as_str())
            .collect();
        if !dangling.is_empty() {
            dangling.sort_unstable();
            warn!(
                "[strata:config] tags mapped to undeclared buckets will be dropped: {}",
                dangling.join(", ")
            );
        }
        Ok(())
    }
}
