use std::collections::{HashMap, HashSet};

use crate::config::SamplerConfig;
use crate::types::{BucketName, SourceTag};

/// Routes raw provenance tags to declared buckets.
///
/// A tag missing from the parent map is tried as a bucket name itself; if
/// that is not declared either, the record is unclassified.
#[derive(Clone, Debug)]
pub struct BucketClassifier {
    parent_map: HashMap<SourceTag, BucketName>,
    declared: HashSet<BucketName>,
}

impl BucketClassifier {
    /// Classifier over an explicit parent map and set of declared buckets.
    pub fn new(
        parent_map: HashMap<SourceTag, BucketName>,
        declared: impl IntoIterator<Item = BucketName>,
    ) -> Self {
        Self {
            parent_map,
            declared: declared.into_iter().collect(),
        }
    }

    /// Classifier over the config's parent map and population table.
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(config.parent_map.clone(), config.populations.keys().cloned())
    }

    /// Declared bucket for `tag`, or `None` if the record must be dropped.
    pub fn classify(&self, tag: Option<&str>) -> Option<&str> {
        let tag = tag?;
        let candidate = self.parent_map.get(tag).map(String::as_str).unwrap_or(tag);
        self.declared.get(candidate).map(String::as_str)
    }
}
