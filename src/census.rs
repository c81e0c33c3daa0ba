//! Provenance census: how many records each raw source tag contributes.
//!
//! The roll-up through the parent map yields a population table in the
//! shape `SamplerConfig::populations` expects.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::SamplerConfig;
use crate::errors::SamplerError;
use crate::filter::RecordFilter;
use crate::record::RecordView;
use crate::source::JsonlSource;
use crate::types::{BucketName, SourceTag};

/// Record counts per raw source tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceCensus {
    /// Counted records per tag, sorted by tag.
    pub tags: BTreeMap<SourceTag, u64>,
    /// Counted records with a null, missing, or non-string source.
    pub untagged: u64,
    /// Records skipped by the filter (only when counting filtered records).
    pub rejected: u64,
    /// Lines that were not a decodable record.
    pub malformed: u64,
}

impl SourceCensus {
    /// Count tags over `source`; with a filter, only accepted records count.
    pub fn scan(source: &JsonlSource, filter: Option<&RecordFilter>) -> Result<Self, SamplerError> {
        let mut census = Self::default();
        let stats = source.for_each_line(|line| {
            let Some(record) = RecordView::parse(line) else {
                census.malformed += 1;
                return Ok(());
            };
            if let Some(filter) = filter
                && !filter.accepts(&record)
            {
                census.rejected += 1;
                return Ok(());
            }
            match record.source_tag() {
                Some(tag) => *census.tags.entry(tag.to_string()).or_insert(0) += 1,
                None => census.untagged += 1,
            }
            Ok(())
        })?;
        census.malformed += stats.undecodable_lines;
        Ok(census)
    }

    /// Records carrying a usable tag.
    pub fn tagged(&self) -> u64 {
        self.tags.values().sum()
    }

    /// Aggregate tag counts into parent buckets.
    ///
    /// Buckets declared in `config` come first, in declaration order (zero
    /// when nothing mapped to them); any other resulting bucket follows in
    /// name order.
    pub fn roll_up(&self, config: &SamplerConfig) -> IndexMap<BucketName, u64> {
        let mut undeclared: BTreeMap<BucketName, u64> = BTreeMap::new();
        let mut populations: IndexMap<BucketName, u64> = config
            .populations
            .keys()
            .map(|bucket| (bucket.clone(), 0))
            .collect();
        for (tag, count) in &self.tags {
            let bucket = config.parent_map.get(tag).unwrap_or(tag);
            match populations.get_mut(bucket) {
                Some(total) => *total += count,
                None => *undeclared.entry(bucket.clone()).or_insert(0) += count,
            }
        }
        populations.extend(undeclared);
        populations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextPolicy;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn write_corpus(path: &std::path::Path) {
        let line = |source: serde_json::Value, answer: &str| {
            json!({"messages": [{"content": "q", "info": {"source": source, "reference_answer": answer}}]})
                .to_string()
        };
        let lines = [
            line(json!("MATH_numina"), "1"),
            line(json!("MATH_numina"), ""),
            line(json!("NuminaMath_1.5"), "2"),
            line(json!("limo"), "3"),
            line(json!("fresh_source"), "4"),
            line(json!(null), "5"),
            "not json".to_string(),
        ];
        fs::write(path, lines.join("\n")).unwrap();
    }

    #[test]
    fn counts_every_tag_without_a_filter() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corpus.jsonl");
        write_corpus(&path);

        let census = SourceCensus::scan(&JsonlSource::new([&path]), None).unwrap();
        assert_eq!(census.tags["MATH_numina"], 2);
        assert_eq!(census.tags.len(), 4);
        assert_eq!(census.untagged, 1);
        assert_eq!(census.malformed, 1);
        assert_eq!(census.rejected, 0);
        assert_eq!(census.tagged(), 5);
    }

    #[test]
    fn filtered_scan_skips_rejected_records() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corpus.jsonl");
        write_corpus(&path);

        let filter = RecordFilter::new(TextPolicy::StrictAscii);
        let census = SourceCensus::scan(&JsonlSource::new([&path]), Some(&filter)).unwrap();
        assert_eq!(census.tags["MATH_numina"], 1);
        assert_eq!(census.rejected, 1);
    }

    #[test]
    fn roll_up_follows_parent_map_and_declaration_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corpus.jsonl");
        write_corpus(&path);

        let census = SourceCensus::scan(&JsonlSource::new([&path]), None).unwrap();
        let populations = census.roll_up(&SamplerConfig::default());
        assert_eq!(populations["NuminaMath_1.5"], 3);
        assert_eq!(populations["Other"], 1);
        assert_eq!(populations["natural_reasoning"], 0);
        assert_eq!(populations.get_index(0).unwrap().0, "natural_reasoning");
        let (last, count) = populations.last().unwrap();
        assert_eq!((last.as_str(), *count), ("fresh_source", 1));
    }
}
