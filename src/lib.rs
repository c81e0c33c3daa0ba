#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Provenance census and parent-bucket roll-up.
pub mod census;
/// Source tag to bucket routing.
pub mod classify;
/// Command-line front end for the `strata` binary.
pub mod cli;
/// Sampling configuration types.
pub mod config;
/// Centralized constants used across the source, filter, and sampler.
pub mod constants;
/// Repeated-question detection.
pub mod duplicates;
/// Uniform top-up sampling without replacement.
pub mod fallback;
/// Record inclusion predicates.
pub mod filter;
/// Census versus output share metrics.
pub mod metrics;
/// End-to-end sampling runs and run reports.
pub mod pipeline;
/// Built-in census tables.
pub mod presets;
/// Proportional quota allocation.
pub mod quota;
/// Typed view over the record fields the pipeline reads.
pub mod record;
/// Algorithm R reservoirs.
pub mod reservoir;
/// Per-run sampling state.
pub mod session;
/// Streaming JSONL input.
pub mod source;
/// Shared type aliases.
pub mod types;
/// Formatting helpers.
pub mod utils;
/// JSONL output.
pub mod writer;

mod errors;

pub use census::SourceCensus;
pub use classify::BucketClassifier;
pub use config::{SamplerConfig, TextPolicy};
pub use duplicates::{DuplicateQuestion, find_duplicate_questions};
pub use errors::SamplerError;
pub use filter::{RecordFilter, Rejection};
pub use metrics::{BucketShare, BucketSkew, bucket_skew};
pub use pipeline::{BucketReport, SampleReport, StratifiedSampler};
pub use quota::{QuotaTable, allocate_quotas};
pub use record::RecordView;
pub use reservoir::{Admission, Reservoir};
pub use session::{BucketSelection, SamplingSession, Selection};
pub use source::{JsonlSource, StreamStats};
pub use types::{BucketName, QuestionText, RawLine, RecordOrdinal, SourceTag};
