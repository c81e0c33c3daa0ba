use std::sync::Arc;

/// Name of a declared parent bucket.
/// Examples: `natural_reasoning`, `NuminaMath_1.5`, `Other`
pub type BucketName = String;
/// Raw provenance tag found at `messages[0].info.source`.
/// Examples: `MATH_numina`, `dolphin_R1_other`, `limo`
pub type SourceTag = String;
/// One input line exactly as read, without its line terminator.
///
/// Shared between the fallback pool and the reservoirs so a record is
/// stored once no matter how many structures refer to it.
pub type RawLine = Arc<str>;
/// Position of a record within the filtered-and-classified stream of a run.
pub type RecordOrdinal = usize;
/// Text of the first message, used as the duplicate-question key.
/// Example: `What is the derivative of x^2?`
pub type QuestionText = String;
