//! Inclusion predicates applied to every parsed record.

use serde::Serialize;
use serde_json::Value;

use crate::config::TextPolicy;
use crate::constants::filter::{
    GENERAL_PUNCTUATION_END, GENERAL_PUNCTUATION_START, NO_BREAK_SPACE,
};
use crate::record::RecordView;

/// Why a record was turned away, in the order the checks run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// `messages` is missing, null, or empty.
    NoMessages,
    /// `reference_answer` is missing or falsy.
    MissingReferenceAnswer,
    /// A non-null `test_case` is present.
    HasTestCase,
    /// Message text fails the text policy.
    NonAsciiText,
}

impl Rejection {
    /// Stable label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::NoMessages => "no_messages",
            Rejection::MissingReferenceAnswer => "missing_reference_answer",
            Rejection::HasTestCase => "has_test_case",
            Rejection::NonAsciiText => "non_ascii_text",
        }
    }
}

/// Stateless record filter. `inspect` is a pure function of the record.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordFilter {
    policy: TextPolicy,
}

impl RecordFilter {
    /// Filter applying `policy` to message text.
    pub fn new(policy: TextPolicy) -> Self {
        Self { policy }
    }

    /// Accept (`Ok`) or name the first failed check.
    pub fn inspect(&self, record: &RecordView) -> Result<(), Rejection> {
        if record.messages().is_empty() {
            return Err(Rejection::NoMessages);
        }
        let info = record.info();
        let has_reference = info
            .and_then(|info| info.reference_answer.as_ref())
            .is_some_and(is_truthy);
        if !has_reference {
            return Err(Rejection::MissingReferenceAnswer);
        }
        if info.is_some_and(|info| info.test_case.is_some()) {
            return Err(Rejection::HasTestCase);
        }
        if record.contents().any(|text| !self.text_allowed(text)) {
            return Err(Rejection::NonAsciiText);
        }
        Ok(())
    }

    /// Shorthand for `inspect(..).is_ok()`.
    pub fn accepts(&self, record: &RecordView) -> bool {
        self.inspect(record).is_ok()
    }

    fn text_allowed(&self, text: &str) -> bool {
        match self.policy {
            TextPolicy::StrictAscii => text.is_ascii(),
            TextPolicy::AllowTypographic => text
                .chars()
                .all(|ch| ch.is_ascii() || is_typographic(ch)),
        }
    }
}

fn is_typographic(ch: char) -> bool {
    ch == NO_BREAK_SPACE || (GENERAL_PUNCTUATION_START..=GENERAL_PUNCTUATION_END).contains(&ch)
}

/// Truthiness of a JSON value: null, `false`, zero, and empty
/// strings/arrays/objects are all falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RecordView {
        RecordView::parse(&value.to_string()).unwrap()
    }

    fn qa(content: &str, info: serde_json::Value) -> RecordView {
        record(json!({
            "messages": [
                {"role": "user", "content": content, "info": info},
                {"role": "assistant", "content": "The answer is 4."}
            ]
        }))
    }

    #[test]
    fn accepts_plain_english_with_reference() {
        let filter = RecordFilter::default();
        let rec = qa("What is 2+2?", json!({"source": "limo", "reference_answer": "4"}));
        assert_eq!(filter.inspect(&rec), Ok(()));
    }

    #[test]
    fn rejections_follow_check_order() {
        let filter = RecordFilter::default();

        assert_eq!(
            filter.inspect(&record(json!({"messages": []}))),
            Err(Rejection::NoMessages)
        );
        assert_eq!(
            filter.inspect(&record(json!({"other": 1}))),
            Err(Rejection::NoMessages)
        );
        // Missing reference wins over a present test case and CJK text.
        assert_eq!(
            filter.inspect(&qa("你好", json!({"test_case": {"x": 1}}))),
            Err(Rejection::MissingReferenceAnswer)
        );
        assert_eq!(
            filter.inspect(&qa("你好", json!({"reference_answer": "1", "test_case": "[]"}))),
            Err(Rejection::HasTestCase)
        );
        assert_eq!(
            filter.inspect(&qa("你好", json!({"reference_answer": "1"}))),
            Err(Rejection::NonAsciiText)
        );
    }

    #[test]
    fn falsy_reference_answers_are_rejected() {
        let filter = RecordFilter::default();
        for falsy in [json!(null), json!(""), json!(0), json!(false), json!([]), json!({})] {
            let rec = qa("Q", json!({"reference_answer": falsy}));
            assert_eq!(filter.inspect(&rec), Err(Rejection::MissingReferenceAnswer));
        }
        let missing_info = record(json!({"messages": [{"content": "Q"}]}));
        assert_eq!(
            filter.inspect(&missing_info),
            Err(Rejection::MissingReferenceAnswer)
        );
    }

    #[test]
    fn null_test_case_counts_as_absent() {
        let filter = RecordFilter::default();
        let rec = qa("Q", json!({"reference_answer": 12, "test_case": null}));
        assert!(filter.accepts(&rec));
    }

    #[test]
    fn non_ascii_anywhere_in_any_message_rejects() {
        let filter = RecordFilter::default();
        let rec = record(json!({
            "messages": [
                {"content": "plain", "info": {"reference_answer": "x"}},
                {"content": "ends with caf\u{e9}"}
            ]
        }));
        assert_eq!(filter.inspect(&rec), Err(Rejection::NonAsciiText));
    }

    #[test]
    fn typographic_policy_keeps_dashes_but_not_cjk() {
        let strict = RecordFilter::new(TextPolicy::StrictAscii);
        let relaxed = RecordFilter::new(TextPolicy::AllowTypographic);
        let dashed = qa("Compute x \u{2014} then y \u{201C}quoted\u{201D}", json!({"reference_answer": "y"}));
        assert_eq!(strict.inspect(&dashed), Err(Rejection::NonAsciiText));
        assert_eq!(relaxed.inspect(&dashed), Ok(()));

        let cjk = qa("计算", json!({"reference_answer": "y"}));
        assert_eq!(relaxed.inspect(&cjk), Err(Rejection::NonAsciiText));
    }

    #[test]
    fn inspection_is_idempotent() {
        let filter = RecordFilter::default();
        let samples = [
            qa("Q", json!({"reference_answer": "a"})),
            qa("Q", json!({"reference_answer": ""})),
            qa("\u{4e2d}", json!({"reference_answer": "a"})),
        ];
        for rec in &samples {
            assert_eq!(filter.inspect(rec), filter.inspect(rec));
        }
    }
}
