//! Repeated-question detection over a JSONL corpus.

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::SamplerError;
use crate::record::RecordView;
use crate::source::JsonlSource;
use crate::types::QuestionText;

/// A first-message text that occurs more than once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateQuestion {
    /// Trimmed first-message content.
    pub question: QuestionText,
    /// Occurrences across all inputs.
    pub count: usize,
}

/// Questions (trimmed first-message content) seen more than once, in
/// first-seen order. Invalid UTF-8 bytes are replaced rather than dropping
/// the line; malformed records and empty questions are ignored.
pub fn find_duplicate_questions(
    source: &JsonlSource,
) -> Result<Vec<DuplicateQuestion>, SamplerError> {
    let mut counts: IndexMap<QuestionText, usize> = IndexMap::new();
    source.for_each_line_lossy(|line| {
        if let Some(question) = RecordView::parse(line)
            .as_ref()
            .and_then(RecordView::first_content)
        {
            *counts.entry(question.to_string()).or_insert(0) += 1;
        }
        Ok(())
    })?;
    Ok(counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(question, count)| DuplicateQuestion { question, count })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reports_repeated_first_messages_in_first_seen_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("answers.jsonl");
        let line = |question: &str| {
            json!({"messages": [{"role": "user", "content": question}, {"role": "assistant", "content": "x"}]})
                .to_string()
        };
        let lines = [
            line("Why is the sky blue?"),
            line("What is 2+2?"),
            line("  What is 2+2?  "),
            line("Why is the sky blue?"),
            line("What is 2+2?"),
            line("Unique question"),
            line("   "),
            line("   "),
            "{oops".to_string(),
        ];
        fs::write(&path, lines.join("\n")).unwrap();

        let duplicates = find_duplicate_questions(&JsonlSource::new([&path])).unwrap();
        assert_eq!(
            duplicates,
            vec![
                DuplicateQuestion {
                    question: "Why is the sky blue?".to_string(),
                    count: 2
                },
                DuplicateQuestion {
                    question: "What is 2+2?".to_string(),
                    count: 3
                },
            ]
        );
    }

    #[test]
    fn lines_with_invalid_utf8_still_count() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("dirty.jsonl");
        fn dirty(tail: &[u8]) -> Vec<u8> {
            let mut bytes = br#"{"messages":[{"content":"Solve x"#.to_vec();
            bytes.extend_from_slice(tail);
            bytes.extend_from_slice(b"\"}]}\n");
            bytes
        }
        let mut body = dirty(&[0xc3]);
        body.extend(dirty(&[0xc3]));
        body.extend(dirty(b""));
        fs::write(&path, body).unwrap();

        let duplicates = find_duplicate_questions(&JsonlSource::new([&path])).unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].count, 2);
        assert_eq!(duplicates[0].question, "Solve x\u{fffd}");
    }
}
