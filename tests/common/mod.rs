#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Value, json};

/// One accepted record tagged with `source`; `idx` keeps lines distinct.
pub fn record_line(source: &str, idx: usize) -> String {
    json!({
        "messages": [
            {
                "role": "user",
                "content": format!("{source} question {idx}"),
                "info": {"source": source, "reference_answer": format!("{idx}")}
            },
            {"role": "assistant", "content": "answer"}
        ]
    })
    .to_string()
}

/// `count` records for each `(source, count)` pair, interleaved round-robin.
pub fn interleaved_corpus(sources: &[(&str, usize)]) -> Vec<String> {
    let longest = sources.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let mut lines = Vec::new();
    for idx in 0..longest {
        for (source, count) in sources {
            if idx < *count {
                lines.push(record_line(source, idx));
            }
        }
    }
    lines
}

pub fn write_jsonl(path: &Path, lines: &[String]) {
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(path, body).unwrap();
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn source_of(line: &str) -> String {
    let value: Value = serde_json::from_str(line).unwrap();
    value["messages"][0]["info"]["source"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Output records per raw source tag.
pub fn count_by_source(lines: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for line in lines {
        *counts.entry(source_of(line)).or_insert(0) += 1;
    }
    counts
}
