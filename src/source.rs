//! Streaming reader over one or more line-delimited JSON inputs.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::info;
use walkdir::WalkDir;

use crate::constants::source::{JSONL_EXTENSION, PROGRESS_REPORT_INTERVAL_MS};
use crate::errors::SamplerError;

/// Line counters for one pass over the inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Files streamed.
    pub files: usize,
    /// Non-blank lines handed to the visitor.
    pub lines: u64,
    /// Whitespace-only lines.
    pub blank_lines: u64,
    /// Lines skipped because they were not valid UTF-8.
    pub undecodable_lines: u64,
    /// Lines with invalid UTF-8 visited after replacing the bad bytes.
    pub repaired_lines: u64,
}

/// Ordered set of JSONL inputs, streamed line by line.
///
/// Files are read in declaration order; a directory contributes its
/// `*.jsonl` files in sorted path order at its position in the list.
pub struct JsonlSource {
    inputs: Vec<PathBuf>,
    follow_links: bool,
}

impl JsonlSource {
    /// Inputs streamed in the given order.
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal when expanding directories.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Expand directories and confirm every input exists before any reading.
    pub fn resolve(&self) -> Result<Vec<PathBuf>, SamplerError> {
        if self.inputs.is_empty() {
            return Err(SamplerError::Configuration(
                "no input files were given".to_string(),
            ));
        }
        let mut files = Vec::new();
        for input in &self.inputs {
            if input.is_file() {
                files.push(input.clone());
                continue;
            }
            if !input.is_dir() {
                return Err(SamplerError::SourceUnavailable {
                    path: input.clone(),
                    reason: "no such file or directory".to_string(),
                });
            }
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(self.follow_links)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file() && is_jsonl_file(entry.path()))
                .map(|entry| entry.path().to_path_buf())
                .collect();
            if found.is_empty() {
                return Err(SamplerError::SourceUnavailable {
                    path: input.clone(),
                    reason: format!("directory holds no .{JSONL_EXTENSION} files"),
                });
            }
            found.sort();
            files.extend(found);
        }
        Ok(files)
    }

    /// Visit every non-blank line of every input, in order.
    ///
    /// The visitor gets the line without its terminator (`\n` or `\r\n`).
    pub fn for_each_line<F>(&self, visit: F) -> Result<StreamStats, SamplerError>
    where
        F: FnMut(&str) -> Result<(), SamplerError>,
    {
        self.stream(false, visit)
    }

    /// Like [`for_each_line`](Self::for_each_line), but a line that is not
    /// valid UTF-8 is still visited, with each bad sequence replaced by
    /// U+FFFD.
    pub fn for_each_line_lossy<F>(&self, visit: F) -> Result<StreamStats, SamplerError>
    where
        F: FnMut(&str) -> Result<(), SamplerError>,
    {
        self.stream(true, visit)
    }

    fn stream<F>(&self, lossy: bool, mut visit: F) -> Result<StreamStats, SamplerError>
    where
        F: FnMut(&str) -> Result<(), SamplerError>,
    {
        let files = self.resolve()?;
        let mut stats = StreamStats::default();
        let report_every = Duration::from_millis(PROGRESS_REPORT_INTERVAL_MS);
        let stream_start = Instant::now();
        let mut last_report = stream_start;

        for path in &files {
            let file = File::open(path).map_err(|err| SamplerError::SourceUnavailable {
                path: path.clone(),
                reason: err.to_string(),
            })?;
            info!("[strata:source] streaming {}", path.display());
            stats.files += 1;
            let mut reader = BufReader::new(file);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                let bytes = strip_terminator(&buf);
                let text = match std::str::from_utf8(bytes) {
                    Ok(text) => Cow::Borrowed(text),
                    Err(_) if lossy => {
                        stats.repaired_lines += 1;
                        String::from_utf8_lossy(bytes)
                    }
                    Err(_) => {
                        stats.undecodable_lines += 1;
                        continue;
                    }
                };
                if text.trim().is_empty() {
                    stats.blank_lines += 1;
                    continue;
                }
                stats.lines += 1;
                visit(&text)?;

                if last_report.elapsed() >= report_every {
                    info!(
                        "[strata:source] progress file='{}' lines={} elapsed={:.1}s",
                        file_label(path),
                        stats.lines,
                        stream_start.elapsed().as_secs_f64()
                    );
                    last_report = Instant::now();
                }
            }
        }
        info!(
            "[strata:source] finished files={} lines={} in {:.2}s",
            stats.files,
            stats.lines,
            stream_start.elapsed().as_secs_f64()
        );
        Ok(stats)
    }
}

fn strip_terminator(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// True if the path has a `.jsonl` extension (case-insensitive).
pub fn is_jsonl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(JSONL_EXTENSION))
        .unwrap_or(false)
}
