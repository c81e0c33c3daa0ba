/// Constants used by quota allocation and session sizing.
pub mod sampling {
    /// Default target sample size for the mini corpus.
    pub const DEFAULT_TARGET: usize = 1400;
}

/// Constants used by the JSONL source reader.
pub mod source {
    /// File extension picked up when an input path is a directory.
    pub const JSONL_EXTENSION: &str = "jsonl";
    /// Minimum interval between streaming progress log lines.
    pub const PROGRESS_REPORT_INTERVAL_MS: u64 = 750;
}

/// Constants used by the record filter stage.
pub mod filter {
    /// No-break space, common in copy-pasted English prose.
    pub const NO_BREAK_SPACE: char = '\u{00A0}';
    /// First code point of the Unicode general punctuation block.
    pub const GENERAL_PUNCTUATION_START: char = '\u{2000}';
    /// Last code point of the Unicode general punctuation block.
    pub const GENERAL_PUNCTUATION_END: char = '\u{206F}';
}

/// Constants used by the command-line front end.
pub mod cli {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub const DEFAULT_LOG_FILTER: &str = "info";
}
