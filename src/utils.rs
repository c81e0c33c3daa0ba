//! Formatting helpers for human-readable run summaries.

/// Render an integer with `,` thousands separators.
pub fn format_with_commas(value: u128) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}

/// Render a `0.0..=1.0` share as a percentage with two decimals.
pub fn format_share(share: f64) -> String {
    format!("{:.2}%", share * 100.0)
}
