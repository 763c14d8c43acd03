//! Shared utility functions.

use chrono::NaiveDate;

/// Date format used in snapshot file names.
pub const SNAPSHOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// File name of the snapshot taken on `date`, e.g. `2024-01-31.json`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{}.{SNAPSHOT_EXTENSION}", date.format(SNAPSHOT_DATE_FORMAT))
}

/// Parses a snapshot file stem back into its date.
///
/// Only the zero-padded form is accepted, so the parsed date always maps back
/// to the same file name.
pub fn parse_snapshot_date(stem: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(stem, SNAPSHOT_DATE_FORMAT)
        .ok()
        .filter(|date| date.format(SNAPSHOT_DATE_FORMAT).to_string() == stem)
}

/// Formats an integer with `,` as thousands separator.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a delta with an explicit sign and thousands separators: `+1,500`.
pub fn format_signed_thousands(value: i64) -> String {
    let sign = if value < 0 { '-' } else { '+' };
    format!("{sign}{}", format_thousands(value.unsigned_abs()))
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// Chunks break on line boundaries where possible; a single line longer than
/// `max_chars` is cut at character boundaries.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed <= max_chars {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Escapes characters Discord markdown would otherwise interpret.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '~' | '`' | '|' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
