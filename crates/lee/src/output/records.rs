//! Matched record output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::records::Record;

/// JSON output structure for the filter command.
#[derive(Serialize)]
pub struct RecordsOutput<'a> {
    pub count: usize,
    pub records: &'a [&'a Record],
}

/// Formats records one per line, as JSON lines or pretty-printed JSON.
pub fn format_records(records: &[&Record], pretty: bool) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        if pretty {
            output.push_str(&serde_json::to_string_pretty(record)?);
        } else {
            output.push_str(&serde_json::to_string(record)?);
        }
        output.push('\n');
    }
    Ok(output)
}

/// Formats records as a single JSON document.
pub fn format_records_json(records: &[&Record]) -> Result<String, serde_json::Error> {
    let output = RecordsOutput {
        count: records.len(),
        records,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a match count for display.
pub fn format_count(count: usize, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", count.bold())
    } else {
        format!("{count}\n")
    }
}

/// Formats a match count as JSON.
pub fn format_count_json(count: usize) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({ "count": count }))
}
