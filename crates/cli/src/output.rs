//! Rendering of the final record on stdout.

use nodes::fields;
use pipeline::Record;
use serde_json::Value;

/// Display order and labels for the human-readable report. `text` is omitted.
const LABELS: &[(&str, &str)] = &[
    (fields::URL, "URL"),
    (fields::TITLE, "Title"),
    (fields::AUTHOR, "Author"),
    (fields::CLASSIFICATION, "Classification"),
    (fields::ENTITIES, "Entities"),
    (fields::SUMMARY, "Summary"),
    (fields::SENTIMENT, "Sentiment"),
    (fields::TONE, "Tone"),
    (fields::STRUCTURE, "Structure & SEO"),
    (fields::ENGAGEMENT_ANALYSIS, "Engagement"),
];

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// One `Label: value` block per known field present in `record`.
///
/// Multi-line values start on their own line.
pub fn render_report(record: &Record) -> String {
    let mut out = String::new();
    for (field, label) in LABELS {
        let Some(value) = record.get(field) else {
            continue;
        };
        let text = display_value(value);
        if text.contains('\n') {
            out.push_str(&format!("{label}:\n{}\n\n", text.trim_end()));
        } else {
            out.push_str(&format!("{label}: {text}\n"));
        }
    }
    out
}

/// The whole record as pretty-printed JSON.
pub fn render_json(record: &Record) -> serde_json::Result<String> {
    serde_json::to_string_pretty(record)
}
