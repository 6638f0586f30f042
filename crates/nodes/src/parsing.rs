//! Strategies for turning free-form completion text into record fields.
//!
//! The text service gives no guarantee about the shape of its answer. Each
//! parser states which fields it produces and applies a [`ParsePolicy`] when
//! the answer does not contain what it needs:
//!
//! - [`ParsePolicy::Strict`] fails with a [`ParseError`], which fails the step
//!   and therefore the whole invocation.
//! - [`ParsePolicy::Lenient`] leaves the unmet field out of the partial record.

use pipeline::{FieldName, ParseError, Record};
use tracing::debug;

/// What to do when the completion lacks an expected part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Fail with a [`ParseError`].
    #[default]
    Strict,
    /// Omit the field.
    Lenient,
}

/// Derives a partial record from completion text.
pub trait OutputParser: Send + Sync {
    /// Fields this parser can produce.
    fn fields(&self) -> &[FieldName];

    /// Fields of [`fields`](Self::fields) that may be missing from a
    /// successful parse. Lenient parsers guarantee none of their fields.
    fn optional_fields(&self) -> &[FieldName];

    /// Parses `raw` into a partial record containing only [`fields`](Self::fields).
    fn parse(&self, raw: &str) -> Result<Record, ParseError>;
}

// ---------------------------------------------------------------------------

/// Whole completion, trimmed, as a single string field.
#[derive(Debug, Clone)]
pub struct Trimmed {
    fields: Vec<FieldName>,
    policy: ParsePolicy,
}

impl Trimmed {
    /// Writes the trimmed completion to `field`.
    pub fn new(field: FieldName, policy: ParsePolicy) -> Self {
        Self {
            fields: vec![field],
            policy,
        }
    }
}

impl OutputParser for Trimmed {
    fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    fn optional_fields(&self) -> &[FieldName] {
        optional(self.policy, &self.fields)
    }

    fn parse(&self, raw: &str) -> Result<Record, ParseError> {
        let field = &self.fields[0];
        let value = raw.trim();
        if value.is_empty() {
            return unmet(self.policy, field, || ParseError::EmptyOutput {
                field: field.to_string(),
            });
        }
        Ok(Record::new().with_field(field.as_str(), value))
    }
}

// ---------------------------------------------------------------------------

/// Completion split on a delimiter into a list of strings.
///
/// Items are trimmed and empty items dropped, so `"a, b,, c,"` becomes
/// `["a", "b", "c"]`.
#[derive(Debug, Clone)]
pub struct Delimited {
    fields: Vec<FieldName>,
    delimiter: char,
    policy: ParsePolicy,
}

impl Delimited {
    /// Writes the items of the completion, split on `delimiter`, to `field`.
    pub fn new(field: FieldName, delimiter: char, policy: ParsePolicy) -> Self {
        Self {
            fields: vec![field],
            delimiter,
            policy,
        }
    }
}

impl OutputParser for Delimited {
    fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    fn optional_fields(&self) -> &[FieldName] {
        optional(self.policy, &self.fields)
    }

    fn parse(&self, raw: &str) -> Result<Record, ParseError> {
        let field = &self.fields[0];
        let items: Vec<String> = raw
            .trim()
            .split(self.delimiter)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect();
        if items.is_empty() {
            return unmet(self.policy, field, || ParseError::EmptyOutput {
                field: field.to_string(),
            });
        }
        Ok(Record::new().with_field(field.as_str(), items))
    }
}

// ---------------------------------------------------------------------------

/// One field per `Label: value` line.
///
/// If any line of the completion starts with one of the configured labels
/// (case-insensitive, optionally wrapped in markdown bullets or bold markers),
/// values are looked up by label wherever they appear. Otherwise the answer is
/// treated as unlabelled and the n-th non-empty line fills the n-th field,
/// skipping lines that end in `:`.
#[derive(Debug, Clone)]
pub struct LabeledLines {
    labels: Vec<String>,
    fields: Vec<FieldName>,
    policy: ParsePolicy,
}

impl LabeledLines {
    /// `pairs` maps each label to the field its value is written to.
    pub fn new(
        pairs: impl IntoIterator<Item = (&'static str, FieldName)>,
        policy: ParsePolicy,
    ) -> Self {
        let (labels, fields) = pairs
            .into_iter()
            .map(|(label, field)| (label.to_owned(), field))
            .unzip();
        Self {
            labels,
            fields,
            policy,
        }
    }
}

impl OutputParser for LabeledLines {
    fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    fn optional_fields(&self) -> &[FieldName] {
        optional(self.policy, &self.fields)
    }

    fn parse(&self, raw: &str) -> Result<Record, ParseError> {
        let lines: Vec<&str> = raw
            .lines()
            .map(clean_line)
            .filter(|line| !line.is_empty())
            .collect();
        let labelled = lines
            .iter()
            .any(|line| self.labels.iter().any(|label| strip_label(line, label).is_some()));

        // Preamble lines such as "Here is my analysis:" carry no value.
        let unlabelled: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|line| !line.ends_with(':'))
            .collect();

        let mut partial = Record::new();
        for (position, (label, field)) in self.labels.iter().zip(&self.fields).enumerate() {
            let value = if labelled {
                lines.iter().find_map(|line| strip_label(line, label))
            } else {
                unlabelled.get(position).map(|line| line.trim_matches('*').trim())
            };

            match value.filter(|v| !v.is_empty()) {
                Some(value) => partial.insert(field.as_str(), value),
                None => {
                    if self.policy == ParsePolicy::Strict {
                        return Err(ParseError::MissingLabel {
                            label: label.clone(),
                            lines: lines.len(),
                        });
                    }
                    debug!(
                        label = %label,
                        lines = lines.len(),
                        "Label missing from completion; leaving field absent"
                    );
                }
            }
        }
        Ok(partial)
    }
}

/// Trims whitespace and leading bullet markers.
fn clean_line(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '*' | '•'))
        .trim_end()
}

/// Returns the value after `label:` if `line` starts with `label`.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = line[label.len()..].trim_start_matches('*').trim_start();
    let value = rest.strip_prefix(':')?;
    Some(value.trim().trim_matches('*').trim())
}

fn optional(policy: ParsePolicy, fields: &[FieldName]) -> &[FieldName] {
    match policy {
        ParsePolicy::Strict => &[],
        ParsePolicy::Lenient => fields,
    }
}

fn unmet(
    policy: ParsePolicy,
    field: &FieldName,
    error: impl FnOnce() -> ParseError,
) -> Result<Record, ParseError> {
    match policy {
        ParsePolicy::Strict => Err(error()),
        ParsePolicy::Lenient => {
            debug!(field = %field, "Completion empty; leaving field absent");
            Ok(Record::new())
        }
    }
}
