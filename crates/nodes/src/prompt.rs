//! `{field}` placeholder templates rendered from record fields.

use pipeline::{FieldName, Record, StepError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(FieldName),
}

/// A prompt template with `{field}` placeholders.
///
/// A placeholder is a brace pair around a non-empty run of lowercase ASCII
/// letters, digits and underscores. Any other brace is literal text, so JSON
/// snippets or `{Positive/Negative}` hints in a template are left alone.
///
/// The placeholders double as the declared reads of the step that renders the
/// template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    placeholders: Vec<FieldName>,
}

impl PromptTemplate {
    /// Parses `source` into literal and placeholder segments.
    pub fn new(source: impl AsRef<str>) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source.as_ref();

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let field = after
                .find('}')
                .map(|close| &after[..close])
                .filter(|name| is_field_name(name))
                .and_then(FieldName::new);

            match field {
                Some(field) => {
                    literal.push_str(&rest[..open]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    rest = &after[field.as_str().len() + 1..];
                    segments.push(Segment::Field(field));
                }
                None => {
                    literal.push_str(&rest[..=open]);
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let mut placeholders: Vec<FieldName> = Vec::new();
        for segment in &segments {
            if let Segment::Field(field) = segment {
                if !placeholders.contains(field) {
                    placeholders.push(field.clone());
                }
            }
        }

        Self {
            segments,
            placeholders,
        }
    }

    /// Distinct placeholder fields in order of first appearance.
    pub fn placeholders(&self) -> &[FieldName] {
        &self.placeholders
    }

    /// Substitutes every placeholder with the string value of its field.
    pub fn render(&self, record: &Record) -> Result<String, StepError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(record.require_str(field.as_str())?),
            }
        }
        Ok(out)
    }
}

fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholders_from_the_record() {
        let template = PromptTemplate::new("Title: {title}\nText: {text}\n\nAgain: {text}");
        let record = Record::from_text("body").with_field("title", "Head");

        assert_eq!(
            template
                .placeholders()
                .iter()
                .map(FieldName::as_str)
                .collect::<Vec<_>>(),
            vec!["title", "text"]
        );
        assert_eq!(
            template.render(&record).unwrap(),
            "Title: Head\nText: body\n\nAgain: body"
        );
    }

    #[test]
    fn non_placeholder_braces_are_literal() {
        let template = PromptTemplate::new("Reply as {\"label\": ...} or {Positive/Negative} for {text}{");
        assert_eq!(template.placeholders().len(), 1);
        assert_eq!(
            template.render(&Record::from_text("x")).unwrap(),
            "Reply as {\"label\": ...} or {Positive/Negative} for x{"
        );
    }

    #[test]
    fn missing_or_non_string_fields_fail_rendering() {
        let template = PromptTemplate::new("{title}");
        assert!(matches!(
            template.render(&Record::new()),
            Err(StepError::MissingField { field }) if field == "title"
        ));
        assert!(matches!(
            template.render(&Record::new().with_field("title", 3)),
            Err(StepError::InvalidField { .. })
        ));
    }

    #[test]
    fn templates_without_placeholders_render_verbatim() {
        let template = PromptTemplate::new("Hello! Are you working?");
        assert!(template.placeholders().is_empty());
        assert_eq!(template.render(&Record::new()).unwrap(), "Hello! Are you working?");
    }
}
