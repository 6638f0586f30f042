//! Turns a `url` field into article `text`, `title` and `author`.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{FieldName, PageFetcher, Record, Step, StepError};
use tracing::debug;

use crate::fields;

/// Fetches the page at `url` and writes `{text, title, author}`.
///
/// `text` is the page's paragraphs joined with newlines, `title` is empty when
/// the page has no `<title>`, and `author` falls back to
/// [`fields::UNKNOWN_AUTHOR`] when there is no `author` meta tag. Fetch
/// failures are propagated unchanged.
pub struct FetchArticleStep {
    fetcher: Arc<dyn PageFetcher>,
    reads: Vec<FieldName>,
    writes: Vec<FieldName>,
}

impl FetchArticleStep {
    /// Creates the step around a fetcher.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            reads: vec![FieldName::from_static(fields::URL)],
            writes: vec![
                FieldName::from_static(fields::TEXT),
                FieldName::from_static(fields::TITLE),
                FieldName::from_static(fields::AUTHOR),
            ],
        }
    }
}

#[async_trait]
impl Step for FetchArticleStep {
    fn reads(&self) -> &[FieldName] {
        &self.reads
    }

    fn writes(&self) -> &[FieldName] {
        &self.writes
    }

    async fn run(&self, record: &Record) -> Result<Record, StepError> {
        let url = record.require_str(fields::URL)?;
        let page = self.fetcher.fetch(url).await?;

        debug!(
            url = %url,
            paragraphs = page.paragraphs.len(),
            has_title = page.title.is_some(),
            "Article fetched"
        );

        let author = page.meta(fields::AUTHOR).unwrap_or(fields::UNKNOWN_AUTHOR);
        Ok(Record::new()
            .with_field(fields::TEXT, page.text())
            .with_field(fields::TITLE, page.title.clone().unwrap_or_default())
            .with_field(fields::AUTHOR, author))
    }
}
