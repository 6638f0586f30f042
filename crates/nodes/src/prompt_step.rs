//! The generic prompt-and-parse step every LLM analysis is built from.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{FieldName, ModelSettings, Prompt, Record, Step, StepError, TextService};
use tracing::debug;

use crate::parsing::OutputParser;
use crate::prompt::PromptTemplate;

/// Renders a template from the record, sends it to the text service, and
/// parses the completion into a partial record.
///
/// Declared reads are the template's placeholders; declared writes are the
/// parser's fields.
pub struct PromptStep {
    template: PromptTemplate,
    parser: Box<dyn OutputParser>,
    service: Arc<dyn TextService>,
    settings: ModelSettings,
    system: Option<String>,
}

impl PromptStep {
    /// Builds a step from its parts.
    pub fn new(
        template: PromptTemplate,
        parser: impl OutputParser + 'static,
        service: Arc<dyn TextService>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            template,
            parser: Box::new(parser),
            service,
            settings,
            system: None,
        }
    }

    /// Adds a system message ahead of the rendered prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Renders the prompt this step would send for `record`.
    pub fn prompt(&self, record: &Record) -> Result<Prompt, StepError> {
        let prompt = Prompt::user(self.template.render(record)?);
        Ok(match &self.system {
            Some(system) => prompt.with_system(system.clone()),
            None => prompt,
        })
    }
}

#[async_trait]
impl Step for PromptStep {
    fn reads(&self) -> &[FieldName] {
        self.template.placeholders()
    }

    fn writes(&self) -> &[FieldName] {
        self.parser.fields()
    }

    fn optional_writes(&self) -> &[FieldName] {
        self.parser.optional_fields()
    }

    async fn run(&self, record: &Record) -> Result<Record, StepError> {
        let prompt = self.prompt(record)?;
        let completion = self.service.complete(&prompt, &self.settings).await?;

        if let Some(usage) = completion.usage {
            debug!(
                model = %self.settings.model,
                prompt_tokens = usage.prompt.as_u64(),
                completion_tokens = usage.completion.as_u64(),
                "Completion received"
            );
        }

        Ok(self.parser.parse(&completion.text)?)
    }
}
