//! Port traits for the external collaborators steps delegate to.
//!
//! Infrastructure crates implement these (`llm` for [`TextService`], `fetch`
//! for [`PageFetcher`]); steps receive them as `Arc<dyn ...>` handles so tests
//! can substitute stubs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{FetchError, ServiceError, Temperature, TokenUsage};

// ---------------------------------------------------------------------------
// Text service
// ---------------------------------------------------------------------------

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// The request itself.
    User,
    /// A prior model answer.
    Assistant,
}

/// One message of a [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who the message is from.
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// A short message list sent to the text service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Messages in conversation order.
    pub messages: Vec<Message>,
}

impl Prompt {
    /// A prompt consisting of a single user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                role: Role::User,
                content: content.into(),
            }],
        }
    }

    /// Prepends a system message.
    pub fn with_system(mut self, content: impl Into<String>) -> Self {
        self.messages.insert(
            0,
            Message {
                role: Role::System,
                content: content.into(),
            },
        );
        self
    }

    /// Concatenated content of all user messages.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Model selection and sampling configuration for a completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature.
    pub temperature: Temperature,
}

impl ModelSettings {
    /// Settings for `model` at temperature `0.0`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: Temperature::default(),
        }
    }

    /// Overrides the temperature.
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::new("gpt-4o-mini")
    }
}

/// The service's answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text. No format guarantees; callers must parse defensively.
    pub text: String,
    /// Token usage, when the service reports it.
    pub usage: Option<TokenUsage>,
}

impl Completion {
    /// A completion with no usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// Free-form text completion endpoint.
///
/// From the caller's perspective each call is a single request/response; the
/// engine awaits it to completion before moving on.
#[async_trait]
pub trait TextService: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    async fn complete(
        &self,
        prompt: &Prompt,
        settings: &ModelSettings,
    ) -> Result<Completion, ServiceError>;
}

// ---------------------------------------------------------------------------
// Page fetcher
// ---------------------------------------------------------------------------

/// A fetched and parsed HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// The URL that was fetched.
    pub url: String,
    /// Content of the `<title>` element, if any.
    pub title: Option<String>,
    /// Text of every `<p>` element in document order.
    pub paragraphs: Vec<String>,
    /// `<meta name="..." content="...">` pairs, keyed by lower-cased name.
    pub meta: BTreeMap<String, String>,
}

impl FetchedPage {
    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    /// Content of the named meta tag (case-insensitive name).
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Retrieves a document by URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches and parses the page at `url`.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_message_goes_first() {
        let prompt = Prompt::user("classify this").with_system("be terse");
        assert_eq!(prompt.messages[0].role, Role::System);
        assert_eq!(prompt.user_text(), "classify this");
    }

    #[test]
    fn page_text_joins_paragraphs() {
        let mut page = FetchedPage {
            paragraphs: vec!["one".into(), "two".into()],
            ..FetchedPage::default()
        };
        page.meta.insert("author".into(), "Ada".into());
        assert_eq!(page.text(), "one\ntwo");
        assert_eq!(page.meta("Author"), Some("Ada"));
        assert_eq!(page.meta("description"), None);
    }

    #[test]
    fn roles_serialise_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
