//! Prompt wording for the stock analysis steps.

/// The set of labels the classification step chooses from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationScheme {
    /// What is being classified, as it appears in the prompt (e.g. `"text"`).
    pub subject: String,
    /// Allowed category labels.
    pub categories: Vec<String>,
}

impl ClassificationScheme {
    /// Creates a scheme from a subject noun and category labels.
    pub fn new<S: Into<String>>(
        subject: impl Into<String>,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            subject: subject.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Broad content-type labels for arbitrary text.
    pub fn general() -> Self {
        Self::new("text", ["News", "Blog", "Research", "Other"])
    }

    /// Topic labels for long-form blog articles.
    pub fn article() -> Self {
        Self::new(
            "article",
            [
                "Technical/Programming",
                "Data Science/AI",
                "Business/Entrepreneurship",
                "Personal Development",
                "Design/UX",
                "Marketing",
                "Opinion/Editorial",
            ],
        )
    }

    /// Renders the classification prompt source for this scheme.
    pub fn template(&self) -> String {
        format!(
            "Classify the following {subject} into exactly one of these categories: {categories}.\n\
             Reply with the category name only.\n\n\
             Text: {{text}}\n\n\
             Category:",
            subject = self.subject,
            categories = self.categories.join(", "),
        )
    }
}

impl Default for ClassificationScheme {
    fn default() -> Self {
        Self::general()
    }
}

pub(crate) const ENTITY_EXTRACTION: &str = "\
Extract all named entities (people, organizations, locations) from the following text.
Reply with a single comma-separated list and nothing else.

Text: {text}

Entities:";

pub(crate) const SUMMARIZATION: &str = "\
Summarize the following text in one short sentence.

Text: {text}

Summary:";

pub(crate) const SENTIMENT_TONE: &str = "\
Analyze the sentiment and tone of the following article.

Text: {text}

Respond in exactly this format:
Sentiment: <Positive/Neutral/Negative>
Tone: <Informative/Critical/Emotional/...>";

pub(crate) const STRUCTURE_SEO: &str = "\
Analyze the structure and SEO qualities of the following article.

Text: {text}

Return:
- Heading count
- Clear introduction and conclusion (Yes/No)
- Title SEO score (0 to 100)
- Formatting quality (Good/Poor)";

pub(crate) const ENGAGEMENT_SCORE: &str = "\
Evaluate the quality and engagement potential of the following article.

Title: {title}
Text: {text}

Respond with:
- Clarity score (0-10)
- Engagement prediction (High/Medium/Low)
- Readability (Easy/Medium/Hard)";

/// Prompt used by the connectivity check.
pub const CONNECTIVITY_CHECK: &str = "Hello! Are you working?";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptTemplate;

    #[test]
    fn classification_template_reads_only_text() {
        let template = PromptTemplate::new(ClassificationScheme::article().template());
        let reads: Vec<_> = template.placeholders().iter().map(|f| f.as_str()).collect();
        assert_eq!(reads, vec!["text"]);
    }

    #[test]
    fn classification_template_lists_categories() {
        let source = ClassificationScheme::general().template();
        assert!(source.contains("News, Blog, Research, Other"));
        assert!(source.contains("Classify the following text"));
    }

    #[test]
    fn engagement_template_reads_title_and_text() {
        let template = PromptTemplate::new(ENGAGEMENT_SCORE);
        let reads: Vec<_> = template.placeholders().iter().map(|f| f.as_str()).collect();
        assert_eq!(reads, vec!["title", "text"]);
    }

    #[test]
    fn sentiment_format_hints_are_not_placeholders() {
        let template = PromptTemplate::new(SENTIMENT_TONE);
        assert_eq!(template.placeholders().len(), 1);
    }
}
