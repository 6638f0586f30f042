//! Record field and step names used by the stock analysis steps.

/// Raw text under analysis.
pub const TEXT: &str = "text";
/// Source URL of an article.
pub const URL: &str = "url";
/// Article title.
pub const TITLE: &str = "title";
/// Article author.
pub const AUTHOR: &str = "author";
/// Category label.
pub const CLASSIFICATION: &str = "classification";
/// List of named entities.
pub const ENTITIES: &str = "entities";
/// One-sentence summary.
pub const SUMMARY: &str = "summary";
/// Sentiment label.
pub const SENTIMENT: &str = "sentiment";
/// Tone label.
pub const TONE: &str = "tone";
/// Free-text structure and SEO assessment.
pub const STRUCTURE: &str = "structure";
/// Free-text engagement assessment.
pub const ENGAGEMENT_ANALYSIS: &str = "engagement_analysis";

/// Value written to [`AUTHOR`] when the page carries no author meta tag.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Registered step names of the stock pipelines.
pub mod steps {
    /// Fetches the article at `url`.
    pub const FETCH_ARTICLE: &str = "fetch_article_node";
    /// Assigns a category.
    pub const CLASSIFICATION: &str = "classification_node";
    /// Extracts named entities.
    pub const ENTITY_EXTRACTION: &str = "entity_extraction";
    /// Summarises the text.
    pub const SUMMARIZATION: &str = "summarization";
    /// Labels sentiment and tone.
    pub const SENTIMENT_TONE: &str = "sentiment_tone_node";
    /// Assesses structure and SEO.
    pub const STRUCTURE_SEO: &str = "structure_seo_node";
    /// Assesses engagement potential.
    pub const ENGAGEMENT_SCORE: &str = "engagement_score_node";
}
