//! Constructors for the stock LLM analysis steps.
//!
//! | Step | Reads | Writes | Parser | On malformed output |
//! |------|-------|--------|--------|---------------------|
//! | [`classification`] | text | classification | [`Trimmed`] | error |
//! | [`entity_extraction`] | text | entities | [`Delimited`] on `,` | error if no items |
//! | [`summarization`] | text | summary | [`Trimmed`] | error |
//! | [`sentiment_tone`] | text | sentiment, tone | [`LabeledLines`] | missing label left absent |
//! | [`structure_seo`] | text | structure | [`Trimmed`] | error |
//! | [`engagement_score`] | title, text | engagement_analysis | [`Trimmed`] | error |

use std::sync::Arc;

use pipeline::{FieldName, ModelSettings, TextService};

use crate::fields;
use crate::parsing::{Delimited, LabeledLines, ParsePolicy, Trimmed};
use crate::prompt::PromptTemplate;
use crate::prompt_step::PromptStep;
use crate::templates::{self, ClassificationScheme};

/// Assigns one category from `scheme`.
pub fn classification(
    service: Arc<dyn TextService>,
    settings: ModelSettings,
    scheme: &ClassificationScheme,
) -> PromptStep {
    PromptStep::new(
        PromptTemplate::new(scheme.template()),
        Trimmed::new(FieldName::from_static(fields::CLASSIFICATION), ParsePolicy::Strict),
        service,
        settings,
    )
}

/// Extracts named entities as a list of strings.
pub fn entity_extraction(service: Arc<dyn TextService>, settings: ModelSettings) -> PromptStep {
    PromptStep::new(
        PromptTemplate::new(templates::ENTITY_EXTRACTION),
        Delimited::new(FieldName::from_static(fields::ENTITIES), ',', ParsePolicy::Strict),
        service,
        settings,
    )
}

/// Summarises the text in one sentence.
pub fn summarization(service: Arc<dyn TextService>, settings: ModelSettings) -> PromptStep {
    PromptStep::new(
        PromptTemplate::new(templates::SUMMARIZATION),
        Trimmed::new(FieldName::from_static(fields::SUMMARY), ParsePolicy::Strict),
        service,
        settings,
    )
}

/// Labels sentiment and tone.
///
/// Lenient: a completion lacking one of the two lines yields a partial record
/// without that field rather than failing the run.
pub fn sentiment_tone(service: Arc<dyn TextService>, settings: ModelSettings) -> PromptStep {
    PromptStep::new(
        PromptTemplate::new(templates::SENTIMENT_TONE),
        LabeledLines::new(
            [
                ("Sentiment", FieldName::from_static(fields::SENTIMENT)),
                ("Tone", FieldName::from_static(fields::TONE)),
            ],
            ParsePolicy::Lenient,
        ),
        service,
        settings,
    )
}

/// Free-text assessment of headings, intro/conclusion, title SEO and formatting.
pub fn structure_seo(service: Arc<dyn TextService>, settings: ModelSettings) -> PromptStep {
    PromptStep::new(
        PromptTemplate::new(templates::STRUCTURE_SEO),
        Trimmed::new(FieldName::from_static(fields::STRUCTURE), ParsePolicy::Strict),
        service,
        settings,
    )
}

/// Free-text assessment of clarity, engagement and readability.
pub fn engagement_score(service: Arc<dyn TextService>, settings: ModelSettings) -> PromptStep {
    PromptStep::new(
        PromptTemplate::new(templates::ENGAGEMENT_SCORE),
        Trimmed::new(
            FieldName::from_static(fields::ENGAGEMENT_ANALYSIS),
            ParsePolicy::Strict,
        ),
        service,
        settings,
    )
}
