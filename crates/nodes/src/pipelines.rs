//! The two stock pipeline assemblies.

use std::sync::Arc;

use pipeline::{
    CompiledPipeline, FieldName, ModelSettings, PageFetcher, PipelineBuilder, PipelineError,
    PipelineName, TextService, END,
};

use crate::analysis;
use crate::fetch_article::FetchArticleStep;
use crate::fields::{self, steps};
use crate::templates::ClassificationScheme;

/// classification → entity extraction → summarization, seeded with `{text}`.
pub fn text_analysis_pipeline(
    service: Arc<dyn TextService>,
    settings: &ModelSettings,
) -> Result<CompiledPipeline, PipelineError> {
    let mut builder = PipelineBuilder::new(PipelineName::from_static("text-analysis"));
    builder.declare_input(FieldName::from_static(fields::TEXT));
    builder
        .add_step(
            steps::CLASSIFICATION,
            analysis::classification(
                Arc::clone(&service),
                settings.clone(),
                &ClassificationScheme::general(),
            ),
        )?
        .add_step(
            steps::ENTITY_EXTRACTION,
            analysis::entity_extraction(Arc::clone(&service), settings.clone()),
        )?
        .add_step(
            steps::SUMMARIZATION,
            analysis::summarization(service, settings.clone()),
        )?;

    builder
        .set_entry(steps::CLASSIFICATION)
        .add_edge(steps::CLASSIFICATION, steps::ENTITY_EXTRACTION)
        .add_edge(steps::ENTITY_EXTRACTION, steps::SUMMARIZATION)
        .add_edge(steps::SUMMARIZATION, END);
    builder.compile()
}

/// fetch → classification → entity extraction → summarization →
/// sentiment/tone → structure/SEO → engagement, seeded with `{url}`.
pub fn article_analysis_pipeline(
    service: Arc<dyn TextService>,
    fetcher: Arc<dyn PageFetcher>,
    settings: &ModelSettings,
) -> Result<CompiledPipeline, PipelineError> {
    let mut builder = PipelineBuilder::new(PipelineName::from_static("article-analysis"));
    builder.declare_input(FieldName::from_static(fields::URL));
    builder
        .add_step(steps::FETCH_ARTICLE, FetchArticleStep::new(fetcher))?
        .add_step(
            steps::CLASSIFICATION,
            analysis::classification(
                Arc::clone(&service),
                settings.clone(),
                &ClassificationScheme::article(),
            ),
        )?
        .add_step(
            steps::ENTITY_EXTRACTION,
            analysis::entity_extraction(Arc::clone(&service), settings.clone()),
        )?
        .add_step(
            steps::SUMMARIZATION,
            analysis::summarization(Arc::clone(&service), settings.clone()),
        )?
        .add_step(
            steps::SENTIMENT_TONE,
            analysis::sentiment_tone(Arc::clone(&service), settings.clone()),
        )?
        .add_step(
            steps::STRUCTURE_SEO,
            analysis::structure_seo(Arc::clone(&service), settings.clone()),
        )?
        .add_step(
            steps::ENGAGEMENT_SCORE,
            analysis::engagement_score(service, settings.clone()),
        )?;

    let order = [
        steps::FETCH_ARTICLE,
        steps::CLASSIFICATION,
        steps::ENTITY_EXTRACTION,
        steps::SUMMARIZATION,
        steps::SENTIMENT_TONE,
        steps::STRUCTURE_SEO,
        steps::ENGAGEMENT_SCORE,
    ];
    builder.set_entry(order[0]);
    for pair in order.windows(2) {
        builder.add_edge(pair[0], pair[1]);
    }
    builder.add_edge(steps::ENGAGEMENT_SCORE, END);
    builder.compile()
}
