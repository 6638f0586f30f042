//! Individual analysis steps against stubbed collaborators.

mod common;

use std::sync::Arc;

use common::{sample_page, StubFetcher, StubService};
use nodes::{analysis, fields, ClassificationScheme, FetchArticleStep};
use pipeline::{
    FetchError, FetchedPage, ModelSettings, ParseError, Record, Role, ServiceError, Step,
    StepError,
};
use serde_json::json;

fn settings() -> ModelSettings {
    ModelSettings::default()
}

#[tokio::test]
async fn sentiment_tone_splits_two_lines() {
    let service = Arc::new(StubService::fixed("Positive\nInformative"));
    let step = analysis::sentiment_tone(service, settings());

    let partial = step.run(&Record::from_text("Great news!")).await.unwrap();

    assert_eq!(
        serde_json::to_value(&partial).unwrap(),
        json!({"sentiment": "Positive", "tone": "Informative"})
    );
}

#[tokio::test]
async fn sentiment_tone_tolerates_a_missing_tone_line() {
    let service = Arc::new(StubService::fixed("Sentiment: Negative"));
    let step = analysis::sentiment_tone(service, settings());

    let partial = step.run(&Record::from_text("Awful.")).await.unwrap();

    assert_eq!(partial.get_str(fields::SENTIMENT), Some("Negative"));
    assert!(!partial.contains(fields::TONE));
}

#[tokio::test]
async fn entity_extraction_splits_on_commas() {
    let service = Arc::new(StubService::fixed("Alice, Acme Corp, Paris"));
    let step = analysis::entity_extraction(service, settings());

    let partial = step.run(&Record::from_text("...")).await.unwrap();

    assert_eq!(
        serde_json::to_value(&partial).unwrap(),
        json!({"entities": ["Alice", "Acme Corp", "Paris"]})
    );
}

#[tokio::test]
async fn classification_trims_and_sends_the_text() {
    let service = Arc::new(StubService::fixed("  Research \n"));
    let step = analysis::classification(
        Arc::clone(&service) as Arc<dyn pipeline::TextService>,
        settings(),
        &ClassificationScheme::general(),
    );

    let partial = step
        .run(&Record::from_text("We measured the thing."))
        .await
        .unwrap();

    assert_eq!(partial.get_str(fields::CLASSIFICATION), Some("Research"));
    let prompts = service.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].messages.len(), 1);
    assert_eq!(prompts[0].messages[0].role, Role::User);
    assert!(prompts[0].user_text().contains("We measured the thing."));
    assert!(prompts[0].user_text().contains("News, Blog, Research, Other"));
}

#[tokio::test]
async fn empty_summary_is_a_parse_error() {
    let service = Arc::new(StubService::fixed("   "));
    let step = analysis::summarization(service, settings());

    let err = step.run(&Record::from_text("text")).await.unwrap_err();

    assert!(matches!(
        err,
        StepError::Parse(ParseError::EmptyOutput { field }) if field == fields::SUMMARY
    ));
}

#[tokio::test]
async fn service_errors_propagate_unchanged() {
    let service = Arc::new(StubService::failing(ServiceError::Api {
        status: 401,
        message: "invalid api key".into(),
    }));
    let step = analysis::structure_seo(service, settings());

    let err = step.run(&Record::from_text("text")).await.unwrap_err();

    assert!(matches!(err, StepError::Service(ServiceError::Api { status: 401, .. })));
}

#[tokio::test]
async fn engagement_needs_a_title() {
    let service = Arc::new(StubService::fixed("Clarity: 8"));
    let step = analysis::engagement_score(Arc::clone(&service) as _, settings());

    let err = step.run(&Record::from_text("body")).await.unwrap_err();
    assert!(matches!(err, StepError::MissingField { field } if field == fields::TITLE));
    assert!(service.prompts().is_empty());

    let partial = step
        .run(&Record::from_text("body").with_field(fields::TITLE, "Headline"))
        .await
        .unwrap();
    assert_eq!(partial.get_str(fields::ENGAGEMENT_ANALYSIS), Some("Clarity: 8"));
    assert!(service.prompts()[0].user_text().contains("Title: Headline"));
}

#[tokio::test]
async fn declared_contracts_match_the_templates() {
    let service: Arc<dyn pipeline::TextService> = Arc::new(StubService::fixed("x"));
    let step = analysis::engagement_score(Arc::clone(&service), settings());
    let reads: Vec<&str> = step.reads().iter().map(|f| f.as_str()).collect();
    let writes: Vec<&str> = step.writes().iter().map(|f| f.as_str()).collect();
    assert_eq!(reads, vec![fields::TITLE, fields::TEXT]);
    assert_eq!(writes, vec![fields::ENGAGEMENT_ANALYSIS]);

    let sentiment = analysis::sentiment_tone(service, settings());
    let writes: Vec<&str> = sentiment.writes().iter().map(|f| f.as_str()).collect();
    assert_eq!(writes, vec![fields::SENTIMENT, fields::TONE]);
}

#[tokio::test]
async fn system_messages_precede_the_rendered_prompt() {
    let service = Arc::new(StubService::fixed("ok"));
    let step = analysis::summarization(Arc::clone(&service) as _, settings())
        .with_system("You are a careful analyst.");

    step.run(&Record::from_text("body")).await.unwrap();

    let prompt = &service.prompts()[0];
    assert_eq!(prompt.messages[0].role, Role::System);
    assert_eq!(prompt.messages[1].role, Role::User);
}

#[tokio::test]
async fn fetch_step_writes_text_title_and_author() {
    let fetcher = Arc::new(StubFetcher::page(sample_page("https://example.com/a")));
    let step = FetchArticleStep::new(Arc::clone(&fetcher) as _);

    let partial = step
        .run(&Record::from_url("https://example.com/a"))
        .await
        .unwrap();

    assert_eq!(
        partial.get_str(fields::TEXT),
        Some("Building projects is the fastest way to learn.\nStart with something small.")
    );
    assert_eq!(partial.get_str(fields::TITLE), Some("Ten Project Ideas"));
    assert_eq!(partial.get_str(fields::AUTHOR), Some("Ryan Blake"));
    assert_eq!(fetcher.requested(), vec!["https://example.com/a"]);
}

#[tokio::test]
async fn fetch_step_defaults_missing_metadata() {
    let page = FetchedPage {
        url: "https://example.com/b".into(),
        paragraphs: vec!["Only text.".into()],
        ..FetchedPage::default()
    };
    let step = FetchArticleStep::new(Arc::new(StubFetcher::page(page)));

    let partial = step
        .run(&Record::from_url("https://example.com/b"))
        .await
        .unwrap();

    assert_eq!(partial.get_str(fields::AUTHOR), Some(fields::UNKNOWN_AUTHOR));
    assert_eq!(partial.get_str(fields::TITLE), Some(""));
}

#[tokio::test]
async fn fetch_errors_propagate() {
    let step = FetchArticleStep::new(Arc::new(StubFetcher::failing(FetchError::Status {
        url: "https://example.com/missing".into(),
        status: 404,
    })));

    let err = step
        .run(&Record::from_url("https://example.com/missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, StepError::Fetch(FetchError::Status { status: 404, .. })));
}
