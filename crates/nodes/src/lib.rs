//! TextLens analysis steps and stock pipelines.
//!
//! This crate provides the LLM analysis steps (classification, entity
//! extraction, summarization, sentiment/tone, structure/SEO, engagement), the
//! article fetch step, the prompt templates and completion parsers they are
//! built from, and the two stock pipeline assemblies.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Steps sequence calls between the [`pipeline`]
//! crate's record and the collaborator ports ([`pipeline::TextService`],
//! [`pipeline::PageFetcher`]). They receive their collaborators as explicit
//! `Arc` handles and hold no global state.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`fields`] | Field and step name constants |
//! | [`prompt`] | `{field}` prompt templates |
//! | [`templates`] | Prompt wording and [`ClassificationScheme`] |
//! | [`parsing`] | Completion parsers and their failure policy |
//! | [`prompt_step`] | The generic prompt-and-parse [`PromptStep`] |
//! | [`analysis`] | Constructors for the stock analysis steps |
//! | [`fetch_article`] | [`FetchArticleStep`] |
//! | [`pipelines`] | [`text_analysis_pipeline`] and [`article_analysis_pipeline`] |

pub mod analysis;
pub mod fetch_article;
pub mod fields;
pub mod parsing;
pub mod pipelines;
pub mod prompt;
pub mod prompt_step;
pub mod templates;

pub use fetch_article::FetchArticleStep;
pub use parsing::{Delimited, LabeledLines, OutputParser, ParsePolicy, Trimmed};
pub use pipelines::{article_analysis_pipeline, text_analysis_pipeline};
pub use prompt::PromptTemplate;
pub use prompt_step::PromptStep;
pub use templates::{ClassificationScheme, CONNECTIVITY_CHECK};
