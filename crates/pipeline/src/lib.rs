//! Core analysis domain for TextLens.
//!
//! This crate contains the accumulating [`Record`], the [`Step`] contract, the
//! pipeline graph builder and execution engine, newtype identifiers, shared
//! value types, error types, and the port traits infrastructure crates
//! implement. Infrastructure crates implement the traits defined here; they
//! never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `llm` and `fetch` crates define *how* to
//! supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`StepName`, `FieldName`, `PipelineRunId`, ...) |
//! | [`types`] | Shared value types (`TokenCount`, `Temperature`, `Timestamp`) |
//! | [`errors`] | Pipeline, step and collaborator error types |
//! | [`record`] | The accumulating key/value [`Record`] |
//! | [`step`] | The [`Step`] trait and the closure adapter [`FnStep`] |
//! | [`graph`] | [`PipelineBuilder`] and [`CompiledPipeline`] |
//! | [`run`] | Invocation state machine and observers |
//! | [`ports`] | [`TextService`] and [`PageFetcher`] collaborator traits |

pub mod errors;
pub mod graph;
pub mod identifiers;
pub mod ports;
pub mod record;
pub mod run;
pub mod step;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{FetchError, ParseError, PipelineError, ServiceError, StepError};
pub use graph::{CompiledPipeline, PipelineBuilder};
pub use identifiers::{FieldName, PipelineName, PipelineRunId, StepName, END};
pub use ports::{
    Completion, FetchedPage, Message, ModelSettings, PageFetcher, Prompt, Role, TextService,
};
pub use record::Record;
pub use run::{NoopObserver, RunLog, RunObserver, RunState, StepTrace};
pub use step::{FnStep, Step};
pub use types::{Temperature, Timestamp, TokenCount, TokenUsage};
