//! Error types for the analysis pipeline domain.
//!
//! [`PipelineError`] covers conditions that stop a pipeline from compiling or
//! from completing an invocation. [`StepError`] is what a single step returns;
//! the engine wraps it in [`PipelineError::StepFailed`] together with the name
//! of the failing step. The collaborator errors ([`ServiceError`],
//! [`FetchError`]) are produced by infrastructure adapters behind the port
//! traits in [`crate::ports`].
//!
//! Nothing here carries retry information: a failed call is propagated and the
//! whole invocation fails.

use thiserror::Error;

use crate::{FieldName, StepName};

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that prevent a pipeline from compiling or an invocation from
/// completing.
///
/// Every variant except [`PipelineError::MissingInput`],
/// [`PipelineError::UndeclaredWrite`], [`PipelineError::MissingWrite`] and
/// [`PipelineError::StepFailed`] is a
/// configuration error reported by `compile()`; a pipeline never runs with an
/// invalid graph.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A step name was empty or collided with the reserved terminal marker.
    #[error("Invalid step name '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Two steps were registered under the same name.
    #[error("Step '{name}' is registered more than once")]
    DuplicateStep {
        /// The name registered twice.
        name: StepName,
    },

    /// `compile()` was called before an entry step was declared.
    #[error("No entry step has been set")]
    NoEntry,

    /// The entry or an edge refers to a step that was never registered.
    #[error("Unknown step '{name}' referenced by {referenced_by}")]
    UnknownStep {
        /// The unregistered name.
        name: String,
        /// Where the reference came from (e.g. `"entry"`, `"edge a -> b"`).
        referenced_by: String,
    },

    /// The graph contains a cycle through the named step.
    #[error("Cycle detected through step '{name}'")]
    Cycle {
        /// A step that lies on the cycle.
        name: StepName,
    },

    /// A registered step cannot be reached from the entry step.
    #[error("Step '{name}' is unreachable from the entry step")]
    Unreachable {
        /// The unreachable step.
        name: StepName,
    },

    /// A step has no path to the terminal marker.
    #[error("Step '{name}' has no path to the end of the pipeline")]
    NoPathToEnd {
        /// The dangling step.
        name: StepName,
    },

    /// A step reads a field that neither the declared inputs nor any step that
    /// always runs before it is guaranteed to write.
    #[error("Step '{step}' reads field '{field}' which no earlier step or declared input provides")]
    UnsatisfiedRead {
        /// The reading step.
        step: StepName,
        /// The unsatisfied field.
        field: FieldName,
    },

    /// The seed record passed to `invoke` lacks a declared input field.
    #[error("Seed record is missing declared input field '{field}'")]
    MissingInput {
        /// The absent input field.
        field: FieldName,
    },

    /// A step returned a field it did not declare in its writes.
    #[error("Step '{step}' wrote undeclared field '{field}'")]
    UndeclaredWrite {
        /// The offending step.
        step: StepName,
        /// The field it was not allowed to write.
        field: String,
    },

    /// A step left out a field it guarantees to write.
    #[error("Step '{step}' did not write guaranteed field '{field}'")]
    MissingWrite {
        /// The offending step.
        step: StepName,
        /// The absent field.
        field: FieldName,
    },

    /// A step failed; the invocation stops here.
    #[error("Step '{step}' failed")]
    StepFailed {
        /// The failing step.
        step: StepName,
        /// What went wrong inside the step.
        #[source]
        source: StepError,
    },
}

// ---------------------------------------------------------------------------
// Step-level errors
// ---------------------------------------------------------------------------

/// Errors a single step can return from `run`.
#[derive(Debug, Error)]
pub enum StepError {
    /// A field the step requires is absent from the record.
    #[error("Required field '{field}' is not present in the record")]
    MissingField {
        /// The absent field.
        field: String,
    },

    /// A field is present but holds a value of the wrong shape.
    #[error("Field '{field}' is not {expected}")]
    InvalidField {
        /// The field with the unexpected value.
        field: String,
        /// Description of the expected shape (e.g. `"a string"`).
        expected: &'static str,
    },

    /// The text service call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The service answered but the answer could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Fetching the source document failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Completion text did not have the shape a step expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The completion was empty after trimming.
    #[error("Completion for field '{field}' was empty")]
    EmptyOutput {
        /// The field the completion was meant to populate.
        field: String,
    },

    /// A labelled line (e.g. `Tone: ...`) was not found in the completion.
    #[error("Completion has no '{label}' line ({lines} non-empty lines received)")]
    MissingLabel {
        /// The expected label.
        label: String,
        /// Number of non-empty lines in the completion.
        lines: usize,
    },
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failures of the external text completion service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced an HTTP response (connection, DNS, timeout).
    #[error("Text service network error: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// The service answered with a non-success status (auth, rate limit, ...).
    #[error("Text service returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error message returned by the service.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Text service response could not be decoded: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },

    /// The response decoded but contained no completion.
    #[error("Text service returned no completion")]
    EmptyResponse,
}

/// Failures of the document fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("Fetching '{url}' failed: {message}")]
    Network {
        /// The requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("Fetching '{url}' returned HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be read or parsed.
    #[error("Could not read page body from '{url}': {message}")]
    Body {
        /// The requested URL.
        url: String,
        /// Reader or parser error description.
        message: String,
    },
}
