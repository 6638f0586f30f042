//! Newtype domain identifiers.
//!
//! Step names, record field names and pipeline names are all strings under the
//! hood; wrapping each in its own type keeps a [`FieldName`] from being passed
//! where a [`StepName`] is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the terminal marker that edges may point to.
///
/// No step may be registered under this name.
pub const END: &str = "__end__";

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, from_static(), as_str(),
// Display, AsRef<str>.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Creates an identifier from a compile-time constant.
            ///
            /// Constants are checked by the unit tests of the modules that
            /// declare them; an empty literal is a programming error.
            pub fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.is_empty(), "identifier literal must not be empty");
                Self(value.to_owned())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: string-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a step by its registered name within one pipeline graph.
    ///
    /// Names are unique per pipeline. The reserved name [`END`] is never a
    /// valid step name.
    StepName
}

string_id! {
    /// Names one field of a [`crate::Record`] (e.g. `"text"`, `"summary"`).
    FieldName
}

string_id! {
    /// Human-readable name of a pipeline (e.g. `"text-analysis"`).
    ///
    /// Only used for logging and span attributes.
    PipelineName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed
// ---------------------------------------------------------------------------

/// Identifies a single pipeline execution (one call to `invoke`).
///
/// Generated fresh for every invocation and attached to the invocation span so
/// all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`PipelineRunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
