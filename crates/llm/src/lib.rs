//! TextLens LLM adapter.
//!
//! Implements [`pipeline::TextService`] over the OpenAI chat-completions API.
//! Other providers are added as further implementations in this crate without
//! any change to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response decoding
//! and status mapping live here. The [`pipeline`] crate sees only
//! [`pipeline::TextService`] and [`pipeline::ServiceError`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`OpenAiConfig`] and its environment loader |
//! | [`openai`] | [`OpenAiProvider`] |
//! | `wire` | Request and response bodies |

pub mod config;
pub mod openai;
mod wire;

pub use config::{ConfigError, OpenAiConfig};
pub use openai::OpenAiProvider;
