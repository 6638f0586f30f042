//! TextLens article fetch adapter.
//!
//! Implements [`pipeline::PageFetcher`] by downloading a page over HTTP and
//! extracting its title, paragraph text and `<meta>` tags.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport, status handling and HTML parsing live here.
//! Steps see only [`pipeline::FetchedPage`] and [`pipeline::FetchError`].

pub mod config;
pub mod html;

mod fetcher;

pub use config::{FetchConfig, FetchConfigError};
pub use fetcher::HtmlFetcher;
pub use html::parse_page;
