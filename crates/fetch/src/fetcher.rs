//! [`PageFetcher`] over plain HTTP GET.

use async_trait::async_trait;
use pipeline::{FetchError, FetchedPage, PageFetcher};
use reqwest::{header, redirect, Client};
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::html::parse_page;

/// Downloads pages and extracts their article content.
///
/// No JavaScript is executed; pages that render client-side yield little
/// or no paragraph text.
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    /// Builds a fetcher with its own HTTP client.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn validate(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_owned(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_owned(),
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[async_trait]
impl PageFetcher for HtmlFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = validate(url)?;

        debug!(url = %parsed, "Fetching page");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_owned(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Page fetch rejected");
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_owned(),
            message: e.to_string(),
        })?;

        Ok(parse_page(url, &body))
    }
}
