//! In-memory collaborators for step and pipeline tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::{
    Completion, FetchError, FetchedPage, ModelSettings, PageFetcher, Prompt, ServiceError,
    TextService,
};

/// Text service that answers from a script and records every prompt.
pub struct StubService {
    replies: Mutex<VecDeque<Result<String, ServiceError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<Prompt>>,
}

impl StubService {
    /// Always answers `reply`.
    pub fn fixed(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(reply.to_owned()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers each call with the next scripted reply.
    pub fn scripted<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_owned())).collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with `error`.
    pub fn failing(error: ServiceError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextService for StubService {
    async fn complete(
        &self,
        prompt: &Prompt,
        _settings: &ModelSettings,
    ) -> Result<Completion, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply.map(Completion::text),
            None => self
                .fallback
                .clone()
                .map(Completion::text)
                .ok_or(ServiceError::EmptyResponse),
        }
    }
}

/// Page fetcher that serves one canned page or error.
pub struct StubFetcher {
    result: Result<FetchedPage, FetchError>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    /// Serves `page` for any URL.
    pub fn page(page: FetchedPage) -> Self {
        Self {
            result: Ok(page),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fails every fetch with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requested.lock().unwrap().push(url.to_owned());
        self.result.clone()
    }
}

/// A small article page with an author meta tag.
pub fn sample_page(url: &str) -> FetchedPage {
    let mut page = FetchedPage {
        url: url.to_owned(),
        title: Some("Ten Project Ideas".to_owned()),
        paragraphs: vec![
            "Building projects is the fastest way to learn.".to_owned(),
            "Start with something small.".to_owned(),
        ],
        ..FetchedPage::default()
    };
    page.meta.insert("author".to_owned(), "Ryan Blake".to_owned());
    page
}
