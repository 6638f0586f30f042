//! HTML to [`FetchedPage`] extraction.

use std::collections::BTreeMap;

use pipeline::FetchedPage;
use scraper::{ElementRef, Html, Selector};

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Extracts title, paragraphs and meta tags from `html`.
///
/// - `title` is the `<title>` text, falling back to `og:title`; blank titles
///   are `None`.
/// - `paragraphs` holds the text of every `<p>` in document order, with
///   whitespace collapsed and empty paragraphs dropped.
/// - `meta` maps each `<meta name=...>` or `<meta property=...>` to its
///   `content`, keyed by the lowercased name. The first occurrence wins.
pub fn parse_page(url: &str, html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    let title = select(&document, "title")
        .into_iter()
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            select(&document, r#"meta[property="og:title"]"#)
                .into_iter()
                .next()
                .and_then(|m| m.value().attr("content"))
                .map(collapse_whitespace)
                .filter(|t| !t.is_empty())
        });

    let paragraphs = select(&document, "p")
        .into_iter()
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect();

    let mut meta = BTreeMap::new();
    for element in select(&document, "meta[content]") {
        let attrs = element.value();
        let Some(name) = attrs.attr("name").or_else(|| attrs.attr("property")) else {
            continue;
        };
        let content = attrs.attr("content").unwrap_or_default().trim();
        meta.entry(name.trim().to_ascii_lowercase())
            .or_insert_with(|| content.to_owned());
    }

    FetchedPage {
        url: url.to_owned(),
        title,
        paragraphs,
        meta,
    }
}
