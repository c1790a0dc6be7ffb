// SPDX-License-Identifier: PMPL-1.0-or-later
//! Parsed page abstraction.
//!
//! Wraps a `scraper` HTML tree and exposes only the queries the checklist
//! needs: full text, tag presence, class matching, interactive elements,
//! images and raw text nodes. A document is immutable once parsed.

use regex::Regex;
use scraper::{ElementRef, Html};

/// Elements treated as clickable calls to action
const INTERACTIVE_TAGS: &[&str] = &["button", "a"];

/// A parsed, rendered page
pub struct Document {
    html: Html,
    text: String,
}

impl Document {
    /// Parse raw (rendered) HTML into a queryable document
    pub fn parse(raw_html: &str) -> Self {
        let html = Html::parse_document(raw_html);
        let text = html
            .tree
            .root()
            .descendants()
            .filter_map(|node| node.value().as_text().map(|t| &**t))
            .collect::<String>();
        Self { html, text }
    }

    /// Full plain text of the page, all text nodes concatenated
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether an element with the given tag name exists
    pub fn has_tag(&self, tag: &str) -> bool {
        self.elements()
            .any(|el| el.value().name().eq_ignore_ascii_case(tag))
    }

    /// Elements with a class matched by `pattern`.
    ///
    /// Each class token is tested, then the whole attribute value, so a
    /// pattern spanning two classes still matches.
    pub fn elements_with_class<'a>(
        &'a self,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements().filter(move |el| {
            let Some(attr) = el.value().attr("class") else {
                return false;
            };
            el.value().classes().any(|class| pattern.is_match(class)) || pattern.is_match(attr)
        })
    }

    /// Visible text of every button and link, in document order.
    ///
    /// Text is trimmed and internal whitespace collapsed to single spaces.
    pub fn interactive_texts(&self) -> Vec<String> {
        self.elements()
            .filter(|el| {
                INTERACTIVE_TAGS
                    .iter()
                    .any(|tag| el.value().name().eq_ignore_ascii_case(tag))
            })
            .map(|el| {
                el.text()
                    .flat_map(str::split_whitespace)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Number of `<img>` elements
    pub fn image_count(&self) -> usize {
        self.elements()
            .filter(|el| el.value().name().eq_ignore_ascii_case("img"))
            .count()
    }

    /// Every text node, in document order
    pub fn text_nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(|node| node.value().as_text().map(|t| &**t))
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text_len", &self.text.len())
            .finish()
    }
}
