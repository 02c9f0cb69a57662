use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Source markdown captured from the editor.
    pub content: String,
    /// Site root used to build absolute links for `[[ctf:…]]` and `[[writeup:…]]`.
    #[serde(default)]
    pub base_url: String,
}

impl RenderRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            base_url: String::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&base_url.into());
        self
    }
}

/// Trim whitespace and trailing slashes so links join as `{base}/ctf/{id}`.
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// One heading of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    /// Anchor id, unique within one render.
    pub id: String,
    /// Heading text with markup removed.
    pub text: String,
    /// Heading depth, 1 through 6.
    pub level: u8,
}

impl TocItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
        }
    }
}

/// Heading with the headings nested beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocNode {
    pub id: String,
    pub text: String,
    pub level: u8,
    pub children: Vec<TocNode>,
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderResult {
    /// Sanitised HTML. Derived data; the Markdown stays the source of truth.
    pub html: String,
    /// Flat table of contents in document order.
    pub toc: Vec<TocItem>,
    /// Whitespace-delimited words in the source Markdown.
    pub word_count: usize,
    /// Estimated reading time; zero only for empty input.
    pub read_time_minutes: usize,
    /// Whether at least one fenced code block was found.
    pub has_code_blocks: bool,
    /// Lower-cased language tags of fenced blocks.
    pub languages_used: BTreeSet<String>,
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same request they return identical results.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> RenderResult;
}
