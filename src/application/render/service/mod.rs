mod autolink;
mod blocks;
mod callout;
mod code;
mod escape;
mod headings;
mod inline;
mod sanitize;
mod stats;
mod table;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::application::render::types::{
    RenderRequest, RenderResult, RenderService, TocItem, normalize_base_url,
};

use self::code::CodeBlocks;

pub use self::sanitize::sanitize_html;

const METRIC_RENDER_TOTAL: &str = "inkpress_render_total";
const METRIC_RENDER_CODE_BLOCKS_TOTAL: &str = "inkpress_render_code_blocks_total";
const METRIC_RENDER_MS: &str = "inkpress_render_ms";

/// One rewrite pass of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    ProtectCode,
    ExpandCallouts,
    ExpandAutolinks,
    ExpandHeadings,
    TransformBlocks,
    RestoreCode,
    Sanitize,
}

impl Stage {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Stage::ProtectCode => "protect_code",
            Stage::ExpandCallouts => "expand_callouts",
            Stage::ExpandAutolinks => "expand_autolinks",
            Stage::ExpandHeadings => "expand_headings",
            Stage::TransformBlocks => "transform_blocks",
            Stage::RestoreCode => "restore_code",
            Stage::Sanitize => "sanitize",
        }
    }
}

/// Every stage consumes the text produced by the one before it. Code must be
/// held back before any Markdown rule runs and restored only after the last
/// one; sanitizing comes last so nothing emitted earlier escapes it.
pub(crate) const PIPELINE: [Stage; 7] = [
    Stage::ProtectCode,
    Stage::ExpandCallouts,
    Stage::ExpandAutolinks,
    Stage::ExpandHeadings,
    Stage::TransformBlocks,
    Stage::RestoreCode,
    Stage::Sanitize,
];

/// Scratch state of a single render call.
struct RenderContext<'a> {
    base_url: String,
    source: &'a str,
    buffer: String,
    code_blocks: CodeBlocks,
    toc: Vec<TocItem>,
}

impl<'a> RenderContext<'a> {
    fn new(request: &'a RenderRequest) -> Self {
        Self {
            base_url: normalize_base_url(&request.base_url),
            source: &request.content,
            buffer: request.content.clone(),
            code_blocks: CodeBlocks::default(),
            toc: Vec::new(),
        }
    }

    fn apply(&mut self, stage: Stage) {
        match stage {
            Stage::ProtectCode => {
                let (text, blocks) = code::protect_code_blocks(&self.buffer);
                self.buffer = text;
                self.code_blocks = blocks;
            }
            Stage::ExpandCallouts => self.buffer = callout::expand_callouts(&self.buffer),
            Stage::ExpandAutolinks => {
                self.buffer = autolink::expand_autolinks(&self.buffer, &self.base_url);
            }
            Stage::ExpandHeadings => {
                let (text, toc) = headings::expand_headings(&self.buffer);
                self.buffer = text;
                self.toc = toc;
            }
            Stage::TransformBlocks => self.buffer = blocks::transform_blocks(&self.buffer),
            Stage::RestoreCode => {
                self.buffer = code::restore_code_blocks(&self.buffer, &self.code_blocks);
            }
            Stage::Sanitize => self.buffer = sanitize::sanitize_html(&self.buffer),
        }
    }

    fn finish(self) -> RenderResult {
        let metrics = stats::collect_metrics(self.source, &self.code_blocks);
        RenderResult {
            html: self.buffer,
            toc: self.toc,
            word_count: metrics.word_count,
            read_time_minutes: metrics.read_time_minutes,
            has_code_blocks: metrics.has_code_blocks,
            languages_used: metrics.languages_used,
        }
    }
}

/// Regex-driven renderer for the writeup Markdown dialect.
///
/// Holds no state; every call gets its own [`RenderContext`], so one instance
/// serves any number of threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteupRenderService;

impl WriteupRenderService {
    pub fn new() -> Self {
        Self
    }
}

impl RenderService for WriteupRenderService {
    fn render(&self, request: &RenderRequest) -> RenderResult {
        counter!(METRIC_RENDER_TOTAL).increment(1);
        if request.content.is_empty() {
            return RenderResult::default();
        }

        let started_at = Instant::now();
        let mut context = RenderContext::new(request);
        for stage in PIPELINE {
            context.apply(stage);
            debug!(
                target = "application::render",
                stage = stage.name(),
                bytes = context.buffer.len(),
                "render stage complete"
            );
        }

        counter!(METRIC_RENDER_CODE_BLOCKS_TOTAL).increment(context.code_blocks.found() as u64);
        let result = context.finish();
        histogram!(METRIC_RENDER_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        debug!(
            target = "application::render",
            headings = result.toc.len(),
            words = result.word_count,
            code_blocks = result.has_code_blocks,
            "render complete"
        );
        result
    }
}

static RENDER_SERVICE: Lazy<Arc<WriteupRenderService>> =
    Lazy::new(|| Arc::new(WriteupRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<WriteupRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

/// Render `content` with autolinks rooted at `base_url`.
pub fn render(content: &str, base_url: &str) -> RenderResult {
    let request = RenderRequest::new(content).with_base_url(base_url);
    render_service().render(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn code_is_protected_first_and_restored_before_sanitizing() {
        let position = |stage| PIPELINE.iter().position(|s| *s == stage);

        assert_eq!(position(Stage::ProtectCode), Some(0));
        assert!(position(Stage::TransformBlocks) < position(Stage::RestoreCode));
        assert_eq!(position(Stage::Sanitize), Some(PIPELINE.len() - 1));
    }

    #[test]
    fn empty_input_yields_zero_value() {
        assert_eq!(render("", "https://x"), RenderResult::default());
    }

    #[test]
    fn renders_title_paragraph_and_link() {
        let result = render(
            "# Title\n\nSome **bold** text with a [link](https://x.com).",
            "",
        );

        assert_eq!(result.toc, vec![TocItem::new("title", "Title", 1)]);
        assert!(result.html.contains("<h1 id=\"title\""));
        assert!(result.html.contains("<strong>bold</strong>"));
        assert!(result.html.contains("<a href=\"https://x.com\""));
        assert_eq!(result.word_count, 8);
        assert_eq!(result.read_time_minutes, 1);
    }

    #[test]
    fn fenced_code_survives_markdown_rules() {
        let result = render("```python\nx = a * b * c  # __init__\n```", "");

        assert!(result.html.contains(
            "<code class=\"language-python\">x = a * b * c  # __init__\n</code>"
        ));
        assert!(!result.html.contains("<em>"));
        assert!(!result.html.contains("<strong>"));
        assert!(!result.html.contains("<p>"));
        assert!(result.has_code_blocks);
    }

    #[test]
    fn concurrent_renders_keep_their_own_code() {
        let handles: Vec<_> = (0..8)
            .map(|idx| {
                std::thread::spawn(move || {
                    let content = format!("```\nblock-{idx}\n```");
                    (idx, render(&content, ""))
                })
            })
            .collect();

        for handle in handles {
            let (idx, result) = handle.join().expect("render thread");
            assert!(result.html.contains(&format!("block-{idx}")));
        }
    }
}
