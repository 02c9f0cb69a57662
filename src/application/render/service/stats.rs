use std::collections::BTreeSet;

use super::code::CodeBlocks;

pub(crate) const WORDS_PER_MINUTE: usize = 200;

/// Reading statistics and the code-language inventory for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentMetrics {
    pub(crate) word_count: usize,
    pub(crate) read_time_minutes: usize,
    pub(crate) has_code_blocks: bool,
    pub(crate) languages_used: BTreeSet<String>,
}

/// Measure the source Markdown, not the rendered HTML.
pub(crate) fn collect_metrics(source: &str, blocks: &CodeBlocks) -> ContentMetrics {
    let word_count = source.split_whitespace().count();

    ContentMetrics {
        word_count,
        read_time_minutes: (word_count / WORDS_PER_MINUTE).max(1),
        has_code_blocks: blocks.found() > 0,
        languages_used: blocks.languages(),
    }
}
