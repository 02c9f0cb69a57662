use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::writeup::{FENCED_BLOCK, count_code_fences};

use super::escape::escape_html;

const PLACEHOLDER_PREFIX: &str = "<!--inkpress:code:";
const PLACEHOLDER_SUFFIX: &str = "-->";
const PLAIN_TEXT_LANGUAGE: &str = "plaintext";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--inkpress:code:([0-9a-f]{64})-->").expect("placeholder pattern is valid")
});

/// Raw fenced block held back from the Markdown passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeBlock {
    pub(crate) language: Option<String>,
    pub(crate) raw_code: String,
}

/// Code blocks extracted from one document, keyed by placeholder token.
///
/// Owned by a single render call and dropped with it.
#[derive(Debug, Default)]
pub(crate) struct CodeBlocks {
    entries: HashMap<String, CodeBlock>,
    found: usize,
}

impl CodeBlocks {
    /// Number of fenced blocks found, counting identical blocks separately.
    pub(crate) fn found(&self) -> usize {
        self.found
    }

    pub(crate) fn languages(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .filter_map(|block| block.language.clone())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, token: &str) -> Option<&CodeBlock> {
        self.entries.get(token)
    }
}

/// Replace every fenced block with an opaque placeholder.
///
/// The token is derived from the language tag and the code, so identical
/// blocks share one entry. An unterminated trailing fence does not match and
/// stays in the text as-is.
pub(crate) fn protect_code_blocks(content: &str) -> (String, CodeBlocks) {
    let fences = count_code_fences(content);
    if fences % 2 != 0 {
        warn!(
            target = "application::render::code",
            fences, "unterminated code fence left as literal text"
        );
    }

    let mut blocks = CodeBlocks::default();
    let protected = FENCED_BLOCK.replace_all(content, |caps: &Captures<'_>| {
        let language = caps
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .filter(|lang| !lang.is_empty());
        let raw_code = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let token = block_token(language.as_deref(), &raw_code);

        blocks.found += 1;
        blocks
            .entries
            .entry(token.clone())
            .or_insert(CodeBlock { language, raw_code });

        format!("{PLACEHOLDER_PREFIX}{token}{PLACEHOLDER_SUFFIX}")
    });

    (protected.into_owned(), blocks)
}

/// Swap placeholders for code containers. Placeholders whose token is not
/// known to this render are left untouched.
pub(crate) fn restore_code_blocks(html: &str, blocks: &CodeBlocks) -> String {
    if blocks.entries.is_empty() {
        return html.to_string();
    }

    PLACEHOLDER
        .replace_all(html, |caps: &Captures<'_>| {
            match blocks.entries.get(&caps[1]) {
                Some(block) => render_code_block(block),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn block_token(language: Option<&str>, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(language.unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize().as_slice())
}

fn render_code_block(block: &CodeBlock) -> String {
    let label = escape_html(block.language.as_deref().unwrap_or(PLAIN_TEXT_LANGUAGE));
    let code = escape_html(&block.raw_code);

    format!(
        "<div class=\"code-block\" data-language=\"{label}\">\
<div class=\"code-header\"><span class=\"code-lang-label\">{label}</span>\
<span class=\"code-copy-btn\" role=\"button\" tabindex=\"0\" data-role=\"code-copy-button\" title=\"Copy code\">📋</span></div>\
<pre><code class=\"language-{label}\">{code}</code></pre></div>"
    )
}
