//! Content rules for writeup bodies that are checked before rendering.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Minimum number of characters (after trimming) a writeup body must have.
pub const MIN_CONTENT_CHARS: usize = 100;
/// Maximum number of characters a writeup body may have.
pub const MAX_CONTENT_CHARS: usize = 200_000;
/// Delimiter of fenced code blocks.
pub const CODE_FENCE: &str = "```";

/// A fenced code block: optional language tag on the opening fence, then the
/// raw code up to the next fence. Unterminated fences do not match.
pub(crate) static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```([\w+#.-]*)[ \t]*\r?\n(.*?)```").expect("fenced block pattern is valid")
});

/// A single rule violated by a writeup body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
    #[error("content must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
    #[error("found {fences} code fences; a code block is not closed")]
    UnbalancedCodeFence { fences: usize },
}

impl ContentError {
    /// Field the violation is reported against (`content` for length rules,
    /// `syntax` for structural ones).
    pub fn field(&self) -> &'static str {
        match self {
            ContentError::TooShort { .. } | ContentError::TooLong { .. } => "content",
            ContentError::UnbalancedCodeFence { .. } => "syntax",
        }
    }
}

/// Every rule a writeup body violates, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentViolations(Vec<ContentError>);

impl ContentViolations {
    pub fn errors(&self) -> &[ContentError] {
        &self.0
    }
}

impl fmt::Display for ContentViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {error}", error.field())?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ContentViolations {}

/// Check a writeup body against the length and fence-balance rules.
///
/// Length and syntax violations are reported together so authors can fix
/// both in one round trip.
pub fn validate_content(content: &str) -> Result<(), ContentViolations> {
    let mut errors = Vec::new();

    let trimmed_len = content.trim().chars().count();
    let total_len = content.chars().count();
    if trimmed_len < MIN_CONTENT_CHARS {
        errors.push(ContentError::TooShort {
            min: MIN_CONTENT_CHARS,
            actual: trimmed_len,
        });
    } else if total_len > MAX_CONTENT_CHARS {
        errors.push(ContentError::TooLong {
            max: MAX_CONTENT_CHARS,
            actual: total_len,
        });
    }

    let fences = count_code_fences(content);
    if fences % 2 != 0 {
        errors.push(ContentError::UnbalancedCodeFence { fences });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ContentViolations(errors))
    }
}

/// Number of non-overlapping triple-backtick delimiters in `content`.
pub fn count_code_fences(content: &str) -> usize {
    content.matches(CODE_FENCE).count()
}

const KNOWN_TOOLS: [&str; 38] = [
    "nmap",
    "gobuster",
    "dirb",
    "dirbuster",
    "nikto",
    "burp",
    "burpsuite",
    "sqlmap",
    "hydra",
    "john",
    "hashcat",
    "metasploit",
    "msfconsole",
    "netcat",
    "nc",
    "wireshark",
    "tcpdump",
    "ghidra",
    "ida",
    "gdb",
    "pwntools",
    "binwalk",
    "steghide",
    "stegsolve",
    "exiftool",
    "strings",
    "file",
    "ltrace",
    "strace",
    "radare2",
    "r2",
    "objdump",
    "checksec",
    "ropper",
    "volatility",
    "autopsy",
    "foremost",
    "photorec",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w-]+").expect("word pattern is valid"));

/// Common CTF tools mentioned in the content, in inventory order.
///
/// Matching is case-insensitive and on whole words, so `nc` does not fire on
/// `function`.
pub fn detect_tools(content: &str) -> Vec<&'static str> {
    let lowered = content.to_lowercase();
    let words: std::collections::HashSet<&str> =
        WORD.find_iter(&lowered).map(|m| m.as_str()).collect();

    KNOWN_TOOLS
        .into_iter()
        .filter(|tool| words.contains(tool))
        .collect()
}
