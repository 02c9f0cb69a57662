//! Anchor slugs for writeup headings.
//!
//! Slugs keep Unicode word characters, so a heading such as “Análisis de red”
//! becomes `análisis-de-red`. Uniqueness is tracked per document by
//! [`AnchorSlugger`]; nothing here is shared between renders.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Slug used when a heading has no word characters at all.
pub const FALLBACK_ANCHOR: &str = "section";

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("slug character class is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Derive the base anchor slug for a heading.
///
/// The text is lower-cased, characters outside word/whitespace/hyphen are
/// dropped and whitespace runs collapse to a single hyphen.
pub fn derive_anchor(heading: &str) -> String {
    let lowered = heading.trim().to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUN.replace_all(stripped.trim(), "-");

    if hyphenated.is_empty() {
        FALLBACK_ANCHOR.to_string()
    } else {
        hyphenated.into_owned()
    }
}

/// Deterministically generate unique anchor slugs within a single document.
///
/// The first occurrence keeps the bare slug; repeats receive `-1`, `-2`, …
/// (e.g. `setup`, `setup-1`, `setup-2`). A suffixed candidate that collides
/// with an id issued earlier keeps counting until it is free.
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    occurrences: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl AnchorSlugger {
    /// Create a new slugger instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a slug for the provided heading text, unique within this slugger.
    pub fn anchor_for(&mut self, heading: &str) -> String {
        let base = derive_anchor(heading);
        let count = self.occurrences.entry(base.clone()).or_insert(0);

        let mut candidate = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        while self.issued.contains(&candidate) {
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        *count += 1;

        self.issued.insert(candidate.clone());
        candidate
    }
}
