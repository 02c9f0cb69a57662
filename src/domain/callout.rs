//! Callout (admonition) kinds recognised in writeups.

use serde::{Deserialize, Serialize};

/// Closed set of callout kinds authors can open with `:::kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    Info,
    Warning,
    Danger,
    Tip,
    Note,
    Success,
    Question,
    Quote,
    Example,
    Bug,
    Abstract,
    Todo,
    Flag,
    Shell,
    Exploit,
}

/// Icon and CSS class a callout container is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalloutStyle {
    pub icon: &'static str,
    pub css_class: &'static str,
}

/// Style used for kinds outside the closed set.
pub const FALLBACK_STYLE: CalloutStyle = CalloutStyle {
    icon: "📌",
    css_class: "callout-note",
};

impl CalloutKind {
    pub const ALL: [CalloutKind; 15] = [
        CalloutKind::Info,
        CalloutKind::Warning,
        CalloutKind::Danger,
        CalloutKind::Tip,
        CalloutKind::Note,
        CalloutKind::Success,
        CalloutKind::Question,
        CalloutKind::Quote,
        CalloutKind::Example,
        CalloutKind::Bug,
        CalloutKind::Abstract,
        CalloutKind::Todo,
        CalloutKind::Flag,
        CalloutKind::Shell,
        CalloutKind::Exploit,
    ];

    /// Resolve a kind name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CalloutKind::Info => "info",
            CalloutKind::Warning => "warning",
            CalloutKind::Danger => "danger",
            CalloutKind::Tip => "tip",
            CalloutKind::Note => "note",
            CalloutKind::Success => "success",
            CalloutKind::Question => "question",
            CalloutKind::Quote => "quote",
            CalloutKind::Example => "example",
            CalloutKind::Bug => "bug",
            CalloutKind::Abstract => "abstract",
            CalloutKind::Todo => "todo",
            CalloutKind::Flag => "flag",
            CalloutKind::Shell => "shell",
            CalloutKind::Exploit => "exploit",
        }
    }

    pub fn style(self) -> CalloutStyle {
        let (icon, css_class) = match self {
            CalloutKind::Info => ("ℹ️", "callout-info"),
            CalloutKind::Warning => ("⚠️", "callout-warning"),
            CalloutKind::Danger => ("🚨", "callout-danger"),
            CalloutKind::Tip => ("💡", "callout-tip"),
            CalloutKind::Note => ("📝", "callout-note"),
            CalloutKind::Success => ("✅", "callout-success"),
            CalloutKind::Question => ("❓", "callout-question"),
            CalloutKind::Quote => ("💬", "callout-quote"),
            CalloutKind::Example => ("📋", "callout-example"),
            CalloutKind::Bug => ("🐛", "callout-bug"),
            CalloutKind::Abstract => ("📄", "callout-abstract"),
            CalloutKind::Todo => ("📌", "callout-todo"),
            CalloutKind::Flag => ("🚩", "callout-flag"),
            CalloutKind::Shell => ("💻", "callout-shell"),
            CalloutKind::Exploit => ("🔓", "callout-exploit"),
        };
        CalloutStyle { icon, css_class }
    }
}

/// Style for an arbitrary kind name, falling back to [`FALLBACK_STYLE`].
pub fn style_for(name: &str) -> CalloutStyle {
    CalloutKind::parse(name)
        .map(CalloutKind::style)
        .unwrap_or(FALLBACK_STYLE)
}

/// Title shown when the author did not supply one: the kind name with its
/// first letter upper-cased.
pub fn default_title(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
