//! Writeup rendering: Markdown in, sanitized HTML plus metadata out.
//!
//! The pipeline is pure. It reads nothing but its input and keeps all
//! intermediate state in a per-call context, so one service handle can be
//! shared across threads.

mod service;
mod toc;
mod types;

pub use service::{WriteupRenderService, render, render_service, sanitize_html};
pub use toc::toc_tree;
pub use types::{RenderRequest, RenderResult, RenderService, TocItem, TocNode};
