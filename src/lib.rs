//! Server-side Markdown rendering for technical writeups.
//!
//! The crate is layered the same way as the rest of the backend: `domain`
//! holds pure content rules, `application` hosts the render pipeline, and
//! `infra` wires logging for the command-line entry point.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::render::{
    RenderRequest, RenderResult, RenderService, TocItem, TocNode, WriteupRenderService, render,
    render_service, sanitize_html, toc_tree,
};
pub use domain::writeup::{ContentError, ContentViolations, validate_content};
