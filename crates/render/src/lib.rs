//! # TroubleCode Render
//!
//! A small markup renderer for commentary about a bundle. Besides the usual minimal markup
//! (headings, bullet lists, fenced code, `**strong**`, `*emphasis*`, `` `code` ``, links) it
//! recognises `[[ref:path]]` tokens and binds each one to a node path of the bundle's
//! [`PathIndex`](troublecode_tree::PathIndex).
//!
//! ```text
//! commentary text
//!     │
//!     ├──> block segmentation (blank lines, fenced code, heading lines)
//!     ├──> block classification (heading / list / paragraph / code)
//!     └──> inline tokenizer (references first, then strong, emphasis, code, links)
//!              │
//!              └──> Document ──> to_html / to_text
//! ```
//!
//! Rendering never fails: anything the grammar does not recognise is kept as literal text,
//! and references to unknown paths are still bound (activating them does nothing).
//!
//! ```rust
//! use troublecode_render::{render_annotated_text, to_html, HtmlOptions};
//! use troublecode_tree::build_path_index;
//!
//! let index = build_path_index(&serde_json::json!({ "user": { "name": "ada" } }));
//! let doc = render_annotated_text("See [[ref:user.name]].", &index);
//! assert!(doc.unresolved(&index).is_empty());
//! assert!(to_html(&doc, &HtmlOptions::default()).contains("data-ref=\"user.name\""));
//! ```

mod block;
mod config;
mod document;
mod error;
mod html;
mod inline;
mod renderer;
mod text;

pub use config::RenderOptions;
pub use document::{Block, Document, Inline, ReferenceBinding};
pub use error::{RenderError, Result};
pub use html::{to_html, HtmlOptions};
pub use renderer::{render_annotated_text, Renderer};
pub use text::to_text;
