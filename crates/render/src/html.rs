//! HTML mount for a rendered [`Document`].
//!
//! Every piece of text is escaped; the only markup emitted is the fixed set of tags below.
//! References become `ref-chip` buttons carrying their path in `data-ref`, which is what a
//! host wires to [`ReferenceBinding::activate`](crate::ReferenceBinding::activate).

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::document::{Block, Document, Inline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Added to every heading level so commentary nests under the host page's own headings
    pub heading_offset: u8,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self { heading_offset: 2 }
    }
}

#[must_use]
pub fn to_html(document: &Document, options: &HtmlOptions) -> String {
    let mut out = String::new();
    for block in &document.blocks {
        if !out.is_empty() {
            out.push('\n');
        }
        push_block(&mut out, block, options);
    }
    out
}

fn push_block(out: &mut String, block: &Block, options: &HtmlOptions) {
    match block {
        Block::Paragraph { content } => {
            out.push_str("<p>");
            push_inlines(out, content);
            out.push_str("</p>");
        }
        Block::Heading { level, content } => {
            let tag = level.saturating_add(options.heading_offset).clamp(1, 6);
            let _ = write!(out, "<h{tag} class=\"ai-heading\">");
            push_inlines(out, content);
            let _ = write!(out, "</h{tag}>");
        }
        Block::List { items } => {
            out.push_str("<ul class=\"ai-list\">");
            for item in items {
                out.push_str("<li>");
                push_inlines(out, item);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        Block::Code { language, code } => {
            out.push_str("<pre class=\"ai-code-block\"");
            if let Some(language) = language {
                out.push_str(" data-lang=\"");
                push_escaped(out, language);
                out.push('"');
            }
            out.push_str("><code>");
            push_escaped(out, code);
            out.push_str("</code></pre>");
        }
    }
}

fn push_inlines(out: &mut String, content: &[Inline]) {
    for inline in content {
        match inline {
            Inline::Text { text } => push_escaped(out, text),
            Inline::Strong { content } => {
                out.push_str("<strong>");
                push_inlines(out, content);
                out.push_str("</strong>");
            }
            Inline::Emphasis { content } => {
                out.push_str("<em>");
                push_inlines(out, content);
                out.push_str("</em>");
            }
            Inline::Code { code } => {
                out.push_str("<code>");
                push_escaped(out, code);
                out.push_str("</code>");
            }
            Inline::Link { label, url } => {
                out.push_str("<a href=\"");
                push_escaped(out, url);
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                push_escaped(out, label);
                out.push_str("</a>");
            }
            Inline::Reference { label, path } => {
                out.push_str("<button type=\"button\" class=\"ref-chip\" data-ref=\"");
                push_escaped(out, path);
                out.push_str("\">");
                push_escaped(out, label);
                out.push_str("</button>");
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
