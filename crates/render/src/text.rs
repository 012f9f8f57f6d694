//! Plain-text mount for terminals: structure stays readable, references show as `[path]`.

use crate::document::{Block, Document, Inline};

#[must_use]
pub fn to_text(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(block_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block_text(block: &Block) -> String {
    match block {
        Block::Paragraph { content } => inline_text(content),
        Block::Heading { level, content } => {
            format!("{} {}", "#".repeat(usize::from(*level)), inline_text(content))
        }
        Block::List { items } => items
            .iter()
            .map(|item| format!("- {}", inline_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Code { language, code } => {
            format!("```{}\n{code}\n```", language.as_deref().unwrap_or_default())
        }
    }
}

fn inline_text(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text { text } => out.push_str(text),
            Inline::Strong { content } | Inline::Emphasis { content } => {
                out.push_str(&inline_text(content));
            }
            Inline::Code { code } => {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
            Inline::Link { label, url } => {
                out.push_str(label);
                out.push_str(" <");
                out.push_str(url);
                out.push('>');
            }
            Inline::Reference { path, .. } => {
                out.push('[');
                out.push_str(path);
                out.push(']');
            }
            Inline::LineBreak => out.push('\n'),
        }
    }
    out
}
