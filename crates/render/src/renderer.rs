use log::debug;
use troublecode_tree::PathIndex;

use crate::block::{parse_heading, segment, strip_bullet, RawBlock};
use crate::config::RenderOptions;
use crate::document::{Block, Document};
use crate::error::Result;
use crate::inline::parse_inline;

/// Turns commentary text into a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parse `text` without looking at any bundle. Never fails.
    #[must_use]
    pub fn parse(&self, text: &str) -> Document {
        let blocks = segment(text)
            .into_iter()
            .map(|raw| self.classify(raw))
            .collect();
        Document { blocks }
    }

    /// Parse `text` and bind its references against `index`.
    ///
    /// References are bound whether or not their path exists; unknown ones are only logged.
    #[must_use]
    pub fn render(&self, text: &str, index: &PathIndex) -> Document {
        let document = self.parse(text);
        let unresolved = document.unresolved(index);
        if !unresolved.is_empty() {
            debug!(
                "{} reference(s) do not resolve: {}",
                unresolved.len(),
                unresolved.join(", ")
            );
        }
        document
    }

    fn classify(&self, raw: RawBlock<'_>) -> Block {
        let lines = match raw {
            RawBlock::Fence { language, code } => return Block::Code { language, code },
            RawBlock::Lines(lines) => lines,
        };

        if let [line] = lines.as_slice() {
            if let Some((level, content)) = parse_heading(line) {
                return Block::Heading {
                    level: level.min(self.options.max_heading_level),
                    content: parse_inline(content),
                };
            }
        }

        let items: Option<Vec<&str>> = lines.iter().map(|line| strip_bullet(line)).collect();
        if let Some(items) = items {
            return Block::List {
                items: items.into_iter().map(parse_inline).collect(),
            };
        }

        Block::Paragraph {
            content: parse_inline(lines.join("\n").trim()),
        }
    }
}

/// Render commentary against a bundle index with default options.
#[must_use]
pub fn render_annotated_text(text: &str, index: &PathIndex) -> Document {
    Renderer::default().render(text, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, ReferenceBinding};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use troublecode_tree::build_path_index;

    fn text(s: &str) -> Inline {
        Inline::text(s)
    }

    fn sample_index() -> PathIndex {
        build_path_index(&json!({
            "userError": "page is blank",
            "user": { "name": "ada" },
            "logs": [
                { "level": "error", "message": "boom" },
                { "level": "warn", "message": "slow" }
            ]
        }))
    }

    #[test]
    fn renders_a_reference_sentence() {
        let doc = render_annotated_text("See [[ref:user.name]] for **details**.", &sample_index());
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph {
                content: vec![
                    text("See "),
                    Inline::reference("user.name"),
                    text(" for "),
                    Inline::Strong {
                        content: vec![text("details")]
                    },
                    text("."),
                ]
            }]
        );
    }

    #[test]
    fn fenced_code_is_never_inline_parsed() {
        let doc = render_annotated_text("```js\nconst a = [[ref:x]];\n```", &sample_index());
        assert_eq!(
            doc.blocks,
            vec![Block::Code {
                language: Some("js".to_string()),
                code: "const a = [[ref:x]];".to_string(),
            }]
        );
        assert!(doc.references().is_empty());
    }

    #[test]
    fn unmatched_delimiters_render_literally() {
        let doc = Renderer::default().parse("**oops");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph {
                content: vec![text("**oops")]
            }]
        );
    }

    #[test]
    fn classifies_headings_lists_and_paragraphs() {
        let doc = Renderer::default().parse(
            "## Summary\n\n- first [[ref:logs[0].message]]\n* second\n\nplain\ntext\n\n- mixed\nline",
        );
        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading {
                    level: 2,
                    content: vec![text("Summary")]
                },
                Block::List {
                    items: vec![
                        vec![text("first "), Inline::reference("logs[0].message")],
                        vec![text("second")],
                    ]
                },
                Block::Paragraph {
                    content: vec![text("plain"), Inline::LineBreak, text("text")]
                },
                Block::Paragraph {
                    content: vec![text("- mixed"), Inline::LineBreak, text("line")]
                },
            ]
        );
    }

    #[test]
    fn heading_levels_are_clamped() {
        let renderer = Renderer::new(RenderOptions {
            max_heading_level: 3,
        })
        .expect("valid options");
        let doc = renderer.parse("###### Deep");
        assert_eq!(
            doc.blocks,
            vec![Block::Heading {
                level: 3,
                content: vec![text("Deep")]
            }]
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        assert!(Renderer::new(RenderOptions {
            max_heading_level: 0
        })
        .is_err());
    }

    #[test]
    fn crlf_input_renders_like_lf() {
        let renderer = Renderer::default();
        assert_eq!(
            renderer.parse("a\r\nb\r\n\r\n- c"),
            renderer.parse("a\nb\n\n- c")
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(Renderer::default().parse("").is_empty());
        assert!(Renderer::default().parse(" \n\n\t").is_empty());
    }

    #[test]
    fn unresolved_references_are_bound_and_inert() {
        let index = sample_index();
        let doc = render_annotated_text("[[ref:logs[1].level]] and [[ref:nope.gone]]", &index);
        assert_eq!(
            doc.references(),
            vec![
                ReferenceBinding {
                    label: "logs[1].level".to_string(),
                    path: "logs[1].level".to_string(),
                },
                ReferenceBinding {
                    label: "nope.gone".to_string(),
                    path: "nope.gone".to_string(),
                },
            ]
        );
        assert_eq!(doc.unresolved(&index), vec!["nope.gone".to_string()]);

        let refs = doc.references();
        let activation = refs[0].activate(&index).expect("known path");
        let reveal: Vec<&str> = activation
            .reveal
            .iter()
            .filter_map(|id| index.get(*id))
            .map(|node| node.path())
            .collect();
        assert_eq!(reveal, vec!["", "logs", "logs[1]"]);
        assert_eq!(refs[1].activate(&index), None);
    }

    #[test]
    fn document_serializes_with_type_tags() {
        let doc = Renderer::default().parse("*hi* [[ref:a]]");
        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(
            value,
            json!({
                "blocks": [{
                    "type": "paragraph",
                    "content": [
                        { "type": "emphasis", "content": [{ "type": "text", "text": "hi" }] },
                        { "type": "text", "text": " " },
                        { "type": "reference", "label": "a", "path": "a" }
                    ]
                }]
            })
        );
    }
}
