use serde::Serialize;
use troublecode_tree::{Activation, PathIndex};

/// Structured rendering of one commentary text. Built fresh per input and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    List {
        items: Vec<Vec<Inline>>,
    },
    /// Fenced block; contents are verbatim
    Code {
        language: Option<String>,
        code: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Strong { content: Vec<Inline> },
    Emphasis { content: Vec<Inline> },
    Code { code: String },
    /// Opens in a new browsing context without referrer or opener access
    Link { label: String, url: String },
    Reference { label: String, path: String },
    LineBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn reference(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::Reference {
            label: path.clone(),
            path,
        }
    }
}

/// A `[[ref:path]]` span found in the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceBinding {
    pub label: String,
    pub path: String,
}

impl ReferenceBinding {
    /// Resolve against `index`. An unknown path yields `None` and nothing else happens.
    #[must_use]
    pub fn activate(&self, index: &PathIndex) -> Option<Activation> {
        index.activate(&self.path)
    }
}

impl Document {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every reference binding, in reading order.
    #[must_use]
    pub fn references(&self) -> Vec<ReferenceBinding> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph { content } | Block::Heading { content, .. } => {
                    collect_references(content, &mut out);
                }
                Block::List { items } => {
                    for item in items {
                        collect_references(item, &mut out);
                    }
                }
                Block::Code { .. } => {}
            }
        }
        out
    }

    /// Reference paths that do not exist in `index`.
    #[must_use]
    pub fn unresolved(&self, index: &PathIndex) -> Vec<String> {
        self.references()
            .into_iter()
            .filter(|binding| !index.contains(&binding.path))
            .map(|binding| binding.path)
            .collect()
    }
}

fn collect_references(content: &[Inline], out: &mut Vec<ReferenceBinding>) {
    for inline in content {
        match inline {
            Inline::Reference { label, path } => out.push(ReferenceBinding {
                label: label.clone(),
                path: path.clone(),
            }),
            Inline::Strong { content } | Inline::Emphasis { content } => {
                collect_references(content, out);
            }
            Inline::Text { .. }
            | Inline::Code { .. }
            | Inline::Link { .. }
            | Inline::LineBreak => {}
        }
    }
}
