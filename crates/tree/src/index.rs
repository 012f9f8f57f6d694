use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Top-level sections expanded when a report is first shown.
pub const OPEN_BY_DEFAULT: &[&str] = &["userError", "logs", "location"];

const ROOT_LABEL: &str = "report";
const ITEM_LABEL: &str = "item";
const EMPTY_DISPLAY: &str = "(empty)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl NodeKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }

    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Map)
    }
}

/// One node of the report tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub path: String,
    /// User-facing label; sequence items are numbered from 1
    pub label: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Text shown for leaves: the scalar itself, or "(empty)" for empty containers
    pub display: Option<String>,
}

impl TreeNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A top-level entry of a mapping-rooted bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub node: NodeId,
    pub key: String,
    pub open_by_default: bool,
}

/// Every node of one bundle, addressable by path.
///
/// Built once per bundle and never mutated. Building the same value twice yields the same
/// ids and paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIndex {
    nodes: Vec<TreeNode>,
    by_path: HashMap<String, NodeId>,
    collisions: Vec<String>,
}

/// Borrowed view of a node that can navigate the index.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    index: &'a PathIndex,
    node: &'a TreeNode,
}

/// What the host does when a reference binding is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub target: NodeId,
    pub path: String,
    /// Containers to expand, outermost first
    pub reveal: Vec<NodeId>,
}

pub fn build_path_index(bundle: &Value) -> PathIndex {
    let mut builder = IndexBuilder::default();
    builder.visit(bundle, String::new(), ROOT_LABEL.to_string(), None, 0);
    if !builder.collisions.is_empty() {
        log::warn!(
            "{} path(s) are ambiguous (keys containing '.' or '['); first node wins: {:?}",
            builder.collisions.len(),
            builder.collisions
        );
    }
    PathIndex {
        nodes: builder.nodes,
        by_path: builder.by_path,
        collisions: builder.collisions,
    }
}

#[derive(Default)]
struct IndexBuilder {
    nodes: Vec<TreeNode>,
    by_path: HashMap<String, NodeId>,
    collisions: Vec<String>,
}

impl IndexBuilder {
    fn visit(
        &mut self,
        value: &Value,
        path: String,
        label: String,
        parent: Option<NodeId>,
        depth: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let kind = NodeKind::of(value);
        let display = match value {
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Array(items) if items.is_empty() => Some(EMPTY_DISPLAY.to_string()),
            Value::Object(map) if map.is_empty() => Some(EMPTY_DISPLAY.to_string()),
            Value::Array(_) | Value::Object(_) => None,
        };
        self.nodes.push(TreeNode {
            id,
            path: path.clone(),
            label: label.clone(),
            kind,
            depth,
            parent,
            children: Vec::new(),
            display,
        });
        if self.by_path.contains_key(&path) {
            self.collisions.push(path.clone());
        } else {
            self.by_path.insert(path.clone(), id);
        }

        let children: Vec<NodeId> = match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, child)| {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    self.visit(child, child_path, key.clone(), Some(id), depth + 1)
                })
                .collect(),
            Value::Array(items) => {
                let item_base = match parent.map(|p| self.nodes[p.0].kind) {
                    Some(NodeKind::Map) => label.as_str(),
                    _ => ITEM_LABEL,
                }
                .to_string();
                items
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        let child_path = format!("{path}[{i}]");
                        let child_label = format!("{item_base} #{}", i + 1);
                        self.visit(child, child_path, child_label, Some(id), depth + 1)
                    })
                    .collect()
            }
            _ => Vec::new(),
        };
        self.nodes[id.0].children = children;
        id
    }
}

impl PathIndex {
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        self.node_ref(NodeId(0))
    }

    /// Find the node addressed by `path`. Surrounding whitespace is ignored.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<NodeRef<'_>> {
        self.by_path
            .get(path.trim())
            .map(|id| self.node_ref(*id))
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path.trim())
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id.0).map(|node| NodeRef { index: self, node })
    }

    fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef {
            index: self,
            node: &self.nodes[id.0],
        }
    }

    /// Nodes in depth-first order (parents before children, siblings in bundle order).
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.nodes.iter().map(move |node| NodeRef { index: self, node })
    }

    /// Paths that were produced twice; lookups return the first node.
    #[must_use]
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// Top-level entries when the bundle is a mapping; empty otherwise.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        let root = &self.nodes[0];
        if root.kind != NodeKind::Map {
            return Vec::new();
        }
        root.children
            .iter()
            .map(|id| {
                let node = &self.nodes[id.0];
                Section {
                    node: *id,
                    key: node.label.clone(),
                    open_by_default: OPEN_BY_DEFAULT.contains(&node.label.as_str()),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!("Decoded {} sections", self.sections().len())
    }

    /// Ancestors of `id`, outermost first, excluding `id` itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id.0).and_then(|node| node.parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes[parent.0].parent;
        }
        chain.reverse();
        chain
    }

    /// Resolve a reference binding. Unknown paths are not an error: nothing happens.
    #[must_use]
    pub fn activate(&self, path: &str) -> Option<Activation> {
        let Some(target) = self.lookup(path) else {
            log::debug!("ignoring activation of unknown path {path:?}");
            return None;
        };
        Some(Activation {
            target: target.id(),
            path: target.path().to_string(),
            reveal: self.ancestors(target.id()),
        })
    }
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    #[must_use]
    pub fn path(&self) -> &'a str {
        &self.node.path
    }

    #[must_use]
    pub fn label(&self) -> &'a str {
        &self.node.label
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    #[must_use]
    pub fn display(&self) -> Option<&'a str> {
        self.node.display.as_deref()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.node.depth
    }

    #[must_use]
    pub fn node(&self) -> &'a TreeNode {
        self.node
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.map(|id| self.index.node_ref(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let index = self.index;
        self.node.children.iter().map(move |id| index.node_ref(*id))
    }
}
