//! Path grammar: `key(.key|[index])*`, or a leading `[index]` when the root is a sequence.
//!
//! The empty string addresses the root. Keys containing `.` or `[` cannot be expressed.

use std::fmt;

use serde_json::Value;

use crate::error::{PathError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    /// 0-based sequence position
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut pos = 0usize;

        while pos < text.len() {
            let rest = &text[pos..];
            if rest.starts_with('[') {
                let close = rest
                    .find(']')
                    .ok_or(PathError::UnclosedIndex { offset: pos })?;
                let raw = &rest[1..close];
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(PathError::InvalidIndex {
                        raw: raw.to_string(),
                        offset: pos,
                    });
                }
                let index = raw.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                    raw: raw.to_string(),
                    offset: pos,
                })?;
                segments.push(PathSegment::Index(index));
                pos += close + 1;
                continue;
            }

            let key_start = if segments.is_empty() {
                pos
            } else if rest.starts_with('.') {
                pos + 1
            } else {
                let found = rest.chars().next().unwrap_or_default();
                return Err(PathError::UnexpectedChar { found, offset: pos });
            };
            let key_rest = &text[key_start..];
            let key_len = key_rest.find(['.', '[']).unwrap_or(key_rest.len());
            if key_len == 0 {
                return Err(PathError::EmptyKey { offset: key_start });
            }
            segments.push(PathSegment::Key(key_rest[..key_len].to_string()));
            pos = key_start + key_len;
        }

        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Walk `value` along this path.
    #[must_use]
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key),
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_keys_and_indices() {
        let path = NodePath::parse("logs[2].message").expect("path");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("logs".to_string()),
                PathSegment::Index(2),
                PathSegment::Key("message".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "logs[2].message");
    }

    #[test]
    fn empty_string_is_root() {
        let path = NodePath::parse("").expect("root");
        assert!(path.is_root());
        assert_eq!(path.to_string(), "");
        assert_eq!(path.parent(), None);
    }

    #[test]
    fn root_sequence_paths_start_with_index() {
        let path = NodePath::parse("[0][1].a").expect("path");
        assert_eq!(path.to_string(), "[0][1].a");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(
            NodePath::parse("a..b"),
            Err(PathError::EmptyKey { offset: 2 })
        );
        assert_eq!(
            NodePath::parse("a[1"),
            Err(PathError::UnclosedIndex { offset: 1 })
        );
        assert!(matches!(
            NodePath::parse("a[-1]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            NodePath::parse("a[]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert_eq!(
            NodePath::parse("a[1]b"),
            Err(PathError::UnexpectedChar {
                found: 'b',
                offset: 4
            })
        );
        assert_eq!(NodePath::parse(".a"), Err(PathError::EmptyKey { offset: 0 }));
    }

    #[test]
    fn builders_match_display() {
        let path = NodePath::root()
            .child_key("navigator")
            .child_key("languages")
            .child_index(0);
        assert_eq!(path.to_string(), "navigator.languages[0]");
        assert_eq!(
            path.parent().expect("parent").to_string(),
            "navigator.languages"
        );
    }

    #[test]
    fn resolves_against_value() {
        let value = json!({ "logs": [{ "message": "a" }, { "message": "b" }] });
        let path: NodePath = "logs[1].message".parse().expect("path");
        assert_eq!(path.resolve(&value), Some(&json!("b")));
        let missing: NodePath = "logs[5]".parse().expect("path");
        assert_eq!(missing.resolve(&value), None);
        let wrong_kind: NodePath = "logs.message".parse().expect("path");
        assert_eq!(wrong_kind.resolve(&value), None);
    }
}
