//! # TroubleCode Tree
//!
//! Walks a JSON-shaped bundle and gives every node a stable, human-readable path:
//!
//! - mapping entries append `.key` (the bare key at the top level)
//! - sequence elements append `[i]`, 0-based (labels count from 1)
//! - scalars and empty containers are leaves
//!
//! The same value always yields the same assignment, so `[[ref:...]]` tokens written against
//! one decoding of a token stay valid against any other.
//!
//! ```rust
//! use troublecode_tree::build_path_index;
//!
//! let bundle = serde_json::json!({ "logs": [{ "message": "boom" }] });
//! let index = build_path_index(&bundle);
//! let node = index.lookup("logs[0].message").unwrap();
//! assert_eq!(node.display(), Some("boom"));
//! assert_eq!(node.parent().unwrap().label(), "logs #1");
//! ```

mod error;
mod index;
mod path;

pub use error::{PathError, Result};
pub use index::{
    build_path_index, Activation, NodeId, NodeKind, NodeRef, PathIndex, Section, TreeNode,
    OPEN_BY_DEFAULT,
};
pub use path::{NodePath, PathSegment};
