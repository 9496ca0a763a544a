//! The node accessor capability consumed by the evaluator.
//!
//! The evaluator never builds nodes itself. Everything it knows about a data
//! tree comes through [`NodeAccessor`]: the kind of a node, its scalar value,
//! its children, and the target of a link. Implementations may be backed by
//! memory, disk or the network, so every fetching operation is fallible.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of a node in a data tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Map,
    List,
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Link,
}

impl NodeKind {
    /// Returns true for every kind that carries a scalar value.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, NodeKind::Map | NodeKind::List | NodeKind::Link)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Map => "map",
            NodeKind::List => "list",
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Int => "int",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Bytes => "bytes",
            NodeKind::Link => "link",
        };
        f.write_str(name)
    }
}

/// A scalar value, either read from a node or written into a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Null,
}

impl Scalar {
    /// Returns the node kind this scalar would have in a data tree.
    pub fn kind(&self) -> NodeKind {
        match self {
            Scalar::Bool(_) => NodeKind::Bool,
            Scalar::Int(_) => NodeKind::Int,
            Scalar::Float(_) => NodeKind::Float,
            Scalar::String(_) => NodeKind::String,
            Scalar::Bytes(_) => NodeKind::Bytes,
            Scalar::Null => NodeKind::Null,
        }
    }

    /// Orders two scalars of compatible kinds.
    ///
    /// Integers and floats compare numerically with each other, strings and
    /// bytes lexicographically, booleans with `false < true`. Incompatible
    /// kinds (and NaN) yield `None`.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
            (Scalar::Float(a), Scalar::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
            (Scalar::Bytes(a), Scalar::Bytes(b)) => Some(a.cmp(b)),
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Null, Scalar::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Map entry by key
    Key(String),
    /// List element by index
    Index(u64),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A path of segments from a block root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path extended by one segment.
    pub fn join(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PathSegment>> for NodePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Failures reported by a [`NodeAccessor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The link target is not present in the backing store.
    #[error("link target '{target}' not found")]
    MissingBlock { target: String },

    /// Dereference was requested on a node that is not a link.
    #[error("node {node} is not a link")]
    NotALink { node: String },

    /// The backing store could not be reached.
    #[error("failed to fetch '{target}': {reason}")]
    Unreachable { target: String, reason: String },
}

/// Read-only access to a data tree.
///
/// `Node` is a cheap handle into the tree; `Id` is the stable identity the
/// evaluator reports in covered and result sets. Child enumeration must be
/// deterministic, since traversal order (and therefore the covered set used
/// as a proof) depends on it.
pub trait NodeAccessor {
    type Node: Clone;
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    fn identity(&self, node: &Self::Node) -> Self::Id;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Returns the scalar value of a scalar node, `None` for maps, lists and links.
    fn scalar(&self, node: &Self::Node) -> Option<Scalar>;

    /// Returns the number of elements of a list node, `None` for anything else.
    fn length(&self, node: &Self::Node) -> Option<u64>;

    /// Looks up a map entry. Missing keys and non-map nodes yield `Ok(None)`.
    fn child(&self, node: &Self::Node, key: &str) -> Result<Option<Self::Node>, AccessError>;

    /// Looks up a list element. Out-of-range indices and non-list nodes yield `Ok(None)`.
    fn element(&self, node: &Self::Node, index: u64) -> Result<Option<Self::Node>, AccessError>;

    /// Enumerates map entries or list elements in their natural order.
    fn children(&self, node: &Self::Node) -> Result<Vec<(PathSegment, Self::Node)>, AccessError>;

    /// Resolves a link node to the node it points at.
    fn dereference(&self, link: &Self::Node) -> Result<Self::Node, AccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kinds() {
        assert!(NodeKind::Int.is_scalar());
        assert!(NodeKind::Null.is_scalar());
        assert!(!NodeKind::Map.is_scalar());
        assert!(!NodeKind::Link.is_scalar());
        assert_eq!(Scalar::String("x".to_string()).kind(), NodeKind::String);
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(
            Scalar::Int(3).compare(&Scalar::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::Float(3.0).compare(&Scalar::Int(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_incompatible_kinds() {
        assert_eq!(Scalar::Int(1).compare(&Scalar::String("1".to_string())), None);
        assert_eq!(Scalar::Float(f64::NAN).compare(&Scalar::Float(1.0)), None);
    }

    #[test]
    fn test_node_path_display() {
        let path = NodePath::root()
            .join(PathSegment::Key("items".to_string()))
            .join(PathSegment::Index(2));
        assert_eq!(path.to_string(), "/items/2");
        assert_eq!(NodePath::root().to_string(), "/");
    }
}
