//! YAML node representation.
//!
//! This module provides the in-memory data tree walked by the selector
//! evaluator. A `YamlNode` is an immutable, reference-counted handle to a
//! `YamlValue`, so handing nodes to the evaluator never copies subtrees.
//!
//! # Example
//!
//! ```
//! use yamlselect::document::node::{YamlNode, YamlValue};
//!
//! let node = YamlNode::map(vec![
//!     ("name", YamlNode::string("yamlselect")),
//!     ("version", YamlNode::int(1)),
//!     ("parent", YamlNode::link("base")),
//! ]);
//! assert!(node.value().is_object());
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::traversal::accessor::{NodeKind, Scalar};

/// Represents YAML numbers (integer or float)
#[derive(Debug, Clone, PartialEq)]
pub enum YamlNumber {
    Integer(i64),
    Float(f64),
}

impl std::fmt::Display for YamlNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YamlNumber::Integer(i) => write!(f, "{}", i),
            YamlNumber::Float(fl) => write!(f, "{}", fl),
        }
    }
}

/// A YAML value.
///
/// Objects and arrays contain `YamlNode` handles. A `Link` names another
/// block of the same document store.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlValue {
    /// A YAML object containing key-value pairs
    Object(IndexMap<String, YamlNode>),
    /// A YAML array containing ordered values
    Array(Vec<YamlNode>),
    /// A YAML string
    String(String),
    /// A YAML number (integer or float)
    Number(YamlNumber),
    /// A YAML boolean
    Boolean(bool),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// A YAML null value
    Null,
    /// A link to another block, written `{"/": "<block id>"}`
    Link(String),
}

impl YamlValue {
    /// Returns true if this value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, YamlValue::Object(_))
    }

    /// Returns true if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, YamlValue::Array(_))
    }

    /// Returns the accessor-level kind of this value.
    pub fn kind(&self) -> NodeKind {
        match self {
            YamlValue::Object(_) => NodeKind::Map,
            YamlValue::Array(_) => NodeKind::List,
            YamlValue::String(_) => NodeKind::String,
            YamlValue::Number(YamlNumber::Integer(_)) => NodeKind::Int,
            YamlValue::Number(YamlNumber::Float(_)) => NodeKind::Float,
            YamlValue::Boolean(_) => NodeKind::Bool,
            YamlValue::Bytes(_) => NodeKind::Bytes,
            YamlValue::Null => NodeKind::Null,
            YamlValue::Link(_) => NodeKind::Link,
        }
    }

    /// Returns the scalar value, or `None` for containers and links.
    pub fn scalar(&self) -> Option<Scalar> {
        match self {
            YamlValue::String(s) => Some(Scalar::String(s.clone())),
            YamlValue::Number(YamlNumber::Integer(i)) => Some(Scalar::Int(*i)),
            YamlValue::Number(YamlNumber::Float(f)) => Some(Scalar::Float(*f)),
            YamlValue::Boolean(b) => Some(Scalar::Bool(*b)),
            YamlValue::Bytes(bytes) => Some(Scalar::Bytes(bytes.clone())),
            YamlValue::Null => Some(Scalar::Null),
            YamlValue::Object(_) | YamlValue::Array(_) | YamlValue::Link(_) => None,
        }
    }
}

/// A shared, immutable handle to a YAML value.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode(Arc<YamlValue>);

impl YamlNode {
    /// Creates a new `YamlNode` with the given value.
    pub fn new(value: YamlValue) -> Self {
        Self(Arc::new(value))
    }

    /// Builds an object node, keeping entry order.
    pub fn map<K: Into<String>>(entries: Vec<(K, YamlNode)>) -> Self {
        Self::new(YamlValue::Object(
            entries
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
        ))
    }

    pub fn list(elements: Vec<YamlNode>) -> Self {
        Self::new(YamlValue::Array(elements))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(YamlValue::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::new(YamlValue::Number(YamlNumber::Integer(value)))
    }

    pub fn float(value: f64) -> Self {
        Self::new(YamlValue::Number(YamlNumber::Float(value)))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(YamlValue::Boolean(value))
    }

    pub fn bytes(value: Vec<u8>) -> Self {
        Self::new(YamlValue::Bytes(value))
    }

    pub fn null() -> Self {
        Self::new(YamlValue::Null)
    }

    pub fn link(target: impl Into<String>) -> Self {
        Self::new(YamlValue::Link(target.into()))
    }

    /// Returns an immutable reference to the node's value.
    ///
    /// # Example
    ///
    /// ```
    /// use yamlselect::document::node::{YamlNode, YamlValue};
    ///
    /// let node = YamlNode::boolean(true);
    /// assert!(matches!(node.value(), YamlValue::Boolean(true)));
    /// ```
    pub fn value(&self) -> &YamlValue {
        &self.0
    }

    /// Returns true if both handles point at the same value.
    pub fn ptr_eq(&self, other: &YamlNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
