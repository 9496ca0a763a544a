//! A store of linked YAML blocks.
//!
//! `DocumentStore` holds named blocks, each a YAML tree. A link node
//! (`{"/": "<block id>"}`) inside one block points at the root of another,
//! so a store forms a graph of trees in the same way content-addressed data
//! does. The store implements [`NodeAccessor`], which is all the selector
//! evaluator needs to walk it.
//!
//! # Example
//!
//! ```
//! use yamlselect::document::{DocumentStore, YamlNode};
//! use yamlselect::traversal::accessor::NodeAccessor;
//!
//! let mut store = DocumentStore::new();
//! store.insert("root", YamlNode::map(vec![("next", YamlNode::link("leaf"))]));
//! store.insert("leaf", YamlNode::string("end"));
//!
//! let root = store.root_node().unwrap();
//! let link = store.child(&root, "next").unwrap().unwrap();
//! let leaf = store.dereference(&link).unwrap();
//! assert_eq!(leaf.to_string(), "leaf:/");
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::node::{YamlNode, YamlValue};
use crate::traversal::accessor::{
    AccessError, NodeAccessor, NodeKind, NodePath, PathSegment, Scalar,
};

/// Identity of a node within a store: its block and its path in that block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub block: Arc<str>,
    pub path: NodePath,
}

impl NodeId {
    pub fn new(block: impl Into<Arc<str>>, path: NodePath) -> Self {
        Self {
            block: block.into(),
            path,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.path)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A handle to one node of a store.
#[derive(Debug, Clone)]
pub struct DocNode {
    block: Arc<str>,
    path: NodePath,
    node: YamlNode,
}

impl DocNode {
    fn child(&self, segment: PathSegment, node: &YamlNode) -> DocNode {
        DocNode {
            block: Arc::clone(&self.block),
            path: self.path.join(segment),
            node: node.clone(),
        }
    }

    pub fn id(&self) -> NodeId {
        NodeId::new(Arc::clone(&self.block), self.path.clone())
    }

    pub fn value(&self) -> &YamlValue {
        self.node.value()
    }
}

impl fmt::Display for DocNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.path)
    }
}

/// Named YAML blocks with one designated root.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    blocks: IndexMap<Arc<str>, YamlNode>,
    root: Option<Arc<str>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one block, which is also the root.
    pub fn single(id: &str, root: YamlNode) -> Self {
        let mut store = Self::new();
        store.insert(id, root);
        store
    }

    /// Adds or replaces a block. The first block inserted becomes the root
    /// unless another is chosen with [`DocumentStore::set_root`].
    pub fn insert(&mut self, id: &str, node: YamlNode) {
        let id: Arc<str> = Arc::from(id);
        if self.root.is_none() {
            self.root = Some(Arc::clone(&id));
        }
        self.blocks.insert(id, node);
    }

    /// Chooses the root block. Fails if no block has that id.
    pub fn set_root(&mut self, id: &str) -> Result<(), AccessError> {
        let (key, _) = self
            .blocks
            .get_key_value(id)
            .ok_or_else(|| AccessError::MissingBlock {
                target: id.to_string(),
            })?;
        self.root = Some(Arc::clone(key));
        Ok(())
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn block(&self, id: &str) -> Option<&YamlNode> {
        self.blocks.get(id)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(|id| id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns a handle to the root node of a block.
    pub fn node(&self, id: &str) -> Option<DocNode> {
        let (key, node) = self.blocks.get_key_value(id)?;
        Some(DocNode {
            block: Arc::clone(key),
            path: NodePath::root(),
            node: node.clone(),
        })
    }

    /// Returns a handle to the root node of the root block.
    pub fn root_node(&self) -> Option<DocNode> {
        self.node(self.root.as_deref()?)
    }

    /// Gets the node at `path` within a block.
    ///
    /// The path is a sequence of segments: keys select object entries and
    /// indices select array elements. Links are not followed.
    pub fn get_node(&self, id: &str, path: &[PathSegment]) -> Option<DocNode> {
        let mut current = self.node(id)?;

        for segment in path {
            let next = match (current.value(), segment) {
                (YamlValue::Object(entries), PathSegment::Key(key)) => entries.get(key)?.clone(),
                (YamlValue::Array(elements), PathSegment::Index(index)) => {
                    elements.get(usize::try_from(*index).ok()?)?.clone()
                }
                _ => return None,
            };
            current = current.child(segment.clone(), &next);
        }

        Some(current)
    }

    /// Builds the identity for a slash-separated path such as `/items/0/name`.
    ///
    /// Segments are read as keys or indices according to the container they
    /// step into. Segments past the end of the tree are read as keys.
    pub fn id_for(&self, id: &str, path: &str) -> NodeId {
        let mut segments = Vec::new();
        let mut current = self.block(id).cloned();

        for part in path.split('/').filter(|part| !part.is_empty()) {
            let (segment, next) = match current.as_ref().map(YamlNode::value) {
                Some(YamlValue::Array(elements)) => match part.parse::<u64>() {
                    Ok(index) => (
                        PathSegment::Index(index),
                        elements.get(index as usize).cloned(),
                    ),
                    Err(_) => (PathSegment::Key(part.to_string()), None),
                },
                Some(YamlValue::Object(entries)) => {
                    (PathSegment::Key(part.to_string()), entries.get(part).cloned())
                }
                _ => (PathSegment::Key(part.to_string()), None),
            };
            segments.push(segment);
            current = next;
        }

        NodeId::new(id, NodePath::from(segments))
    }
}

impl NodeAccessor for DocumentStore {
    type Node = DocNode;
    type Id = NodeId;

    fn identity(&self, node: &DocNode) -> NodeId {
        node.id()
    }

    fn kind(&self, node: &DocNode) -> NodeKind {
        node.value().kind()
    }

    fn scalar(&self, node: &DocNode) -> Option<Scalar> {
        node.value().scalar()
    }

    fn length(&self, node: &DocNode) -> Option<u64> {
        match node.value() {
            YamlValue::Array(elements) => Some(elements.len() as u64),
            _ => None,
        }
    }

    fn child(&self, node: &DocNode, key: &str) -> Result<Option<DocNode>, AccessError> {
        let child = match node.value() {
            YamlValue::Object(entries) => entries
                .get(key)
                .map(|child| node.child(PathSegment::Key(key.to_string()), child)),
            _ => None,
        };
        Ok(child)
    }

    fn element(&self, node: &DocNode, index: u64) -> Result<Option<DocNode>, AccessError> {
        let element = match node.value() {
            YamlValue::Array(elements) => usize::try_from(index)
                .ok()
                .and_then(|i| elements.get(i))
                .map(|element| node.child(PathSegment::Index(index), element)),
            _ => None,
        };
        Ok(element)
    }

    fn children(&self, node: &DocNode) -> Result<Vec<(PathSegment, DocNode)>, AccessError> {
        let children = match node.value() {
            YamlValue::Object(entries) => entries
                .iter()
                .map(|(key, child)| {
                    let segment = PathSegment::Key(key.clone());
                    (segment.clone(), node.child(segment, child))
                })
                .collect(),
            YamlValue::Array(elements) => elements
                .iter()
                .enumerate()
                .map(|(idx, element)| {
                    let segment = PathSegment::Index(idx as u64);
                    (segment.clone(), node.child(segment, element))
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(children)
    }

    fn dereference(&self, link: &DocNode) -> Result<DocNode, AccessError> {
        match link.value() {
            YamlValue::Link(target) => self.node(target).ok_or_else(|| AccessError::MissingBlock {
                target: target.clone(),
            }),
            _ => Err(AccessError::NotALink {
                node: link.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DocumentStore {
        let mut store = DocumentStore::new();
        store.insert(
            "root",
            YamlNode::map(vec![
                ("items", YamlNode::list(vec![YamlNode::int(1), YamlNode::int(2)])),
                ("next", YamlNode::link("leaf")),
                ("broken", YamlNode::link("nowhere")),
            ]),
        );
        store.insert("leaf", YamlNode::map(vec![("value", YamlNode::boolean(true))]));
        store
    }

    #[test]
    fn test_first_block_is_root() {
        let mut store = store();
        assert_eq!(store.root_id(), Some("root"));
        store.set_root("leaf").unwrap();
        assert_eq!(store.root_node().unwrap().to_string(), "leaf:/");
        assert!(store.set_root("missing").is_err());
    }

    #[test]
    fn test_children_in_order() {
        let store = store();
        let root = store.root_node().unwrap();
        let keys: Vec<String> = store
            .children(&root)
            .unwrap()
            .into_iter()
            .map(|(segment, _)| segment.to_string())
            .collect();
        assert_eq!(keys, vec!["items", "next", "broken"]);
    }

    #[test]
    fn test_element_and_length() {
        let store = store();
        let items = store.get_node("root", &[PathSegment::Key("items".to_string())]).unwrap();
        assert_eq!(store.length(&items), Some(2));
        let second = store.element(&items, 1).unwrap().unwrap();
        assert_eq!(second.to_string(), "root:/items/1");
        assert!(store.element(&items, 2).unwrap().is_none());
        assert!(store.child(&items, "0").unwrap().is_none());
    }

    #[test]
    fn test_dereference() {
        let store = store();
        let root = store.root_node().unwrap();

        let next = store.child(&root, "next").unwrap().unwrap();
        assert_eq!(store.kind(&next), NodeKind::Link);
        assert_eq!(store.dereference(&next).unwrap().id(), store.id_for("leaf", "/"));

        let broken = store.child(&root, "broken").unwrap().unwrap();
        assert_eq!(
            store.dereference(&broken).unwrap_err(),
            AccessError::MissingBlock {
                target: "nowhere".to_string()
            }
        );
        assert!(matches!(
            store.dereference(&root),
            Err(AccessError::NotALink { .. })
        ));
    }

    #[test]
    fn test_id_for_follows_container_kinds() {
        let store = store();
        let id = store.id_for("root", "/items/1");
        assert_eq!(
            id.path.segments(),
            &[PathSegment::Key("items".to_string()), PathSegment::Index(1)]
        );
        assert_eq!(id.to_string(), "root:/items/1");
    }

    #[test]
    fn test_get_node_invalid_path() {
        let store = store();
        assert!(store
            .get_node("root", &[PathSegment::Key("items".to_string()), PathSegment::Index(9)])
            .is_none());
        assert!(store.get_node("missing", &[]).is_none());
    }
}
