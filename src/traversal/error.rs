//! Error types for selector evaluation.

use std::fmt;

use thiserror::Error;

use super::accessor::AccessError;

/// The chain of selector variants from the root selector to a failing step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorPath(Vec<&'static str>);

impl SelectorPath {
    pub fn new(steps: Vec<&'static str>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[&'static str] {
        &self.0
    }
}

impl fmt::Display for SelectorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

/// A selector tree that cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("exploreRecursive sequence has no reachable exploreRecursiveEdge")]
    MissingEdge,

    #[error("exploreRecursiveEdge used outside of any exploreRecursive")]
    EdgeWithoutRecursion,
}

/// A bound that stopped the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceLimit {
    #[error("condition budget of {budget} predicate evaluations exhausted")]
    ConditionBudget { budget: u64 },

    #[error("traversal budget of {budget} node visits exceeded")]
    TraversalBudget { budget: u64 },

    #[error("step budget of {budget} selector steps exceeded")]
    StepBudget { budget: u64 },

    #[error("selector nesting deeper than {limit}")]
    Nesting { limit: usize },
}

/// Errors that abort a traversal.
///
/// Every variant records where the walk was when it failed: the selector
/// path from the root selector and the identity of the current node.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("structural error at [{selector_path}] on node {node}: {kind}")]
    Structural {
        kind: StructuralError,
        selector_path: SelectorPath,
        node: String,
    },

    #[error("resource limit at [{selector_path}] on node {node}: {limit}")]
    ResourceLimit {
        limit: ResourceLimit,
        selector_path: SelectorPath,
        node: String,
    },

    #[error("node access failed at [{selector_path}] on node {node}: {source}")]
    Access {
        #[source]
        source: AccessError,
        selector_path: SelectorPath,
        node: String,
    },

    #[error("traversal cancelled at [{selector_path}] on node {node}")]
    Cancelled {
        selector_path: SelectorPath,
        node: String,
    },
}

impl SelectError {
    pub fn selector_path(&self) -> &SelectorPath {
        match self {
            SelectError::Structural { selector_path, .. }
            | SelectError::ResourceLimit { selector_path, .. }
            | SelectError::Access { selector_path, .. }
            | SelectError::Cancelled { selector_path, .. } => selector_path,
        }
    }

    pub fn node(&self) -> &str {
        match self {
            SelectError::Structural { node, .. }
            | SelectError::ResourceLimit { node, .. }
            | SelectError::Access { node, .. }
            | SelectError::Cancelled { node, .. } => node,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, SelectError::Structural { .. })
    }

    pub fn is_resource_limit(&self) -> bool {
        matches!(self, SelectError::ResourceLimit { .. })
    }
}
