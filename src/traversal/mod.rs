//! Selector evaluation over data trees.
//!
//! The pieces, leaf first:
//!
//! - [`accessor`] - the capability the evaluator uses to read a tree
//! - [`condition`] - predicate evaluation under a budget
//! - [`recursion`] - frames for `exploreRecursive` and edge resolution
//! - [`collector`] - delivery of covered nodes and matches
//! - [`evaluator`] - the walker tying them together

pub mod accessor;
pub mod cancel;
pub mod collector;
pub mod condition;
pub mod error;
pub mod evaluator;
pub mod recursion;

pub use accessor::{AccessError, NodeAccessor, NodeKind, NodePath, PathSegment, Scalar};
pub use cancel::CancelToken;
pub use collector::{Collector, FnSink, Match, Traversal, TraversalSink};
pub use condition::{ConditionBudget, ConditionEngine, ConditionError};
pub use error::{ResourceLimit, SelectError, SelectorPath, StructuralError};
pub use evaluator::{
    AccessErrorPolicy, BudgetScope, Evaluator, TraversalLimits, TraversalStats,
};
