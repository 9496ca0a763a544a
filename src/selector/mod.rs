//! Selector query language.
//!
//! Selectors describe which parts of a data tree to visit and which visited
//! nodes to report. They are plain data: the walking algorithm lives in
//! [`crate::traversal`].
//!
//! # Variants
//!
//! - `matcher` - report the current node, optionally only if a condition holds
//! - `exploreAll` - descend into every child
//! - `exploreFields` - descend into named map fields
//! - `exploreIndex` / `exploreRange` - descend into list elements
//! - `exploreRecursive` / `exploreRecursiveEdge` - bounded recursive descent
//! - `exploreUnion` - apply several selectors to the same node
//! - `exploreConditional` - continue only if a condition holds

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{
    Condition, ExploreAll, ExploreConditional, ExploreFields, ExploreIndex, ExploreRange,
    ExploreRecursive, Matcher, Selector,
};
pub use error::SelectorParseError;
