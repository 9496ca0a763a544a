//! yamlselect - selector-driven traversal of linked YAML document trees.
//!
//! A [`selector::Selector`] describes which parts of a data tree to visit
//! and which visited nodes to report. The [`traversal::Evaluator`] walks any
//! tree exposed through [`traversal::NodeAccessor`] and produces the covered
//! set (every node visited) and the result set (every node matched).
//! [`document::DocumentStore`] is an in-memory accessor over YAML blocks.

pub mod config;
pub mod document;
pub mod file;
pub mod selector;
pub mod traversal;
