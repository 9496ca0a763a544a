//! In-memory YAML data trees.
//!
//! - `node` - the `YamlNode`/`YamlValue` tree
//! - `parser` - YAML text into nodes and stores
//! - `store` - linked blocks implementing the node accessor

pub mod node;
pub mod parser;
pub mod store;

pub use node::{YamlNode, YamlNumber, YamlValue};
pub use store::{DocNode, DocumentStore, NodeId};
