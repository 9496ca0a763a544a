//! YAML parsing into `YamlNode` trees and document stores.
//!
//! Parsing goes through `serde_yaml::Value`, so anchors and aliases are
//! expanded by the YAML parser itself. A mapping whose only key is `/` with
//! a string value is read as a link to another block.
//!
//! # Example
//!
//! ```
//! use yamlselect::document::parser::parse_store;
//!
//! let store = parse_store(r#"
//! root:
//!   name: top
//!   child: {"/": leaf}
//! leaf:
//!   name: bottom
//! "#).unwrap();
//!
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.root_id(), Some("root"));
//! ```

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde_yaml::Value as SerdeValue;

use super::node::{YamlNode, YamlNumber, YamlValue};
use super::store::DocumentStore;

/// The mapping key that marks a link.
pub const LINK_KEY: &str = "/";

/// Parses a single YAML document into a node tree.
pub fn parse_yaml(yaml_str: &str) -> Result<YamlNode> {
    let value: SerdeValue = serde_yaml::from_str(yaml_str).context("Failed to parse YAML")?;
    parse_value(&value)
}

/// Parses a YAML mapping of block id to block content into a store.
///
/// The first block becomes the root.
pub fn parse_store(yaml_str: &str) -> Result<DocumentStore> {
    let value: SerdeValue = serde_yaml::from_str(yaml_str).context("Failed to parse YAML")?;

    let SerdeValue::Mapping(blocks) = value else {
        bail!("A document store must be a mapping of block ids to blocks");
    };
    if blocks.is_empty() {
        bail!("No blocks found in document store");
    }

    let mut store = DocumentStore::new();
    for (key, block) in &blocks {
        let id = mapping_key(key)?;
        let node = parse_value(block).with_context(|| format!("Invalid block '{}'", id))?;
        store.insert(&id, node);
    }
    Ok(store)
}

/// Converts a `serde_yaml::Value` into a `YamlNode`.
pub fn parse_value(value: &SerdeValue) -> Result<YamlNode> {
    let node = match value {
        SerdeValue::Null => YamlNode::null(),
        SerdeValue::Bool(b) => YamlNode::boolean(*b),
        SerdeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlNode::new(YamlValue::Number(YamlNumber::Integer(i)))
            } else {
                let f = n
                    .as_f64()
                    .ok_or_else(|| anyhow!("Unrepresentable number: {}", n))?;
                YamlNode::new(YamlValue::Number(YamlNumber::Float(f)))
            }
        }
        SerdeValue::String(s) => YamlNode::string(s.clone()),
        SerdeValue::Sequence(items) => YamlNode::list(
            items
                .iter()
                .map(parse_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        SerdeValue::Mapping(entries) => {
            if let Some(target) = link_target(entries) {
                return Ok(YamlNode::link(target));
            }
            let mut fields = IndexMap::with_capacity(entries.len());
            for (key, child) in entries {
                fields.insert(mapping_key(key)?, parse_value(child)?);
            }
            YamlNode::new(YamlValue::Object(fields))
        }
        // Tags carry no meaning for traversal
        SerdeValue::Tagged(tagged) => parse_value(&tagged.value)?,
    };
    Ok(node)
}

fn link_target(entries: &serde_yaml::Mapping) -> Option<String> {
    if entries.len() != 1 {
        return None;
    }
    match entries.get(LINK_KEY)? {
        SerdeValue::String(target) => Some(target.clone()),
        _ => None,
    }
}

fn mapping_key(key: &SerdeValue) -> Result<String> {
    match key {
        SerdeValue::String(s) => Ok(s.clone()),
        SerdeValue::Number(n) => Ok(n.to_string()),
        SerdeValue::Bool(b) => Ok(b.to_string()),
        SerdeValue::Null => Ok("null".to_string()),
        other => bail!("Unsupported mapping key: {:?}", other),
    }
}
