//! File I/O operations for document stores and selectors.
//!
//! This module loads document stores from disk or stdin, transparently
//! decompressing gzip input, and reads selector files in JSON or YAML.

pub mod loader;
