//! Store and selector loading.
//!
//! This module provides functions to load document stores from files or
//! stdin, parsing them into `DocumentStore` structures the evaluator can
//! walk, and to read selectors from JSON or YAML files.

use crate::document::parser::parse_store;
use crate::document::DocumentStore;
use crate::selector::Selector;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loads and parses a document store from the filesystem.
///
/// The file holds a mapping of block id to block content. JSON stores are
/// read the same way, since JSON is valid YAML. Files ending in `.gz` are
/// decompressed first.
///
/// # Examples
///
/// ```no_run
/// use yamlselect::file::loader::load_store_file;
///
/// let store = load_store_file("blocks.yaml").unwrap();
/// assert!(store.root_node().is_some());
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The file path does not exist
/// - The file cannot be read (permissions, etc.)
/// - The file contents are not a valid store
pub fn load_store_file<P: AsRef<Path>>(path: P) -> Result<DocumentStore> {
    let path_ref = path.as_ref();
    let content = read_content(path_ref)?;
    parse_store(&content).with_context(|| format!("Failed to load store {}", path_ref.display()))
}

/// Loads and parses a document store from standard input.
///
/// Gzip input is detected by its magic bytes.
///
/// # Errors
///
/// This function will return an error if:
/// - Reading from stdin fails
/// - The input is neither valid gzip nor valid UTF-8
/// - The input contents are not a valid store
pub fn load_store_from_stdin() -> Result<DocumentStore> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;

    let content = decode_bytes(buffer)?;
    parse_store(&content).context("Failed to parse store from stdin")
}

/// Loads a selector from a file.
///
/// Files named `*.json` (optionally followed by `.gz`) are read as JSON,
/// anything else as YAML.
pub fn load_selector_file<P: AsRef<Path>>(path: P) -> Result<Selector> {
    let path_ref = path.as_ref();
    let content = read_content(path_ref)?;

    let selector = if is_json_file(path_ref) {
        Selector::from_json(&content)
    } else {
        Selector::from_yaml(&content)
    };
    selector.with_context(|| format!("Invalid selector in {}", path_ref.display()))
}

fn read_content(path: &Path) -> Result<String> {
    if is_gzipped(path) {
        read_gzipped_file(path)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false)
}

/// Determines if a file holds JSON based on its name.
///
/// Examples:
/// - `select.json` → true
/// - `select.json.gz` → true
/// - `select.yaml` → false
fn is_json_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    let base = path_str.strip_suffix(".gz").unwrap_or(&path_str);
    base.ends_with(".json")
}

/// Converts raw input to text, decompressing it if it starts with the gzip magic bytes.
fn decode_bytes(buffer: Vec<u8>) -> Result<String> {
    if buffer.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&buffer)
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in input")
    }
}

/// Reads and decompresses a gzipped file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The file is not valid gzip format (corrupted)
/// - The decompressed content is not valid UTF-8
fn read_gzipped_file(path: &Path) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path).context("Failed to open gzipped file")?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped input")?;
    Ok(content)
}
