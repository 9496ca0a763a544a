//! Configuration system for yamlselect.
//!
//! This module provides the traversal limits and policies used by the
//! evaluator, with sensible defaults and support for serialization via
//! serde. Configuration can be loaded from TOML files and merged with
//! command-line arguments.
//!
//! # Example
//!
//! ```
//! use yamlselect::config::Config;
//!
//! // Use default configuration
//! let config = Config::default();
//! assert_eq!(config.condition_budget, 64);
//! assert_eq!(config.max_nesting, 128);
//!
//! // Create custom configuration
//! let custom = Config {
//!     max_visits: Some(10_000),
//!     ..Config::default()
//! };
//! assert_eq!(custom.limits().max_visits, Some(10_000));
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::traversal::evaluator::DEFAULT_MAX_NESTING;
use crate::traversal::{AccessErrorPolicy, BudgetScope, TraversalLimits};

/// Configuration for yamlselect traversals.
///
/// # Fields
///
/// * `condition_budget` - Predicate nodes a single condition may visit (default: 64)
/// * `condition_budget_scope` - "per_check" or "per_traversal" (default: "per_check")
/// * `max_visits` - Overall node visit budget, unbounded if absent (default: none)
/// * `max_steps` - Overall selector step budget, unbounded if absent (default: none)
/// * `max_nesting` - Maximum selector nesting depth (default: 128)
/// * `on_access_error` - "abort" or "skip" when a link cannot be resolved (default: "abort")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Predicate nodes a single condition may visit
    #[serde(default = "default_condition_budget")]
    pub condition_budget: u64,

    /// Whether the condition budget resets per check or spans the traversal
    #[serde(default)]
    pub condition_budget_scope: BudgetScope,

    /// Overall node visit budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u64>,

    /// Overall selector step budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,

    /// Maximum selector nesting depth
    #[serde(default = "default_max_nesting")]
    pub max_nesting: usize,

    /// What to do when a node cannot be fetched
    #[serde(default)]
    pub on_access_error: AccessErrorPolicy,
}

/// Returns the default condition budget.
fn default_condition_budget() -> u64 {
    64
}

/// Returns the default nesting limit.
fn default_max_nesting() -> usize {
    DEFAULT_MAX_NESTING
}

impl Default for Config {
    fn default() -> Self {
        Self {
            condition_budget: default_condition_budget(),
            condition_budget_scope: BudgetScope::default(),
            max_visits: None,
            max_steps: None,
            max_nesting: default_max_nesting(),
            on_access_error: AccessErrorPolicy::default(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/yamlselect/config.toml` on all platforms.
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("yamlselect");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        Self::load_from(&config_path).unwrap_or_else(|err| {
            tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config file");
            Self::default()
        })
    }

    /// Loads configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Returns the evaluator limits described by this configuration.
    pub fn limits(&self) -> TraversalLimits {
        TraversalLimits {
            condition_budget: self.condition_budget,
            condition_budget_scope: self.condition_budget_scope,
            max_visits: self.max_visits,
            max_steps: self.max_steps,
            max_nesting: self.max_nesting,
            on_access_error: self.on_access_error,
        }
    }
}
