use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use yamlselect::config::Config;
use yamlselect::document::DocumentStore;
use yamlselect::file::loader::{load_selector_file, load_store_file, load_store_from_stdin};
use yamlselect::traversal::{AccessErrorPolicy, Evaluator};

/// yamlselect - run a selector over a store of linked YAML blocks
#[derive(Parser)]
#[command(name = "yamlselect")]
#[command(version)]
#[command(about = "Selector-driven traversal of linked YAML documents", long_about = None)]
struct Cli {
    /// Store file: a mapping of block id to block (omit or use "-" to read from stdin)
    store: Option<String>,

    /// Selector file (JSON if it ends in .json, YAML otherwise)
    #[arg(short, long)]
    selector: PathBuf,

    /// Block to start from (default: the first block of the store)
    #[arg(short, long)]
    root: Option<String>,

    /// Print the covered nodes and results as a JSON object
    #[arg(long)]
    json: bool,

    /// Stop after this many node visits
    #[arg(long)]
    max_visits: Option<u64>,

    /// Stop after this many selector steps
    #[arg(long)]
    max_steps: Option<u64>,

    /// Predicate nodes a single condition may visit
    #[arg(long)]
    condition_budget: Option<u64>,

    /// Skip branches behind broken links instead of failing
    #[arg(long)]
    skip_broken_links: bool,
}

fn init_logging() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_store(path: Option<&str>) -> Result<DocumentStore> {
    match path {
        Some(path) if path != "-" => load_store_file(path),
        _ => {
            if io::stdin().is_terminal() {
                bail!("No store given: pass a store file or pipe one on stdin");
            }
            load_store_from_stdin()
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    // CLI flags override the config file
    let config = Config::load();
    let mut limits = config.limits();
    if let Some(max_visits) = cli.max_visits {
        limits.max_visits = Some(max_visits);
    }
    if let Some(max_steps) = cli.max_steps {
        limits.max_steps = Some(max_steps);
    }
    if let Some(budget) = cli.condition_budget {
        limits.condition_budget = budget;
    }
    if cli.skip_broken_links {
        limits.on_access_error = AccessErrorPolicy::Skip;
    }

    let selector = load_selector_file(&cli.selector)?;
    let mut store = load_store(cli.store.as_deref())?;
    if let Some(root) = &cli.root {
        store
            .set_root(root)
            .with_context(|| format!("Cannot start from block '{}'", root))?;
    }
    let root = store
        .root_node()
        .context("Store has no root block")?;

    let traversal = Evaluator::new(&store)
        .with_limits(limits)
        .evaluate(&selector, &root)
        .context("Traversal failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &traversal)?;
        writeln!(out)?;
    } else {
        for id in &traversal.covered {
            writeln!(out, "{}", id)?;
        }
        for found in &traversal.results {
            match &found.label {
                Some(label) => writeln!(out, "match {} {}", found.node, label)?,
                None => writeln!(out, "match {}", found.node)?,
            }
        }
    }

    Ok(())
}
