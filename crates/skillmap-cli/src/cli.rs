//! Command-line interface for the skillmap utility
//!
//! Lays out skill trees from a JSON store document and prints the result as
//! JSON, lists trees, and reports records the layout would drop.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::colorizer::{mark, status_label};
use skillmap::core::logging::init_logging;
use skillmap::prelude::*;

/// Skillmap - Lay out exercise progression trees
#[derive(Parser)]
#[command(name = "skillmap")]
#[command(about = "Lay out exercise/skill progression trees and compose skill maps")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Output file (use - for stdout)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output (default when writing to a terminal)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// When to use colors in listings
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Flow direction of the layout
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum DirectionChoice {
    /// Easiest skills at the bottom
    #[default]
    BottomToTop,
    /// Easiest skills at the top
    TopToBottom,
}

impl From<DirectionChoice> for Direction {
    fn from(value: DirectionChoice) -> Self {
        match value {
            DirectionChoice::BottomToTop => Direction::BottomToTop,
            DirectionChoice::TopToBottom => Direction::TopToBottom,
        }
    }
}

/// Layout tuning shared by the layout commands
#[derive(Args, Clone, Debug)]
pub struct LayoutArgs {
    /// Flow direction
    #[arg(short, long, value_enum, default_value_t = DirectionChoice::BottomToTop)]
    pub direction: DirectionChoice,

    /// Horizontal spacing between nodes in a row
    #[arg(long, default_value_t = skillmap::tree::position::DEFAULT_SPACING)]
    pub spacing: f64,

    /// Vertical spacing between ranks
    #[arg(long, default_value_t = skillmap::tree::position::DEFAULT_ROW_SPACING)]
    pub row_spacing: f64,

    /// Number of barycenter sweep pairs
    #[arg(long, default_value_t = skillmap::tree::position::DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Horizontal gap between trees in a skill map
    #[arg(long, default_value_t = skillmap::tree::position::DEFAULT_TREE_GAP)]
    pub tree_gap: f64,
}

impl LayoutArgs {
    /// Build a validated layout config
    pub fn config(&self) -> Result<LayoutConfig> {
        let config = LayoutConfig {
            spacing: self.spacing,
            row_spacing: self.row_spacing,
            iterations: self.iterations,
            tree_gap: self.tree_gap,
            direction: self.direction.into(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lay out one tree from scratch
    Layout {
        /// Store document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Tree ID
        #[arg(short, long)]
        tree: String,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Compose all published trees into one skill map
    Map {
        /// Store document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// User whose progress decides node status
        #[arg(short, long)]
        user: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// List trees in a store document
    Trees {
        /// Store document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Report placements and connections the layout would drop
    Validate {
        /// Store document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeSummary<'a> {
    id: &'a str,
    title: &'a str,
    status: TreeStatus,
    node_count: usize,
    connection_count: usize,
}

/// Main CLI application
#[derive(Debug, Default)]
pub struct SkillmapApp {
    verbose: bool,
}

impl SkillmapApp {
    /// Create a new application instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("SKILLMAP_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("SKILLMAP_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        self.verbose = cli.verbose;
        if self.verbose {
            eprintln!("Skillmap v{}", env!("CARGO_PKG_VERSION"));
        }

        let to_terminal = Self::writes_to_terminal(&cli.output);
        let pretty = cli.pretty || to_terminal;
        let color = match cli.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => to_terminal && std::env::var("NO_COLOR").is_err(),
        };

        let (content, result) = match cli.command {
            Commands::Layout {
                input,
                tree,
                layout,
            } => {
                let store = self.load_store(input)?;
                (self.layout_command(store, &tree, &layout, pretty)?, Ok(()))
            }
            Commands::Map {
                input,
                user,
                layout,
            } => {
                let store = self.load_store(input)?;
                (self.map_command(store, user.as_deref(), &layout, pretty)?, Ok(()))
            }
            Commands::Trees { input, json } => {
                let store = self.load_store(input)?;
                (self.trees_command(&store, json, color)?, Ok(()))
            }
            Commands::Validate { input } => {
                let store = self.load_store(input)?;
                self.validate_command(store, color)?
            }
        };

        self.write_output(cli.output, &content)?;
        result
    }

    fn writes_to_terminal(output: &Option<PathBuf>) -> bool {
        match output {
            None => crossterm::tty::IsTty::is_tty(&std::io::stdout()),
            Some(ref p) if p.to_str() == Some("-") => {
                crossterm::tty::IsTty::is_tty(&std::io::stdout())
            }
            Some(_) => false,
        }
    }

    fn load_store(&self, input: Option<PathBuf>) -> Result<MemoryStore> {
        let content = self.read_input(input)?;
        debug!(bytes = content.len(), "Read store document");
        if self.verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        MemoryStore::from_json(&content)
    }

    fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        })
    }

    /// Handle the layout command
    pub fn layout_command(
        &self,
        store: MemoryStore,
        tree: &str,
        layout: &LayoutArgs,
        pretty: bool,
    ) -> Result<String> {
        let service = SkillMapService::with_config(store, layout.config()?)?;
        let positioned = service.tree_layout(tree)?;
        info!(tree_id = tree, node_count = positioned.nodes.len(), "Tree laid out");
        if self.verbose {
            eprintln!("Laid out {} nodes of tree {}", positioned.nodes.len(), tree);
        }
        Self::to_json(&positioned, pretty)
    }

    /// Handle the map command
    pub fn map_command(
        &self,
        store: MemoryStore,
        user: Option<&str>,
        layout: &LayoutArgs,
        pretty: bool,
    ) -> Result<String> {
        let service = SkillMapService::with_config(store, layout.config()?)?;
        let map = service.skill_map(user)?;
        info!(tree_count = map.trees.len(), node_count = map.nodes.len(), "Skill map composed");
        if self.verbose {
            eprintln!(
                "Composed {} trees with {} nodes",
                map.trees.len(),
                map.nodes.len()
            );
        }
        Self::to_json(&map, pretty)
    }

    /// Handle the trees command
    pub fn trees_command(&self, store: &MemoryStore, json: bool, color: bool) -> Result<String> {
        let trees = store.list_trees()?;
        if self.verbose {
            eprintln!("Listing {} trees", trees.len());
        }

        if json {
            let summaries: Vec<TreeSummary> = trees
                .iter()
                .map(|t| TreeSummary {
                    id: &t.id,
                    title: &t.title,
                    status: t.status,
                    node_count: t.nodes.len(),
                    connection_count: t.connections.len(),
                })
                .collect();
            let listing = serde_json::json!({
                "trees": summaries,
                "total": trees.len(),
            });
            return Ok(serde_json::to_string_pretty(&listing)?);
        }

        let mut out = String::from("Trees:\n");
        for tree in &trees {
            out.push_str(&format!(
                "  {:<16} {:<24} {:<9} {} nodes, {} connections\n",
                tree.id,
                tree.title,
                status_label(tree.status, color),
                tree.nodes.len(),
                tree.connections.len()
            ));
        }
        out.push_str(&format!("\nTotal: {} trees", trees.len()));
        Ok(out)
    }

    /// Handle the validate command
    ///
    /// Returns the report and an error when any tree has problems, so the
    /// report is still written before the process fails.
    pub fn validate_command(
        &self,
        store: MemoryStore,
        color: bool,
    ) -> Result<(String, Result<()>)> {
        let diagnostics = SkillMapService::new(store).diagnostics()?;
        let mut out = String::new();
        let mut failing = 0;

        for report in &diagnostics {
            if report.is_clean() {
                out.push_str(&format!("{} {}\n", mark(true, color), report.tree_id));
                continue;
            }
            failing += 1;
            out.push_str(&format!("{} {}\n", mark(false, color), report.tree_id));
            for exercise in &report.missing_exercises {
                out.push_str(&format!("    missing exercise: {}\n", exercise));
            }
            for exercise in &report.duplicate_placements {
                out.push_str(&format!("    duplicate placement: {}\n", exercise));
            }
            for connection in &report.dangling_connections {
                out.push_str(&format!(
                    "    dangling connection: {} -> {}\n",
                    connection.from_ref, connection.to_ref
                ));
            }
        }

        let result = if failing == 0 {
            Ok(())
        } else {
            Err(anyhow!("{} of {} trees have dropped records", failing, diagnostics.len()))
        };
        Ok((out, result))
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}
