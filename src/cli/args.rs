//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Inspect layered configuration: merge files by precedence and show where every value came from
#[derive(Parser, Debug)]
#[command(name = "lct")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Layer and its file as NAME=FILE, lowest precedence first (repeatable)
    #[arg(short, long = "layer", value_name = "NAME=FILE", value_parser = parse_layer_file, global = true)]
    pub layers: Vec<(String, PathBuf)>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every key with its layers
    Show {
        /// Render as a tree
        #[arg(long)]
        tree: bool,
        /// Files assigned to the configured layers in order
        #[arg(value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// Print the value of a key
    Get {
        /// Dotted key path
        key: String,
        /// Read this layer instead of the effective value
        #[arg(short = 'L', long = "from")]
        layer: Option<String>,
        /// Files assigned to the configured layers in order
        #[arg(value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// Show where a key's values came from
    Meta {
        /// Dotted key path
        key: String,
        /// Files assigned to the configured layers in order
        #[arg(value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// Print the merged configuration without provenance
    Dump {
        /// Output format (default: from settings)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Files assigned to the configured layers in order
        #[arg(value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,

    /// Print a settings template
    Template,

    /// Show settings path
    Path,
}

/// Parse a `NAME=FILE` pair.
fn parse_layer_file(s: &str) -> Result<(String, PathBuf), String> {
    let (name, file) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FILE, got '{s}'"))?;
    if name.is_empty() || file.is_empty() {
        return Err(format!("expected NAME=FILE, got '{s}'"));
    }
    Ok((name.to_string(), PathBuf::from(file)))
}
