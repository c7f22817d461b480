//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Read-through client for the ECCAIRS taxonomy service
#[derive(Parser, Debug)]
#[command(name = "eccairs-taxonomy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: ./eccairs-taxonomy.toml if present)
    #[arg(short, long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Taxonomy service base URL, overriding configuration and environment
    #[arg(long, global = true, value_name = "URL", value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the current taxonomy version
    Version,

    /// Show an attribute by taxonomy code
    Attribute {
        /// Attribute taxonomy code, e.g. 431
        code: u32,
    },

    /// Show an entity by taxonomy code
    Entity {
        /// Entity taxonomy code, e.g. 24
        code: u32,
    },

    /// Show the entity that owns an attribute
    ParentEntity {
        /// Attribute taxonomy code
        code: u32,
    },

    /// Report whether an attribute's value list has more than one level
    HasHierarchicalValues {
        /// Attribute taxonomy code
        code: u32,
    },

    /// Print an attribute's complete value list
    ValueList {
        /// Attribute taxonomy code
        code: u32,
    },
}
