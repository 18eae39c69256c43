//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::NodeId;

/// Hierarchical tree editor: add, rename and remove nodes, persisted locally
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding the saved tree (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub store_dir: Option<PathBuf>,

    /// Slot holding the tree (overrides config)
    #[arg(long, global = true)]
    pub slot: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tree
    Show {
        /// Hide node ids
        #[arg(long)]
        plain: bool,
    },

    /// Add a child node named "Node" as last child of PARENT
    Add {
        /// Id of the parent node
        parent: NodeId,
    },

    /// Rename a node
    Rename {
        /// Id of the node
        id: NodeId,
        /// New name (may be empty)
        #[arg(allow_hyphen_values = true)]
        name: String,
    },

    /// Remove a node and its whole subtree
    Remove {
        /// Id of the node
        id: NodeId,
    },

    /// Replace the entire tree with a fresh root
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the tree as a paginated text document
    Export {
        /// Output file (default: export.file_name from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Lines per page (default: export.page_height from config)
        #[arg(long)]
        page_height: Option<usize>,
    },

    /// Show store location and tree statistics
    Info,

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
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
