//! CLI argument definitions for roadmap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Roadmap - prioritize product features on a value/effort matrix.
///
/// Start with `rmap feature add --name ...`, then `rmap matrix -H` to see
/// where each feature lands.
#[derive(Parser, Debug)]
#[command(name = "rmap")]
#[command(author, version, about = "Prioritize product features on a value/effort matrix and kanban board", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Log debug diagnostics to stderr (RMAP_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding config.kdl and the stored features.
    /// Defaults to the platform data directory (e.g. ~/.local/share/roadmap).
    #[arg(long = "data-dir", global = true, env = "RMAP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage key of the feature list (overrides config.kdl)
    #[arg(long = "storage-key", global = true)]
    pub storage_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feature management commands
    Feature {
        #[command(subcommand)]
        command: FeatureCommands,
    },

    /// Show the value/effort matrix
    ///
    /// Features are bucketed into quick wins, high value, foundation and
    /// strategic by impact and effort; blocked features are listed on their
    /// own with --blocked.
    Matrix(MatrixArgs),

    /// Show the kanban board (one column per status)
    Kanban {
        /// Only include features with this status (repeatable)
        #[arg(long)]
        status: Vec<String>,
    },

    /// Show counts per status and of blocked features
    Stats,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Scoring and planning attributes shared by `feature add` and `feature update`
#[derive(Args, Debug, Clone, Default)]
pub struct FeatureFields {
    /// Users reached per quarter (0-1000)
    #[arg(long)]
    pub reach: Option<f64>,

    /// Impact on the objective (0-3)
    #[arg(long)]
    pub impact: Option<f64>,

    /// Confidence in the estimates, percent (0-100)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Effort in weeks (values below 1 count as 1)
    #[arg(long)]
    pub effort: Option<f64>,

    /// Priority (low, medium, high, urgent)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Status (BACKLOG, TODO, IN_PROGRESS, DONE)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Target date (YYYY-MM-DD); an empty value clears it
    #[arg(long)]
    pub deadline: Option<String>,

    /// Business impact rating for the simple score (1-5)
    #[arg(long)]
    pub business_impact: Option<f64>,

    /// Urgency rating for the simple score (1-5)
    #[arg(long)]
    pub urgency: Option<f64>,
}

/// Feature subcommands
#[derive(Subcommand, Debug)]
pub enum FeatureCommands {
    /// Add a new feature
    Add {
        /// Feature name
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        fields: FeatureFields,
    },

    /// List features with their scores
    List {
        /// Only include features with this status (repeatable)
        #[arg(long)]
        status: Vec<String>,
    },

    /// Show a feature with its scores and quadrant
    Show {
        /// Feature ID (e.g., ft-a1b2)
        id: String,
    },

    /// Update a feature; flags not given keep their current value
    Update {
        /// Feature ID
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        fields: FeatureFields,
    },

    /// Mark a feature as blocked
    Block {
        /// Feature ID
        id: String,

        /// Why work on the feature is blocked
        #[arg(short, long)]
        reason: String,
    },

    /// Clear a feature's blocked state and reason
    Unblock {
        /// Feature ID
        id: String,
    },

    /// Move a feature to another status column
    Move {
        /// Feature ID
        id: String,

        /// Target status (BACKLOG, TODO, IN_PROGRESS, DONE)
        status: String,
    },

    /// Delete a feature
    Delete {
        /// Feature ID
        id: String,
    },
}

/// Arguments of `rmap matrix`
#[derive(Args, Debug, Clone, Default)]
pub struct MatrixArgs {
    /// Only include features with this status (repeatable)
    #[arg(long)]
    pub status: Vec<String>,

    /// Show only the blocked features
    #[arg(long)]
    pub blocked: bool,

    /// Surface width in CSS pixels (overrides config.kdl)
    #[arg(long)]
    pub width: Option<u32>,

    /// Surface height in CSS pixels (overrides config.kdl)
    #[arg(long)]
    pub height: Option<u32>,

    /// Device pixel ratio (overrides config.kdl)
    #[arg(long)]
    pub dpr: Option<f64>,

    /// Scroll a list before rendering, e.g. quick_wins=120 (repeatable)
    #[arg(long, value_name = "BUCKET=PX")]
    pub scroll: Vec<String>,

    /// Resolve a click at surface coordinates, e.g. 100,150
    #[arg(long, value_name = "X,Y")]
    pub click: Option<String>,

    /// Include the drawing commands of the rendered frame
    #[arg(long)]
    pub commands: bool,

    /// Deadline format (chrono strftime, overrides config.kdl)
    #[arg(long)]
    pub date_format: Option<String>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every setting with where its value came from
    Show,

    /// Get a configuration value from config.kdl
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value in config.kdl
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // This will panic if the CLI is misconfigured
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_feature_add() {
        let cli = Cli::try_parse_from([
            "rmap", "feature", "add", "--name", "Search", "--reach", "500", "--impact", "3",
            "-p", "high",
        ])
        .unwrap();
        match cli.command {
            Commands::Feature {
                command: FeatureCommands::Add { name, fields },
            } => {
                assert_eq!(name, "Search");
                assert_eq!(fields.reach, Some(500.0));
                assert_eq!(fields.impact, Some(3.0));
                assert_eq!(fields.priority.as_deref(), Some("high"));
                assert_eq!(fields.effort, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_matrix_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "rmap", "-H", "matrix", "--status", "TODO", "--status", "DONE", "--scroll",
            "quick_wins=120", "--click", "100,150",
        ])
        .unwrap();
        assert!(cli.human_readable);
        match cli.command {
            Commands::Matrix(args) => {
                assert_eq!(args.status, vec!["TODO", "DONE"]);
                assert_eq!(args.scroll, vec!["quick_wins=120"]);
                assert_eq!(args.click.as_deref(), Some("100,150"));
                assert!(!args.blocked);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rmap", "stats", "-v", "--data-dir", "/tmp/rm"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/rm")));
    }

    #[test]
    fn test_block_requires_reason() {
        assert!(Cli::try_parse_from(["rmap", "feature", "block", "ft-a1b2"]).is_err());
    }
}
