//! CLI command definitions.

use clap::{Parser, Subcommand};
use courier::AttachmentArg;
use std::path::PathBuf;

/// Courier - publish scheduled post folders to social platforms
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Publish scheduled post folders to social platforms", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Extra configuration file, applied after the default locations
    #[arg(long, global = true, env = "COURIER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the post directory and publish folders when they are due
    Watch {
        /// Log what would be published without calling any platform
        #[arg(long)]
        dry_run: bool,

        /// Override the configured watch directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Periodically log engagement of the latest post on each platform
        #[arg(long)]
        stats: bool,
    },

    /// Create a scheduled post folder in the watch directory
    Create {
        /// Local publish time, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        at: String,

        /// Target platform (repeatable)
        #[arg(long = "platform", required = true)]
        platforms: Vec<String>,

        /// Body text
        #[arg(long, default_value = "")]
        text: String,

        /// Attachment as PATH or PATH::ALT TEXT (repeatable)
        #[arg(long = "file")]
        files: Vec<AttachmentArg>,

        /// Text of a reply appended to the thread (repeatable)
        #[arg(long = "reply")]
        replies: Vec<String>,
    },

    /// Validate a post folder without publishing it
    Check {
        /// Path to the post folder
        folder: PathBuf,
    },
}
