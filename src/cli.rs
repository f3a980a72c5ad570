use clap::{Parser, Subcommand};

use crate::shop::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "sweatshop", about = "Git worktree workspaces bound to terminal sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open a workspace, creating it first if needed
    Open {
        /// <eng_area>/worktrees/<repo>/<branch>, optionally prefixed with <host>:
        target: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Create the workspace but don't attach a session
        #[arg(long)]
        no_attach: bool,
        /// Arguments for the agent started inside the session
        #[arg(last = true)]
        agent_args: Vec<String>,
    },
    /// Report a workspace's state relative to the default branch
    Close {
        path: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Merge the current workspace into its repository and remove it
    Merge,
    /// Print a status table for every repository and workspace
    Status {
        /// Skip remote hosts
        #[arg(long)]
        local: bool,
    },
    /// List workspace addresses for shell completion
    Completions,
    /// Move permission rules from a workspace into shared tiers
    Perms {
        path: String,
        /// Promote to the global tier
        #[arg(long = "global", value_name = "RULE")]
        global: Vec<String>,
        /// Promote to the repository tier
        #[arg(long = "repo", value_name = "RULE")]
        repo: Vec<String>,
        /// Drop from the workspace settings
        #[arg(long = "discard", value_name = "RULE")]
        discard: Vec<String>,
    },
    /// Print version information
    Version,
}
