use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("invalid worktree path: {0} (expected <eng_area>/worktrees/<repo>/<branch>)")]
    PathFormat(String),

    #[error("{0}")]
    Lookup(String),

    #[error("{program} {args} failed: {detail}")]
    ExternalCommand {
        program: String,
        args: String,
        detail: String,
    },

    #[error("could not parse {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShopError {
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    pub fn command(program: &str, args: &[&str], detail: impl Into<String>) -> Self {
        Self::ExternalCommand {
            program: program.to_string(),
            args: args.join(" "),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
