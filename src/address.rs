//! Workspace addresses: `<eng_area>/worktrees/<repo>/<branch>`, optionally
//! prefixed with `<host>:` to name a workspace on another machine.

use std::path::{Path, PathBuf};

use crate::error::{Result, ShopError};

const WORKTREES_SEGMENT: &str = "worktrees";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: Option<String>,
    pub path: String,
}

/// Split a raw target at the first `:`.
pub fn parse_target(raw: &str) -> Target {
    match raw.split_once(':') {
        Some((host, path)) => Target {
            host: Some(host.to_string()),
            path: path.to_string(),
        },
        None => Target {
            host: None,
            path: raw.to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponents {
    pub eng_area: String,
    pub repo: String,
    pub worktree: String,
}

impl PathComponents {
    /// The canonical four-segment address. Also used as the session key.
    pub fn address(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.eng_area, WORKTREES_SEGMENT, self.repo, self.worktree
        )
    }
}

/// Segments past the fourth are accepted and ignored.
pub fn parse_path(raw: &str) -> Result<PathComponents> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() < 4 || parts[1] != WORKTREES_SEGMENT {
        return Err(ShopError::PathFormat(raw.to_string()));
    }
    Ok(PathComponents {
        eng_area: parts[0].to_string(),
        repo: parts[2].to_string(),
        worktree: parts[3].to_string(),
    })
}

pub fn repo_path(home: &Path, comp: &PathComponents) -> PathBuf {
    home.join(&comp.eng_area).join("repos").join(&comp.repo)
}

pub fn worktree_path(home: &Path, relative: &str) -> PathBuf {
    home.join(relative)
}
