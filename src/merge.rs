use std::path::{Component, Path};

use crate::address;
use crate::context::Context;
use crate::error::{Result, ShopError};
use crate::vcs;

/// Merges the workspace containing `cwd` into its repository and removes it.
/// A failed merge leaves the workspace exactly as git left it.
pub fn run(ctx: &Context, cwd: &Path) -> Result<()> {
    let home = &ctx.config.home;
    let relative = relative_to_home(home, cwd)?;
    let comp = address::parse_path(&relative)
        .map_err(|_| ShopError::PathFormat(format!("not in a worktree directory: {}", cwd.display())))?;

    let repo_path = address::repo_path(home, &comp);
    if !repo_path.is_dir() {
        return Err(ShopError::lookup(format!(
            "repository not found: {}",
            repo_path.display()
        )));
    }

    tracing::info!(worktree = %comp.worktree, "merging worktree");
    if let Err(e) = vcs::merge_no_ff(ctx.vcs, &repo_path, &comp.worktree) {
        tracing::error!("merge failed, not removing worktree");
        return Err(e);
    }

    let ws_path = address::worktree_path(home, &comp.address());
    tracing::info!(path = %ws_path.display(), "removing worktree");
    vcs::worktree_remove(ctx.vcs, &repo_path, &ws_path)?;

    tracing::info!("detaching from zmx session");
    ctx.session.detach()
}

fn relative_to_home(home: &Path, cwd: &Path) -> Result<String> {
    let not_inside = || ShopError::lookup(format!("not in a subdirectory of home: {}", cwd.display()));
    let relative = cwd.strip_prefix(home).map_err(|_| not_inside())?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return Err(not_inside());
    }
    Ok(parts.join("/"))
}
