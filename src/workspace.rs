use std::fs;
use std::path::Path;

use crate::address::PathComponents;
use crate::context::Context;
use crate::error::Result;
use crate::{perms, sweatfile::Sweatfile, vcs};

const OVERLAY_DIR: &str = "rcm-worktrees";

/// Creates the workspace directory, registers it as a git worktree of
/// `repo_path`, then layers the dotfile overlay and provisioning on top.
pub fn create(ctx: &Context, comp: &PathComponents, repo_path: &Path, ws_path: &Path) -> Result<()> {
    let home = &ctx.config.home;
    fs::create_dir_all(ws_path)?;
    tracing::info!(path = %ws_path.display(), "creating worktree");
    vcs::worktree_add(ctx.vcs, repo_path, ws_path)?;
    apply_overlay(home, &comp.eng_area, ws_path)?;

    let rules = perms::tier_rules(&ctx.config.tiers_dir(), &comp.repo)?;
    perms::apply_agent_settings(ws_path, &rules)?;
    Sweatfile::load_layered(home, &comp.eng_area, repo_path)?.apply(home, repo_path, ws_path)
}

/// Symlinks every file under `<home>/<eng_area>/rcm-worktrees` into the
/// workspace as a dotfile (`config/git/ignore` becomes `.config/git/ignore`).
/// Existing destinations are never replaced. No template tree is a no-op.
pub fn apply_overlay(home: &Path, eng_area: &str, ws_path: &Path) -> Result<()> {
    let overlay = home.join(eng_area).join(OVERLAY_DIR);
    if !overlay.is_dir() {
        return Ok(());
    }
    let mut files = Vec::new();
    collect_files(&overlay, &mut files)?;
    for src in files {
        let Ok(rel) = src.strip_prefix(&overlay) else {
            continue;
        };
        let dest = ws_path.join(format!(".{}", rel.display()));
        if dest.symlink_metadata().is_ok() {
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(&src, &dest)?;
    }
    Ok(())
}

fn collect_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// A linked worktree carries a `.git` file pointing back at its repository.
pub fn is_worktree(dir: &Path) -> bool {
    dir.join(".git").exists()
}
