//! Gathers status rows for every repository and workspace under the home
//! directory, and fetches the same report from remote hosts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::status::{self, BranchStatus};
use crate::{remote, vcs, workspace};

/// Command that produces a host's local report.
pub const REMOTE_STATUS_COMMAND: &str = "sweatshop status --local";

/// Engineering areas are the `eng*` directories directly under home.
pub fn eng_areas(home: &Path) -> Vec<(String, PathBuf)> {
    sorted_subdirs(home)
        .into_iter()
        .filter(|(name, _)| name.starts_with("eng"))
        .collect()
}

/// Directory children sorted by name. Unreadable directories are empty.
pub fn sorted_subdirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<(String, PathBuf)> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().to_string();
            Some((name, path))
        })
        .collect();
    dirs.sort();
    dirs
}

fn branch_status(ctx: &Context, repo_label: &str, dir: &Path) -> BranchStatus {
    let branch = vcs::current_branch(ctx.vcs, dir)
        .ok()
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| "(detached)".to_string());
    let dirty = status::summarize_dirty(&vcs::status_porcelain(ctx.vcs, dir));
    let upstream = vcs::upstream(ctx.vcs, dir);
    let (ahead, behind) = match upstream {
        Some(_) => vcs::ahead_behind(ctx.vcs, dir),
        None => (0, 0),
    };
    let modified = fs::metadata(dir).and_then(|m| m.modified()).ok();
    BranchStatus {
        repo: repo_label.to_string(),
        branch,
        dirty: if dirty.is_empty() { "clean".to_string() } else { dirty },
        remote: status::remote_marker(upstream.as_deref(), ahead, behind),
        last_commit: vcs::last_commit(ctx.vcs, dir),
        last_modified: status::format_time_ago(modified),
    }
}

/// One row per canonical repository followed by one per workspace of it.
pub fn local_rows(ctx: &Context) -> Vec<BranchStatus> {
    let home = &ctx.config.home;
    let mut rows = Vec::new();
    for (area, area_path) in eng_areas(home) {
        for (repo, repo_path) in sorted_subdirs(&area_path.join("repos")) {
            let label = format!("{area}/repos/{repo}");
            rows.push(branch_status(ctx, &label, &repo_path));
            for (_, ws_path) in sorted_subdirs(&area_path.join("worktrees").join(&repo)) {
                if workspace::is_worktree(&ws_path) {
                    rows.push(branch_status(ctx, &label, &ws_path));
                }
            }
        }
    }
    rows
}

/// Each reachable host's report, in host order.
pub fn remote_reports(ctx: &Context) -> Vec<(String, String)> {
    remote::collect(ctx.remote, &ctx.config.remote_hosts, REMOTE_STATUS_COMMAND)
}
