use std::path::Path;

use crate::error::Result;

/// The one capability sweatshop needs from version control: run a command in
/// a directory, either capturing stdout or with inherited stdio.
pub trait Vcs {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String>;
    fn run_passthrough(&self, dir: &Path, args: &[&str]) -> Result<()>;
}

pub fn current_branch(vcs: &dyn Vcs, dir: &Path) -> Result<String> {
    Ok(vcs.run(dir, &["branch", "--show-current"])?.trim().to_string())
}

/// Commits on `branch` that are not on `base`. Zero when the query fails.
pub fn commits_ahead(vcs: &dyn Vcs, dir: &Path, base: &str, branch: &str) -> u32 {
    let range = format!("{base}..{branch}");
    vcs.run(dir, &["rev-list", "--count", &range])
        .ok()
        .and_then(|out| out.trim().parse().ok())
        .unwrap_or(0)
}

/// Raw `status --porcelain` output; leading spaces are part of the status code
/// so only the trailing newline is stripped. Empty when the query fails.
pub fn status_porcelain(vcs: &dyn Vcs, dir: &Path) -> String {
    vcs.run(dir, &["status", "--porcelain"])
        .map(|out| out.trim_end().to_string())
        .unwrap_or_default()
}

pub fn worktree_add(vcs: &dyn Vcs, repo_dir: &Path, ws_path: &Path) -> Result<()> {
    let path_str = ws_path.to_string_lossy();
    vcs.run_passthrough(repo_dir, &["worktree", "add", &path_str])
}

pub fn worktree_remove(vcs: &dyn Vcs, repo_dir: &Path, ws_path: &Path) -> Result<()> {
    let path_str = ws_path.to_string_lossy();
    vcs.run_passthrough(repo_dir, &["worktree", "remove", &path_str])
}

pub fn merge_no_ff(vcs: &dyn Vcs, repo_dir: &Path, branch: &str) -> Result<()> {
    let message = format!("Merge worktree: {branch}");
    vcs.run_passthrough(repo_dir, &["merge", "--no-ff", branch, "-m", &message])
}

pub fn upstream(vcs: &dyn Vcs, dir: &Path) -> Option<String> {
    vcs.run(dir, &["rev-parse", "--abbrev-ref", "@{upstream}"])
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `(ahead, behind)` relative to the upstream branch.
pub fn ahead_behind(vcs: &dyn Vcs, dir: &Path) -> (u32, u32) {
    let Ok(out) = vcs.run(dir, &["rev-list", "--left-right", "--count", "@{upstream}...HEAD"])
    else {
        return (0, 0);
    };
    parse_left_right(&out).unwrap_or((0, 0))
}

fn parse_left_right(output: &str) -> Option<(u32, u32)> {
    let mut fields = output.split_whitespace();
    let behind = fields.next()?.parse().ok()?;
    let ahead = fields.next()?.parse().ok()?;
    Some((ahead, behind))
}

pub fn last_commit(vcs: &dyn Vcs, dir: &Path) -> String {
    vcs.run(dir, &["log", "-1", "--format=%cr"])
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeVcs;
    use std::path::PathBuf;

    #[test]
    fn left_right_counts() {
        assert_eq!(parse_left_right("2\t5\n"), Some((5, 2)));
        assert_eq!(parse_left_right("0\t0"), Some((0, 0)));
        assert_eq!(parse_left_right("garbage"), None);
        assert_eq!(parse_left_right(""), None);
    }

    #[test]
    fn commits_ahead_parses_count() {
        let vcs = FakeVcs::new().respond("rev-list --count master..feat", Ok("3\n"));
        assert_eq!(commits_ahead(&vcs, Path::new("/wt"), "master", "feat"), 3);
    }

    #[test]
    fn commits_ahead_defaults_to_zero_on_failure() {
        let vcs = FakeVcs::new().respond("rev-list", Err("bad revision"));
        assert_eq!(commits_ahead(&vcs, Path::new("/wt"), "master", "feat"), 0);
    }

    #[test]
    fn porcelain_keeps_leading_space() {
        let vcs = FakeVcs::new().respond("status --porcelain", Ok(" M a.rs\n?? b.rs\n"));
        assert_eq!(status_porcelain(&vcs, Path::new("/wt")), " M a.rs\n?? b.rs");
    }

    #[test]
    fn current_branch_is_trimmed() {
        let vcs = FakeVcs::new().respond("branch --show-current", Ok("master\n"));
        assert_eq!(current_branch(&vcs, Path::new("/repo")).unwrap(), "master");
    }

    #[test]
    fn merge_uses_no_ff_with_message() {
        let vcs = FakeVcs::new();
        merge_no_ff(&vcs, Path::new("/repo"), "feat").unwrap();
        let calls = vcs.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/repo"));
        assert_eq!(calls[0].1, "merge --no-ff feat -m Merge worktree: feat");
    }

    #[test]
    fn upstream_missing_is_none() {
        let vcs = FakeVcs::new().respond("rev-parse", Err("no upstream configured"));
        assert_eq!(upstream(&vcs, Path::new("/wt")), None);
    }
}
