//! Opening and closing workspaces around an interactive session.

use clap::ValueEnum;
use std::io::Write;
use std::path::Path;

use crate::address::{self, PathComponents};
use crate::context::Context;
use crate::error::Result;
use crate::tap::TapWriter;
use crate::{session, sweatfile, vcs, workspace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Tap,
}

pub fn open_new(
    ctx: &Context,
    path: &str,
    format: OutputFormat,
    no_attach: bool,
    extra: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let comp = address::parse_path(path)?;
    let home = &ctx.config.home;
    let repo_path = address::repo_path(home, &comp);
    let ws_path = address::worktree_path(home, path);

    workspace::create(ctx, &comp, &repo_path, &ws_path)?;

    if no_attach {
        return Ok(());
    }
    attach_then_close(ctx, &comp, path, &ws_path, format, extra, out)
}

pub fn open_existing(
    ctx: &Context,
    path: &str,
    format: OutputFormat,
    no_attach: bool,
    extra: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let comp = address::parse_path(path)?;
    if no_attach {
        return Ok(());
    }
    let ws_path = address::worktree_path(&ctx.config.home, path);
    attach_then_close(ctx, &comp, path, &ws_path, format, extra, out)
}

fn attach_then_close(
    ctx: &Context,
    comp: &PathComponents,
    path: &str,
    ws_path: &Path,
    format: OutputFormat,
    extra: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let devshell = session::has_devshell(ws_path);
    if devshell {
        tracing::info!("flake.nix detected, starting session in nix develop");
    }
    let command = session::attach_command(extra, devshell, &ctx.config.agent, &ctx.config.shell);

    sweatfile::snapshot_env(ws_path)?;
    let status = ctx.session.attach(ws_path, &comp.address(), &command)?;
    if !status.success() {
        tracing::warn!(worktree = %path, %status, "session exited unsuccessfully");
    }
    close(ctx, path, format, out)
}

/// Reports how the workspace relates to the repository's default branch.
/// Paths outside the address scheme and repositories without a current
/// branch have nothing to report and succeed.
pub fn close(ctx: &Context, path: &str, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let Ok(comp) = address::parse_path(path) else {
        return Ok(());
    };
    let home = &ctx.config.home;
    let repo_path = address::repo_path(home, &comp);
    let ws_path = address::worktree_path(home, path);

    let default_branch = match vcs::current_branch(ctx.vcs, &repo_path) {
        Ok(branch) if !branch.is_empty() => branch,
        _ => {
            tracing::warn!(repo = %repo_path.display(), "could not determine default branch");
            return Ok(());
        }
    };

    let ahead = vcs::commits_ahead(ctx.vcs, &ws_path, &default_branch, &comp.worktree);
    let porcelain = vcs::status_porcelain(ctx.vcs, &ws_path);
    let desc = status_description(&default_branch, ahead, &porcelain);

    match format {
        OutputFormat::Tap => {
            let mut tap = TapWriter::new(out);
            tap.plan_ahead(1)?;
            tap.ok(&format!("close {} # {}", comp.worktree, desc))?;
        }
        OutputFormat::Human => tracing::info!(worktree = %path, "{desc}"),
    }

    report_env_changes(path, ws_path.as_path());
    Ok(())
}

fn report_env_changes(path: &str, ws_path: &Path) {
    let diff = sweatfile::diff_env(ws_path);
    if diff.is_empty() {
        sweatfile::cleanup_env_snapshot(ws_path);
        return;
    }
    for (key, value) in &diff.added {
        tracing::warn!(worktree = %path, "env added during session: {key}={value}");
    }
    for (key, value) in &diff.changed {
        tracing::warn!(worktree = %path, "env changed during session: {key}={value}");
    }
    sweatfile::cleanup_env_snapshot(ws_path);
}

pub fn status_description(default_branch: &str, commits_ahead: u32, porcelain: &str) -> String {
    let mut parts = Vec::new();
    if commits_ahead == 1 {
        parts.push(format!("1 commit ahead of {default_branch}"));
    } else {
        parts.push(format!("{commits_ahead} commits ahead of {default_branch}"));
    }
    let clean = porcelain.is_empty();
    parts.push(if clean { "clean" } else { "dirty" }.to_string());
    if commits_ahead == 0 && clean {
        parts.push("(merged)".to_string());
    }
    parts.join(", ")
}
