use std::io::{self, Write};
use std::path::Path;

use crate::context::Context;
use crate::report::{eng_areas, sorted_subdirs};
use crate::{remote, workspace};

/// `<area>/worktrees/<repo>/` for every repository (a place to start a new
/// workspace) and `<area>/worktrees/<repo>/<branch>` for every existing one.
pub fn local(home: &Path, out: &mut dyn Write) -> io::Result<()> {
    for (area, area_path) in eng_areas(home) {
        for (repo, _) in sorted_subdirs(&area_path.join("repos")) {
            writeln!(out, "{area}/worktrees/{repo}/\tnew worktree")?;
            for (branch, ws_path) in sorted_subdirs(&area_path.join("worktrees").join(&repo)) {
                if workspace::is_worktree(&ws_path) {
                    writeln!(out, "{area}/worktrees/{repo}/{branch}\texisting worktree")?;
                }
            }
        }
    }
    Ok(())
}

pub fn all(ctx: &Context, out: &mut dyn Write) -> io::Result<()> {
    local(&ctx.config.home, out)?;
    remote::scan(ctx.remote, &ctx.config.remote_hosts, out)
}
