use std::io::{self, Write};
use std::process::Command;

use crate::error::{Result, ShopError};

const CONNECT_TIMEOUT: &str = "ConnectTimeout=2";

/// Lists `<area>/worktrees/<repo>` and `<area>/worktrees/<repo>/<branch>`
/// directories relative to the remote home.
const SCAN_COMMAND: &str =
    r#"find ~/eng*/worktrees -mindepth 1 -maxdepth 2 -type d 2>/dev/null | sed "s|^$HOME/||""#;

pub trait RemoteExec {
    fn run(&self, host: &str, command: &str) -> Result<String>;
    /// Runs with a terminal allocated and stdio inherited.
    fn interactive(&self, host: &str, command: &str) -> Result<()>;
}

pub struct Ssh;

impl RemoteExec for Ssh {
    fn run(&self, host: &str, command: &str) -> Result<String> {
        let args = ["-o", CONNECT_TIMEOUT, host, command];
        let output = Command::new("ssh")
            .args(args)
            .output()
            .map_err(|e| ShopError::command("ssh", &args, e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShopError::command("ssh", &args, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn interactive(&self, host: &str, command: &str) -> Result<()> {
        let args = ["-t", host, command];
        let status = Command::new("ssh")
            .args(args)
            .status()
            .map_err(|e| ShopError::command("ssh", &args, e.to_string()))?;
        if !status.success() {
            return Err(ShopError::command("ssh", &args, status.to_string()));
        }
        Ok(())
    }
}

/// Attaches to a workspace session on another host.
pub fn open_remote(remote: &dyn RemoteExec, host: &str, path: &str) -> Result<()> {
    tracing::info!(host, path, "opening remote shop");
    remote.interactive(host, &format!("zmx attach {path}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEntry {
    NewWorktree,
    ExistingWorktree,
}

pub fn classify_remote_path(path: &str) -> Option<RemoteEntry> {
    match path.split('/').count() {
        3 => Some(RemoteEntry::NewWorktree),
        4 => Some(RemoteEntry::ExistingWorktree),
        _ => None,
    }
}

/// Writes one completion line per workspace found on each host. Hosts that
/// cannot be reached are skipped.
pub fn scan(remote: &dyn RemoteExec, hosts: &[String], out: &mut dyn Write) -> io::Result<()> {
    for host in hosts {
        let listing = match remote.run(host, SCAN_COMMAND) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::debug!(host = %host, error = %e, "skipping remote host");
                continue;
            }
        };
        for path in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match classify_remote_path(path) {
                Some(RemoteEntry::NewWorktree) => {
                    writeln!(out, "{host}:{path}/\tremote: new worktree")?
                }
                Some(RemoteEntry::ExistingWorktree) => {
                    writeln!(out, "{host}:{path}\tremote: existing worktree")?
                }
                None => {}
            }
        }
    }
    Ok(())
}

/// Runs `command` on every host and pairs each successful output with its
/// host. Failing hosts are left out.
pub fn collect(remote: &dyn RemoteExec, hosts: &[String], command: &str) -> Vec<(String, String)> {
    hosts
        .iter()
        .filter_map(|host| match remote.run(host, command) {
            Ok(out) => Some((host.clone(), out)),
            Err(e) => {
                tracing::debug!(host = %host, error = %e, "skipping remote host");
                None
            }
        })
        .collect()
}
