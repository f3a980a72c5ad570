use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::error::{Result, ShopError};

/// Terminal session multiplexer. Calls inherit stdio and block until the
/// user leaves the session.
pub trait Session {
    /// Errors only when the multiplexer cannot be started; the exit status of
    /// whatever ran inside the session is returned to the caller.
    fn attach(&self, dir: &Path, key: &str, command: &[String]) -> Result<ExitStatus>;
    fn detach(&self) -> Result<()>;
}

pub struct Zmx;

impl Session for Zmx {
    fn attach(&self, dir: &Path, key: &str, command: &[String]) -> Result<ExitStatus> {
        Command::new("zmx")
            .arg("attach")
            .arg(key)
            .args(command)
            .current_dir(dir)
            .status()
            .map_err(|e| ShopError::command("zmx", &["attach", key], e.to_string()))
    }

    fn detach(&self) -> Result<()> {
        let status = Command::new("zmx")
            .arg("detach")
            .status()
            .map_err(|e| ShopError::command("zmx", &["detach"], e.to_string()))?;
        if !status.success() {
            return Err(ShopError::command("zmx", &["detach"], status.to_string()));
        }
        Ok(())
    }
}

/// What to run inside a freshly attached session.
///
/// Extra arguments go to the agent program; a `flake.nix` in the workspace
/// wraps that (or a plain interactive shell) in `nix develop`.
pub fn attach_command(extra: &[String], has_devshell: bool, agent: &str, shell: &str) -> Vec<String> {
    let inner: Vec<String> = if !extra.is_empty() {
        std::iter::once(agent.to_string())
            .chain(extra.iter().cloned())
            .collect()
    } else if has_devshell {
        vec![shell.to_string()]
    } else {
        return Vec::new();
    };
    if !has_devshell {
        return inner;
    }
    let mut command: Vec<String> = ["nix", "develop", "--command"].map(String::from).to_vec();
    command.extend(inner);
    command
}

pub fn has_devshell(worktree: &Path) -> bool {
    worktree.join("flake.nix").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_session_without_args_or_devshell() {
        assert!(attach_command(&[], false, "claude", "/bin/zsh").is_empty());
    }

    #[test]
    fn extra_args_run_agent() {
        let cmd = attach_command(&strings(&["--resume"]), false, "claude", "/bin/zsh");
        assert_eq!(cmd, strings(&["claude", "--resume"]));
    }

    #[test]
    fn extra_args_inside_devshell() {
        let cmd = attach_command(&strings(&["-p", "fix it"]), true, "claude", "/bin/zsh");
        assert_eq!(
            cmd,
            strings(&["nix", "develop", "--command", "claude", "-p", "fix it"])
        );
    }

    #[test]
    fn devshell_without_args_runs_shell() {
        let cmd = attach_command(&[], true, "claude", "/bin/zsh");
        assert_eq!(cmd, strings(&["nix", "develop", "--command", "/bin/zsh"]));
    }

    #[test]
    fn devshell_detection() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_devshell(dir.path()));
        std::fs::write(dir.path().join("flake.nix"), "{}").unwrap();
        assert!(has_devshell(dir.path()));
    }
}
