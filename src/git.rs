use std::path::Path;
use std::process::Command;

use crate::error::{Result, ShopError};
use crate::vcs::Vcs;

pub struct GitCli;

impl Vcs for GitCli {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| ShopError::command("git", args, format!("is it installed? {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShopError::command("git", args, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_passthrough(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|e| ShopError::command("git", args, format!("is it installed? {e}")))?;
        if !status.success() {
            return Err(ShopError::command("git", args, status.to_string()));
        }
        Ok(())
    }
}
