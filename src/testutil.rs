//! Deterministic stand-ins for git, zmx and ssh.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::error::{Result, ShopError};
use crate::remote::RemoteExec;
use crate::session::Session;
use crate::vcs::Vcs;

type Scripted = std::result::Result<String, String>;

/// Answers each call with the first scripted response whose prefix matches
/// the joined arguments, or empty output. A successful `worktree remove`
/// deletes the directory like git would.
#[derive(Default)]
pub struct FakeVcs {
    responses: Vec<(String, Scripted)>,
    calls: RefCell<Vec<(PathBuf, String)>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, out: std::result::Result<&str, &str>) -> Self {
        let out = out.map(String::from).map_err(String::from);
        self.responses.push((prefix.to_string(), out));
        self
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.borrow().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|(_, line)| line.starts_with(prefix))
    }

    fn answer(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let line = args.join(" ");
        self.calls.borrow_mut().push((dir.to_path_buf(), line.clone()));
        let scripted = self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| Ok(String::new()));
        match scripted {
            Ok(out) => {
                if let ["worktree", "remove", path, ..] = args {
                    let _ = std::fs::remove_dir_all(path);
                }
                Ok(out)
            }
            Err(detail) => Err(ShopError::command("git", args, detail)),
        }
    }
}

impl Vcs for FakeVcs {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        self.answer(dir, args)
    }

    fn run_passthrough(&self, dir: &Path, args: &[&str]) -> Result<()> {
        self.answer(dir, args).map(|_| ())
    }
}

#[derive(Default)]
pub struct FakeSession {
    pub exit_code: i32,
    pub unavailable: bool,
    pub attaches: RefCell<Vec<(PathBuf, String, Vec<String>)>>,
    pub detaches: Cell<usize>,
}

impl Session for FakeSession {
    fn attach(&self, dir: &Path, key: &str, command: &[String]) -> Result<ExitStatus> {
        if self.unavailable {
            return Err(ShopError::command("zmx", &["attach", key], "not found"));
        }
        self.attaches
            .borrow_mut()
            .push((dir.to_path_buf(), key.to_string(), command.to_vec()));
        Ok(ExitStatus::from_raw(self.exit_code << 8))
    }

    fn detach(&self) -> Result<()> {
        self.detaches.set(self.detaches.get() + 1);
        Ok(())
    }
}

/// Hosts without a scripted answer are unreachable.
#[derive(Default)]
pub struct FakeRemote {
    pub outputs: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl FakeRemote {
    pub fn with_host(mut self, host: &str, output: &str) -> Self {
        self.outputs.insert(host.to_string(), output.to_string());
        self
    }
}

impl RemoteExec for FakeRemote {
    fn run(&self, host: &str, command: &str) -> Result<String> {
        self.calls
            .borrow_mut()
            .push((host.to_string(), command.to_string()));
        self.outputs
            .get(host)
            .cloned()
            .ok_or_else(|| ShopError::command("ssh", &[host], "connection timed out"))
    }

    fn interactive(&self, host: &str, command: &str) -> Result<()> {
        self.run(host, command).map(|_| ())
    }
}
