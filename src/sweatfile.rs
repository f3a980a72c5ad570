//! Per-repository workspace provisioning read from a `sweatfile`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, ShopError};

pub const ENV_FILE: &str = ".sweatshop-env";
const ENV_SNAPSHOT: &str = ".sweatshop-env.snapshot";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub source: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sweatfile {
    pub git_excludes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub files: BTreeMap<String, FileEntry>,
    pub setup: Vec<String>,
}

impl Sweatfile {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| ShopError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// A missing file is an empty sweatfile.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Area-wide settings first, repo settings layered on top.
    pub fn load_layered(home: &Path, eng_area: &str, repo_path: &Path) -> Result<Self> {
        let area = Self::load(&home.join(eng_area).join("sweatfile"))?;
        let repo = Self::load(&repo_path.join("sweatfile"))?;
        Ok(area.merged_with(repo))
    }

    fn merged_with(mut self, other: Sweatfile) -> Sweatfile {
        for pattern in other.git_excludes {
            if !self.git_excludes.contains(&pattern) {
                self.git_excludes.push(pattern);
            }
        }
        for cmd in other.setup {
            if !self.setup.contains(&cmd) {
                self.setup.push(cmd);
            }
        }
        self.env.extend(other.env);
        self.files.extend(other.files);
        self
    }

    pub fn apply(&self, home: &Path, repo_path: &Path, worktree: &Path) -> Result<()> {
        let exclude = repo_path.join(".git").join("info").join("exclude");
        apply_git_excludes(&exclude, &self.git_excludes)?;
        apply_files(home, worktree, &self.files)?;
        apply_env(worktree, &self.env)?;
        run_setup(worktree, &self.setup)
    }
}

/// Appends patterns not already listed.
pub fn apply_git_excludes(exclude_path: &Path, patterns: &[String]) -> Result<()> {
    if patterns.is_empty() {
        return Ok(());
    }
    let existing = fs::read_to_string(exclude_path).unwrap_or_default();
    let missing: Vec<&String> = patterns
        .iter()
        .filter(|p| !existing.lines().any(|line| line == p.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    if let Some(parent) = exclude_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(exclude_path)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    for pattern in missing {
        writeln!(file, "{pattern}")?;
    }
    Ok(())
}

fn expand_home(home: &Path, source: &str) -> PathBuf {
    match source.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(source),
    }
}

/// Each entry lands at `worktree/.<name>`. Existing files are left alone.
pub fn apply_files(home: &Path, worktree: &Path, files: &BTreeMap<String, FileEntry>) -> Result<()> {
    for (name, entry) in files {
        let dest = worktree.join(format!(".{name}"));
        if dest.symlink_metadata().is_ok() {
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Some(source) = &entry.source {
            std::os::unix::fs::symlink(expand_home(home, source), &dest)?;
        } else if let Some(content) = &entry.content {
            fs::write(&dest, content)?;
        }
    }
    Ok(())
}

pub fn apply_env(worktree: &Path, env: &BTreeMap<String, String>) -> Result<()> {
    if env.is_empty() {
        return Ok(());
    }
    let body: String = env.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
    fs::write(worktree.join(ENV_FILE), body)?;
    Ok(())
}

pub fn run_setup(worktree: &Path, commands: &[String]) -> Result<()> {
    for cmd in commands {
        tracing::info!(command = %cmd, "running setup");
        let status = Command::new("sh")
            .args(["-c", cmd.as_str()])
            .current_dir(worktree)
            .status()
            .map_err(|e| ShopError::command("sh", &["-c", cmd.as_str()], e.to_string()))?;
        if !status.success() {
            return Err(ShopError::command("sh", &["-c", cmd.as_str()], status.to_string()));
        }
    }
    Ok(())
}

pub fn snapshot_env(worktree: &Path) -> Result<()> {
    match fs::read(worktree.join(ENV_FILE)) {
        Ok(data) => Ok(fs::write(worktree.join(ENV_SNAPSHOT), data)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnvDiff {
    pub added: BTreeMap<String, String>,
    pub changed: BTreeMap<String, String>,
}

impl EnvDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty()
    }
}

/// Compares the env file against the open-time snapshot. A missing snapshot
/// is an empty baseline.
pub fn diff_env(worktree: &Path) -> EnvDiff {
    let before = parse_env_file(&worktree.join(ENV_SNAPSHOT));
    let after = parse_env_file(&worktree.join(ENV_FILE));
    let mut diff = EnvDiff::default();
    for (key, value) in after {
        match before.get(&key) {
            None => {
                diff.added.insert(key, value);
            }
            Some(old) if *old != value => {
                diff.changed.insert(key, value);
            }
            Some(_) => {}
        }
    }
    diff
}

pub fn cleanup_env_snapshot(worktree: &Path) {
    let _ = fs::remove_file(worktree.join(ENV_SNAPSHOT));
}

fn parse_env_file(path: &Path) -> BTreeMap<String, String> {
    let Ok(text) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    text.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
