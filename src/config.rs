use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShopError};

pub const REMOTE_HOSTS_VAR: &str = "SWEATSHOP_REMOTE_HOSTS";
const AGENT_VAR: &str = "SWEATSHOP_AGENT";
const DEFAULT_AGENT: &str = "claude";
const DEFAULT_SHELL: &str = "sh";

/// Everything sweatshop reads from the process environment, resolved once.
#[derive(Debug, Clone)]
pub struct Config {
    pub home: PathBuf,
    pub remote_hosts: Vec<String>,
    pub shell: String,
    pub agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ShopError::lookup("could not determine home directory"))?;
        let remote_hosts = remote_hosts(&home, std::env::var(REMOTE_HOSTS_VAR).ok().as_deref());
        Ok(Self {
            remote_hosts,
            shell: non_empty_var("SHELL").unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            agent: non_empty_var(AGENT_VAR).unwrap_or_else(|| DEFAULT_AGENT.to_string()),
            home,
        })
    }

    /// A config rooted at `home` with no remotes and default programs.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            remote_hosts: Vec::new(),
            shell: DEFAULT_SHELL.to_string(),
            agent: DEFAULT_AGENT.to_string(),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        config_dir(&self.home)
    }

    pub fn tiers_dir(&self) -> PathBuf {
        self.config_dir().join("tiers")
    }
}

fn config_dir(home: &Path) -> PathBuf {
    home.join(".config").join("sweatshop")
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Hosts from the colon-separated override, else the `remotes` file, else none.
pub fn remote_hosts(home: &Path, env_override: Option<&str>) -> Vec<String> {
    if let Some(hosts) = env_override
        && !hosts.is_empty()
    {
        return hosts
            .split(':')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect();
    }
    let remotes_file = config_dir(home).join("remotes");
    match fs::read_to_string(&remotes_file) {
        Ok(text) => parse_hosts_file(&text),
        Err(_) => Vec::new(),
    }
}

fn parse_hosts_file(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
