//! Permission rule tiers and the per-workspace agent settings file.
//!
//! A tier is a JSON allow-list (`{"allow": [...]}`); `tiers/global.json`
//! applies everywhere and `tiers/repos/<repo>.json` to one repository.
//! New workspaces start with both tiers in `.claude/settings.local.json`,
//! and rules approved during a session can be promoted back into a tier.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use crate::address;
use crate::error::{Result, ShopError};

pub const SETTINGS_FILE: &str = ".claude/settings.local.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default)]
    pub allow: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    PromoteGlobal,
    PromoteRepo,
    Keep,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDecision {
    pub rule: String,
    pub action: ReviewAction,
}

pub fn global_tier_path(tiers_dir: &Path) -> PathBuf {
    tiers_dir.join("global.json")
}

pub fn repo_tier_path(tiers_dir: &Path, repo: &str) -> PathBuf {
    tiers_dir.join("repos").join(format!("{repo}.json"))
}

fn parse_error(path: &Path, e: serde_json::Error) -> ShopError {
    ShopError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}

fn read_json(path: &Path) -> Result<Option<Value>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text).map_err(|e| parse_error(path, e))?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| parse_error(path, e))?;
    fs::write(path, text + "\n")?;
    Ok(())
}

/// A missing tier file is an empty tier.
pub fn load_tier(path: &Path) -> Result<Tier> {
    match read_json(path)? {
        Some(value) => serde_json::from_value(value).map_err(|e| parse_error(path, e)),
        None => Ok(Tier::default()),
    }
}

pub fn append_to_tier(path: &Path, rule: &str) -> Result<()> {
    let mut tier = load_tier(path)?;
    if tier.allow.iter().any(|r| r == rule) {
        return Ok(());
    }
    tier.allow.push(rule.to_string());
    write_json(path, &tier)
}

/// Rules a new workspace in `repo` starts with.
pub fn tier_rules(tiers_dir: &Path, repo: &str) -> Result<Vec<String>> {
    let mut rules = load_tier(&global_tier_path(tiers_dir))?.allow;
    for rule in load_tier(&repo_tier_path(tiers_dir, repo))?.allow {
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }
    Ok(rules)
}

pub fn load_settings_rules(settings_path: &Path) -> Result<Vec<String>> {
    let Some(doc) = read_json(settings_path)? else {
        return Ok(Vec::new());
    };
    Ok(doc
        .pointer("/permissions/allow")
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}

/// Replaces `permissions.allow`, keeping every other key in the file.
pub fn save_settings_rules(settings_path: &Path, rules: &[String]) -> Result<()> {
    let mut doc = read_json(settings_path)?.unwrap_or_else(|| json!({}));
    if !doc.is_object() {
        doc = json!({});
    }
    if !doc["permissions"].is_object() {
        doc["permissions"] = json!({});
    }
    doc["permissions"]["allow"] = json!(rules);
    write_json(settings_path, &doc)
}

/// Writes the starting settings for a workspace: the given rules followed by
/// edit and write access scoped to the workspace itself.
pub fn apply_agent_settings(worktree: &Path, rules: &[String]) -> Result<()> {
    let scope = format!("/{}/**", worktree.display());
    let mut allow = rules.to_vec();
    allow.push(format!("Edit({scope})"));
    allow.push(format!("Write({scope})"));
    save_settings_rules(&worktree.join(SETTINGS_FILE), &allow)
}

pub fn remove_rules(current: &[String], remove: &[String]) -> Vec<String> {
    current
        .iter()
        .filter(|rule| !remove.contains(rule))
        .cloned()
        .collect()
}

pub fn route_decisions(
    tiers_dir: &Path,
    repo: &str,
    settings_path: &Path,
    decisions: &[ReviewDecision],
) -> Result<()> {
    let mut to_remove = Vec::new();
    for decision in decisions {
        match decision.action {
            ReviewAction::PromoteGlobal => {
                append_to_tier(&global_tier_path(tiers_dir), &decision.rule)?;
                to_remove.push(decision.rule.clone());
            }
            ReviewAction::PromoteRepo => {
                append_to_tier(&repo_tier_path(tiers_dir, repo), &decision.rule)?;
                to_remove.push(decision.rule.clone());
            }
            ReviewAction::Discard => to_remove.push(decision.rule.clone()),
            ReviewAction::Keep => {}
        }
    }
    if to_remove.is_empty() {
        return Ok(());
    }
    let current = load_settings_rules(settings_path)?;
    save_settings_rules(settings_path, &remove_rules(&current, &to_remove))
}

/// Routes decisions for the workspace at `path` (an address relative to home).
pub fn review_workspace(
    tiers_dir: &Path,
    home: &Path,
    path: &str,
    decisions: &[ReviewDecision],
) -> Result<()> {
    let comp = address::parse_path(path)?;
    let settings = address::worktree_path(home, &comp.address()).join(SETTINGS_FILE);
    route_decisions(tiers_dir, &comp.repo, &settings, decisions)
}
