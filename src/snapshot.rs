use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::TournamentSnapshot;

const CACHE_DIR: &str = "wc26_pickem";
const CACHE_FILE: &str = "snapshot.json";

/// SHA-256 of the snapshot's JSON form; equal snapshots share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotFingerprint(String);

impl SnapshotFingerprint {
    pub fn of(snapshot: &TournamentSnapshot) -> Result<Self> {
        let json = serde_json::to_vec(snapshot).context("serialize snapshot for fingerprint")?;
        Ok(Self(hex::encode(Sha256::digest(&json))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for SnapshotFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn parse_snapshot_json(raw: &str) -> Result<TournamentSnapshot> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(TournamentSnapshot::default());
    }
    serde_json::from_str(trimmed).context("invalid snapshot json")
}

pub fn load_snapshot(path: &Path) -> Result<TournamentSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading snapshot {}", path.display()))?;
    parse_snapshot_json(&raw).with_context(|| format!("failed parsing snapshot {}", path.display()))
}

/// Write through a temp file and rename so readers never see a partial snapshot.
pub fn save_snapshot(path: &Path, snapshot: &TournamentSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create snapshot dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot).context("serialize snapshot")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write snapshot")?;
    fs::rename(&tmp, path).context("swap snapshot")?;
    Ok(())
}

/// Last fetched snapshot lives in the user cache dir.
pub fn default_snapshot_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}
