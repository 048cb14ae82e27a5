use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::group_scoring::{DEFAULT_PERFECT_BONUS, GroupScoringRules, GroupScoringScheme};
use crate::knockout_scoring::DEFAULT_POINTS_PER_PICK;

/// Picks lock at midnight Eastern on March 11, 2026.
pub const DEFAULT_DEADLINE: &str = "2026-03-11T05:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub group: GroupScoringRules,
    pub knockout_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            group: GroupScoringRules::default(),
            knockout_points: DEFAULT_POINTS_PER_PICK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub deadline: DateTime<Utc>,
    pub store: Option<StoreConfig>,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            deadline: default_deadline(),
            store: None,
            snapshot_path: None,
        }
    }
}

impl AppConfig {
    /// Read `PICKEM_*` variables. Call `load_env_files` first to pick up `.env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut cfg = AppConfig::default();

        if let Some(raw) = get("PICKEM_GROUP_SCHEME") {
            match GroupScoringScheme::from_key(&raw) {
                Some(scheme) => cfg.scoring.group.scheme = scheme,
                None => warn!(value = %raw, "unknown PICKEM_GROUP_SCHEME, using position table"),
            }
        }
        cfg.scoring.group.perfect_bonus =
            parse_u32(get("PICKEM_PERFECT_BONUS"), "PICKEM_PERFECT_BONUS", DEFAULT_PERFECT_BONUS);
        cfg.scoring.knockout_points = parse_u32(
            get("PICKEM_KNOCKOUT_POINTS"),
            "PICKEM_KNOCKOUT_POINTS",
            DEFAULT_POINTS_PER_PICK,
        );

        if let Some(raw) = get("PICKEM_DEADLINE") {
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(ts) => cfg.deadline = ts.with_timezone(&Utc),
                Err(err) => warn!(value = %raw, error = %err, "invalid PICKEM_DEADLINE"),
            }
        }

        cfg.store = match (get("PICKEM_STORE_URL"), get("PICKEM_STORE_KEY")) {
            (Some(base_url), Some(api_key)) => Some(StoreConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
            }),
            (Some(_), None) => {
                warn!("PICKEM_STORE_URL set without PICKEM_STORE_KEY; remote store disabled");
                None
            }
            _ => None,
        };

        cfg.snapshot_path = get("PICKEM_SNAPSHOT").map(PathBuf::from);
        cfg
    }
}

/// `.env.local` wins over `.env`; both are optional.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn default_deadline() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(DEFAULT_DEADLINE)
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_default()
}

fn parse_u32(raw: Option<String>, key: &str, default: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<u32>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "not a non-negative integer, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let cfg = from_pairs(&[]);
        assert_eq!(cfg.scoring, ScoringConfig::default());
        assert_eq!(cfg.deadline.to_rfc3339(), "2026-03-11T05:00:00+00:00");
        assert!(cfg.store.is_none());
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let cfg = from_pairs(&[
            ("PICKEM_GROUP_SCHEME", " exact_qualified "),
            ("PICKEM_PERFECT_BONUS", "abc"),
            ("PICKEM_KNOCKOUT_POINTS", "3"),
            ("PICKEM_STORE_URL", "https://store.example/"),
            ("PICKEM_STORE_KEY", "k"),
            ("PICKEM_DEADLINE", "not a date"),
        ]);
        assert_eq!(cfg.scoring.group.scheme, GroupScoringScheme::ExactOrQualified);
        assert_eq!(cfg.scoring.group.perfect_bonus, DEFAULT_PERFECT_BONUS);
        assert_eq!(cfg.scoring.knockout_points, 3);
        assert_eq!(cfg.store.as_ref().map(|s| s.base_url.as_str()), Some("https://store.example"));
        assert_eq!(cfg.deadline, default_deadline());
    }
}
