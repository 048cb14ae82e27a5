use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::http_client::{fetch_store_json, http_client};
use crate::model::{
    Group, GroupMatch, GroupPick, KnockoutMatch, KnockoutPick, Participant, Round, Team,
    TournamentSnapshot,
};

const REST_PREFIX: &str = "rest/v1";

/// Read-only view of the hosted pick'em database.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    config: StoreConfig,
}

impl RemoteStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{REST_PREFIX}/{table}?select=*",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn fetch_table(&self, table: &str) -> Result<String> {
        let client = http_client()?;
        fetch_store_json(client, &self.table_url(table), &self.config.api_key)
            .with_context(|| format!("fetch table {table}"))
    }

    pub fn fetch_snapshot(&self) -> Result<TournamentSnapshot> {
        let snapshot = TournamentSnapshot {
            groups: parse_groups_json(&self.fetch_table("groups")?)?,
            teams: parse_teams_json(&self.fetch_table("teams")?)?,
            group_matches: parse_group_matches_json(&self.fetch_table("matches")?)?,
            knockout_matches: parse_knockout_matches_json(&self.fetch_table("knockout_matches")?)?,
            participants: parse_profiles_json(&self.fetch_table("profiles")?)?,
            group_picks: parse_group_picks_json(&self.fetch_table("group_picks")?)?,
            knockout_picks: parse_knockout_picks_json(&self.fetch_table("knockout_picks")?)?,
        };
        info!(
            groups = snapshot.groups.len(),
            teams = snapshot.teams.len(),
            matches = snapshot.group_matches.len(),
            knockout = snapshot.knockout_matches.len(),
            participants = snapshot.participants.len(),
            "fetched snapshot from store"
        );
        Ok(snapshot)
    }
}

/// Ids come back as text or as integers depending on the column type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_id(self) -> Option<String> {
        match self {
            RawId::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            RawId::Number(n) => Some(n.to_string()),
        }
    }
}

fn clean_id(raw: Option<RawId>) -> Option<String> {
    raw.and_then(RawId::into_id)
}

fn score(raw: Option<i64>, match_id: &str) -> Option<u8> {
    let value = raw?;
    match u8::try_from(value) {
        Ok(goals) => Some(goals),
        Err(_) => {
            warn!(match_id, value, "score out of range, treating as missing");
            None
        }
    }
}

fn timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            warn!(value = trimmed, error = %err, "unparseable timestamp");
            None
        }
    }
}

fn parse_rows<T: DeserializeOwned>(raw: &str, table: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).with_context(|| format!("invalid {table} json"))
}

#[derive(Debug, Deserialize)]
struct GroupRow {
    id: Option<RawId>,
    #[serde(default)]
    name: Option<String>,
}

pub fn parse_groups_json(raw: &str) -> Result<Vec<Group>> {
    let rows: Vec<GroupRow> = parse_rows(raw, "groups")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = clean_id(row.id)?;
            let name = row.name.unwrap_or_else(|| id.clone());
            Some(Group { id, name })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    id: Option<RawId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    group_id: Option<RawId>,
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>> {
    let rows: Vec<TeamRow> = parse_rows(raw, "teams")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = clean_id(row.id)?;
            let name = row.name.unwrap_or_else(|| id.clone());
            Some(Team {
                id,
                name,
                group_id: clean_id(row.group_id),
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    id: Option<RawId>,
    #[serde(default)]
    group_id: Option<RawId>,
    #[serde(default)]
    home_team_id: Option<RawId>,
    #[serde(default)]
    away_team_id: Option<RawId>,
    #[serde(default)]
    home_score: Option<i64>,
    #[serde(default)]
    away_score: Option<i64>,
    #[serde(default, alias = "finalized")]
    is_final: Option<bool>,
}

pub fn parse_group_matches_json(raw: &str) -> Result<Vec<GroupMatch>> {
    let rows: Vec<MatchRow> = parse_rows(raw, "matches")?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(match_id) = clean_id(row.id) else {
            continue;
        };
        let (Some(group_id), Some(home), Some(away)) =
            (clean_id(row.group_id), clean_id(row.home_team_id), clean_id(row.away_team_id))
        else {
            warn!(match_id = %match_id, "group match without group or teams, skipping");
            continue;
        };
        out.push(GroupMatch {
            home_score: score(row.home_score, &match_id),
            away_score: score(row.away_score, &match_id),
            id: match_id,
            group_id,
            home_team_id: home,
            away_team_id: away,
            finalized: row.is_final.unwrap_or(false),
        });
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct KnockoutMatchRow {
    id: Option<RawId>,
    #[serde(default)]
    round: Option<String>,
    #[serde(default, alias = "slot")]
    match_no: Option<i64>,
    #[serde(default)]
    home_team_id: Option<RawId>,
    #[serde(default)]
    away_team_id: Option<RawId>,
    #[serde(default)]
    home_score: Option<i64>,
    #[serde(default)]
    away_score: Option<i64>,
    #[serde(default, alias = "finalized")]
    is_final: Option<bool>,
}

/// Rows with an unknown round or no slot number are dropped here; slot range is
/// checked later when the bracket is built.
pub fn parse_knockout_matches_json(raw: &str) -> Result<Vec<KnockoutMatch>> {
    let rows: Vec<KnockoutMatchRow> = parse_rows(raw, "knockout_matches")?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(match_id) = clean_id(row.id) else {
            continue;
        };
        let Some(round) = row.round.as_deref().and_then(Round::from_tag) else {
            warn!(match_id = %match_id, round = ?row.round, "unknown knockout round, skipping");
            continue;
        };
        let Some(slot) = row.match_no.and_then(|n| u8::try_from(n).ok()) else {
            warn!(match_id = %match_id, "knockout match without usable match_no, skipping");
            continue;
        };
        out.push(KnockoutMatch {
            home_score: score(row.home_score, &match_id),
            away_score: score(row.away_score, &match_id),
            id: match_id,
            round,
            slot,
            home_team_id: clean_id(row.home_team_id),
            away_team_id: clean_id(row.away_team_id),
            finalized: row.is_final.unwrap_or(false),
        });
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    user_id: Option<RawId>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    submitted_at: Option<String>,
}

pub fn parse_profiles_json(raw: &str) -> Result<Vec<Participant>> {
    let rows: Vec<ProfileRow> = parse_rows(raw, "profiles")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            Some(Participant {
                id: clean_id(row.user_id).or_else(|| clean_id(row.id))?,
                display_name: row
                    .display_name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty()),
                submitted_at: timestamp(row.submitted_at),
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct GroupPickRow {
    #[serde(alias = "participant_id")]
    user_id: Option<RawId>,
    #[serde(default)]
    group_id: Option<RawId>,
    #[serde(default)]
    team_id: Option<RawId>,
    #[serde(default)]
    position: Option<i64>,
    #[serde(default)]
    rank: Option<i64>,
    #[serde(default)]
    submitted_at: Option<String>,
}

/// Older rows carry `rank` instead of `position`; either is accepted.
pub fn parse_group_picks_json(raw: &str) -> Result<Vec<GroupPick>> {
    let rows: Vec<GroupPickRow> = parse_rows(raw, "group_picks")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let position = row.position.or(row.rank)?;
            Some(GroupPick {
                participant_id: clean_id(row.user_id)?,
                group_id: clean_id(row.group_id)?,
                position: u8::try_from(position).ok()?,
                team_id: clean_id(row.team_id)?,
                submitted_at: timestamp(row.submitted_at),
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct KnockoutPickRow {
    #[serde(alias = "participant_id")]
    user_id: Option<RawId>,
    #[serde(default)]
    match_id: Option<RawId>,
    #[serde(default, alias = "winner_team_id")]
    team_id: Option<RawId>,
    #[serde(default)]
    submitted_at: Option<String>,
}

pub fn parse_knockout_picks_json(raw: &str) -> Result<Vec<KnockoutPick>> {
    let rows: Vec<KnockoutPickRow> = parse_rows(raw, "knockout_picks")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            Some(KnockoutPick {
                participant_id: clean_id(row.user_id)?,
                match_id: clean_id(row.match_id)?,
                team_id: clean_id(row.team_id)?,
                submitted_at: timestamp(row.submitted_at),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_blank_ids() {
        let teams = parse_teams_json(r#"[{"id": 7, "name": "Mexico", "group_id": " "}]"#).unwrap();
        assert_eq!(teams[0].id, "7");
        assert_eq!(teams[0].group_id, None);
    }

    #[test]
    fn table_url_has_single_slash() {
        let store = RemoteStore::new(StoreConfig {
            base_url: "https://db.example/".to_string(),
            api_key: "k".to_string(),
        });
        assert_eq!(
            store.table_url("groups"),
            "https://db.example/rest/v1/groups?select=*"
        );
    }

    #[test]
    fn empty_bodies() {
        assert!(parse_group_picks_json("").unwrap().is_empty());
        assert!(parse_knockout_picks_json("null").unwrap().is_empty());
        assert!(parse_profiles_json("{oops").is_err());
    }
}
