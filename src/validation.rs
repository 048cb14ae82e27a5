//! Checks run by the submission and result-entry workflows before data reaches
//! the scoring engine. The engine itself never re-validates.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Group, GroupId, GroupMatch, GroupPick, KnockoutMatch, TeamId, TournamentSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("picks are locked (deadline {deadline} passed)")]
    DeadlinePassed { deadline: DateTime<Utc> },
    #[error("group {group_id}: expected {expected} ranked teams, got {actual}")]
    WrongRankingLength {
        group_id: GroupId,
        expected: usize,
        actual: usize,
    },
    #[error("group {group_id}: team {team_id} ranked more than once")]
    DuplicateTeam { group_id: GroupId, team_id: TeamId },
    #[error("group {group_id}: team {team_id} is not in this group")]
    ForeignTeam { group_id: GroupId, team_id: TeamId },
    #[error("group {group_id} has no submitted ranking")]
    MissingGroup { group_id: GroupId },
    #[error("enter both scores before finalizing")]
    MissingScore,
    #[error("set both teams before finalizing")]
    MissingTeam,
    #[error("knockout games cannot end in a draw")]
    KnockoutDraw,
    #[error("team {team_id} is not playing in match {match_id}")]
    PickNotInMatch { match_id: String, team_id: TeamId },
}

pub fn check_deadline(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Result<(), ValidationError> {
    if now >= deadline {
        return Err(ValidationError::DeadlinePassed { deadline });
    }
    Ok(())
}

/// Full ranking for a group: saved picks in position order, then any group team
/// not yet placed, so every team appears exactly once.
pub fn normalize_group_order(group_team_ids: &[TeamId], picks: &[&GroupPick]) -> Vec<TeamId> {
    let n = group_team_ids.len();
    let members: HashSet<&str> = group_team_ids.iter().map(String::as_str).collect();

    let mut ordered: Vec<&GroupPick> = picks
        .iter()
        .copied()
        .filter(|p| p.position >= 1 && (p.position as usize) <= n)
        .collect();
    ordered.sort_by_key(|p| p.position);

    let mut used: HashSet<&str> = HashSet::new();
    let mut out: Vec<TeamId> = Vec::with_capacity(n);
    for pick in ordered {
        let team = pick.team_id.as_str();
        if members.contains(team) && used.insert(team) {
            out.push(team.to_string());
        }
    }
    for team in group_team_ids {
        if used.insert(team.as_str()) {
            out.push(team.clone());
        }
    }
    out.truncate(n);
    out
}

pub fn validate_group_ranking(
    group_id: &str,
    group_team_ids: &[TeamId],
    ranking: &[TeamId],
) -> Result<(), ValidationError> {
    if ranking.len() != group_team_ids.len() {
        return Err(ValidationError::WrongRankingLength {
            group_id: group_id.to_string(),
            expected: group_team_ids.len(),
            actual: ranking.len(),
        });
    }
    let members: HashSet<&str> = group_team_ids.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    for team in ranking {
        if !members.contains(team.as_str()) {
            return Err(ValidationError::ForeignTeam {
                group_id: group_id.to_string(),
                team_id: team.clone(),
            });
        }
        if !seen.insert(team.as_str()) {
            return Err(ValidationError::DuplicateTeam {
                group_id: group_id.to_string(),
                team_id: team.clone(),
            });
        }
    }
    Ok(())
}

/// Everything a participant must satisfy to lock in group picks: before the
/// deadline, and a complete valid ranking for every group.
pub fn validate_submission(
    snapshot: &TournamentSnapshot,
    participant_id: &str,
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
) -> Result<(), ValidationError> {
    check_deadline(now, deadline)?;
    for group in &snapshot.groups {
        validate_group_submission(snapshot, group, participant_id)?;
    }
    Ok(())
}

fn validate_group_submission(
    snapshot: &TournamentSnapshot,
    group: &Group,
    participant_id: &str,
) -> Result<(), ValidationError> {
    let team_ids: Vec<TeamId> = snapshot.teams_in_group(&group.id).map(|t| t.id.clone()).collect();
    let mut picks: Vec<&GroupPick> = snapshot
        .group_picks
        .iter()
        .filter(|p| p.participant_id == participant_id && p.group_id == group.id)
        .collect();
    if picks.is_empty() {
        return Err(ValidationError::MissingGroup {
            group_id: group.id.clone(),
        });
    }
    picks.sort_by_key(|p| p.position);
    let ranking: Vec<TeamId> = picks.iter().map(|p| p.team_id.clone()).collect();
    validate_group_ranking(&group.id, &team_ids, &ranking)
}

/// Group results may be draws but need both scores.
pub fn validate_group_result(m: &GroupMatch) -> Result<(), ValidationError> {
    if m.home_score.is_none() || m.away_score.is_none() {
        return Err(ValidationError::MissingScore);
    }
    Ok(())
}

pub fn validate_knockout_result(m: &KnockoutMatch) -> Result<(), ValidationError> {
    if m.home_team_id.is_none() || m.away_team_id.is_none() {
        return Err(ValidationError::MissingTeam);
    }
    let (Some(home), Some(away)) = (m.home_score, m.away_score) else {
        return Err(ValidationError::MissingScore);
    };
    if home == away {
        return Err(ValidationError::KnockoutDraw);
    }
    Ok(())
}

/// A pick must name one of the two teams once the slot is filled.
pub fn validate_knockout_pick(m: &KnockoutMatch, team_id: &str) -> Result<(), ValidationError> {
    let filled = m.home_team_id.is_some() || m.away_team_id.is_some();
    if filled && !m.has_team(team_id) {
        return Err(ValidationError::PickNotInMatch {
            match_id: m.id.clone(),
            team_id: team_id.to_string(),
        });
    }
    Ok(())
}
