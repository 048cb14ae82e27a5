use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TeamId = String;
pub type GroupId = String;
pub type MatchId = String;
pub type ParticipantId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub id: MatchId,
    pub group_id: GroupId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    #[serde(default)]
    pub home_score: Option<u8>,
    #[serde(default)]
    pub away_score: Option<u8>,
    #[serde(default)]
    pub finalized: bool,
}

impl GroupMatch {
    /// Final score, only once the result is locked and both sides are entered.
    pub fn final_score(&self) -> Option<(u8, u8)> {
        if !self.finalized {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    R32,
    R16,
    QF,
    SF,
    F,
}

impl Round {
    pub const ALL: [Round; 5] = [Round::R32, Round::R16, Round::QF, Round::SF, Round::F];

    pub fn index(self) -> usize {
        match self {
            Round::R32 => 0,
            Round::R16 => 1,
            Round::QF => 2,
            Round::SF => 3,
            Round::F => 4,
        }
    }

    pub fn from_index(idx: usize) -> Option<Round> {
        Round::ALL.get(idx).copied()
    }

    /// Fixed slot count per round for a 32-team draw.
    pub fn match_count(self) -> u8 {
        match self {
            Round::R32 => 16,
            Round::R16 => 8,
            Round::QF => 4,
            Round::SF => 2,
            Round::F => 1,
        }
    }

    pub fn next(self) -> Option<Round> {
        Round::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Round> {
        self.index().checked_sub(1).and_then(Round::from_index)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Round::R32 => "R32",
            Round::R16 => "R16",
            Round::QF => "QF",
            Round::SF => "SF",
            Round::F => "F",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Round::R32 => "Round of 32",
            Round::R16 => "Round of 16",
            Round::QF => "Quarterfinals",
            Round::SF => "Semifinals",
            Round::F => "Final",
        }
    }

    pub fn from_tag(raw: &str) -> Option<Round> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "R32" => Some(Round::R32),
            "R16" => Some(Round::R16),
            "QF" => Some(Round::QF),
            "SF" => Some(Round::SF),
            "F" | "FINAL" => Some(Round::F),
            _ => None,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutMatch {
    pub id: MatchId,
    pub round: Round,
    pub slot: u8,
    #[serde(default)]
    pub home_team_id: Option<TeamId>,
    #[serde(default)]
    pub away_team_id: Option<TeamId>,
    #[serde(default)]
    pub home_score: Option<u8>,
    #[serde(default)]
    pub away_score: Option<u8>,
    #[serde(default)]
    pub finalized: bool,
}

impl KnockoutMatch {
    pub fn placeholder(round: Round, slot: u8) -> Self {
        Self {
            id: format!("missing-{}-{}", round.tag(), slot),
            round,
            slot,
            home_team_id: None,
            away_team_id: None,
            home_score: None,
            away_score: None,
            finalized: false,
        }
    }

    pub fn has_team(&self, team_id: &str) -> bool {
        self.home_team_id.as_deref() == Some(team_id) || self.away_team_id.as_deref() == Some(team_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPick {
    pub participant_id: ParticipantId,
    pub group_id: GroupId,
    pub position: u8,
    pub team_id: TeamId,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl GroupPick {
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutPick {
    pub participant_id: ParticipantId,
    pub match_id: MatchId,
    pub team_id: TeamId,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl KnockoutPick {
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Name shown on boards: trimmed display name, else a short id tag.
pub fn display_label(id: &str, display_name: Option<&str>) -> String {
    if let Some(name) = display_name.map(str::trim).filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    let short: String = id.chars().take(6).collect();
    format!("User {short}")
}

/// Everything the engine reads, already fetched from the result and prediction stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub group_matches: Vec<GroupMatch>,
    #[serde(default)]
    pub knockout_matches: Vec<KnockoutMatch>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub group_picks: Vec<GroupPick>,
    #[serde(default)]
    pub knockout_picks: Vec<KnockoutPick>,
}

impl TournamentSnapshot {
    pub fn teams_in_group<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Team> + 'a {
        self.teams
            .iter()
            .filter(move |t| t.group_id.as_deref() == Some(group_id))
    }

    pub fn matches_in_group<'a>(
        &'a self,
        group_id: &'a str,
    ) -> impl Iterator<Item = &'a GroupMatch> + 'a {
        self.group_matches.iter().filter(move |m| m.group_id == group_id)
    }

    pub fn team_name(&self, team_id: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }

    pub fn team_label(&self, team_id: Option<&str>) -> String {
        team_id
            .and_then(|id| self.team_name(id).or(Some(id)))
            .unwrap_or("TBD")
            .to_string()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participants with a locked submission: a profile timestamp or any submitted pick.
    /// Draft-only participants never appear. Profile order first, then pick order.
    pub fn submitted_participant_ids(&self) -> Vec<ParticipantId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let profile_ids = self
            .participants
            .iter()
            .filter(|p| p.submitted_at.is_some())
            .map(|p| p.id.as_str());
        let group_ids = self
            .group_picks
            .iter()
            .filter(|p| p.is_submitted())
            .map(|p| p.participant_id.as_str());
        let knockout_ids = self
            .knockout_picks
            .iter()
            .filter(|p| p.is_submitted())
            .map(|p| p.participant_id.as_str());
        for id in profile_ids.chain(group_ids).chain(knockout_ids) {
            if seen.insert(id) {
                out.push(id.to_string());
            }
        }
        out
    }

    /// Profile submission time, else the earliest submitted pick.
    pub fn submission_time(&self, participant_id: &str) -> Option<DateTime<Utc>> {
        if let Some(ts) = self.participant(participant_id).and_then(|p| p.submitted_at) {
            return Some(ts);
        }
        let group_times = self
            .group_picks
            .iter()
            .filter(|p| p.participant_id == participant_id)
            .filter_map(|p| p.submitted_at);
        let knockout_times = self
            .knockout_picks
            .iter()
            .filter(|p| p.participant_id == participant_id)
            .filter_map(|p| p.submitted_at);
        group_times.chain(knockout_times).min()
    }
}
