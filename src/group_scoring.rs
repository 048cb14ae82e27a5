use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{GroupId, GroupPick, TeamId};
use crate::standings::GroupStandings;

/// Only the top four places are predicted and scored.
pub const SCORED_POSITIONS: usize = 4;
pub const DEFAULT_PERFECT_BONUS: u32 = 2;

const POSITION_TABLE: [u32; SCORED_POSITIONS] = [3, 2, 1, 0];
const EXACT_POINTS: u32 = 5;
const QUALIFIED_WRONG_ORDER_POINTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupScoringScheme {
    /// Exact hit at 1st/2nd/3rd/4th is worth 3/2/1/0.
    #[default]
    PositionTable,
    /// Exact hit is worth 5; a top-four team at the wrong place is worth 2.
    ExactOrQualified,
}

impl GroupScoringScheme {
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "position" | "position_table" | "table" => Some(Self::PositionTable),
            "exact_qualified" | "exact_or_qualified" | "exact" => Some(Self::ExactOrQualified),
            _ => None,
        }
    }

    pub fn describe(self, perfect_bonus: u32) -> String {
        match self {
            Self::PositionTable => {
                format!("1st=3, 2nd=2, 3rd=1, 4th=0, perfect group +{perfect_bonus}")
            }
            Self::ExactOrQualified => format!(
                "exact spot +{EXACT_POINTS}, qualified wrong order +{QUALIFIED_WRONG_ORDER_POINTS}, perfect group +{perfect_bonus}"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupScoringRules {
    pub scheme: GroupScoringScheme,
    pub perfect_bonus: u32,
}

impl Default for GroupScoringRules {
    fn default() -> Self {
        Self {
            scheme: GroupScoringScheme::PositionTable,
            perfect_bonus: DEFAULT_PERFECT_BONUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionOutcome {
    Exact,
    QualifiedWrongOrder,
    Miss,
    /// Nothing submitted for this position.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResult {
    pub position: u8,
    pub picked_team_id: Option<TeamId>,
    pub actual_team_id: Option<TeamId>,
    pub outcome: PositionOutcome,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResult {
    pub group_id: GroupId,
    pub positions: Vec<PositionResult>,
    pub base_points: u32,
    pub bonus: u32,
    pub points: u32,
    pub perfect: bool,
    /// Scored against a table with no finalized results yet.
    pub provisional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPickScore {
    pub per_group: Vec<GroupResult>,
    pub perfect_groups: u32,
    pub total: u32,
}

impl GroupPickScore {
    pub fn points_for(&self, group_id: &str) -> u32 {
        self.per_group
            .iter()
            .find(|g| g.group_id == group_id)
            .map(|g| g.points)
            .unwrap_or(0)
    }
}

/// Score one group. `picks` are the participant's submitted picks for that group;
/// the first pick seen for a position wins.
pub fn score_group(
    picks: &[&GroupPick],
    standings: &GroupStandings,
    rules: GroupScoringRules,
) -> GroupResult {
    let mut by_position: HashMap<u8, &str> = HashMap::new();
    for pick in picks {
        by_position
            .entry(pick.position)
            .or_insert(pick.team_id.as_str());
    }

    let actual_top: Vec<&str> = standings
        .rows
        .iter()
        .take(SCORED_POSITIONS)
        .map(|r| r.team_id.as_str())
        .collect();

    let mut positions = Vec::with_capacity(SCORED_POSITIONS);
    let mut base_points = 0u32;
    let mut exact = 0usize;

    for (idx, table_points) in POSITION_TABLE.iter().enumerate() {
        let position = (idx + 1) as u8;
        let picked = by_position.get(&position).copied();
        let actual = actual_top.get(idx).copied();

        let outcome = match (picked, actual) {
            (None, _) => PositionOutcome::Missing,
            (Some(p), Some(a)) if p == a => PositionOutcome::Exact,
            (Some(p), _) if actual_top.contains(&p) => PositionOutcome::QualifiedWrongOrder,
            (Some(_), _) => PositionOutcome::Miss,
        };

        let points = match (rules.scheme, outcome) {
            (GroupScoringScheme::PositionTable, PositionOutcome::Exact) => *table_points,
            (GroupScoringScheme::ExactOrQualified, PositionOutcome::Exact) => EXACT_POINTS,
            (GroupScoringScheme::ExactOrQualified, PositionOutcome::QualifiedWrongOrder) => {
                QUALIFIED_WRONG_ORDER_POINTS
            }
            _ => 0,
        };

        if outcome == PositionOutcome::Exact {
            exact += 1;
        }
        base_points += points;
        positions.push(PositionResult {
            position,
            picked_team_id: picked.map(str::to_string),
            actual_team_id: actual.map(str::to_string),
            outcome,
            points,
        });
    }

    let perfect = exact == SCORED_POSITIONS;
    let bonus = if perfect { rules.perfect_bonus } else { 0 };

    GroupResult {
        group_id: standings.group_id.clone(),
        positions,
        base_points,
        bonus,
        points: base_points + bonus,
        perfect,
        provisional: !standings.has_data,
    }
}

/// Score one participant's group predictions across every group.
///
/// Draft picks (no submission timestamp) are dropped before scoring, so a
/// participant with only drafts scores zero and has no perfect groups.
pub fn score_group_picks(
    picks: &[GroupPick],
    standings: &[GroupStandings],
    rules: GroupScoringRules,
) -> GroupPickScore {
    let mut by_group: HashMap<&str, Vec<&GroupPick>> = HashMap::new();
    for pick in picks.iter().filter(|p| p.is_submitted()) {
        by_group.entry(pick.group_id.as_str()).or_default().push(pick);
    }

    let mut score = GroupPickScore::default();
    for table in standings {
        let group_picks = by_group
            .get(table.group_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let result = score_group(group_picks, table, rules);
        if result.perfect {
            score.perfect_groups += 1;
        }
        score.total += result.points;
        score.per_group.push(result);
    }
    score
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::standings::StandingRow;

    fn table(order: &[&str], has_data: bool) -> GroupStandings {
        GroupStandings {
            group_id: "A".to_string(),
            group_name: "Group A".to_string(),
            rows: order
                .iter()
                .map(|id| StandingRow {
                    team_id: id.to_string(),
                    team_name: id.to_string(),
                    played: 0,
                    wins: 0,
                    draws: 0,
                    losses: 0,
                    goals_for: 0,
                    goals_against: 0,
                    goal_difference: 0,
                    points: 0,
                })
                .collect(),
            has_data,
        }
    }

    fn picks(order: &[&str], submitted: bool) -> Vec<GroupPick> {
        order
            .iter()
            .enumerate()
            .map(|(idx, team)| GroupPick {
                participant_id: "p1".to_string(),
                group_id: "A".to_string(),
                position: (idx + 1) as u8,
                team_id: team.to_string(),
                submitted_at: submitted.then(|| Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
            })
            .collect()
    }

    #[test]
    fn perfect_group_gets_table_points_and_bonus() {
        let standings = vec![table(&["T1", "T3", "T4", "T2"], true)];
        let score = score_group_picks(
            &picks(&["T1", "T3", "T4", "T2"], true),
            &standings,
            GroupScoringRules::default(),
        );
        assert_eq!(score.total, 3 + 2 + 1 + 0 + 2);
        assert_eq!(score.perfect_groups, 1);
        assert!(score.per_group[0].perfect);
    }

    #[test]
    fn partial_hits_use_position_table_without_bonus() {
        let standings = vec![table(&["T1", "T3", "T4", "T2"], true)];
        let score = score_group_picks(
            &picks(&["T1", "T4", "T3", "T2"], true),
            &standings,
            GroupScoringRules::default(),
        );
        assert_eq!(score.total, 3);
        assert_eq!(score.perfect_groups, 0);
        let outcomes: Vec<_> = score.per_group[0].positions.iter().map(|p| p.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                PositionOutcome::Exact,
                PositionOutcome::QualifiedWrongOrder,
                PositionOutcome::QualifiedWrongOrder,
                PositionOutcome::Exact,
            ]
        );
    }

    #[test]
    fn exact_or_qualified_scheme() {
        let standings = vec![table(&["T1", "T3", "T4", "T2"], true)];
        let rules = GroupScoringRules {
            scheme: GroupScoringScheme::ExactOrQualified,
            perfect_bonus: 2,
        };
        let score = score_group_picks(&picks(&["T1", "T4", "T3", "T2"], true), &standings, rules);
        assert_eq!(score.total, 5 + 2 + 2 + 5);

        let perfect = score_group_picks(&picks(&["T1", "T3", "T4", "T2"], true), &standings, rules);
        assert_eq!(perfect.total, 5 * 4 + 2);
        assert_eq!(perfect.perfect_groups, 1);
    }

    #[test]
    fn drafts_score_nothing() {
        let standings = vec![table(&["T1", "T3", "T4", "T2"], true)];
        let score = score_group_picks(
            &picks(&["T1", "T3", "T4", "T2"], false),
            &standings,
            GroupScoringRules::default(),
        );
        assert_eq!(score.total, 0);
        assert_eq!(score.perfect_groups, 0);
        assert!(score.per_group[0]
            .positions
            .iter()
            .all(|p| p.outcome == PositionOutcome::Missing));
    }

    #[test]
    fn missing_positions_and_provisional_flag() {
        let standings = vec![table(&["T1", "T2", "T3", "T4"], false)];
        let score = score_group_picks(&picks(&["T1"], true), &standings, GroupScoringRules::default());
        let group = &score.per_group[0];
        assert!(group.provisional);
        assert_eq!(group.points, 3);
        assert_eq!(group.positions[1].outcome, PositionOutcome::Missing);
    }

    #[test]
    fn foreign_team_is_a_miss() {
        let standings = vec![table(&["T1", "T2", "T3", "T4"], true)];
        let score = score_group_picks(&picks(&["X9"], true), &standings, GroupScoringRules::default());
        assert_eq!(score.per_group[0].positions[0].outcome, PositionOutcome::Miss);
        assert_eq!(score.total, 0);
    }
}
