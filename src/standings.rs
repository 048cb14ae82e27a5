use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{GroupId, GroupMatch, Team, TeamId, TournamentSnapshot};

const POINTS_WIN: u32 = 3;
const POINTS_DRAW: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl StandingRow {
    fn empty(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: u8, conceded: u8) {
        self.played = self.played.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(scored as u32);
        self.goals_against = self.goals_against.saturating_add(conceded as u32);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.wins += 1;
                self.points += POINTS_WIN;
            }
            Ordering::Less => self.losses += 1,
            Ordering::Equal => {
                self.draws += 1;
                self.points += POINTS_DRAW;
            }
        }
    }
}

/// Points, goal difference, goals for (all descending), then name ascending
/// ignoring case. No head-to-head or fair-play criteria.
pub fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_difference.cmp(&a.goal_difference))
        .then(b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team_name.to_lowercase().cmp(&b.team_name.to_lowercase()))
        .then_with(|| a.team_name.cmp(&b.team_name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Fold finalized results into one row per team, sorted leader first.
///
/// Matches that are not finalized or lack a score are ignored. A match with a
/// side outside `teams` is skipped entirely. With nothing finalized every row is
/// zero and the order is alphabetical, which callers should read as "no data".
pub fn compute_standings<'a>(
    teams: impl IntoIterator<Item = &'a Team>,
    matches: impl IntoIterator<Item = &'a GroupMatch>,
) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for team in teams {
        if index.contains_key(team.id.as_str()) {
            continue;
        }
        index.insert(team.id.as_str(), rows.len());
        rows.push(StandingRow::empty(team));
    }

    for m in matches {
        let Some((home_goals, away_goals)) = m.final_score() else {
            continue;
        };
        let (Some(&home), Some(&away)) = (
            index.get(m.home_team_id.as_str()),
            index.get(m.away_team_id.as_str()),
        ) else {
            warn!(
                match_id = %m.id,
                home = %m.home_team_id,
                away = %m.away_team_id,
                "skipping group match with a team outside the group"
            );
            continue;
        };
        if home == away {
            warn!(match_id = %m.id, "skipping group match with the same team on both sides");
            continue;
        }
        rows[home].record(home_goals, away_goals);
        rows[away].record(away_goals, home_goals);
    }

    for row in &mut rows {
        row.goal_difference = row.goals_for as i32 - row.goals_against as i32;
    }
    rows.sort_by(compare_rows);
    rows
}

/// True once at least one finalized result has been folded in.
pub fn standings_have_data(rows: &[StandingRow]) -> bool {
    rows.iter().any(|r| r.played > 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStandings {
    pub group_id: GroupId,
    pub group_name: String,
    pub rows: Vec<StandingRow>,
    pub has_data: bool,
}

impl GroupStandings {
    pub fn team_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(|r| r.team_id.as_str())
    }

    pub fn position_of(&self, team_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.team_id == team_id).map(|i| i + 1)
    }
}

/// Standings for every group, in snapshot group order.
pub fn standings_by_group(snapshot: &TournamentSnapshot) -> Vec<GroupStandings> {
    snapshot
        .groups
        .iter()
        .map(|group| {
            let rows = compute_standings(
                snapshot.teams_in_group(&group.id),
                snapshot.matches_in_group(&group.id),
            );
            let has_data = standings_have_data(&rows);
            GroupStandings {
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                rows,
                has_data,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_string(),
            group_id: Some("A".to_string()),
        }
    }

    fn played(id: &str, home: &str, away: &str, hs: u8, aw: u8) -> GroupMatch {
        GroupMatch {
            id: id.to_string(),
            group_id: "A".to_string(),
            home_team_id: home.to_string(),
            away_team_id: away.to_string(),
            home_score: Some(hs),
            away_score: Some(aw),
            finalized: true,
        }
    }

    fn order(rows: &[StandingRow]) -> Vec<&str> {
        rows.iter().map(|r| r.team_id.as_str()).collect()
    }

    #[test]
    fn opening_results_order_by_points_then_name() {
        let teams = vec![team("T1"), team("T2"), team("T3"), team("T4")];
        let matches = vec![played("m1", "T1", "T2", 3, 0), played("m2", "T3", "T4", 1, 1)];
        let rows = compute_standings(&teams, &matches);
        assert_eq!(order(&rows), vec!["T1", "T3", "T4", "T2"]);
        assert_eq!(rows[0].points, 3);
        assert_eq!(rows[0].goal_difference, 3);
        assert_eq!(rows[3].goal_difference, -3);
    }

    #[test]
    fn zero_state_is_alphabetical_and_flagged() {
        let teams = vec![team("Delta"), team("Alpha"), team("Charlie"), team("Bravo")];
        let mut unfinished = played("m1", "Delta", "Alpha", 5, 0);
        unfinished.finalized = false;
        let rows = compute_standings(&teams, &[unfinished]);
        assert_eq!(order(&rows), vec!["Alpha", "Bravo", "Charlie", "Delta"]);
        assert!(rows.iter().all(|r| r.played == 0 && r.points == 0));
        assert!(!standings_have_data(&rows));
    }

    #[test]
    fn name_order_ignores_case() {
        let teams = vec![team("USA"), team("Paraguay"), team("Uruguay"), team("Turkey")];
        let rows = compute_standings(&teams, &[] as &[GroupMatch]);
        assert_eq!(order(&rows), vec!["Paraguay", "Turkey", "Uruguay", "USA"]);
    }

    #[test]
    fn draw_gives_one_point_each() {
        let teams = vec![team("A1"), team("A2")];
        let rows = compute_standings(&teams, &[played("m", "A1", "A2", 2, 2)]);
        for row in &rows {
            assert_eq!(row.points, 1);
            assert_eq!(row.draws, 1);
            assert_eq!(row.wins, 0);
            assert_eq!(row.losses, 0);
        }
    }

    #[test]
    fn goals_for_breaks_points_and_difference_tie() {
        let teams = vec![team("Aaa"), team("Zzz"), team("X"), team("Y")];
        let matches = vec![
            played("m1", "Aaa", "X", 1, 0),
            played("m2", "Zzz", "Y", 3, 2),
        ];
        let rows = compute_standings(&teams, &matches);
        // Both winners have 3 points and +1; Zzz scored more.
        assert_eq!(order(&rows)[..2], ["Zzz", "Aaa"]);
    }

    #[test]
    fn foreign_team_match_is_skipped() {
        let teams = vec![team("T1"), team("T2")];
        let rows = compute_standings(&teams, &[played("m", "T1", "Other", 4, 0)]);
        assert!(rows.iter().all(|r| r.played == 0));
    }

    #[test]
    fn recomputing_is_idempotent() {
        let teams = vec![team("T1"), team("T2"), team("T3")];
        let matches = vec![played("m1", "T1", "T2", 0, 1), played("m2", "T2", "T3", 2, 2)];
        assert_eq!(compute_standings(&teams, &matches), compute_standings(&teams, &matches));
    }
}
