use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::bracket::{SlotAddress, feeder_slots, match_winner, next_slot};
use crate::model::{
    Group, GroupMatch, GroupPick, KnockoutMatch, KnockoutPick, Participant, Round, TeamId, Team,
    TournamentSnapshot,
};
use crate::standings::{GroupStandings, compare_rows, standings_by_group};

const GROUP_LETTERS: [&str; 12] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];

const TEAM_NAMES: [&str; 48] = [
    "Mexico", "South Africa", "Korea Republic", "Denmark",
    "Canada", "Italy", "Qatar", "Switzerland",
    "Brazil", "Morocco", "Haiti", "Scotland",
    "USA", "Paraguay", "Australia", "Turkey",
    "Germany", "Curacao", "Ivory Coast", "Ecuador",
    "Netherlands", "Japan", "Sweden", "Tunisia",
    "Belgium", "Egypt", "Iran", "New Zealand",
    "Spain", "Cape Verde", "Saudi Arabia", "Uruguay",
    "France", "Senegal", "Norway", "Iraq",
    "Argentina", "Algeria", "Austria", "Jordan",
    "Portugal", "Colombia", "Uzbekistan", "Jamaica",
    "England", "Croatia", "Ghana", "Panama",
];

const PLAYER_NAMES: [&str; 10] = [
    "Sam", "Alex", "jordan", "Riley", "Casey", "Morgan", "Taylor", "Quinn", "Avery", "Jamie",
];

/// Round-robin pairings for a four-team group, by matchday.
const PAIRINGS: [(usize, usize); 6] = [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];

const TEAMS_PER_GROUP: usize = 4;
const THIRD_PLACE_QUALIFIERS: usize = 8;

#[derive(Debug, Clone)]
pub struct FakeTournamentOptions {
    pub seed: u64,
    /// Finalized matches per group, 0 to 6.
    pub group_matches_played: usize,
    /// Knockout rounds up to and including this one get results.
    pub knockout_through: Option<Round>,
    pub participants: usize,
    /// Participants who only saved drafts.
    pub drafts: usize,
}

impl Default for FakeTournamentOptions {
    fn default() -> Self {
        Self {
            seed: 2026,
            group_matches_played: PAIRINGS.len(),
            knockout_through: Some(Round::QF),
            participants: 8,
            drafts: 2,
        }
    }
}

pub fn generate_snapshot(options: &FakeTournamentOptions) -> TournamentSnapshot {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut snapshot = TournamentSnapshot::default();

    seed_groups(&mut snapshot);
    play_group_stage(&mut snapshot, &mut rng, options.group_matches_played);

    let standings = standings_by_group(&snapshot);
    let complete = options.group_matches_played >= PAIRINGS.len();
    let draw = if complete { knockout_draw(&standings) } else { Vec::new() };
    snapshot.knockout_matches = play_knockouts(&mut rng, &draw, options.knockout_through);

    seed_participants(&mut snapshot, &mut rng, &standings, options);
    snapshot
}

fn seed_groups(snapshot: &mut TournamentSnapshot) {
    for (g, letter) in GROUP_LETTERS.iter().enumerate() {
        snapshot.groups.push(Group {
            id: letter.to_string(),
            name: format!("Group {letter}"),
        });
        for t in 0..TEAMS_PER_GROUP {
            let idx = g * TEAMS_PER_GROUP + t;
            snapshot.teams.push(Team {
                id: format!("t{:02}", idx + 1),
                name: TEAM_NAMES[idx].to_string(),
                group_id: Some(letter.to_string()),
            });
        }
    }
}

fn goals(rng: &mut StdRng) -> u8 {
    // Weighted toward low scores.
    let roll: u8 = rng.gen_range(0..10);
    match roll {
        0..=2 => 0,
        3..=5 => 1,
        6..=7 => 2,
        8 => 3,
        _ => 4,
    }
}

fn play_group_stage(snapshot: &mut TournamentSnapshot, rng: &mut StdRng, played: usize) {
    for group in &snapshot.groups {
        let team_ids: Vec<TeamId> = snapshot.teams_in_group(&group.id).map(|t| t.id.clone()).collect();
        for (n, (home, away)) in PAIRINGS.iter().enumerate() {
            let finalized = n < played;
            snapshot.group_matches.push(GroupMatch {
                id: format!("g{}-{}", group.id.to_lowercase(), n + 1),
                group_id: group.id.clone(),
                home_team_id: team_ids[*home].clone(),
                away_team_id: team_ids[*away].clone(),
                home_score: finalized.then(|| goals(rng)),
                away_score: finalized.then(|| goals(rng)),
                finalized,
            });
        }
    }
}

/// Group winners, runners-up, then the best third-placed teams; seed i meets
/// seed 32 - i + 1 in slot i.
fn knockout_draw(standings: &[GroupStandings]) -> Vec<TeamId> {
    let mut seeds: Vec<TeamId> = Vec::new();
    for position in 0..2 {
        seeds.extend(
            standings
                .iter()
                .filter_map(|g| g.rows.get(position))
                .map(|r| r.team_id.clone()),
        );
    }
    let mut thirds: Vec<_> = standings.iter().filter_map(|g| g.rows.get(2)).collect();
    thirds.sort_by(|a, b| compare_rows(a, b));
    seeds.extend(
        thirds
            .into_iter()
            .take(THIRD_PLACE_QUALIFIERS)
            .map(|r| r.team_id.clone()),
    );
    seeds
}

fn knockout_id(address: SlotAddress) -> String {
    format!("ko-{}-{}", address.round.tag().to_lowercase(), address.slot)
}

fn play_knockouts(rng: &mut StdRng, seeds: &[TeamId], through: Option<Round>) -> Vec<KnockoutMatch> {
    let mut matches: HashMap<SlotAddress, KnockoutMatch> = HashMap::new();
    for round in Round::ALL {
        for slot in 1..=round.match_count() {
            let Some(address) = SlotAddress::new(round, slot) else {
                continue;
            };
            let mut m = KnockoutMatch::placeholder(round, slot);
            m.id = knockout_id(address);
            matches.insert(address, m);
        }
    }

    let r32 = usize::from(Round::R32.match_count());
    if seeds.len() == r32 * 2 {
        for i in 0..r32 {
            let Some(address) = SlotAddress::new(Round::R32, (i + 1) as u8) else {
                continue;
            };
            if let Some(m) = matches.get_mut(&address) {
                m.home_team_id = Some(seeds[i].clone());
                m.away_team_id = Some(seeds[seeds.len() - 1 - i].clone());
            }
        }
    }

    for round in Round::ALL {
        if through.is_none_or(|last| round > last) {
            break;
        }
        for slot in 1..=round.match_count() {
            let Some(address) = SlotAddress::new(round, slot) else {
                continue;
            };
            let Some(m) = matches.get_mut(&address) else {
                continue;
            };
            if m.home_team_id.is_none() || m.away_team_id.is_none() {
                continue;
            }
            let home = goals(rng);
            let mut away = goals(rng);
            if home == away {
                // Extra time or penalties settle it.
                away = if rng.gen_bool(0.5) { home + 1 } else { home.saturating_sub(1) };
                if away == home {
                    away = home + 1;
                }
            }
            m.home_score = Some(home);
            m.away_score = Some(away);
            m.finalized = true;
            let winner = match_winner(m);

            let Some(dest) = next_slot(address) else {
                continue;
            };
            let home_side = feeder_slots(dest).is_some_and(|[first, _]| first == address);
            if let Some(next) = matches.get_mut(&dest) {
                if home_side {
                    next.home_team_id = winner;
                } else {
                    next.away_team_id = winner;
                }
            }
        }
    }

    let mut out: Vec<KnockoutMatch> = matches.into_values().collect();
    out.sort_by_key(|m| (m.round, m.slot));
    out
}

fn base_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn seed_participants(
    snapshot: &mut TournamentSnapshot,
    rng: &mut StdRng,
    standings: &[GroupStandings],
    options: &FakeTournamentOptions,
) {
    let total = options.participants + options.drafts;
    for n in 0..total {
        let id = format!("p{:02}", n + 1);
        let submitted = n < options.participants;
        let submitted_at = submitted.then(|| base_time() + Duration::minutes(rng.gen_range(0..14_400)));
        let display_name = if rng.gen_bool(0.8) {
            Some(PLAYER_NAMES[n % PLAYER_NAMES.len()].to_string())
        } else {
            None
        };

        for group in standings {
            let mut order: Vec<TeamId> = group.rows.iter().map(|r| r.team_id.clone()).collect();
            // Some participants call the table exactly, most get it partly wrong.
            if !rng.gen_bool(0.3) {
                order.shuffle(rng);
            }
            for (idx, team_id) in order.into_iter().enumerate() {
                snapshot.group_picks.push(GroupPick {
                    participant_id: id.clone(),
                    group_id: group.group_id.clone(),
                    position: (idx + 1) as u8,
                    team_id,
                    submitted_at,
                });
            }
        }

        for m in &snapshot.knockout_matches {
            let (Some(home), Some(away)) = (&m.home_team_id, &m.away_team_id) else {
                continue;
            };
            let team_id = if rng.gen_bool(0.5) { home } else { away };
            snapshot.knockout_picks.push(KnockoutPick {
                participant_id: id.clone(),
                match_id: m.id.clone(),
                team_id: team_id.clone(),
                submitted_at,
            });
        }

        snapshot.participants.push(Participant {
            id,
            display_name,
            submitted_at,
        });
    }
}
