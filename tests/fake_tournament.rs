use std::collections::HashSet;

use wc26_pickem::bracket::{SlotAddress, next_slot};
use wc26_pickem::config::ScoringConfig;
use wc26_pickem::fake_tournament::{FakeTournamentOptions, generate_snapshot};
use wc26_pickem::model::Round;
use wc26_pickem::report::evaluate;

#[test]
fn generates_full_field() {
    let snapshot = generate_snapshot(&FakeTournamentOptions::default());
    assert_eq!(snapshot.groups.len(), 12);
    assert_eq!(snapshot.teams.len(), 48);
    assert_eq!(snapshot.group_matches.len(), 72);
    assert_eq!(snapshot.knockout_matches.len(), 31);
    assert_eq!(snapshot.participants.len(), 10);

    let ids: HashSet<&str> = snapshot.teams.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 48);
}

#[test]
fn round_of_32_has_each_team_once() {
    let snapshot = generate_snapshot(&FakeTournamentOptions::default());
    let mut seen = HashSet::new();
    for m in snapshot.knockout_matches.iter().filter(|m| m.round == Round::R32) {
        for team in [&m.home_team_id, &m.away_team_id] {
            let team = team.as_deref().expect("round of 32 is fully drawn");
            assert!(seen.insert(team.to_string()), "{team} drawn twice");
        }
    }
    assert_eq!(seen.len(), 32);
}

#[test]
fn winners_move_into_their_next_slot() {
    let snapshot = generate_snapshot(&FakeTournamentOptions::default());
    let report = evaluate(&snapshot, &ScoringConfig::default());
    for slot in report.bracket.round(Round::R32) {
        let winner = slot.winner.as_deref().expect("round of 32 is played");
        let dest = next_slot(slot.address).unwrap();
        let next = report.bracket.slot(dest).unwrap();
        assert!(next.match_row.has_team(winner));
    }
    // Played through the quarterfinals only.
    let final_slot = SlotAddress::new(Round::F, 1).unwrap();
    assert!(report.bracket.winner_of(final_slot).is_none());
    assert_eq!(report.bracket.decided_matches(), 16 + 8 + 4);
}

#[test]
fn drafts_stay_off_the_leaderboard() {
    let options = FakeTournamentOptions {
        participants: 5,
        drafts: 3,
        ..FakeTournamentOptions::default()
    };
    let snapshot = generate_snapshot(&options);
    let report = evaluate(&snapshot, &ScoringConfig::default());
    assert_eq!(report.leaderboard.len(), 5);
    assert!(report.leaderboard.windows(2).all(|w| w[0].total >= w[1].total));
    assert_eq!(report.leaderboard[0].rank, 1);
}

#[test]
fn unfinished_groups_leave_knockouts_empty() {
    let snapshot = generate_snapshot(&FakeTournamentOptions {
        group_matches_played: 2,
        ..FakeTournamentOptions::default()
    });
    assert!(
        snapshot
            .knockout_matches
            .iter()
            .all(|m| m.home_team_id.is_none() && !m.finalized)
    );
    assert!(snapshot.knockout_picks.is_empty());
    let finalized = snapshot.group_matches.iter().filter(|m| m.finalized).count();
    assert_eq!(finalized, 24);
}
