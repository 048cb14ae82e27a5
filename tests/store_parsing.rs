use std::fs;
use std::path::PathBuf;

use wc26_pickem::model::Round;
use wc26_pickem::store::{
    parse_group_matches_json, parse_group_picks_json, parse_groups_json,
    parse_knockout_matches_json, parse_knockout_picks_json, parse_profiles_json,
    parse_teams_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_groups_and_teams() {
    let groups = parse_groups_json(&read_fixture("groups.json")).expect("groups should parse");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "Group A");

    let teams = parse_teams_json(&read_fixture("teams.json")).expect("teams should parse");
    assert_eq!(teams.len(), 8);
    let brazil = teams.iter().find(|t| t.name == "Brazil").unwrap();
    assert_eq!(brazil.id, "5");
    assert_eq!(brazil.group_id.as_deref(), Some("B"));
}

#[test]
fn parses_group_matches_and_skips_incomplete_rows() {
    let matches =
        parse_group_matches_json(&read_fixture("matches.json")).expect("matches should parse");
    assert_eq!(matches.len(), 7);
    assert!(matches.iter().all(|m| m.id != "4"));

    let opener = matches.iter().find(|m| m.id == "1").unwrap();
    assert_eq!(opener.final_score(), Some((3, 0)));

    let pending = matches.iter().find(|m| m.id == "3").unwrap();
    assert!(!pending.finalized);
    assert_eq!(pending.final_score(), None);

    let numeric = matches.iter().find(|m| m.id == "11").unwrap();
    assert_eq!(numeric.home_team_id, "5");
    assert_eq!(numeric.away_team_id, "6");
}

#[test]
fn parses_knockout_matches() {
    let matches = parse_knockout_matches_json(&read_fixture("knockout_matches.json"))
        .expect("knockout matches should parse");
    assert_eq!(matches.len(), 5);
    assert!(matches.iter().all(|m| m.id != "999"));

    let first = matches.iter().find(|m| m.id == "101").unwrap();
    assert_eq!(first.round, Round::R32);
    assert_eq!(first.slot, 1);
    assert_eq!(first.away_team_id.as_deref(), Some("5"));
    assert!(first.finalized);

    let r16 = matches.iter().find(|m| m.id == "201").unwrap();
    assert_eq!(r16.round, Round::R16);
    assert_eq!(r16.away_team_id, None);

    let lower = matches.iter().find(|m| m.id == "140").unwrap();
    assert_eq!(lower.round, Round::R32);
    assert_eq!(lower.slot, 40);
}

#[test]
fn parses_profiles() {
    let profiles = parse_profiles_json(&read_fixture("profiles.json")).expect("profiles should parse");
    assert_eq!(profiles.len(), 4);
    assert_eq!(profiles[0].id, "u1");
    assert_eq!(profiles[0].display_name.as_deref(), Some("Alice"));
    assert!(profiles[0].submitted_at.is_some());
    assert_eq!(profiles[1].display_name, None);
    assert_eq!(profiles[1].submitted_at, None);
    assert_eq!(
        profiles[3].submitted_at.map(|ts| ts.to_rfc3339()),
        Some("2026-03-02T09:30:00.123456+00:00".to_string())
    );
}

#[test]
fn parses_group_picks_with_rank_or_position() {
    let picks =
        parse_group_picks_json(&read_fixture("group_picks.json")).expect("picks should parse");
    // 7 full groups of four; the row without a team is dropped.
    assert_eq!(picks.len(), 28);

    let u2_first = picks
        .iter()
        .find(|p| p.participant_id == "u2" && p.group_id == "A" && p.position == 1)
        .unwrap();
    assert_eq!(u2_first.team_id, "T3");

    let drafts = picks.iter().filter(|p| !p.is_submitted()).count();
    assert_eq!(drafts, 4);
    assert!(picks.iter().all(|p| (1..=4).contains(&p.position)));
}

#[test]
fn parses_knockout_picks() {
    let picks =
        parse_knockout_picks_json(&read_fixture("knockout_picks.json")).expect("picks should parse");
    assert_eq!(picks.len(), 9);
    let bob = picks.iter().find(|p| p.participant_id == "u4").unwrap();
    assert_eq!(bob.match_id, "101");
    assert_eq!(bob.team_id, "T1");
    let numeric_team = picks
        .iter()
        .find(|p| p.participant_id == "u1" && p.match_id == "103")
        .unwrap();
    assert_eq!(numeric_team.team_id, "7");
}

#[test]
fn blank_bodies_parse_empty() {
    assert!(parse_groups_json("").unwrap().is_empty());
    assert!(parse_teams_json("null").unwrap().is_empty());
    assert!(parse_group_matches_json("  ").unwrap().is_empty());
    assert!(parse_knockout_matches_json("[]").unwrap().is_empty());
}
