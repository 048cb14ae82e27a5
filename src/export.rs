use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::model::TournamentSnapshot;
use crate::report::TournamentReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub leaderboard_rows: usize,
    pub standings_rows: usize,
    pub bracket_rows: usize,
}

pub fn leaderboard_rows(report: &TournamentReport) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Rank".to_string(),
        "Participant".to_string(),
        "Total".to_string(),
        "Group".to_string(),
        "Knockout".to_string(),
        "Perfect Groups".to_string(),
        "Submitted".to_string(),
    ]];
    for entry in &report.leaderboard {
        rows.push(vec![
            entry.rank.to_string(),
            entry.display_name.clone(),
            entry.total.to_string(),
            entry.group_total.to_string(),
            entry.knockout_total.to_string(),
            entry.perfect_groups.to_string(),
            entry
                .submitted_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        ]);
    }
    rows
}

pub fn standings_rows(report: &TournamentReport) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Group".to_string(),
        "Pos".to_string(),
        "Team".to_string(),
        "P".to_string(),
        "W".to_string(),
        "D".to_string(),
        "L".to_string(),
        "GF".to_string(),
        "GA".to_string(),
        "GD".to_string(),
        "Pts".to_string(),
    ]];
    for group in &report.standings {
        for (idx, row) in group.rows.iter().enumerate() {
            rows.push(vec![
                group.group_name.clone(),
                (idx + 1).to_string(),
                row.team_name.clone(),
                row.played.to_string(),
                row.wins.to_string(),
                row.draws.to_string(),
                row.losses.to_string(),
                row.goals_for.to_string(),
                row.goals_against.to_string(),
                format!("{:+}", row.goal_difference),
                row.points.to_string(),
            ]);
        }
    }
    rows
}

pub fn bracket_rows(snapshot: &TournamentSnapshot, report: &TournamentReport) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Round".to_string(),
        "Match".to_string(),
        "Home".to_string(),
        "Away".to_string(),
        "Score".to_string(),
        "Final".to_string(),
        "Winner".to_string(),
    ]];
    for slot in report.bracket.slots() {
        let m = &slot.match_row;
        let score = match (m.home_score, m.away_score) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => String::new(),
        };
        rows.push(vec![
            slot.address.round.label().to_string(),
            slot.address.slot.to_string(),
            snapshot.team_label(m.home_team_id.as_deref()),
            snapshot.team_label(m.away_team_id.as_deref()),
            score,
            if m.finalized { "yes" } else { "" }.to_string(),
            slot.winner
                .as_deref()
                .map(|id| snapshot.team_label(Some(id)))
                .unwrap_or_default(),
        ]);
    }
    rows
}

pub fn export_report(
    path: &Path,
    snapshot: &TournamentSnapshot,
    report: &TournamentReport,
) -> Result<ExportReport> {
    let leaderboard = leaderboard_rows(report);
    let standings = standings_rows(report);
    let bracket = bracket_rows(snapshot, report);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leaderboard")?;
        write_rows(sheet, &leaderboard)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Bracket")?;
        write_rows(sheet, &bracket)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        leaderboard_rows: leaderboard.len().saturating_sub(1),
        standings_rows: standings.len().saturating_sub(1),
        bracket_rows: bracket.len().saturating_sub(1),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
