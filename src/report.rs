use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::bracket::{Bracket, build_bracket};
use crate::config::ScoringConfig;
use crate::group_scoring::{GroupPickScore, score_group_picks};
use crate::knockout_scoring::{KnockoutPickScore, score_knockout_picks};
use crate::leaderboard::{LeaderboardEntry, ParticipantTotals, rank_leaderboard};
use crate::model::{
    GroupPick, KnockoutPick, ParticipantId, TeamId, TournamentSnapshot, display_label,
};
use crate::snapshot::SnapshotFingerprint;
use crate::standings::{GroupStandings, standings_by_group};

/// One participant's scored picks, for the "view bracket" page.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantCard {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub group: GroupPickScore,
    pub knockout: KnockoutPickScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentReport {
    pub standings: Vec<GroupStandings>,
    pub bracket: Bracket,
    pub champion: Option<TeamId>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub cards: Vec<ParticipantCard>,
}

impl TournamentReport {
    pub fn card(&self, participant_id: &str) -> Option<&ParticipantCard> {
        self.cards.iter().find(|c| c.participant_id == participant_id)
    }
}

/// Score every submitted participant against precomputed standings and bracket.
pub fn participant_totals(
    snapshot: &TournamentSnapshot,
    standings: &[GroupStandings],
    bracket: &Bracket,
    config: &ScoringConfig,
) -> Vec<ParticipantTotals> {
    let mut group_picks: HashMap<&str, Vec<GroupPick>> = HashMap::new();
    for pick in &snapshot.group_picks {
        group_picks
            .entry(pick.participant_id.as_str())
            .or_default()
            .push(pick.clone());
    }
    let mut knockout_picks: HashMap<&str, Vec<KnockoutPick>> = HashMap::new();
    for pick in &snapshot.knockout_picks {
        knockout_picks
            .entry(pick.participant_id.as_str())
            .or_default()
            .push(pick.clone());
    }

    snapshot
        .submitted_participant_ids()
        .into_iter()
        .map(|participant_id| {
            let group = score_group_picks(
                group_picks
                    .get(participant_id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
                standings,
                config.group,
            );
            let knockout = score_knockout_picks(
                knockout_picks
                    .get(participant_id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
                bracket,
                config.knockout_points,
            );
            let display_name = display_label(
                &participant_id,
                snapshot
                    .participant(&participant_id)
                    .and_then(|p| p.display_name.as_deref()),
            );
            let submitted_at = snapshot.submission_time(&participant_id);
            ParticipantTotals {
                participant_id,
                display_name,
                submitted_at,
                group,
                knockout,
            }
        })
        .collect()
}

/// Run the whole pipeline over one snapshot: standings and bracket, then
/// per-participant scores, then the ranked leaderboard.
pub fn evaluate(snapshot: &TournamentSnapshot, config: &ScoringConfig) -> TournamentReport {
    let standings = standings_by_group(snapshot);
    let bracket = build_bracket(&snapshot.knockout_matches);
    let totals = participant_totals(snapshot, &standings, &bracket, config);

    let cards = totals
        .iter()
        .map(|t| ParticipantCard {
            participant_id: t.participant_id.clone(),
            display_name: t.display_name.clone(),
            group: t.group.clone(),
            knockout: t.knockout.clone(),
        })
        .collect();
    let leaderboard = rank_leaderboard(totals);
    let champion = bracket.champion().map(str::to_string);

    debug!(
        groups = standings.len(),
        decided_knockout = bracket.decided_matches(),
        participants = leaderboard.len(),
        "evaluated snapshot"
    );

    TournamentReport {
        standings,
        bracket,
        champion,
        leaderboard,
        cards,
    }
}

/// Keeps the report for the last snapshot seen. Optional: `evaluate` is always
/// correct on its own.
#[derive(Debug, Default)]
pub struct ReportCache {
    entry: Option<(SnapshotFingerprint, ScoringConfig, TournamentReport)>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_evaluate(
        &mut self,
        snapshot: &TournamentSnapshot,
        config: &ScoringConfig,
    ) -> Result<&TournamentReport> {
        let fingerprint = SnapshotFingerprint::of(snapshot)?;
        let fresh = matches!(
            &self.entry,
            Some((cached, cached_config, _)) if *cached == fingerprint && cached_config == config
        );
        if !fresh {
            debug!(fingerprint = fingerprint.short(), "report cache miss");
            self.entry = Some((fingerprint, *config, evaluate(snapshot, config)));
        }
        match &self.entry {
            Some((_, _, report)) => Ok(report),
            None => Err(anyhow::anyhow!("report cache empty after evaluation")),
        }
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
