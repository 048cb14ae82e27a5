use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, SlotAddress};
use crate::model::{KnockoutPick, MatchId, TeamId};

pub const DEFAULT_POINTS_PER_PICK: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickOutcome {
    Correct,
    Incorrect,
    /// The match has no winner yet; neither right nor wrong.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchPickResult {
    pub match_id: MatchId,
    /// `None` when the pick points at a match the bracket does not hold.
    pub address: Option<SlotAddress>,
    pub picked_team_id: TeamId,
    pub actual_winner: Option<TeamId>,
    pub outcome: PickOutcome,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnockoutPickScore {
    pub per_match: Vec<MatchPickResult>,
    pub correct: u32,
    pub incorrect: u32,
    pub pending: u32,
    pub total: u32,
}

impl KnockoutPickScore {
    pub fn outcome_for(&self, match_id: &str) -> Option<PickOutcome> {
        self.per_match
            .iter()
            .find(|r| r.match_id == match_id)
            .map(|r| r.outcome)
    }
}

/// Score one participant's knockout picks against the bracket's computed winners.
/// Drafts are skipped and only the first submitted pick per match counts. Flat
/// points per correct pick, no round weighting.
pub fn score_knockout_picks(
    picks: &[KnockoutPick],
    bracket: &Bracket,
    points_per_pick: u32,
) -> KnockoutPickScore {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut score = KnockoutPickScore::default();

    for pick in picks.iter().filter(|p| p.is_submitted()) {
        if !seen.insert(pick.match_id.as_str()) {
            continue;
        }
        let slot = bracket.find_match(&pick.match_id);
        let actual_winner = slot.and_then(|s| s.winner.clone());
        let (outcome, points) = match actual_winner.as_deref() {
            None => (PickOutcome::Pending, 0),
            Some(winner) if winner == pick.team_id => (PickOutcome::Correct, points_per_pick),
            Some(_) => (PickOutcome::Incorrect, 0),
        };
        match outcome {
            PickOutcome::Correct => score.correct += 1,
            PickOutcome::Incorrect => score.incorrect += 1,
            PickOutcome::Pending => score.pending += 1,
        }
        score.total += points;
        score.per_match.push(MatchPickResult {
            match_id: pick.match_id.clone(),
            address: slot.map(|s| s.address),
            picked_team_id: pick.team_id.clone(),
            actual_winner,
            outcome,
            points,
        });
    }

    score.per_match.sort_by_key(|r| {
        r.address
            .map(|a| (a.round.index(), a.slot))
            .unwrap_or((usize::MAX, u8::MAX))
    });
    score
}
