use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{KnockoutMatch, MatchId, Round, TeamId};

/// Half of the round of 32 drawn on each side of the sheet (slots 1-8 and 9-16).
const R32_HALF: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotAddress {
    pub round: Round,
    pub slot: u8,
}

impl SlotAddress {
    pub fn new(round: Round, slot: u8) -> Option<Self> {
        if slot == 0 || slot > round.match_count() {
            return None;
        }
        Some(Self { round, slot })
    }
}

/// Winner of a knockout match, if one can be read off the result.
///
/// Needs a finalized match, both scores, different scores and the winning side's
/// team set. A finalized draw is invalid in knockout play and yields no winner.
pub fn match_winner(m: &KnockoutMatch) -> Option<TeamId> {
    if !m.finalized {
        return None;
    }
    let (home, away) = (m.home_score?, m.away_score?);
    if home == away {
        warn!(match_id = %m.id, round = %m.round, slot = m.slot, "finalized knockout match is a draw");
        return None;
    }
    if home > away {
        m.home_team_id.clone()
    } else {
        m.away_team_id.clone()
    }
}

/// Destination slot in the next round for a winner, `None` for the final.
///
/// The round of 32 feeds the round of 16 in two halves: slots 1-8 go to 1-4 and
/// slots 9-16 to 5-8. Every later round maps slot n to ceil(n/2).
pub fn next_slot(from: SlotAddress) -> Option<SlotAddress> {
    let round = from.round.next()?;
    let n = from.slot;
    let slot = if from.round == Round::R32 {
        if n <= R32_HALF {
            n.div_ceil(2)
        } else {
            R32_HALF / 2 + (n - R32_HALF).div_ceil(2)
        }
    } else {
        n.div_ceil(2)
    };
    SlotAddress::new(round, slot)
}

/// The two earlier slots whose winners meet in `to`, home side first.
pub fn feeder_slots(to: SlotAddress) -> Option<[SlotAddress; 2]> {
    let round = to.round.previous()?;
    let first = to.slot.checked_mul(2)?.checked_sub(1)?;
    let home = SlotAddress::new(round, first)?;
    let away = SlotAddress::new(round, first + 1)?;
    Some([home, away])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketSlot {
    pub address: SlotAddress,
    #[serde(rename = "match")]
    pub match_row: KnockoutMatch,
    /// No backing row in the result store yet.
    pub placeholder: bool,
    pub winner: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedSlot {
    pub address: SlotAddress,
    pub feeders: [SlotAddress; 2],
    /// Current winners of the two feeder slots, home side first.
    pub incoming: [Option<TeamId>; 2],
    pub assigned: [Option<TeamId>; 2],
}

impl FeedSlot {
    /// Assigned teams agree with the feeder winners wherever both are known.
    pub fn consistent(&self) -> bool {
        self.incoming
            .iter()
            .zip(self.assigned.iter())
            .all(|(incoming, assigned)| match (incoming, assigned) {
                (Some(i), Some(a)) => i == a,
                _ => true,
            })
    }
}

/// Dense knockout tree: one vector per round, indexed by slot - 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    rounds: Vec<Vec<BracketSlot>>,
    #[serde(skip)]
    by_match: HashMap<MatchId, SlotAddress>,
}

/// Lay sparse knockout rows onto the fixed tree. Slots without a row become
/// placeholders. Rows with an out-of-range slot are dropped; for duplicate
/// addresses the last row wins, as with an upsert keyed on the slot.
pub fn build_bracket(matches: &[KnockoutMatch]) -> Bracket {
    let mut rounds: Vec<Vec<Option<KnockoutMatch>>> = Round::ALL
        .iter()
        .map(|r| vec![None; r.match_count() as usize])
        .collect();

    for m in matches {
        let Some(address) = SlotAddress::new(m.round, m.slot) else {
            warn!(match_id = %m.id, round = %m.round, slot = m.slot, "knockout slot out of range");
            continue;
        };
        let cell = &mut rounds[address.round.index()][(address.slot - 1) as usize];
        if let Some(previous) = cell.as_ref() {
            warn!(
                match_id = %m.id,
                replaced = %previous.id,
                round = %m.round,
                slot = m.slot,
                "duplicate knockout slot, keeping the later row"
            );
        }
        *cell = Some(m.clone());
    }

    let rounds: Vec<Vec<BracketSlot>> = Round::ALL
        .iter()
        .zip(rounds)
        .map(|(round, cells)| {
            cells
                .into_iter()
                .enumerate()
                .map(|(idx, cell)| {
                    let slot = (idx + 1) as u8;
                    let placeholder = cell.is_none();
                    let match_row = cell.unwrap_or_else(|| KnockoutMatch::placeholder(*round, slot));
                    let winner = match_winner(&match_row);
                    BracketSlot {
                        address: SlotAddress { round: *round, slot },
                        match_row,
                        placeholder,
                        winner,
                    }
                })
                .collect()
        })
        .collect();

    Bracket::from_rounds(rounds)
}

impl Bracket {
    fn from_rounds(rounds: Vec<Vec<BracketSlot>>) -> Self {
        let by_match = rounds
            .iter()
            .flatten()
            .filter(|s| !s.placeholder)
            .map(|s| (s.match_row.id.clone(), s.address))
            .collect();
        Self { rounds, by_match }
    }

    pub fn round(&self, round: Round) -> &[BracketSlot] {
        &self.rounds[round.index()]
    }

    pub fn slot(&self, address: SlotAddress) -> Option<&BracketSlot> {
        self.rounds
            .get(address.round.index())?
            .get((address.slot as usize).checked_sub(1)?)
    }

    pub fn slots(&self) -> impl Iterator<Item = &BracketSlot> {
        self.rounds.iter().flatten()
    }

    pub fn find_match(&self, match_id: &str) -> Option<&BracketSlot> {
        let address = self.by_match.get(match_id)?;
        self.slot(*address)
    }

    pub fn winner_of(&self, address: SlotAddress) -> Option<&str> {
        self.slot(address)?.winner.as_deref()
    }

    /// Tournament champion: the winner of the final.
    pub fn champion(&self) -> Option<&str> {
        self.winner_of(SlotAddress { round: Round::F, slot: 1 })
    }

    pub fn decided_matches(&self) -> usize {
        self.slots().filter(|s| s.winner.is_some()).count()
    }

    /// For each slot after the round of 32, the current winners of its two feeders
    /// next to the teams the administrator has assigned.
    pub fn feed_view(&self) -> Vec<FeedSlot> {
        self.slots()
            .filter(|s| s.address.round != Round::R32)
            .filter_map(|s| {
                let feeders = feeder_slots(s.address)?;
                Some(FeedSlot {
                    address: s.address,
                    feeders,
                    incoming: feeders.map(|f| self.winner_of(f).map(str::to_string)),
                    assigned: [
                        s.match_row.home_team_id.clone(),
                        s.match_row.away_team_id.clone(),
                    ],
                })
            })
            .collect()
    }

    /// Copy of the bracket with empty team sides filled from feeder winners,
    /// round by round. Sides already assigned are left as they are.
    pub fn auto_advanced(&self) -> Bracket {
        let mut rounds = self.rounds.clone();
        for round in Round::ALL.iter().skip(1) {
            let (done, rest) = rounds.split_at_mut(round.index());
            let previous = &done[round.index() - 1];
            for slot in rest[0].iter_mut() {
                let Some([home, away]) = feeder_slots(slot.address) else {
                    continue;
                };
                let incoming = |address: SlotAddress| {
                    previous
                        .get((address.slot - 1) as usize)
                        .and_then(|s| s.winner.clone())
                };
                if slot.match_row.home_team_id.is_none() {
                    slot.match_row.home_team_id = incoming(home);
                }
                if slot.match_row.away_team_id.is_none() {
                    slot.match_row.away_team_id = incoming(away);
                }
                slot.winner = match_winner(&slot.match_row);
            }
        }
        Bracket::from_rounds(rounds)
    }
}
