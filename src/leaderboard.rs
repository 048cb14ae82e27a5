use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::group_scoring::GroupPickScore;
use crate::knockout_scoring::KnockoutPickScore;
use crate::model::{GroupId, ParticipantId};

#[derive(Debug, Clone, Default)]
pub struct ParticipantTotals {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub group: GroupPickScore,
    pub knockout: KnockoutPickScore,
}

impl ParticipantTotals {
    pub fn total(&self) -> u32 {
        self.group.total + self.knockout.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupBreakdown {
    pub group_id: GroupId,
    pub points: u32,
    pub perfect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub total: u32,
    pub group_total: u32,
    pub knockout_total: u32,
    pub breakdown: Vec<GroupBreakdown>,
    pub perfect_groups: u32,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl LeaderboardEntry {
    fn from_totals(totals: ParticipantTotals) -> Self {
        let breakdown = totals
            .group
            .per_group
            .iter()
            .map(|g| GroupBreakdown {
                group_id: g.group_id.clone(),
                points: g.points,
                perfect: g.perfect,
            })
            .collect();
        Self {
            rank: 0,
            total: totals.total(),
            group_total: totals.group.total,
            knockout_total: totals.knockout.total,
            perfect_groups: totals.group.perfect_groups,
            breakdown,
            participant_id: totals.participant_id,
            display_name: totals.display_name,
            submitted_at: totals.submitted_at,
        }
    }

    fn rank_key(&self) -> (u32, u32) {
        (self.total, self.perfect_groups)
    }
}

/// Earlier submissions rank first; a missing timestamp sorts after every real one.
fn compare_submitted(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Total, perfect groups (both descending), earliest submission, then name and id.
pub fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.total
        .cmp(&a.total)
        .then(b.perfect_groups.cmp(&a.perfect_groups))
        .then(compare_submitted(a.submitted_at, b.submitted_at))
        .then_with(|| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        })
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.participant_id.cmp(&b.participant_id))
}

/// Order participants and hand out ranks.
///
/// Ranks follow competition ranking over (total, perfect groups): entries equal
/// on both share a rank and the next rank skips, e.g. 1, 2, 2, 4. Submission
/// time and name only decide display order inside a shared rank.
pub fn rank_leaderboard(totals: Vec<ParticipantTotals>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> =
        totals.into_iter().map(LeaderboardEntry::from_totals).collect();
    entries.sort_by(compare_entries);

    let mut previous: Option<(u32, u32)> = None;
    let mut rank = 0u32;
    for (idx, entry) in entries.iter_mut().enumerate() {
        let key = entry.rank_key();
        if previous != Some(key) {
            rank = (idx + 1) as u32;
            previous = Some(key);
        }
        entry.rank = rank;
    }
    entries
}
