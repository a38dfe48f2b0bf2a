// ── Survey domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Highest rank a participant can hand out per question.
pub const MAX_RANK: u8 = 3;

/// One peer-evaluation question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: String,
    pub text: String,
    pub weight: f64,
}

/// Rankings for a single question: rank (1..=3) → member.
///
/// Both directions are unique -- a rank holds one member, a member holds
/// one rank. Assigning over an existing slot displaces rather than
/// erroring, matching how a tap-to-rank UI behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSelection {
    slots: BTreeMap<u8, UserId>,
}

impl RankingSelection {
    /// Assign `member` to `rank`. Any previous rank held by the member
    /// and any previous holder of the rank are removed first. Returns
    /// `false` (and does nothing) for a rank outside `1..=MAX_RANK`.
    pub fn assign(&mut self, rank: u8, member: UserId) -> bool {
        if rank == 0 || rank > MAX_RANK {
            return false;
        }

        if let Some(old_rank) = self.rank_of(&member) {
            self.slots.remove(&old_rank);
        }
        self.slots.insert(rank, member);
        true
    }

    /// Clear a single rank slot.
    pub fn clear_rank(&mut self, rank: u8) -> Option<UserId> {
        self.slots.remove(&rank)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn member_at(&self, rank: u8) -> Option<&UserId> {
        self.slots.get(&rank)
    }

    pub fn rank_of(&self, member: &UserId) -> Option<u8> {
        self.slots
            .iter()
            .find(|(_, m)| *m == member)
            .map(|(rank, _)| *rank)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Wire form for the survey submission body.
    pub fn to_wire(&self) -> BTreeMap<u8, String> {
        self.slots
            .iter()
            .map(|(rank, member)| (*rank, member.as_str().to_owned()))
            .collect()
    }
}
