//! Vote transition engine.
//!
//! One parameterized transition covers both directions; the per-direction
//! code paths of earlier iterations drifted (one recomputed the opposing
//! count from the set, the other carried it forward), so both now flow
//! through [`Post::apply_vote`].

use serde::{Deserialize, Serialize};

use super::{Identity, Post};

/// The two vote actions an actor can request. A closed enum: anything else
/// is unrepresentable and gets rejected at the API boundary during
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteIntent {
    Upvote,
    Downvote,
}

impl Post {
    /// Apply one vote transition for `actor`.
    ///
    /// - actor already voted this way: the vote is removed (toggle off);
    /// - actor voted the other way: the vote switches sides;
    /// - otherwise: the vote is recorded.
    ///
    /// Counts are recomputed from set cardinality afterwards, so they cannot
    /// drift from membership regardless of the path taken.
    pub fn apply_vote(&mut self, actor: &Identity, intent: VoteIntent) {
        let (same, other) = match intent {
            VoteIntent::Upvote => (&mut self.upvoted_by, &mut self.downvoted_by),
            VoteIntent::Downvote => (&mut self.downvoted_by, &mut self.upvoted_by),
        };

        if !same.remove(actor) {
            other.remove(actor);
            same.insert(actor.clone());
        }

        self.upvotes = self.upvoted_by.len() as u32;
        self.downvotes = self.downvoted_by.len() as u32;
    }
}
