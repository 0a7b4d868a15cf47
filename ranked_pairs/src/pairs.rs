use log::debug;
use std::cmp::Reverse;

use crate::registry::CandidateId;
use crate::tally::{PreferenceTally, VoteCount};

/// A strict majority of `winner` over `loser`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Pair {
    pub winner: CandidateId,
    pub loser: CandidateId,
    // Always strictly positive.
    pub margin: VoteCount,
}

/// Finds all the pairs of candidates where one is strictly preferred over the other.
///
/// Pairs come out by increasing winner index, then increasing loser index.
/// Exact ties produce no pair.
pub fn extract_pairs(tally: &PreferenceTally) -> Vec<Pair> {
    let n = tally.num_candidates();
    let mut pairs: Vec<Pair> = Vec::new();
    for i in (0..n).map(CandidateId) {
        for j in (0..n).map(CandidateId) {
            let for_i = tally.get(i, j);
            let for_j = tally.get(j, i);
            if i != j && for_i > for_j {
                pairs.push(Pair {
                    winner: i,
                    loser: j,
                    margin: for_i - for_j,
                });
            }
        }
    }
    debug!("extract_pairs: {} pairs: {:?}", pairs.len(), pairs);
    pairs
}

/// Orders the pairs by decreasing margin of victory.
///
/// The sort is stable: pairs with the same margin stay in the order they
/// were given, which for extracted pairs is the candidate order.
pub fn sort_by_margin(pairs: &[Pair]) -> Vec<Pair> {
    let mut res = pairs.to_vec();
    res.sort_by_key(|p| Reverse(p.margin));
    res
}
