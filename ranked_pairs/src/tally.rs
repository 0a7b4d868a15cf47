use std::ops::{Add, Sub};

use crate::config::VotingErrors;
use crate::registry::{Ballot, CandidateId};

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct VoteCount(pub u64);

impl VoteCount {
    pub const EMPTY: VoteCount = VoteCount(0);

    /// The sum of both counts, or [VotingErrors::CountOverflow] if it does not fit.
    pub fn checked_add(self, rhs: VoteCount) -> Result<VoteCount, VotingErrors> {
        self.0
            .checked_add(rhs.0)
            .map(VoteCount)
            .ok_or(VotingErrors::CountOverflow)
    }
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

impl Sub for VoteCount {
    type Output = VoteCount;
    fn sub(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 - rhs.0)
    }
}

/// Pairwise preference counts.
///
/// Cell (i, j) is the number of ballots ranking candidate i strictly above
/// candidate j. The diagonal stays at zero.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceTally {
    num_candidates: usize,
    // Row-major, num_candidates x num_candidates
    counts: Vec<VoteCount>,
    num_ballots: VoteCount,
}

impl PreferenceTally {
    pub fn new(num_candidates: usize) -> PreferenceTally {
        PreferenceTally {
            num_candidates,
            counts: vec![VoteCount::EMPTY; num_candidates * num_candidates],
            num_ballots: VoteCount::EMPTY,
        }
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    pub fn num_ballots(&self) -> VoteCount {
        self.num_ballots
    }

    pub fn get(&self, preferred: CandidateId, other: CandidateId) -> VoteCount {
        self.counts[preferred.0 * self.num_candidates + other.0]
    }

    /// Adds `count` identical ballots to the tally.
    ///
    /// The ballot must rank the same candidates this tally was created for.
    /// Nothing is recorded if the total number of ballots would overflow.
    pub fn record(&mut self, ballot: &Ballot, count: VoteCount) -> Result<(), VotingErrors> {
        let ranks = ballot.ranks();
        debug_assert_eq!(ranks.len(), self.num_candidates);
        // No cell exceeds the number of ballots, so this check covers all of them.
        let num_ballots = self.num_ballots.checked_add(count)?;
        for (p, higher) in ranks.iter().enumerate() {
            for lower in ranks[p + 1..].iter() {
                let cell = &mut self.counts[higher.0 * self.num_candidates + lower.0];
                *cell = *cell + count;
            }
        }
        self.num_ballots = num_ballots;
        Ok(())
    }

    /// Adds a partial tally computed over the same candidates.
    ///
    /// The tally is left unchanged on error.
    pub fn merge(&mut self, other: &PreferenceTally) -> Result<(), VotingErrors> {
        if self.num_candidates != other.num_candidates {
            return Err(VotingErrors::TallyMismatch {
                expected: self.num_candidates,
                found: other.num_candidates,
            });
        }
        let num_ballots = self.num_ballots.checked_add(other.num_ballots)?;
        for (c, o) in self.counts.iter_mut().zip(other.counts.iter()) {
            *c = *c + *o;
        }
        self.num_ballots = num_ballots;
        Ok(())
    }
}
