use log::warn;

pub use crate::config::*;
use crate::registry::{Ballot, CandidateRegistry};
use crate::tally::{PreferenceTally, VoteCount};

/// A builder for adding votes.
///
/// The builder owns the preference tally while ballots are added. Tabulating
/// consumes the builder, so the tally cannot change once the pairs are computed.
///
/// ```
/// pub use ranked_pairs::builder::Builder;
/// pub use ranked_pairs::VoteRules;
/// # use ranked_pairs::VotingErrors;
///
/// let mut builder = Builder::new(&VoteRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Bob".to_string()])?;
/// builder.add_vote(&["Bob".to_string(), "Anna".to_string()], 2)?;
///
/// let result = builder.tabulate()?;
/// assert_eq!(result.winners, vec!["Bob".to_string()]);
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: VoteRules,
    pub(crate) _candidates: Option<(CandidateRegistry, PreferenceTally)>,
    // Number of ballots submitted so far, valid or not.
    pub(crate) _num_submitted: usize,
    pub(crate) _skipped: VoteCount,
    pub(crate) _aborted: bool,
}

impl Builder {
    pub fn new(rules: &VoteRules) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: None,
            _num_submitted: 0,
            _skipped: VoteCount::EMPTY,
            _aborted: false,
        })
    }

    /// Registers the candidates, in order.
    ///
    /// Any vote added before is discarded.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        let registry = CandidateRegistry::new(cands, self._rules.max_candidates)?;
        let tally = PreferenceTally::new(registry.len());
        Ok(Builder {
            _rules: self._rules,
            _candidates: Some((registry, tally)),
            _num_submitted: 0,
            _skipped: VoteCount::EMPTY,
            _aborted: false,
        })
    }

    pub fn registry(&self) -> Option<&CandidateRegistry> {
        self._candidates.as_ref().map(|(reg, _)| reg)
    }

    /// Adds a single vote to the builder.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), VotingErrors> {
        self.add_vote(candidates, 1)
    }

    /// Adds a vote, with a weight attached to it.
    ///
    /// candidates: the names of all the candidates, most preferred first.
    pub fn add_vote(&mut self, candidates: &[String], count: u64) -> Result<(), VotingErrors> {
        self.add_checked(count, |reg, idx| reg.ballot_from_names(candidates, idx))
    }

    /// Adds a vote given as candidate indices, most preferred first.
    pub fn add_ranking(&mut self, indices: &[usize], count: u64) -> Result<(), VotingErrors> {
        self.add_checked(count, |reg, idx| reg.ballot_from_indices(indices, idx))
    }

    fn add_checked<F>(&mut self, count: u64, check: F) -> Result<(), VotingErrors>
    where
        F: FnOnce(&CandidateRegistry, usize) -> Result<Ballot, VotingErrors>,
    {
        if self._aborted {
            return Err(VotingErrors::ElectionAborted);
        }
        let (registry, tally) = self
            ._candidates
            .as_mut()
            .ok_or(VotingErrors::MissingCandidates)?;
        let ballot_idx = self._num_submitted;
        self._num_submitted += 1;
        let res = match check(registry, ballot_idx) {
            Ok(ballot) => tally.record(&ballot, VoteCount(count)),
            Err(e) => match self._rules.invalid_ballot_mode {
                InvalidBallotMode::AbortElection => Err(e),
                InvalidBallotMode::SkipBallot => {
                    warn!("add_vote: skipping ballot: {}", e);
                    self._skipped
                        .checked_add(VoteCount(count))
                        .map(|skipped| self._skipped = skipped)
                }
            },
        };
        // Any error left at this point stops the election, overflows included.
        if let Err(e) = &res {
            warn!("add_vote: aborting the election: {}", e);
            self._aborted = true;
        }
        res
    }

    /// Runs the ranked pairs procedure on the votes added so far.
    pub fn tabulate(self) -> Result<VotingResult, VotingErrors> {
        if self._aborted {
            return Err(VotingErrors::ElectionAborted);
        }
        let (registry, tally) = self._candidates.ok_or(VotingErrors::MissingCandidates)?;
        crate::tabulate(&registry, &tally, self._skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    fn builder(rules: &VoteRules) -> Builder {
        Builder::new(rules)
            .unwrap()
            .candidates(&names(&["A", "B", "C"]))
            .unwrap()
    }

    #[test]
    fn votes_require_candidates() {
        let mut b = Builder::new(&VoteRules::DEFAULT_RULES).unwrap();
        assert_eq!(
            b.add_vote_simple(&names(&["A", "B"])),
            Err(VotingErrors::MissingCandidates)
        );
        assert_eq!(b.tabulate(), Err(VotingErrors::MissingCandidates));
    }

    #[test]
    fn capacity_comes_from_the_rules() {
        let rules = VoteRules {
            max_candidates: 2,
            ..VoteRules::DEFAULT_RULES
        };
        let res = Builder::new(&rules)
            .unwrap()
            .candidates(&names(&["A", "B", "C"]));
        assert!(matches!(
            res,
            Err(VotingErrors::TooManyCandidates { count: 3, max: 2 })
        ));
    }

    #[test]
    fn invalid_vote_does_not_touch_the_tally() {
        let mut b = builder(&VoteRules::DEFAULT_RULES);
        b.add_vote_simple(&names(&["A", "B", "C"])).unwrap();
        let before = b._candidates.as_ref().unwrap().1.clone();
        let err = b.add_ranking(&[1, 1, 0], 1).unwrap_err();
        assert!(matches!(err, VotingErrors::DuplicateRanking { ballot: 1, .. }));
        assert_eq!(b._candidates.as_ref().unwrap().1, before);
    }

    #[test]
    fn invalid_vote_aborts_the_election() {
        let mut b = builder(&VoteRules::DEFAULT_RULES);
        b.add_vote_simple(&names(&["A", "B", "C"])).unwrap();
        assert!(b.add_vote_simple(&names(&["A", "X", "C"])).is_err());
        assert_eq!(
            b.add_vote_simple(&names(&["A", "B", "C"])),
            Err(VotingErrors::ElectionAborted)
        );
        assert_eq!(b.tabulate(), Err(VotingErrors::ElectionAborted));
    }

    #[test]
    fn invalid_vote_can_be_skipped() {
        let rules = VoteRules {
            invalid_ballot_mode: InvalidBallotMode::SkipBallot,
            ..VoteRules::DEFAULT_RULES
        };
        let mut b = builder(&rules);
        b.add_vote(&names(&["C", "B", "A"]), 2).unwrap();
        b.add_vote(&names(&["A", "B"]), 3).unwrap();
        b.add_vote_simple(&names(&["A", "B", "B"])).unwrap();
        let res = b.tabulate().unwrap();
        assert_eq!(res.num_ballots, 2);
        assert_eq!(res.skipped_ballots, 4);
        assert_eq!(res.winners, names(&["C"]));
    }

    #[test]
    fn overflowing_weight_stops_the_election() {
        let mut b = Builder::new(&VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        b.add_vote(&names(&["A", "B"]), u64::MAX).unwrap();
        assert_eq!(
            b.add_vote(&names(&["A", "B"]), 1),
            Err(VotingErrors::CountOverflow)
        );
        assert_eq!(b.tabulate(), Err(VotingErrors::ElectionAborted));
    }

    #[test]
    fn overflowing_skipped_weight_stops_the_election() {
        let rules = VoteRules {
            invalid_ballot_mode: InvalidBallotMode::SkipBallot,
            ..VoteRules::DEFAULT_RULES
        };
        let mut b = builder(&rules);
        b.add_vote(&names(&["A"]), u64::MAX).unwrap();
        let err = b.add_vote(&names(&["B"]), 1).unwrap_err();
        assert_eq!(err, VotingErrors::CountOverflow);
        assert_eq!(err.kind(), ErrorKind::InvalidVote);
    }
}
