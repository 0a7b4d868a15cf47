use log::debug;
use std::collections::HashMap;

use crate::config::*;

/// The position of a candidate in the registration order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub(crate) usize);

impl CandidateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A full ranking of all the registered candidates, most preferred first.
///
/// Ballots can only be built through a [CandidateRegistry], which guarantees
/// that every candidate appears exactly once.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    ranks: Vec<CandidateId>,
}

impl Ballot {
    pub fn ranks(&self) -> &[CandidateId] {
        &self.ranks
    }
}

/// The ordered list of candidates of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateRegistry {
    names: Vec<String>,
    by_name: HashMap<String, CandidateId>,
}

impl CandidateRegistry {
    /// Registers the candidates in the given order.
    ///
    /// Fails if there are fewer than [MIN_CANDIDATES] or more than
    /// `max_candidates` names, or if a name is empty or repeated.
    pub fn new(names: &[String], max_candidates: usize) -> Result<CandidateRegistry, VotingErrors> {
        if names.is_empty() {
            return Err(VotingErrors::MissingCandidates);
        }
        if names.len() < MIN_CANDIDATES {
            return Err(VotingErrors::TooFewCandidates {
                count: names.len(),
                min: MIN_CANDIDATES,
            });
        }
        if names.len() > max_candidates {
            return Err(VotingErrors::TooManyCandidates {
                count: names.len(),
                max: max_candidates,
            });
        }
        let mut by_name: HashMap<String, CandidateId> = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(VotingErrors::EmptyCandidateName { position: idx });
            }
            if by_name.insert(name.clone(), CandidateId(idx)).is_some() {
                return Err(VotingErrors::DuplicateCandidate(name.clone()));
            }
        }
        debug!("CandidateRegistry::new: registered {:?}", names);
        Ok(CandidateRegistry {
            names: names.to_vec(),
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<CandidateId> {
        self.by_name.get(name).cloned()
    }

    pub fn name(&self, cid: CandidateId) -> &str {
        &self.names[cid.0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn ids(&self) -> impl Iterator<Item = CandidateId> {
        (0..self.names.len()).map(CandidateId)
    }

    /// Validates a ranking given by candidate names.
    ///
    /// `ballot_idx` only serves to locate the ballot in error messages.
    pub fn ballot_from_names(
        &self,
        names: &[String],
        ballot_idx: usize,
    ) -> Result<Ballot, VotingErrors> {
        let mut ranks: Vec<CandidateId> = Vec::with_capacity(self.len());
        for (idx, name) in names.iter().enumerate() {
            let cid = self
                .index_of(name)
                .ok_or_else(|| VotingErrors::UnknownCandidate {
                    ballot: ballot_idx,
                    rank: idx + 1,
                    name: name.clone(),
                })?;
            ranks.push(cid);
        }
        self.check_permutation(ranks, ballot_idx)
    }

    /// Validates a ranking given by candidate indices.
    pub fn ballot_from_indices(
        &self,
        indices: &[usize],
        ballot_idx: usize,
    ) -> Result<Ballot, VotingErrors> {
        let mut ranks: Vec<CandidateId> = Vec::with_capacity(self.len());
        for (idx, &cand_idx) in indices.iter().enumerate() {
            if cand_idx >= self.len() {
                return Err(VotingErrors::CandidateOutOfRange {
                    ballot: ballot_idx,
                    rank: idx + 1,
                    index: cand_idx,
                });
            }
            ranks.push(CandidateId(cand_idx));
        }
        self.check_permutation(ranks, ballot_idx)
    }

    fn check_permutation(
        &self,
        ranks: Vec<CandidateId>,
        ballot_idx: usize,
    ) -> Result<Ballot, VotingErrors> {
        let mut seen = vec![false; self.len()];
        for (idx, cid) in ranks.iter().enumerate() {
            if seen[cid.0] {
                return Err(VotingErrors::DuplicateRanking {
                    ballot: ballot_idx,
                    rank: idx + 1,
                    name: self.name(*cid).to_string(),
                });
            }
            seen[cid.0] = true;
        }
        if ranks.len() != self.len() {
            return Err(VotingErrors::IncompleteBallot {
                ballot: ballot_idx,
                expected: self.len(),
                found: ranks.len(),
            });
        }
        Ok(Ballot { ranks })
    }
}
