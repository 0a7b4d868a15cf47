use log::debug;

use crate::pairs::Pair;
use crate::registry::CandidateId;

/// The graph of locked pairs. An edge i -> j means i is locked in over j.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LockGraph {
    num_candidates: usize,
    // Row-major adjacency matrix
    locked: Vec<bool>,
}

/// The outcome of locking a list of ranked pairs.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LockOutcome {
    pub graph: LockGraph,
    /// For each pair, in the order given, whether it was locked.
    pub locked: Vec<bool>,
}

impl LockGraph {
    pub fn new(num_candidates: usize) -> LockGraph {
        LockGraph {
            num_candidates,
            locked: vec![false; num_candidates * num_candidates],
        }
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    pub fn has_edge(&self, from: CandidateId, to: CandidateId) -> bool {
        self.locked[from.0 * self.num_candidates + to.0]
    }

    fn set_edge(&mut self, from: CandidateId, to: CandidateId) {
        self.locked[from.0 * self.num_candidates + to.0] = true;
    }

    fn successors(&self, from: CandidateId) -> impl Iterator<Item = CandidateId> + '_ {
        (0..self.num_candidates)
            .map(CandidateId)
            .filter(move |to| self.has_edge(from, *to))
    }

    /// True if a directed path leads from `from` to `to`.
    ///
    /// Every outgoing edge of every reached node is followed.
    pub fn reaches(&self, from: CandidateId, to: CandidateId) -> bool {
        let mut visited = vec![false; self.num_candidates];
        let mut stack: Vec<CandidateId> = vec![from];
        visited[from.0] = true;
        while let Some(cur) = stack.pop() {
            if cur == to {
                return true;
            }
            for next in self.successors(cur) {
                if !visited[next.0] {
                    visited[next.0] = true;
                    stack.push(next);
                }
            }
        }
        false
    }

    /// True if adding the edge winner -> loser would close a cycle.
    pub fn creates_cycle(&self, winner: CandidateId, loser: CandidateId) -> bool {
        self.reaches(loser, winner)
    }

    /// Locks the edge winner -> loser unless it would close a cycle.
    ///
    /// Returns whether the edge was locked.
    pub fn try_lock(&mut self, winner: CandidateId, loser: CandidateId) -> bool {
        if self.creates_cycle(winner, loser) {
            return false;
        }
        self.set_edge(winner, loser);
        true
    }

    /// Checks the whole graph for cycles by repeatedly removing sources.
    pub fn is_acyclic(&self) -> bool {
        let n = self.num_candidates;
        let mut in_degree: Vec<usize> = (0..n)
            .map(|j| {
                (0..n)
                    .filter(|&i| self.has_edge(CandidateId(i), CandidateId(j)))
                    .count()
            })
            .collect();
        let mut ready: Vec<CandidateId> = (0..n)
            .filter(|&j| in_degree[j] == 0)
            .map(CandidateId)
            .collect();
        let mut removed = 0;
        while let Some(cur) = ready.pop() {
            removed += 1;
            for next in self.successors(cur) {
                in_degree[next.0] -= 1;
                if in_degree[next.0] == 0 {
                    ready.push(next);
                }
            }
        }
        removed == n
    }

    /// The candidates without any incoming edge, in candidate order.
    pub fn sources(&self) -> Vec<CandidateId> {
        (0..self.num_candidates)
            .map(CandidateId)
            .filter(|&j| (0..self.num_candidates).all(|i| !self.has_edge(CandidateId(i), j)))
            .collect()
    }
}

/// Locks the pairs in the given order, skipping those that would create a cycle.
pub fn lock(sorted_pairs: &[Pair], num_candidates: usize) -> LockOutcome {
    let mut graph = LockGraph::new(num_candidates);
    let mut locked: Vec<bool> = Vec::with_capacity(sorted_pairs.len());
    for p in sorted_pairs.iter() {
        let is_locked = graph.try_lock(p.winner, p.loser);
        if is_locked {
            debug!(
                "lock: locked {:?} -> {:?} (margin {:?})",
                p.winner, p.loser, p.margin
            );
        } else {
            debug!(
                "lock: skipped {:?} -> {:?} (margin {:?}): would create a cycle",
                p.winner, p.loser, p.margin
            );
        }
        locked.push(is_locked);
    }
    LockOutcome { graph, locked }
}

/// Returns the winners: every candidate that nobody is locked in over.
pub fn resolve(graph: &LockGraph) -> Vec<CandidateId> {
    let winners = graph.sources();
    debug!("resolve: sources {:?}", winners);
    winners
}
