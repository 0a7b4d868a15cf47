// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A ballot expressed with candidate names.
///
/// The names must form a full ranking of the registered candidates, most
/// preferred first. `count` is the weight of the ballot: a ballot with a
/// count of 3 is tallied as three identical ballots.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub candidates: Vec<String>,
    pub count: u64,
}

// ******** Output data structures *********

/// One majority pair, as it went through the locking procedure.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairStats {
    pub winner: String,
    pub loser: String,
    /// Number of ballots ranking the winner above the loser.
    pub votes_for: u64,
    /// Number of ballots ranking the loser above the winner.
    pub votes_against: u64,
    pub margin: u64,
    /// False if locking this pair would have created a cycle.
    pub locked: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    /// The sources of the locked graph, in candidate order.
    pub winners: Vec<String>,
    /// Total weight of the ballots that were tallied.
    pub num_ballots: u64,
    /// Total weight of the invalid ballots that were skipped.
    pub skipped_ballots: u64,
    /// For each candidate, the number of ballots preferring it over every other candidate.
    pub preferences: Vec<(String, Vec<(String, u64)>)>,
    /// The majority pairs in the order they were considered for locking.
    pub pairs: Vec<PairStats>,
}

/// The broad family an error belongs to.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ErrorKind {
    /// The candidate list cannot be used to run an election.
    Configuration,
    /// A ballot is not a full ranking of the candidates.
    InvalidVote,
    /// The algorithm broke one of its own invariants.
    Internal,
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    MissingCandidates,
    TooFewCandidates {
        count: usize,
        min: usize,
    },
    TooManyCandidates {
        count: usize,
        max: usize,
    },
    EmptyCandidateName {
        position: usize,
    },
    DuplicateCandidate(String),
    /// `ballot` is the 0-based index of the ballot, `rank` the 1-based rank.
    UnknownCandidate {
        ballot: usize,
        rank: usize,
        name: String,
    },
    CandidateOutOfRange {
        ballot: usize,
        rank: usize,
        index: usize,
    },
    DuplicateRanking {
        ballot: usize,
        rank: usize,
        name: String,
    },
    IncompleteBallot {
        ballot: usize,
        expected: usize,
        found: usize,
    },
    /// The total weight of the ballots does not fit in a count.
    CountOverflow,
    /// An earlier invalid ballot aborted the election.
    ElectionAborted,
    /// Two tallies over different numbers of candidates cannot be merged.
    TallyMismatch {
        expected: usize,
        found: usize,
    },
    /// The locked graph contains a cycle.
    CycleDetected,
}

impl VotingErrors {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VotingErrors::MissingCandidates
            | VotingErrors::TooFewCandidates { .. }
            | VotingErrors::TooManyCandidates { .. }
            | VotingErrors::EmptyCandidateName { .. }
            | VotingErrors::DuplicateCandidate(_) => ErrorKind::Configuration,
            VotingErrors::UnknownCandidate { .. }
            | VotingErrors::CandidateOutOfRange { .. }
            | VotingErrors::DuplicateRanking { .. }
            | VotingErrors::IncompleteBallot { .. }
            | VotingErrors::CountOverflow
            | VotingErrors::ElectionAborted => ErrorKind::InvalidVote,
            VotingErrors::TallyMismatch { .. } | VotingErrors::CycleDetected => {
                ErrorKind::Internal
            }
        }
    }
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::MissingCandidates => write!(f, "no candidates were registered"),
            VotingErrors::TooFewCandidates { count, min } => write!(
                f,
                "at least {} candidates are required, but {} were given",
                min, count
            ),
            VotingErrors::TooManyCandidates { count, max } => write!(
                f,
                "maximum number of candidates is {}, but {} were given",
                max, count
            ),
            VotingErrors::EmptyCandidateName { position } => {
                write!(f, "candidate #{} has an empty name", position + 1)
            }
            VotingErrors::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is registered more than once", name)
            }
            VotingErrors::UnknownCandidate { ballot, rank, name } => write!(
                f,
                "invalid vote: ballot #{} rank {}: {:?} is not a candidate",
                ballot + 1,
                rank,
                name
            ),
            VotingErrors::CandidateOutOfRange {
                ballot,
                rank,
                index,
            } => write!(
                f,
                "invalid vote: ballot #{} rank {}: no candidate with index {}",
                ballot + 1,
                rank,
                index
            ),
            VotingErrors::DuplicateRanking { ballot, rank, name } => write!(
                f,
                "invalid vote: ballot #{} rank {}: {:?} is already ranked",
                ballot + 1,
                rank,
                name
            ),
            VotingErrors::IncompleteBallot {
                ballot,
                expected,
                found,
            } => write!(
                f,
                "invalid vote: ballot #{} ranks {} candidates, expected {}",
                ballot + 1,
                found,
                expected
            ),
            VotingErrors::CountOverflow => write!(
                f,
                "invalid vote: the total weight of the ballots exceeds {}",
                u64::MAX
            ),
            VotingErrors::TallyMismatch { expected, found } => write!(
                f,
                "internal error: cannot merge a tally over {} candidates into one over {}",
                found, expected
            ),
            VotingErrors::ElectionAborted => {
                write!(f, "the election was aborted by an invalid vote")
            }
            VotingErrors::CycleDetected => {
                write!(f, "internal error: the locked graph contains a cycle")
            }
        }
    }
}

// ********* Configuration **********

/// The smallest number of candidates for which an election makes sense.
pub const MIN_CANDIDATES: usize = 2;

/// The default capacity limit on the number of candidates.
pub const DEFAULT_MAX_CANDIDATES: usize = 9;

/// What to do with a ballot that is not a full ranking of the candidates.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InvalidBallotMode {
    /// The first invalid ballot stops the election. No winner is computed.
    AbortElection,
    /// Invalid ballots are dropped and counted, and tallying continues.
    SkipBallot,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub max_candidates: usize,
    pub invalid_ballot_mode: InvalidBallotMode,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        max_candidates: DEFAULT_MAX_CANDIDATES,
        invalid_ballot_mode: InvalidBallotMode::AbortElection,
    };
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}
