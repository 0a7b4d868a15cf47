/*!
This crate computes the outcome of an election with the Tideman method, also
known as ranked pairs.

Every voter ranks all the candidates. For every pair of candidates, the
ballots give a majority one way or the other (or a tie). These majorities are
locked into a graph, strongest first, skipping any that would contradict the
ones already locked by closing a cycle. The winners are the candidates that
nobody is locked in over.

The simplest entry point is [run_election]. The [builder::Builder] is more
convenient when the ballots come one at a time.
*/

mod config;
use log::{debug, info};

pub mod builder;
mod lock_graph;
mod pairs;
mod registry;
mod tally;

pub use crate::config::*;
pub use crate::lock_graph::{lock, resolve, LockGraph, LockOutcome};
pub use crate::pairs::{extract_pairs, sort_by_margin, Pair};
pub use crate::registry::{Ballot, CandidateId, CandidateRegistry};
pub use crate::tally::{PreferenceTally, VoteCount};

/// Runs the ranked pairs procedure with the given rules for the given votes.
///
/// Arguments:
/// * `coll` the collection of votes to process
/// * `rules` the rules that govern this election
/// * `candidates` the registered candidates for this election, in order.
pub fn run_election(
    coll: &[Vote],
    rules: &VoteRules,
    candidates: &[String],
) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} votes, candidates: {:?}, rules: {:?}",
        coll.len(),
        candidates,
        rules
    );
    let mut builder = builder::Builder::new(rules)?.candidates(candidates)?;
    for v in coll.iter() {
        builder.add_vote(&v.candidates, v.count)?;
    }
    builder.tabulate()
}

// The tally is final when this is called.
pub(crate) fn tabulate(
    registry: &CandidateRegistry,
    tally: &PreferenceTally,
    skipped: VoteCount,
) -> Result<VotingResult, VotingErrors> {
    let num_candidates = registry.len();
    info!(
        "Tabulating {:?} ballots ({:?} skipped)",
        tally.num_ballots().0,
        skipped.0
    );
    for cid in registry.ids() {
        info!("Candidate: {}: {}", cid.index() + 1, registry.name(cid));
    }

    let pairs = extract_pairs(tally);
    let sorted_pairs = sort_by_margin(&pairs);
    let outcome = lock(&sorted_pairs, num_candidates);

    if !outcome.graph.is_acyclic() {
        return Err(VotingErrors::CycleDetected);
    }
    let winners = resolve(&outcome.graph);
    // A graph without cycles always has a source.
    if winners.is_empty() {
        return Err(VotingErrors::CycleDetected);
    }

    let mut pair_stats: Vec<PairStats> = Vec::new();
    for (p, &locked) in sorted_pairs.iter().zip(outcome.locked.iter()) {
        let stats = PairStats {
            winner: registry.name(p.winner).to_string(),
            loser: registry.name(p.loser).to_string(),
            votes_for: tally.get(p.winner, p.loser).0,
            votes_against: tally.get(p.loser, p.winner).0,
            margin: p.margin.0,
            locked,
        };
        info!(
            "{:>6} {} over {} -> {}",
            stats.margin,
            stats.winner,
            stats.loser,
            if locked { "locked" } else { "skipped" }
        );
        pair_stats.push(stats);
    }

    let preferences: Vec<(String, Vec<(String, u64)>)> = registry
        .ids()
        .map(|i| {
            let row: Vec<(String, u64)> = registry
                .ids()
                .filter(|j| *j != i)
                .map(|j| (registry.name(j).to_string(), tally.get(i, j).0))
                .collect();
            (registry.name(i).to_string(), row)
        })
        .collect();

    let winner_names: Vec<String> = winners
        .iter()
        .map(|cid| registry.name(*cid).to_string())
        .collect();
    debug!("tabulate: winners: {:?}", winner_names);
    if winner_names.len() > 1 {
        info!("Tie between {} winners: {:?}", winner_names.len(), winner_names);
    }

    Ok(VotingResult {
        winners: winner_names,
        num_ballots: tally.num_ballots().0,
        skipped_ballots: skipped.0,
        preferences,
        pairs: pair_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    fn vote(l: &[&str], count: u64) -> Vote {
        Vote {
            candidates: names(l),
            count,
        }
    }

    fn find_pair<'a>(res: &'a VotingResult, w: &str, l: &str) -> &'a PairStats {
        res.pairs
            .iter()
            .find(|p| p.winner == w && p.loser == l)
            .unwrap()
    }

    #[test]
    fn clear_winner_after_locking_all_pairs() {
        init();
        let votes = vec![vote(&["A", "B", "C"], 3), vote(&["B", "C", "A"], 2)];
        let res = run_election(&votes, &VoteRules::DEFAULT_RULES, &names(&["A", "B", "C"]))
            .unwrap();

        let prefs: Vec<(String, u64)> = res.preferences[0].1.clone();
        assert_eq!(prefs, vec![("B".to_string(), 3), ("C".to_string(), 3)]);
        assert_eq!(find_pair(&res, "A", "B").votes_against, 2);
        assert_eq!(find_pair(&res, "B", "C").votes_against, 0);

        let order: Vec<(String, String, u64, bool)> = res
            .pairs
            .iter()
            .map(|p| (p.winner.clone(), p.loser.clone(), p.margin, p.locked))
            .collect();
        assert_eq!(
            order,
            vec![
                ("B".to_string(), "C".to_string(), 5, true),
                ("A".to_string(), "B".to_string(), 1, true),
                ("A".to_string(), "C".to_string(), 1, true),
            ]
        );
        assert_eq!(res.winners, names(&["A"]));
        assert_eq!(res.num_ballots, 5);
    }

    #[test]
    fn condorcet_cycle_has_a_single_source() {
        init();
        let votes = vec![
            vote(&["A", "B", "C"], 2),
            vote(&["B", "C", "A"], 2),
            vote(&["C", "A", "B"], 2),
        ];
        let res = run_election(&votes, &VoteRules::DEFAULT_RULES, &names(&["A", "B", "C"]))
            .unwrap();
        assert_eq!(res.pairs.len(), 3);
        assert!(res.pairs.iter().all(|p| p.margin == 2));
        assert_eq!(res.pairs.iter().filter(|p| !p.locked).count(), 1);
        assert_eq!(res.winners.len(), 1);
        // Equal margins are locked in candidate order: A>B, B>C, then C>A is skipped.
        assert!(!find_pair(&res, "C", "A").locked);
        assert_eq!(res.winners, names(&["A"]));
    }

    #[test]
    fn no_ballots_means_everybody_wins() {
        init();
        let res = run_election(&[], &VoteRules::DEFAULT_RULES, &names(&["A", "B", "C"]))
            .unwrap();
        assert!(res.pairs.is_empty());
        assert_eq!(res.winners, names(&["A", "B", "C"]));
        assert_eq!(res.num_ballots, 0);
    }

    #[test]
    fn exact_tie_reports_both_winners() {
        init();
        let votes = vec![vote(&["A", "B", "C"], 1), vote(&["B", "A", "C"], 1)];
        let res = run_election(&votes, &VoteRules::DEFAULT_RULES, &names(&["A", "B", "C"]))
            .unwrap();
        assert_eq!(res.winners, names(&["A", "B"]));
    }

    #[test]
    fn malformed_ballot_stops_the_election() {
        init();
        let votes = vec![vote(&["A", "B", "C"], 1), vote(&["A", "A", "C"], 1)];
        let err = run_election(&votes, &VoteRules::DEFAULT_RULES, &names(&["A", "B", "C"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVote);
        assert!(matches!(
            err,
            VotingErrors::DuplicateRanking {
                ballot: 1,
                rank: 2,
                ..
            }
        ));
    }

    #[test]
    fn too_many_candidates_is_a_configuration_error() {
        let cands: Vec<String> = (0..10).map(|i| format!("C{}", i)).collect();
        let err = run_election(&[], &VoteRules::DEFAULT_RULES, &cands).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "maximum number of candidates is 9, but 10 were given"
        );
    }

    // ******** Properties ********

    fn election() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
        (2usize..=7).prop_flat_map(|n| {
            let ballot = Just((0..n).collect::<Vec<usize>>()).prop_shuffle();
            (Just(n), prop::collection::vec(ballot, 0..40))
        })
    }

    fn tally_of(n: usize, ballots: &[Vec<usize>]) -> (CandidateRegistry, PreferenceTally) {
        let cands: Vec<String> = (0..n).map(|i| format!("C{}", i)).collect();
        let reg = CandidateRegistry::new(&cands, 9).unwrap();
        let mut tally = PreferenceTally::new(n);
        for (idx, b) in ballots.iter().enumerate() {
            tally
                .record(&reg.ballot_from_indices(b, idx).unwrap(), VoteCount(1))
                .unwrap();
        }
        (reg, tally)
    }

    fn locked_graph(tally: &PreferenceTally) -> LockGraph {
        let sorted = sort_by_margin(&extract_pairs(tally));
        lock(&sorted, tally.num_candidates()).graph
    }

    proptest! {
        #[test]
        fn locked_graph_is_acyclic((n, ballots) in election()) {
            let (_, tally) = tally_of(n, &ballots);
            let graph = locked_graph(&tally);
            prop_assert!(graph.is_acyclic());
            for i in 0..n {
                for j in 0..n {
                    if graph.has_edge(CandidateId(i), CandidateId(j)) {
                        prop_assert!(!graph.reaches(CandidateId(j), CandidateId(i)));
                    }
                }
            }
        }

        #[test]
        fn winners_are_never_empty((n, ballots) in election()) {
            let (reg, tally) = tally_of(n, &ballots);
            let res = tabulate(&reg, &tally, VoteCount::EMPTY).unwrap();
            prop_assert!(!res.winners.is_empty());
        }

        #[test]
        fn unanimous_pairs_are_never_reversed((n, ballots) in election()) {
            let (_, tally) = tally_of(n, &ballots);
            let graph = locked_graph(&tally);
            let total = tally.num_ballots();
            for i in (0..n).map(CandidateId) {
                for j in (0..n).map(CandidateId) {
                    if i != j && total > VoteCount::EMPTY && tally.get(i, j) == total {
                        prop_assert!(!graph.reaches(j, i));
                    }
                }
            }
        }

        #[test]
        fn ballot_order_does_not_matter(
            ((n, ballots), seed) in (election(), any::<u64>())
        ) {
            let mut shuffled = ballots.clone();
            // Deterministic rotation and reversal of the ballots.
            if !shuffled.is_empty() {
                let k = (seed as usize) % shuffled.len();
                shuffled.rotate_left(k);
            }
            shuffled.reverse();
            let (reg, tally) = tally_of(n, &ballots);
            let (_, tally2) = tally_of(n, &shuffled);
            prop_assert_eq!(&tally, &tally2);
            let res = tabulate(&reg, &tally, VoteCount::EMPTY).unwrap();
            let res2 = tabulate(&reg, &tally2, VoteCount::EMPTY).unwrap();
            prop_assert_eq!(res.winners, res2.winners);
        }

        #[test]
        fn extraction_is_pure((n, ballots) in election()) {
            let (_, tally) = tally_of(n, &ballots);
            let before = tally.clone();
            let first = extract_pairs(&tally);
            let second = extract_pairs(&tally);
            prop_assert_eq!(first, second);
            prop_assert_eq!(tally, before);
        }
    }
}
