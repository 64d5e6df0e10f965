use log::{debug, info};
use snafu::ResultExt;

use crate::ballot::*;
use crate::candidate::Candidate;
use crate::config::*;
use crate::election::Election;
use crate::shuffle::Shuffler;

/// Runs a plurality count: one vote per ballot, the `seats` highest counts win.
///
/// Candidates tied at the cut-off are put in the order given by the shuffler,
/// and the first ones take the remaining seats.
pub fn run_plurality<S: Shuffler>(
    election: &mut Election<PluralityBallot>,
    shuffler: &mut S,
) -> Result<TallyOutcome, TallyError> {
    info!(
        "run_plurality: {} ballots, {} candidates, {} seats",
        election.num_ballots(),
        election.candidates().len(),
        election.seats()
    );
    let choices: Vec<CandidateId> = election.ballots().iter().map(|b| b.choice()).collect();
    let seats = election.seats() as usize;
    let candidates = election.start_count();
    count_marks(candidates, choices)?;
    select_top(candidates, seats, shuffler)
}

/// Runs a municipal voting count: every mark on a ballot is one vote, the
/// `seats` highest counts win. Ties at the cut-off are handled as in
/// [`run_plurality`].
pub fn run_municipal<S: Shuffler>(
    election: &mut Election<MvBallot>,
    shuffler: &mut S,
) -> Result<TallyOutcome, TallyError> {
    info!(
        "run_municipal: {} ballots, {} candidates, {} seats",
        election.num_ballots(),
        election.candidates().len(),
        election.seats()
    );
    let choices: Vec<CandidateId> = election
        .ballots()
        .iter()
        .flat_map(|b| b.choices().iter().cloned())
        .collect();
    let seats = election.seats() as usize;
    let candidates = election.start_count();
    count_marks(candidates, choices)?;
    select_top(candidates, seats, shuffler)
}

fn count_marks(candidates: &mut [Candidate], marks: Vec<CandidateId>) -> Result<(), TallyError> {
    for cid in marks {
        candidates[cid.index()]
            .update_votes(1)
            .context(CandidateInvariantSnafu)?;
    }
    Ok(())
}

fn select_top<S: Shuffler>(
    candidates: &mut [Candidate],
    seats: usize,
    shuffler: &mut S,
) -> Result<TallyOutcome, TallyError> {
    // Sorted by decreasing count. The sort is stable: roster order among equals.
    let mut order: Vec<CandidateId> = candidates.iter().map(|c| c.id()).collect();
    order.sort_by_key(|cid| std::cmp::Reverse(candidates[cid.index()].votes()));

    let (winners, losers): (Vec<CandidateId>, Vec<CandidateId>) = if seats >= order.len() {
        (order, Vec::new())
    } else {
        let cutoff = candidates[order[seats - 1].index()].votes();
        let votes = |cid: &CandidateId| candidates[cid.index()].votes();
        let mut winners: Vec<CandidateId> =
            order.iter().filter(|cid| votes(*cid) > cutoff).cloned().collect();
        let mut tied: Vec<CandidateId> =
            order.iter().filter(|cid| votes(*cid) == cutoff).cloned().collect();
        let below: Vec<CandidateId> = order.iter().filter(|cid| votes(*cid) < cutoff).cloned().collect();

        let open_seats = seats - winners.len();
        if tied.len() > open_seats {
            debug!(
                "select_top: {} candidates tied at {} votes for {} seats",
                tied.len(),
                cutoff,
                open_seats
            );
            shuffler.shuffle(&mut tied);
        }
        let tied_losers = tied.split_off(open_seats);
        winners.extend(tied);
        let mut losers = tied_losers;
        losers.extend(below);
        (winners, losers)
    };

    let mut round = RoundStats {
        round: 1,
        tally: candidates
            .iter()
            .map(|c| (c.name().to_string(), c.votes()))
            .collect(),
        tally_results_elected: Vec::new(),
        tally_result_eliminated: Vec::new(),
    };
    for cid in winners.iter() {
        let c = &mut candidates[cid.index()];
        c.set_winner(true).context(CandidateInvariantSnafu)?;
        info!("Elected: {} with {} votes", c.name(), c.votes());
        round.tally_results_elected.push(no_transfer(c));
    }
    for cid in losers.iter() {
        let c = &mut candidates[cid.index()];
        c.set_loser(true).context(CandidateInvariantSnafu)?;
        round.tally_result_eliminated.push(no_transfer(c));
    }

    let pick = |ids: &[CandidateId]| -> Vec<Candidate> {
        ids.iter().map(|cid| candidates[cid.index()].clone()).collect()
    };
    Ok(TallyOutcome {
        winners: pick(&winners),
        losers: pick(&losers),
        quota: None,
        round_stats: vec![round],
    })
}

fn no_transfer(c: &Candidate) -> TransferStats {
    TransferStats {
        name: c.name().to_string(),
        transfers: Vec::new(),
        exhausted: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::{KeepOrder, SeededShuffler};

    fn names(cs: &[Candidate]) -> Vec<&str> {
        cs.iter().map(|c| c.name()).collect()
    }

    fn roster(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    fn plurality(ns: &[&str], seats: u32, rows: &[Vec<u32>]) -> Election<PluralityBallot> {
        let mut e = Election::new(&roster(ns), seats).unwrap();
        for (idx, row) in rows.iter().enumerate() {
            let b = PluralityBallot::new(Ballot::new(BallotId(idx as u32 + 1), row.clone())).unwrap();
            e.add_ballot(b).unwrap();
        }
        e
    }

    fn municipal(ns: &[&str], seats: u32, rows: &[Vec<u32>]) -> Election<MvBallot> {
        let mut e = Election::new(&roster(ns), seats).unwrap();
        for (idx, row) in rows.iter().enumerate() {
            let b = MvBallot::new(Ballot::new(BallotId(idx as u32 + 1), row.clone())).unwrap();
            e.add_ballot(b).unwrap();
        }
        e
    }

    #[test]
    fn highest_count_wins() {
        let mut e = plurality(
            &["A", "B", "C"],
            1,
            &[vec![1, 0, 0], vec![1, 0, 0], vec![0, 1, 0]],
        );
        let res = run_plurality(&mut e, &mut KeepOrder).unwrap();
        assert_eq!(names(&res.winners), vec!["A"]);
        assert_eq!(names(&res.losers), vec!["B", "C"]);
        assert_eq!(res.quota, None);
        assert_eq!(res.winners[0].votes(), 2);
        assert!(e.candidates()[2].is_loser());
    }

    #[test]
    fn tie_at_the_cutoff_follows_the_shuffler() {
        let rows = vec![
            vec![1, 0, 0],
            vec![1, 0, 0],
            vec![0, 1, 0],
            vec![0, 0, 1],
        ];
        let mut e = plurality(&["A", "B", "C"], 2, &rows);
        let res = run_plurality(&mut e, &mut KeepOrder).unwrap();
        assert_eq!(names(&res.winners), vec!["A", "B"]);
        assert_eq!(names(&res.losers), vec!["C"]);

        for seed in 0..10 {
            let mut e = plurality(&["A", "B", "C"], 2, &rows);
            let res = run_plurality(&mut e, &mut SeededShuffler::new(seed)).unwrap();
            assert_eq!(res.winners.len(), 2);
            assert_eq!(res.winners[0].name(), "A");
            assert_eq!(res.losers.len(), 1);
            assert_ne!(res.losers[0].name(), "A");
        }
    }

    #[test]
    fn everybody_wins_with_enough_seats() {
        let mut e = plurality(&["A", "B"], 2, &[vec![0, 1]]);
        let res = run_plurality(&mut e, &mut KeepOrder).unwrap();
        assert_eq!(names(&res.winners), vec!["B", "A"]);
        assert!(res.losers.is_empty());
    }

    #[test]
    fn municipal_counts_every_mark() {
        let mut e = municipal(
            &["A", "B", "C", "D"],
            2,
            &[
                vec![1, 1, 0, 0],
                vec![1, 0, 1, 0],
                vec![0, 1, 0, 0],
                vec![0, 0, 0, 0],
            ],
        );
        let res = run_municipal(&mut e, &mut KeepOrder).unwrap();
        assert_eq!(names(&res.winners), vec!["A", "B"]);
        assert_eq!(names(&res.losers), vec!["C", "D"]);
        assert_eq!(
            res.round_stats[0].tally,
            vec![
                ("A".to_string(), 2),
                ("B".to_string(), 2),
                ("C".to_string(), 1),
                ("D".to_string(), 0)
            ]
        );
    }

    #[test]
    fn municipal_tie_for_the_last_seat() {
        let mut e = municipal(
            &["A", "B", "C"],
            2,
            &[vec![1, 1, 1], vec![1, 0, 0]],
        );
        let res = run_municipal(&mut e, &mut KeepOrder).unwrap();
        assert_eq!(names(&res.winners), vec!["A", "B"]);
        assert_eq!(names(&res.losers), vec!["C"]);
    }
}
