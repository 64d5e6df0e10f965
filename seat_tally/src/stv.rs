use log::{debug, info, warn};
use snafu::ResultExt;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::ballot::*;
use crate::candidate::Candidate;
use crate::config::*;
use crate::election::Election;
use crate::shuffle::Shuffler;

/// The Droop quota: the smallest number of votes that no more than `seats`
/// candidates can reach at the same time.
pub fn droop_quota(num_ballots: usize, seats: u32) -> u64 {
    (num_ballots as u64 / (seats as u64 + 1)) + 1
}

/// Runs a single transferable vote count.
///
/// The ballots of the election are copied and shuffled with the given
/// shuffler before the first distribution; the election itself keeps its
/// ballots untouched. The candidates of the election carry the final tallies
/// and the winner/loser flags when this returns.
///
/// The count stops when all the seats are filled. If the candidates run out
/// first, the outcome holds fewer winners than seats.
pub fn run_stv<S: Shuffler>(
    election: &mut Election<RankedBallot>,
    rules: &StvRules,
    shuffler: &mut S,
) -> Result<TallyOutcome, TallyError> {
    let seats = election.seats();
    let quota = droop_quota(election.num_ballots(), seats);
    info!(
        "run_stv: {} ballots, {} candidates, {} seats, quota {}, rules: {:?}",
        election.num_ballots(),
        election.candidates().len(),
        seats,
        quota,
        rules
    );

    let mut ballots: Vec<RankedBallot> = election.ballots().to_vec();
    shuffler.shuffle(&mut ballots);
    debug!(
        "run_stv: ballot order: {:?}",
        ballots.iter().map(|b| b.id().0).collect::<Vec<u32>>()
    );

    let candidates = election.start_count();
    let mut count = StvCount::new(candidates, ballots, seats as usize, quota, rules);
    count.run()?;
    Ok(count.into_outcome())
}

// The working state of one count.
struct StvCount<'a> {
    candidates: &'a mut [Candidate],
    // The arena of ballots. Piles refer to ballots by their index in it.
    ballots: Vec<RankedBallot>,
    // Invariant: every ballot index is in at most one pile, and a ballot that
    // is in no pile is exhausted.
    piles: Vec<Vec<usize>>,
    // Winners are flagged here too: they do not take any more ballots.
    eliminated: Vec<bool>,
    first_receipt: Vec<Option<usize>>,
    next_receipt: usize,
    exhausted: usize,
    seats: usize,
    quota: u64,
    rules: StvRules,
    winners: Vec<CandidateId>,
    losers: Vec<CandidateId>,
    round_stats: Vec<RoundStats>,
}

impl<'a> StvCount<'a> {
    fn new(
        candidates: &'a mut [Candidate],
        ballots: Vec<RankedBallot>,
        seats: usize,
        quota: u64,
        rules: &StvRules,
    ) -> StvCount<'a> {
        let num_candidates = candidates.len();
        StvCount {
            candidates,
            ballots,
            piles: vec![Vec::new(); num_candidates],
            eliminated: vec![false; num_candidates],
            first_receipt: vec![None; num_candidates],
            next_receipt: 0,
            exhausted: 0,
            seats,
            quota,
            rules: rules.clone(),
            winners: Vec::new(),
            losers: Vec::new(),
            round_stats: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<(), TallyError> {
        self.distribute_initial()?;

        let mut round_id: u32 = 0;
        while self.winners.len() < self.seats {
            round_id += 1;
            let mut round = RoundStats {
                round: round_id,
                tally: self.tally(),
                tally_results_elected: Vec::new(),
                tally_result_eliminated: Vec::new(),
            };
            info!("Round {} (quota: {}): {:?}", round_id, self.quota, round.tally);

            let continuing = self.continuing();
            let open_seats = self.seats - self.winners.len();
            if continuing.len() <= open_seats {
                info!(
                    "Round {}: {} candidates left for {} seats, electing all of them",
                    round_id,
                    continuing.len(),
                    open_seats
                );
                for cid in continuing {
                    self.elect(cid)?;
                    round.tally_results_elected.push(TransferStats {
                        name: self.name(cid),
                        transfers: Vec::new(),
                        exhausted: 0,
                    });
                }
                self.round_stats.push(round);
                break;
            }

            let mut elected_any = false;
            for idx in 0..self.candidates.len() {
                if self.winners.len() >= self.seats {
                    break;
                }
                if !self.eliminated[idx] && self.candidates[idx].votes() >= self.quota {
                    let cid = CandidateId(idx);
                    self.elect(cid)?;
                    let stats = self.redistribute_surplus(cid)?;
                    round.tally_results_elected.push(stats);
                    elected_any = true;
                }
            }

            if !elected_any {
                match self.find_lowest() {
                    Some(cid) => {
                        self.eliminate(cid)?;
                        let stats = self.redistribute_eliminated(cid)?;
                        round.tally_result_eliminated.push(stats);
                    }
                    None => {
                        warn!(
                            "Round {}: no candidate left to eliminate, {} of {} seats filled",
                            round_id,
                            self.winners.len(),
                            self.seats
                        );
                        self.round_stats.push(round);
                        break;
                    }
                }
            }

            self.check_piles();
            self.round_stats.push(round);
        }
        Ok(())
    }

    fn distribute_initial(&mut self) -> Result<(), TallyError> {
        for idx in 0..self.ballots.len() {
            match self.ballots[idx].current_preference() {
                Some(cid) if !self.eliminated[cid.index()] => self.receive(cid, idx)?,
                _ => {
                    debug!(
                        "distribute_initial: ballot {} has no preference",
                        self.ballots[idx].id()
                    );
                    self.exhausted += 1;
                }
            }
        }
        self.check_piles();
        Ok(())
    }

    fn receive(&mut self, cid: CandidateId, ballot_idx: usize) -> Result<(), TallyError> {
        let c = cid.index();
        self.candidates[c]
            .update_votes(1)
            .context(CandidateInvariantSnafu)?;
        self.piles[c].push(ballot_idx);
        if self.first_receipt[c].is_none() {
            self.first_receipt[c] = Some(self.next_receipt);
            self.next_receipt += 1;
        }
        Ok(())
    }

    fn elect(&mut self, cid: CandidateId) -> Result<(), TallyError> {
        let c = &mut self.candidates[cid.index()];
        c.set_winner(true).context(CandidateInvariantSnafu)?;
        info!("Elected: {} with {} votes", c.name(), c.votes());
        self.eliminated[cid.index()] = true;
        self.winners.push(cid);
        Ok(())
    }

    fn eliminate(&mut self, cid: CandidateId) -> Result<(), TallyError> {
        let c = &mut self.candidates[cid.index()];
        c.set_loser(true).context(CandidateInvariantSnafu)?;
        info!("Eliminated: {} with {} votes", c.name(), c.votes());
        self.eliminated[cid.index()] = true;
        self.losers.push(cid);
        Ok(())
    }

    // Only the first ballots received, up to the surplus, move on. The others
    // stay with the winner.
    fn redistribute_surplus(&mut self, winner: CandidateId) -> Result<TransferStats, TallyError> {
        let surplus = self.candidates[winner.index()]
            .votes()
            .saturating_sub(self.quota) as usize;
        let pile = &mut self.piles[winner.index()];
        let num_moved = surplus.min(pile.len());
        let moved: Vec<usize> = pile.drain(..num_moved).collect();
        debug!(
            "redistribute_surplus: {}: surplus {}, moving ballots {:?}",
            self.name(winner),
            surplus,
            moved
        );
        self.transfer(winner, moved)
    }

    fn redistribute_eliminated(&mut self, loser: CandidateId) -> Result<TransferStats, TallyError> {
        let moved = std::mem::take(&mut self.piles[loser.index()]);
        debug!(
            "redistribute_eliminated: {}: moving ballots {:?}",
            self.name(loser),
            moved
        );
        self.transfer(loser, moved)
    }

    fn transfer(&mut self, from: CandidateId, moved: Vec<usize>) -> Result<TransferStats, TallyError> {
        let mut transfers: BTreeMap<CandidateId, u64> = BTreeMap::new();
        let mut exhausted: u64 = 0;
        for ballot_idx in moved {
            match self.next_continuing(ballot_idx) {
                Some(to) => {
                    self.receive(to, ballot_idx)?;
                    *transfers.entry(to).or_insert(0) += 1;
                }
                None => {
                    exhausted += 1;
                    self.exhausted += 1;
                }
            }
        }
        let stats = TransferStats {
            name: self.name(from),
            transfers: transfers
                .iter()
                .map(|(cid, count)| (self.name(*cid), *count))
                .collect(),
            exhausted,
        };
        debug!("transfer: {:?}", stats);
        Ok(stats)
    }

    // Moves the ballot to its next preference and returns the candidate it
    // now counts for, if that candidate is still in the count.
    fn next_continuing(&mut self, ballot_idx: usize) -> Option<CandidateId> {
        let eliminated = &self.eliminated;
        let ballot = &mut self.ballots[ballot_idx];
        ballot.advance();
        match self.rules.transfer_rule {
            TransferRule::ExhaustOnEliminated => ballot
                .current_preference()
                .filter(|cid| !eliminated[cid.index()]),
            TransferRule::SkipToContinuing => loop {
                match ballot.current_preference() {
                    Some(cid) if eliminated[cid.index()] => ballot.advance(),
                    other => return other,
                }
            },
        }
    }

    // The candidates still running, in roster order.
    fn continuing(&self) -> Vec<CandidateId> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(idx, c)| !self.eliminated[*idx] && !c.is_winner())
            .map(|(idx, _)| CandidateId(idx))
            .collect()
    }

    fn find_lowest(&self) -> Option<CandidateId> {
        let continuing = self.continuing();
        let min_votes = continuing
            .iter()
            .map(|cid| self.candidates[cid.index()].votes())
            .min()?;
        let all_smallest: Vec<CandidateId> = continuing
            .into_iter()
            .filter(|cid| self.candidates[cid.index()].votes() == min_votes)
            .collect();
        if all_smallest.len() > 1 {
            debug!(
                "find_lowest: tie at {} votes between {:?}, tiebreak mode {:?}",
                min_votes, all_smallest, self.rules.tiebreak_mode
            );
        }
        match self.rules.tiebreak_mode {
            TieBreakMode::FirstReceipt => all_smallest.into_iter().min_by_key(|cid| {
                (
                    Reverse(self.first_receipt[cid.index()].unwrap_or(usize::MAX)),
                    cid.index(),
                )
            }),
            TieBreakMode::UseCandidateOrder => all_smallest.into_iter().min(),
        }
    }

    // Candidates that are not losers, with their current count.
    fn tally(&self) -> Vec<(String, u64)> {
        self.candidates
            .iter()
            .filter(|c| !c.is_loser())
            .map(|c| (c.name().to_string(), c.votes()))
            .collect()
    }

    fn name(&self, cid: CandidateId) -> String {
        self.candidates[cid.index()].name().to_string()
    }

    fn check_piles(&self) {
        let in_piles: usize = self.piles.iter().map(|p| p.len()).sum();
        assert_eq!(
            in_piles + self.exhausted,
            self.ballots.len(),
            "Ballots were lost or duplicated during the count"
        );
        for (idx, c) in self.candidates.iter().enumerate() {
            if !self.eliminated[idx] {
                assert_eq!(
                    c.votes(),
                    self.piles[idx].len() as u64,
                    "The count of {} does not match its pile",
                    c.name()
                );
            } else if c.is_loser() {
                assert!(self.piles[idx].is_empty());
            }
        }
    }

    fn into_outcome(self) -> TallyOutcome {
        let pick = |ids: &[CandidateId]| -> Vec<Candidate> {
            ids.iter()
                .map(|cid| self.candidates[cid.index()].clone())
                .collect()
        };
        TallyOutcome {
            winners: pick(&self.winners),
            losers: pick(&self.losers),
            quota: Some(self.quota),
            round_stats: self.round_stats.clone(),
        }
    }
}
