use log::{debug, warn};
use snafu::ensure;
use std::collections::HashSet;

use crate::ballot::*;
use crate::candidate::Candidate;
use crate::config::*;

/// A ballot that was turned down when the election was assembled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RejectedBallot {
    pub id: BallotId,
    pub markers: Vec<u32>,
    pub reason: BallotError,
}

/// The election context: the candidate roster, the number of seats and the
/// validated ballots.
///
/// The ballots never change once they are in. The candidates carry the
/// results of the last count that ran on this election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election<B> {
    seats: u32,
    // Invariant: candidates[i].id() == CandidateId(i)
    candidates: Vec<Candidate>,
    // Invariant: every ballot has exactly candidates.len() markers.
    ballots: Vec<B>,
    rejected: Vec<RejectedBallot>,
    // Ids of the valid and the rejected ballots.
    ballot_ids: HashSet<BallotId>,
}

impl<B: Marked> Election<B> {
    /// An election without ballots. The candidates get their ids from their position.
    pub fn new(names: &[String], seats: u32) -> Result<Election<B>, ElectionError> {
        let candidates = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Candidate::new(name, CandidateId(idx)))
            .collect();
        Election::from_parts(candidates, seats, Vec::new())
    }

    /// Assembles an election out of existing records, checking that the
    /// candidate ids match their positions and that every ballot has one
    /// marker per candidate.
    pub fn from_parts(
        candidates: Vec<Candidate>,
        seats: u32,
        ballots: Vec<B>,
    ) -> Result<Election<B>, ElectionError> {
        ensure!(!candidates.is_empty(), NoCandidatesSnafu);
        ensure!(seats >= 1, NoSeatsSnafu);
        for (position, c) in candidates.iter().enumerate() {
            ensure!(
                c.id() == CandidateId(position),
                CandidateOutOfPlaceSnafu {
                    name: c.name(),
                    id: c.id().index(),
                    position,
                }
            );
        }
        if seats as usize > candidates.len() {
            warn!(
                "Election: {} seats for only {} candidates",
                seats,
                candidates.len()
            );
        }
        let mut election = Election {
            seats,
            candidates,
            ballots: Vec::new(),
            rejected: Vec::new(),
            ballot_ids: HashSet::new(),
        };
        for b in ballots {
            election.add_ballot(b)?;
        }
        Ok(election)
    }

    pub fn add_ballot(&mut self, ballot: B) -> Result<(), ElectionError> {
        ensure!(
            ballot.markers().len() == self.candidates.len(),
            MarkerCountMismatchSnafu {
                ballot_id: ballot.id(),
                expected: self.candidates.len(),
                found: ballot.markers().len(),
            }
        );
        self.claim_id(ballot.id())?;
        self.ballots.push(ballot);
        Ok(())
    }

    /// Keeps track of a ballot that could not be accepted, for the audit.
    /// Its id is taken all the same.
    pub fn reject_ballot(
        &mut self,
        ballot: Ballot,
        reason: BallotError,
    ) -> Result<(), ElectionError> {
        self.claim_id(ballot.id())?;
        warn!("Rejected ballot: {}", reason);
        self.rejected.push(RejectedBallot {
            id: ballot.id(),
            markers: ballot.markers().to_vec(),
            reason,
        });
        Ok(())
    }

    fn claim_id(&mut self, ballot_id: BallotId) -> Result<(), ElectionError> {
        ensure!(
            self.ballot_ids.insert(ballot_id),
            DuplicateBallotIdSnafu { ballot_id }
        );
        Ok(())
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, cid: CandidateId) -> Option<&Candidate> {
        self.candidates.get(cid.index())
    }

    pub fn names(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn ballots(&self) -> &[B] {
        &self.ballots
    }

    pub fn num_ballots(&self) -> usize {
        self.ballots.len()
    }

    pub fn rejected(&self) -> &[RejectedBallot] {
        &self.rejected
    }

    /// Hands the roster to a counting algorithm, with all the tallies cleared.
    pub(crate) fn start_count(&mut self) -> &mut [Candidate] {
        debug!(
            "start_count: {} candidates, {} ballots, {} seats",
            self.candidates.len(),
            self.ballots.len(),
            self.seats
        );
        for c in self.candidates.iter_mut() {
            c.reset();
        }
        &mut self.candidates
    }
}

impl<B: Interpretation> Election<B> {
    /// The kind of count that applies to this election.
    pub fn kind(&self) -> ElectionKind {
        B::KIND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn candidates_take_their_position_as_id() {
        let e: Election<RankedBallot> = Election::new(&names(&["A", "B", "C"]), 2).unwrap();
        for (idx, c) in e.candidates().iter().enumerate() {
            assert_eq!(c.id(), CandidateId(idx));
            assert_eq!(c.votes(), 0);
        }
        assert_eq!(e.names(), names(&["A", "B", "C"]));
        assert_eq!(e.kind(), ElectionKind::Stv);
    }

    #[test]
    fn empty_roster_and_zero_seats_are_refused() {
        assert_eq!(
            Election::<RankedBallot>::new(&[], 1),
            Err(ElectionError::NoCandidates)
        );
        assert_eq!(
            Election::<RankedBallot>::new(&names(&["A"]), 0),
            Err(ElectionError::NoSeats)
        );
    }

    #[test]
    fn candidate_out_of_place_is_refused() {
        let candidates = vec![
            Candidate::new("A", CandidateId(1)),
            Candidate::new("B", CandidateId(0)),
        ];
        let res = Election::<MvBallot>::from_parts(candidates, 1, vec![]);
        assert!(matches!(
            res,
            Err(ElectionError::CandidateOutOfPlace { position: 0, .. })
        ));
    }

    #[test]
    fn ballots_must_cover_the_roster() {
        let mut e: Election<MvBallot> = Election::new(&names(&["A", "B"]), 1).unwrap();
        let short = MvBallot::new(Ballot::new(BallotId(1), vec![1])).unwrap();
        assert_eq!(
            e.add_ballot(short),
            Err(ElectionError::MarkerCountMismatch {
                ballot_id: BallotId(1),
                expected: 2,
                found: 1
            })
        );
        assert_eq!(e.num_ballots(), 0);
    }

    #[test]
    fn rejected_ballots_are_kept_aside() {
        let mut e: Election<RankedBallot> =
            Election::new(&names(&["A", "B", "C", "D"]), 1).unwrap();
        let raw = Ballot::new(BallotId(4), vec![1, 0, 0, 0]);
        let err = RankedBallot::new(raw.clone()).unwrap_err();
        e.reject_ballot(raw, err.clone()).unwrap();
        assert_eq!(e.num_ballots(), 0);
        assert_eq!(e.rejected().len(), 1);
        assert_eq!(e.rejected()[0].id, BallotId(4));
        assert_eq!(e.rejected()[0].reason, err);
    }

    #[test]
    fn ballot_ids_are_used_once() {
        let mut e: Election<PluralityBallot> = Election::new(&names(&["A", "B"]), 1).unwrap();
        let ballot = |id: u32, markers: Vec<u32>| Ballot::new(BallotId(id), markers);
        e.add_ballot(PluralityBallot::new(ballot(1, vec![1, 0])).unwrap())
            .unwrap();
        assert_eq!(
            e.add_ballot(PluralityBallot::new(ballot(1, vec![0, 1])).unwrap()),
            Err(ElectionError::DuplicateBallotId {
                ballot_id: BallotId(1)
            })
        );

        let raw = ballot(2, vec![1, 1]);
        let err = PluralityBallot::new(raw.clone()).unwrap_err();
        e.reject_ballot(raw, err.clone()).unwrap();
        assert!(e.reject_ballot(ballot(1, vec![1, 1]), err).is_err());
        assert_eq!(
            e.add_ballot(PluralityBallot::new(ballot(2, vec![0, 1])).unwrap()),
            Err(ElectionError::DuplicateBallotId {
                ballot_id: BallotId(2)
            })
        );
        assert_eq!(e.num_ballots(), 1);
        assert_eq!(e.rejected().len(), 1);
    }
}
