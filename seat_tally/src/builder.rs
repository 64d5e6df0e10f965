use crate::ballot::*;
use crate::config::*;
use crate::election::Election;

/// A builder for assembling an election out of raw ballot rows.
///
/// Ballots get sequential ids starting at 1, in the order they are added.
/// Rows that do not make a valid ballot for the kind of election are kept
/// aside as rejected ballots; they still consume an id.
///
/// ```
/// use seat_tally::builder::Builder;
/// use seat_tally::{ElectionError, RankedBallot};
///
/// let mut builder = Builder::<RankedBallot>::new(1)
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_ballot(&[1, 2])?;
/// builder.add_ballot(&[0, 1])?;
/// let election = builder.build()?;
/// assert_eq!(election.num_ballots(), 2);
///
/// # Ok::<(), ElectionError>(())
/// ```
pub struct Builder<B> {
    seats: u32,
    election: Option<Election<B>>,
    next_id: u32,
}

impl<B: Interpretation> Builder<B> {
    pub fn new(seats: u32) -> Builder<B> {
        Builder {
            seats,
            election: None,
            next_id: 1,
        }
    }

    /// Sets the candidate roster. Any ballot added before is dropped.
    pub fn candidates(self, names: &[String]) -> Result<Builder<B>, ElectionError> {
        Ok(Builder {
            seats: self.seats,
            election: Some(Election::new(names, self.seats)?),
            next_id: 1,
        })
    }

    /// Adds a row of markers, one per candidate.
    ///
    /// Returns the id given to the ballot. An error is only returned when the
    /// row does not fit the roster; an invalid ballot is recorded as rejected.
    pub fn add_ballot(&mut self, markers: &[u32]) -> Result<BallotId, ElectionError> {
        let election = match self.election.as_mut() {
            Some(e) => e,
            None => return NoCandidatesSnafu.fail(),
        };
        let id = BallotId(self.next_id);
        let ballot = Ballot::new(id, markers.to_vec());
        if markers.len() != election.candidates().len() {
            return MarkerCountMismatchSnafu {
                ballot_id: id,
                expected: election.candidates().len(),
                found: markers.len(),
            }
            .fail();
        }
        self.next_id += 1;
        match B::interpret(ballot.clone()) {
            Ok(b) => election.add_ballot(b)?,
            Err(reason) => election.reject_ballot(ballot, reason)?,
        }
        Ok(id)
    }

    pub fn build(self) -> Result<Election<B>, ElectionError> {
        match self.election {
            Some(e) => Ok(e),
            None => NoCandidatesSnafu.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ids_are_sequential_and_include_rejected() {
        let mut b = Builder::<RankedBallot>::new(1)
            .candidates(&roster(&["A", "B", "C", "D"]))
            .unwrap();
        assert_eq!(b.add_ballot(&[1, 2, 0, 0]), Ok(BallotId(1)));
        assert_eq!(b.add_ballot(&[1, 0, 0, 0]), Ok(BallotId(2)));
        assert_eq!(b.add_ballot(&[0, 0, 2, 1]), Ok(BallotId(3)));
        let e = b.build().unwrap();
        assert_eq!(e.num_ballots(), 2);
        assert_eq!(e.rejected().len(), 1);
        assert_eq!(e.rejected()[0].id, BallotId(2));
        assert_eq!(e.ballots()[1].id(), BallotId(3));
    }

    #[test]
    fn roster_is_needed_first() {
        let mut b = Builder::<MvBallot>::new(1);
        assert_eq!(b.add_ballot(&[1]), Err(ElectionError::NoCandidates));
        assert_eq!(b.build(), Err(ElectionError::NoCandidates));
    }

    #[test]
    fn wrong_row_length_does_not_use_an_id() {
        let mut b = Builder::<PluralityBallot>::new(1)
            .candidates(&roster(&["A", "B"]))
            .unwrap();
        assert!(matches!(
            b.add_ballot(&[1]),
            Err(ElectionError::MarkerCountMismatch { found: 1, .. })
        ));
        assert_eq!(b.add_ballot(&[0, 1]), Ok(BallotId(1)));
        let e = b.build().unwrap();
        assert_eq!(e.kind(), ElectionKind::Plurality);
        assert_eq!(e.ballots()[0].choice(), CandidateId(1));
    }
}
