use snafu::ensure;

use crate::config::*;

/// The tally record of a candidate.
///
/// The winner and loser flags are mutually exclusive and the vote count never
/// goes down. Mutators that would break one of these rules fail and leave the
/// record untouched.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    name: String,
    id: CandidateId,
    votes: u64,
    winner: bool,
    loser: bool,
}

impl Candidate {
    pub fn new(name: &str, id: CandidateId) -> Candidate {
        Candidate {
            name: name.to_string(),
            id,
            votes: 0,
            winner: false,
            loser: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> CandidateId {
        self.id
    }

    pub fn votes(&self) -> u64 {
        self.votes
    }

    pub fn is_winner(&self) -> bool {
        self.winner
    }

    pub fn is_loser(&self) -> bool {
        self.loser
    }

    /// Adds votes to the candidate. Negative increments are rejected.
    pub fn update_votes(&mut self, increment: i64) -> Result<(), CandidateError> {
        ensure!(
            increment >= 0,
            NegativeIncrementSnafu {
                name: self.name.clone(),
                increment,
            }
        );
        self.votes += increment as u64;
        Ok(())
    }

    pub fn set_winner(&mut self, winner: bool) -> Result<(), CandidateError> {
        ensure!(
            !(winner && self.loser),
            WinnerAndLoserSnafu {
                name: self.name.clone()
            }
        );
        self.winner = winner;
        Ok(())
    }

    pub fn set_loser(&mut self, loser: bool) -> Result<(), CandidateError> {
        ensure!(
            !(loser && self.winner),
            WinnerAndLoserSnafu {
                name: self.name.clone()
            }
        );
        self.loser = loser;
        Ok(())
    }

    /// Puts the record back to its initial state, before a new count.
    pub(crate) fn reset(&mut self) {
        self.votes = 0;
        self.winner = false;
        self.loser = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_only_go_up() {
        let mut c = Candidate::new("Anna", CandidateId(0));
        c.update_votes(3).unwrap();
        c.update_votes(0).unwrap();
        assert_eq!(c.votes(), 3);
        assert_eq!(
            c.update_votes(-1),
            Err(CandidateError::NegativeIncrement {
                name: "Anna".to_string(),
                increment: -1
            })
        );
        assert_eq!(c.votes(), 3);
    }

    #[test]
    fn loser_cannot_become_winner() {
        let mut c = Candidate::new("Bob", CandidateId(1));
        c.set_loser(true).unwrap();
        assert!(c.set_winner(true).is_err());
        assert!(c.is_loser());
        assert!(!c.is_winner());
    }

    #[test]
    fn winner_cannot_become_loser() {
        let mut c = Candidate::new("Clara", CandidateId(2));
        c.set_winner(true).unwrap();
        assert!(c.set_loser(true).is_err());
        assert!(c.is_winner());
        assert!(!c.is_loser());
        // Clearing a flag is always allowed.
        c.set_loser(false).unwrap();
        c.set_winner(false).unwrap();
        c.set_loser(true).unwrap();
        assert!(c.is_loser());
    }
}
