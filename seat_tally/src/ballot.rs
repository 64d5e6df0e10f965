use log::debug;
use snafu::ensure;

use crate::config::*;

/// Read access to the raw markers of a ballot, shared by all the ballot kinds.
pub trait Marked {
    fn id(&self) -> BallotId;
    /// One marker per candidate, in roster order.
    fn markers(&self) -> &[u32];
}

/// A ballot kind, validated out of a raw ballot for one kind of election.
pub trait Interpretation: Marked + Sized {
    const KIND: ElectionKind;

    fn interpret(ballot: Ballot) -> Result<Self, BallotError>;
}

/// An immutable vote record, as read from the input.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    id: BallotId,
    markers: Vec<u32>,
}

impl Ballot {
    pub fn new(id: BallotId, markers: Vec<u32>) -> Ballot {
        Ballot { id, markers }
    }
}

impl Marked for Ballot {
    fn id(&self) -> BallotId {
        self.id
    }

    fn markers(&self) -> &[u32] {
        &self.markers
    }
}

/// A ballot interpreted as a ranking: a positive marker is a preference order
/// (1 is the most preferred), 0 means that the candidate is not ranked.
///
/// The ballot keeps its original markers and a working copy of the ranks.
/// Advancing zeroes the current preference in the working copy.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedBallot {
    ballot: Ballot,
    ranks: Vec<u32>,
    // Invariant: the index of the lowest positive value in ranks, None if there is none.
    current: Option<CandidateId>,
}

impl RankedBallot {
    /// Validates a ballot for a ranked count.
    ///
    /// At least half (rounded down) of the candidates must be ranked.
    pub fn new(ballot: Ballot) -> Result<RankedBallot, BallotError> {
        let ranked = ballot.markers.iter().filter(|m| **m > 0).count();
        let required = ballot.markers.len() / 2;
        ensure!(
            ranked >= required,
            InsufficientRankingsSnafu {
                ballot_id: ballot.id,
                ranked,
                required,
            }
        );
        let ranks = ballot.markers.clone();
        let current = lowest_rank(&ranks);
        Ok(RankedBallot {
            ballot,
            ranks,
            current,
        })
    }

    /// The candidate this ballot currently counts for, or None if the ballot is exhausted.
    pub fn current_preference(&self) -> Option<CandidateId> {
        self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Drops the current preference and moves on to the next one.
    /// Nothing happens on an exhausted ballot.
    pub fn advance(&mut self) {
        if let Some(cid) = self.current {
            self.ranks[cid.index()] = 0;
            self.current = lowest_rank(&self.ranks);
            debug!(
                "advance: ballot {}: {:?} -> {:?}",
                self.ballot.id, cid, self.current
            );
        }
    }

    /// The ranks that are still live.
    pub fn remaining_ranks(&self) -> &[u32] {
        &self.ranks
    }
}

impl Marked for RankedBallot {
    fn id(&self) -> BallotId {
        self.ballot.id
    }

    fn markers(&self) -> &[u32] {
        &self.ballot.markers
    }
}

impl Interpretation for RankedBallot {
    const KIND: ElectionKind = ElectionKind::Stv;

    fn interpret(ballot: Ballot) -> Result<Self, BallotError> {
        RankedBallot::new(ballot)
    }
}

// Ties between equal ranks go to the lowest index.
fn lowest_rank(ranks: &[u32]) -> Option<CandidateId> {
    ranks
        .iter()
        .enumerate()
        .filter(|(_, r)| **r > 0)
        .min_by_key(|(idx, r)| (**r, *idx))
        .map(|(idx, _)| CandidateId(idx))
}

/// A single-choice ballot: exactly one marker is 1, all the others are 0.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PluralityBallot {
    ballot: Ballot,
    choice: CandidateId,
}

impl PluralityBallot {
    pub fn new(ballot: Ballot) -> Result<PluralityBallot, BallotError> {
        check_binary(&ballot)?;
        let marked: Vec<usize> = marked_positions(&ballot.markers).collect();
        match marked.as_slice() {
            [idx] => Ok(PluralityBallot {
                choice: CandidateId(*idx),
                ballot,
            }),
            _ => NotExactlyOneChoiceSnafu {
                ballot_id: ballot.id,
                marked: marked.len(),
            }
            .fail(),
        }
    }

    pub fn choice(&self) -> CandidateId {
        self.choice
    }
}

impl Marked for PluralityBallot {
    fn id(&self) -> BallotId {
        self.ballot.id
    }

    fn markers(&self) -> &[u32] {
        &self.ballot.markers
    }
}

impl Interpretation for PluralityBallot {
    const KIND: ElectionKind = ElectionKind::Plurality;

    fn interpret(ballot: Ballot) -> Result<Self, BallotError> {
        PluralityBallot::new(ballot)
    }
}

/// A municipal voting ballot: every marker is 0 or 1, and each 1 is a vote.
/// A ballot without any mark is valid and counts for nobody.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MvBallot {
    ballot: Ballot,
    choices: Vec<CandidateId>,
}

impl MvBallot {
    pub fn new(ballot: Ballot) -> Result<MvBallot, BallotError> {
        check_binary(&ballot)?;
        let choices = marked_positions(&ballot.markers).map(CandidateId).collect();
        Ok(MvBallot { ballot, choices })
    }

    pub fn choices(&self) -> &[CandidateId] {
        &self.choices
    }
}

impl Marked for MvBallot {
    fn id(&self) -> BallotId {
        self.ballot.id
    }

    fn markers(&self) -> &[u32] {
        &self.ballot.markers
    }
}

impl Interpretation for MvBallot {
    const KIND: ElectionKind = ElectionKind::Municipal;

    fn interpret(ballot: Ballot) -> Result<Self, BallotError> {
        MvBallot::new(ballot)
    }
}

fn check_binary(ballot: &Ballot) -> Result<(), BallotError> {
    if let Some((position, value)) = ballot
        .markers
        .iter()
        .enumerate()
        .find(|(_, v)| **v > 1)
    {
        return NonBinaryMarkerSnafu {
            ballot_id: ballot.id,
            position,
            value: *value,
        }
        .fail();
    }
    Ok(())
}

fn marked_positions(markers: &[u32]) -> impl Iterator<Item = usize> + '_ {
    markers
        .iter()
        .enumerate()
        .filter_map(|(idx, m)| if *m == 1 { Some(idx) } else { None })
}
