// ********* Identifiers ***********

use snafu::Snafu;
use std::fmt::Display;
use std::str::FromStr;

use crate::candidate::Candidate;

/// Position of a candidate in the roster. It doubles as the index of the
/// candidate's marker on every ballot.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub usize);

impl CandidateId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identifier of a ballot, assigned by the loader.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct BallotId(pub u32);

impl Display for BallotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ********* Election kinds **********

/// The tallying rule of an election.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ElectionKind {
    /// Single transferable vote over ranked ballots.
    Stv,
    /// One mark per ballot, highest counts win.
    Plurality,
    /// Municipal voting: any number of marks per ballot, highest counts win.
    Municipal,
}

impl FromStr for ElectionKind {
    type Err = ElectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STV" => Ok(ElectionKind::Stv),
            "PV" => Ok(ElectionKind::Plurality),
            "MV" => Ok(ElectionKind::Municipal),
            _ => UnknownKindSnafu { token: s.trim() }.fail(),
        }
    }
}

impl Display for ElectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ElectionKind::Stv => "STV",
            ElectionKind::Plurality => "PV",
            ElectionKind::Municipal => "MV",
        };
        write!(f, "{}", s)
    }
}

// ******** Output data structures *********

/// Where the ballots of one candidate went when they were transferred.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub name: String,
    pub transfers: Vec<(String, u64)>,
    pub exhausted: u64,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// Vote counts at the start of the round, for all candidates still in the count
    /// and the ones elected earlier.
    pub tally: Vec<(String, u64)>,
    pub tally_results_elected: Vec<TransferStats>,
    pub tally_result_eliminated: Vec<TransferStats>,
}

/// The result of a count.
///
/// Winners are in the order in which they were elected, losers in the order
/// in which they were eliminated. A candidate may be in neither list when all
/// the seats were filled before it was eliminated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyOutcome {
    pub winners: Vec<Candidate>,
    pub losers: Vec<Candidate>,
    /// The Droop quota, for STV counts only.
    pub quota: Option<u64>,
    pub round_stats: Vec<RoundStats>,
}

impl TallyOutcome {
    /// True when fewer candidates were elected than there are seats.
    pub fn is_underfilled(&self, seats: u32) -> bool {
        self.winners.len() < seats as usize
    }
}

// ******** Errors *********

/// A ballot that cannot be accepted for the election it was cast in.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BallotError {
    #[snafu(display(
        "Invalid STV ballot {ballot_id}: only {ranked} candidates ranked (minimum {required} required)"
    ))]
    InsufficientRankings {
        ballot_id: BallotId,
        ranked: usize,
        required: usize,
    },
    #[snafu(display(
        "Invalid ballot {ballot_id}: marker {value} at position {position} is neither 0 nor 1"
    ))]
    NonBinaryMarker {
        ballot_id: BallotId,
        position: usize,
        value: u32,
    },
    #[snafu(display("Invalid plurality ballot {ballot_id}: exactly one '1' is required, found {marked}"))]
    NotExactlyOneChoice { ballot_id: BallotId, marked: usize },
}

/// Violations of the invariants of a candidate record.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CandidateError {
    #[snafu(display("Candidate {name} cannot be a loser and a winner at the same time"))]
    WinnerAndLoser { name: String },
    #[snafu(display("The votes of candidate {name} cannot be decremented (increment {increment})"))]
    NegativeIncrement { name: String, increment: i64 },
}

/// Errors in the shape of an election, detected before any counting happens.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ElectionError {
    #[snafu(display("An election needs at least one candidate"))]
    NoCandidates,
    #[snafu(display("An election needs at least one seat"))]
    NoSeats,
    #[snafu(display("Candidate {name} has id {id} but sits at position {position} in the roster"))]
    CandidateOutOfPlace {
        name: String,
        id: usize,
        position: usize,
    },
    #[snafu(display("Ballot {ballot_id} has {found} markers, expected {expected}"))]
    MarkerCountMismatch {
        ballot_id: BallotId,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Ballot id {ballot_id} is used more than once"))]
    DuplicateBallotId { ballot_id: BallotId },
    #[snafu(display("Unknown election type {token:?} (expected STV, PV or MV)"))]
    UnknownKind { token: String },
}

/// Errors that prevent a count from completing.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("Candidate invariant violated during the count: {source}"))]
    CandidateInvariant { source: CandidateError },
    #[snafu(display("The election cannot be counted: {source}"))]
    InvalidElection { source: ElectionError },
}

// ********* Configuration **********

/// How ties for the last place are broken when a candidate must be eliminated.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// The tied candidate whose first ballot arrived earliest stays: the one
    /// that received its first ballot last is eliminated. Candidates that
    /// never received a ballot go before all the others, and the roster order
    /// decides what is left.
    FirstReceipt,
    /// Eliminate the tied candidate that comes first in the roster.
    UseCandidateOrder,
}

/// What happens to a transferred ballot whose next preference is a candidate
/// that is no longer in the count.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TransferRule {
    /// The ballot is exhausted.
    ExhaustOnEliminated,
    /// The ballot keeps advancing until it reaches a continuing candidate.
    SkipToContinuing,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StvRules {
    pub tiebreak_mode: TieBreakMode,
    pub transfer_rule: TransferRule,
}

impl StvRules {
    pub const DEFAULT_RULES: StvRules = StvRules {
        tiebreak_mode: TieBreakMode::FirstReceipt,
        transfer_rule: TransferRule::ExhaustOnEliminated,
    };
}

impl Default for StvRules {
    fn default() -> Self {
        StvRules::DEFAULT_RULES
    }
}
