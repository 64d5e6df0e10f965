/*!
Seat-based election counting.

Three kinds of elections are supported, all over the same raw ballots (one
numeric marker per candidate, in roster order):
* `STV` single transferable vote with a Droop quota, over ranked ballots
* `PV` plurality: one mark per ballot
* `MV` municipal voting: any number of marks per ballot

```
use seat_tally::builder::Builder;
use seat_tally::{run_stv, KeepOrder, RankedBallot, StvRules};

let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
let mut builder = Builder::<RankedBallot>::new(2).candidates(&names)?;
builder.add_ballot(&[1, 2, 0])?;
builder.add_ballot(&[1, 0, 2])?;
builder.add_ballot(&[0, 2, 1])?;
let mut election = builder.build()?;

let outcome = run_stv(&mut election, &StvRules::DEFAULT_RULES, &mut KeepOrder)?;
assert_eq!(outcome.winners.len(), 2);
# Ok::<(), Box<dyn std::error::Error>>(())
```

See the [manual] for the details of the rules.
*/

mod ballot;
pub mod builder;
mod candidate;
mod config;
mod election;
pub mod manual;
mod plurality;
mod shuffle;
mod stv;

pub use crate::ballot::*;
pub use crate::candidate::Candidate;
pub use crate::config::*;
pub use crate::election::{Election, RejectedBallot};
pub use crate::plurality::{run_municipal, run_plurality};
pub use crate::shuffle::{KeepOrder, SeededShuffler, Shuffler, ThreadShuffler};
pub use crate::stv::{droop_quota, run_stv};
