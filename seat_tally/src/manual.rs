/*!

This is the long-form manual for `seat_tally` and `seattally`.

## Input format

Ballots come in CSV files with a short header, one value per line, followed by
the candidate names and one row of markers per ballot:

```text
STV
2
3
4
A,B,C
1,2,3
1,3,2
0,1,2
2,1,0
```

The header lines are, in order:
* the kind of election: `STV`, `PV` or `MV` (case does not matter)
* the number of seats to fill
* the number of candidates
* the number of ballots. It is only informational: the ballot rows are counted.

Each ballot row has one marker per candidate, in the order of the names. An
empty cell counts as `0`. A row with more cells than candidates is an error,
and blank lines are skipped.

Several files can be counted together. They must all declare the same kind of
election, the same number of seats and the same number of candidates. The names
are taken from the first file. Ballots are numbered from 1, across all the
files, in the order they are read.

### `STV`

A positive marker is a rank (1 is the first choice), `0` leaves the candidate
unranked. A ballot must rank at least half of the candidates, rounded down.
Two candidates with the same rank are taken in roster order.

### `PV`

Plurality voting. Every marker is `0` or `1` and exactly one of them is `1`.

### `MV`

Municipal voting. Every marker is `0` or `1`, with any number of `1`. A ballot
without any mark is valid and counts for nobody.

Ballots that do not follow the rules of the election are set aside and listed
in the audit. They do not count towards the quota.

## Counting rules

### `STV`

The quota is the Droop quota, computed once from the number of valid ballots:
`floor(ballots / (seats + 1)) + 1`.

The ballots are shuffled once, then every ballot goes to its first choice. Each
round then goes as follows:
1. if there are no more continuing candidates than open seats, all of them are
   elected and the count stops.
2. the continuing candidates are checked in roster order. A candidate that
   reaches the quota is elected, and the first `votes - quota` ballots of their
   pile move to their next choice. This stops once all the seats are filled.
3. if nobody was elected in this round, the continuing candidate with the
   fewest votes is eliminated and all their ballots move to their next choice.

When several candidates have the fewest votes, the `tiebreakMode` option
decides:
* `firstReceipt` (default): the one who received a ballot first stays, and the
  one whose first ballot came last is eliminated. Candidates that never
  received a ballot are eliminated before the others.
* `useCandidateOrder`: the first one in the roster.

A ballot that moves to a candidate who is already elected or eliminated is
handled according to the `transferRule` option:
* `exhaustOnEliminated` (default): the ballot is exhausted.
* `skipToContinuing`: the ballot keeps moving until it finds a continuing
  candidate, or runs out of choices.

### `PV` and `MV`

Each mark is one vote, and the candidates with the most votes take the seats.
When several candidates are tied for the last seats, they are shuffled and the
first ones win. With the `--no-shuffle` flag, the roster order decides. When
there are at least as many seats as candidates, everyone wins.

## Configuration

`seattally` works without a configuration file. The optional configuration is a
JSON file:

```text
{
  "contestName": "Board 2024",
  "cvrFiles": ["ballots1.csv", "ballots2.csv"],
  "auditFile": "audit.txt",
  "shuffle": true,
  "randomSeed": 42,
  "tiebreakMode": "firstReceipt",
  "transferRule": "exhaustOnEliminated"
}
```

All the fields are optional. The relative paths are resolved against the
directory of the configuration file. The command line flags take precedence
over the configuration file.

When a random seed is given, the shuffles are derived from it and two runs give
the same result.

 */
