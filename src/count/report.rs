// The plain-text audit report.

use std::fmt::Write;

use crate::count::*;

/// Renders the results of a count as the audit text.
pub fn results_text(tab: &Tabulation) -> String {
    let mut s = String::new();
    // Writing to a String does not fail.
    let _ = write_results(&mut s, tab);
    s
}

fn write_results(s: &mut String, tab: &Tabulation) -> std::fmt::Result {
    writeln!(s)?;
    writeln!(s, "=== Election Results ===")?;
    writeln!(s, "Election Type: {}", tab.kind)?;
    writeln!(s)?;
    writeln!(s, "####### {} Results #######", tab.kind)?;
    writeln!(s, "Number of Invalid Ballots: {}", tab.rejected.len())?;
    if !tab.rejected.is_empty() {
        writeln!(s)?;
        writeln!(s, "=== List of Removed Ballots ===")?;
        for rb in tab.rejected.iter() {
            let markers: Vec<String> = rb.markers.iter().map(|m| m.to_string()).collect();
            writeln!(s, "ID {}: {}", rb.id, markers.join(" "))?;
        }
        writeln!(s)?;
    }
    writeln!(s, "Number of Valid Ballots: {}", tab.num_valid)?;
    writeln!(s, "Number of Seats: {}", tab.seats)?;
    writeln!(s, "Number of Candidates: {}", tab.num_candidates)?;

    let outcome = match &tab.outcome {
        Some(o) if tab.num_valid > 0 => o,
        _ => {
            writeln!(s)?;
            writeln!(s, "ERROR: Election aborted. No valid ballots to process.")?;
            return Ok(());
        }
    };

    if let Some(quota) = outcome.quota {
        writeln!(s, "Droop Quota: {} votes", quota)?;
    }

    writeln!(s)?;
    writeln!(s, "Winners:")?;
    for c in outcome.winners.iter() {
        write!(
            s,
            "  {} | Votes: {} | Percentage: {:.2}%",
            c.name(),
            c.votes(),
            percentage(c.votes(), tab.num_valid)
        )?;
        if let Some(quota) = outcome.quota {
            let met = if c.votes() >= quota { "Yes" } else { "No" };
            write!(s, " | Met Quota: {}", met)?;
        }
        writeln!(s)?;
    }

    writeln!(s)?;
    writeln!(s, "Losers:")?;
    for c in outcome.losers.iter() {
        writeln!(
            s,
            "  {} | Votes: {} | Percentage: {:.2}%",
            c.name(),
            c.votes(),
            percentage(c.votes(), tab.num_valid)
        )?;
    }

    writeln!(s)?;
    writeln!(s, "=== End of Results ===")?;
    Ok(())
}

fn percentage(votes: u64, num_valid: usize) -> f64 {
    (votes as f64) / (num_valid as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabulation(kind: ElectionKind, outcome: Option<TallyOutcome>, num_valid: usize) -> Tabulation {
        Tabulation {
            kind,
            seats: 1,
            num_candidates: 2,
            num_valid,
            rejected: vec![RejectedBallot {
                id: BallotId(2),
                markers: vec![1, 1],
                reason: BallotError::NotExactlyOneChoice {
                    ballot_id: BallotId(2),
                    marked: 2,
                },
            }],
            outcome,
        }
    }

    #[test]
    fn aborted_without_valid_ballots() {
        let text = results_text(&tabulation(ElectionKind::Plurality, None, 0));
        assert!(text.contains("Election Type: PV"));
        assert!(text.contains("Number of Invalid Ballots: 1"));
        assert!(text.contains("ID 2: 1 1"));
        assert!(text.contains("ERROR: Election aborted. No valid ballots to process."));
        assert!(!text.contains("Winners:"));
    }

    #[test]
    fn stv_report_shows_the_quota() {
        let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let mut election: Election<RankedBallot> = Election::new(&names, 1).unwrap();
        let rows = [vec![1, 2, 0], vec![1, 2, 0], vec![2, 1, 0], vec![2, 0, 1]];
        for (idx, row) in rows.iter().enumerate() {
            let b = RankedBallot::new(Ballot::new(BallotId(idx as u32 + 1), row.clone())).unwrap();
            election.add_ballot(b).unwrap();
        }
        // B and C are tied with one vote: C received its first ballot last and goes.
        let outcome = run_stv(&mut election, &StvRules::DEFAULT_RULES, &mut KeepOrder).unwrap();
        let text = results_text(&tabulation(ElectionKind::Stv, Some(outcome), 4));
        assert!(text.contains("Droop Quota: 3 votes"));
        assert!(text.contains("  A | Votes: 3 | Percentage: 75.00% | Met Quota: Yes\n"));
        assert!(text.contains("  C | Votes: 1 | Percentage: 25.00%\n"));
        assert!(!text.contains("  B |"));
        assert!(text.ends_with("=== End of Results ===\n"));
    }
}
