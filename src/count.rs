use log::{debug, info, warn};

use seat_tally::builder::Builder;
use seat_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::count::config_reader::*;
use crate::count::io_common::{resolve_path, simplify_file_name};
use crate::count::io_csv::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod report;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CountError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number, found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Unknown value {value:?} for option {option}"))]
    UnknownOption { option: String, value: String },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Missing header line ({field}) in {path}"))]
    CsvMissingHeader { path: String, field: String },
    #[snafu(display("Invalid header line ({field}) in {path}: {value}"))]
    CsvInvalidHeader {
        path: String,
        field: String,
        value: String,
    },
    #[snafu(display("Line {lineno} of {path} has {found} cells for {expected} candidates"))]
    CsvLineTooLong {
        path: String,
        lineno: usize,
        found: usize,
        expected: usize,
    },
    #[snafu(display("File {path} does not match the first input file ({field})"))]
    InputMismatch { path: String, field: String },
    #[snafu(display("No input file: use --input or list cvrFiles in the configuration"))]
    NoInput {},

    #[snafu(display("Invalid election: {source}"))]
    InvalidElection { source: ElectionError },
    #[snafu(display("Counting error: {source}"))]
    Counting { source: TallyError },

    #[snafu(display("Error writing file {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },
}

pub type CountResult<T> = Result<T, CountError>;
pub type BCountResult<T> = Result<T, Box<CountError>>;

const DEFAULT_AUDIT_FILE: &str = "audit.txt";

/// Everything the reports need to know about a finished count.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tabulation {
    pub kind: ElectionKind,
    pub seats: u32,
    pub num_candidates: usize,
    pub num_valid: usize,
    pub rejected: Vec<RejectedBallot>,
    /// None when there was nothing to count.
    pub outcome: Option<TallyOutcome>,
}

impl Tabulation {
    fn new<B: Interpretation>(election: &Election<B>, outcome: Option<TallyOutcome>) -> Tabulation {
        Tabulation {
            kind: election.kind(),
            seats: election.seats(),
            num_candidates: election.candidates().len(),
            num_valid: election.num_ballots(),
            rejected: election.rejected().to_vec(),
            outcome,
        }
    }
}

fn result_stats_to_json(rs: &TallyOutcome) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers_to_json(elim_stats)
            }));
        }
        for elected_stats in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": elected_stats.name,
                "transfers": transfers_to_json(elected_stats)
            }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn transfers_to_json(stats: &TransferStats) -> JSMap<String, JSValue> {
    let mut transfers: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in stats.transfers.iter() {
        transfers.insert(name.clone(), json!(count.to_string()));
    }
    if stats.exhausted > 0 {
        transfers.insert(
            "exhausted".to_string(),
            json!(stats.exhausted.to_string()),
        );
    }
    transfers
}

fn build_summary_js(contest: &str, tab: &Tabulation) -> JSValue {
    let config = OutputConfig {
        contest: contest.to_string(),
        kind: tab.kind.to_string(),
        seats: tab.seats,
        threshold: tab
            .outcome
            .as_ref()
            .and_then(|o| o.quota)
            .map(|q| q.to_string()),
    };
    let results = tab
        .outcome
        .as_ref()
        .map(result_stats_to_json)
        .unwrap_or_default();
    json!({ "config": config, "results": results })
}

fn build_election<B: Interpretation>(parsed: &ParsedInputs) -> CountResult<Election<B>> {
    let mut builder = Builder::<B>::new(parsed.header.seats)
        .candidates(&parsed.header.names)
        .context(InvalidElectionSnafu {})?;
    for row in parsed.rows.iter() {
        builder.add_ballot(row).context(InvalidElectionSnafu {})?;
    }
    let election = builder.build().context(InvalidElectionSnafu {})?;
    info!(
        "build_election: {} valid ballots, {} rejected",
        election.num_ballots(),
        election.rejected().len()
    );
    Ok(election)
}

/// Builds the election described by the parsed files and counts it.
fn tabulate<S: Shuffler>(
    parsed: &ParsedInputs,
    rules: &StvRules,
    shuffler: &mut S,
) -> CountResult<Tabulation> {
    match parsed.header.kind {
        ElectionKind::Stv => {
            let mut election = build_election::<RankedBallot>(parsed)?;
            let outcome = if election.num_ballots() > 0 {
                Some(run_stv(&mut election, rules, shuffler).context(CountingSnafu {})?)
            } else {
                None
            };
            Ok(Tabulation::new(&election, outcome))
        }
        ElectionKind::Plurality => {
            let mut election = build_election::<PluralityBallot>(parsed)?;
            let outcome = if election.num_ballots() > 0 {
                Some(run_plurality(&mut election, shuffler).context(CountingSnafu {})?)
            } else {
                None
            };
            Ok(Tabulation::new(&election, outcome))
        }
        ElectionKind::Municipal => {
            let mut election = build_election::<MvBallot>(parsed)?;
            let outcome = if election.num_ballots() > 0 {
                Some(run_municipal(&mut election, shuffler).context(CountingSnafu {})?)
            } else {
                None
            };
            Ok(Tabulation::new(&election, outcome))
        }
    }
}

fn write_output(path: &str, contents: &str) -> CountResult<()> {
    if path == "stdout" {
        println!("{}", contents);
        Ok(())
    } else {
        info!("Writing {:?}", path);
        fs::write(path, contents).context(WritingSnafu { path })
    }
}

pub fn run_election(args: &Args) -> BCountResult<()> {
    let (config, config_root) = match &args.config {
        Some(path) => (
            read_config(path)?,
            Path::new(path).parent().map(|p| p.to_path_buf()),
        ),
        None => (CountConfig::default(), None),
    };
    let root = config_root.as_deref();

    let inputs: Vec<String> = if !args.input.is_empty() {
        args.input.clone()
    } else {
        config
            .cvr_files
            .iter()
            .flatten()
            .map(|p| resolve_path(root, p))
            .collect()
    };
    let rules = validate_rules(&config)?;
    let seed = match args.seed {
        Some(s) => Some(s),
        None => config.random_seed()?,
    };
    let shuffle = !args.no_shuffle && config.shuffle.unwrap_or(true);
    let audit_path = match (&args.audit, &config.audit_file) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(root, p),
        (None, None) => DEFAULT_AUDIT_FILE.to_string(),
    };
    debug!(
        "run_election: inputs: {:?} rules: {:?} shuffle: {} seed: {:?}",
        inputs, rules, shuffle, seed
    );

    let parsed = read_inputs(&inputs)?;
    let contest = config
        .contest_name
        .clone()
        .unwrap_or_else(|| simplify_file_name(&inputs[0]));

    let tab = match (shuffle, seed) {
        (false, _) => tabulate(&parsed, &rules, &mut KeepOrder)?,
        (true, Some(s)) => tabulate(&parsed, &rules, &mut SeededShuffler::new(s))?,
        (true, None) => tabulate(&parsed, &rules, &mut ThreadShuffler)?,
    };
    if let Some(outcome) = &tab.outcome {
        if outcome.is_underfilled(tab.seats) {
            warn!(
                "Only {} of {} seats could be filled",
                outcome.winners.len(),
                tab.seats
            );
        }
    } else {
        warn!("No valid ballots: the election is aborted");
    }

    let text = report::results_text(&tab);
    info!("{}", text);
    write_output(&audit_path, &text)?;
    println!("Audit log written to: {}", audit_path);

    // Assemble the final json
    let result_js = build_summary_js(&contest, &tab);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    if let Some(out) = &args.out {
        write_output(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return Err(Box::new(CountError::ReferenceMismatch {
                path: summary_p.clone(),
            }));
        }
        info!("The summary matches the reference {:?}", summary_p);
    }

    Ok(())
}
