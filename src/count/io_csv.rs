// Primitives for reading CSV ballot files.

use std::fs::File;

use csv::StringRecord;

use crate::count::{io_common::parse_marker, *};

/// The header that starts every ballot file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CsvHeader {
    pub kind: ElectionKind,
    pub seats: u32,
    pub names: Vec<String>,
    /// Informational only: the rows are what counts.
    pub declared_ballots: usize,
}

/// The content of one or several ballot files, with one row of markers per
/// ballot, padded to the number of candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedInputs {
    pub header: CsvHeader,
    pub rows: Vec<Vec<u32>>,
}

pub fn read_csv_ballots(path: &str) -> CountResult<ParsedInputs> {
    info!("Attempting to read ballot file {:?}", path);
    let mut records = get_records(path)?;

    let kind_s = next_header_line(&mut records, path, "election kind", 1)?;
    let kind: ElectionKind = kind_s.parse().context(InvalidElectionSnafu {})?;
    let seats: u32 = parse_header_number(&mut records, path, "seats", 2)?;
    let num_candidates: usize =
        parse_header_number(&mut records, path, "number of candidates", 3)?;
    let declared_ballots: usize = parse_header_number(&mut records, path, "number of ballots", 4)?;

    let names_rec = next_header_record(&mut records, path, "candidate names", 5)?;
    let names: Vec<String> = names_rec.iter().map(|s| s.to_string()).collect();
    ensure!(
        names.len() == num_candidates,
        CsvInvalidHeaderSnafu {
            path,
            field: "candidate names",
            value: format!("{} names for {} candidates", names.len(), num_candidates),
        }
    );
    let header = CsvHeader {
        kind,
        seats,
        names,
        declared_ballots,
    };
    debug!("read_csv_ballots: {:?} header: {:?}", path, header);

    let mut rows: Vec<Vec<u32>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let line = line_r.context(CsvLineParseSnafu {
            path,
            lineno: idx + 6,
        })?;
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 6);
        if is_blank(&line) {
            continue;
        }
        ensure!(
            line.len() <= num_candidates,
            CsvLineTooLongSnafu {
                path,
                lineno,
                found: line.len(),
                expected: num_candidates,
            }
        );
        let mut markers: Vec<u32> = line.iter().map(parse_marker).collect();
        markers.resize(num_candidates, 0);
        debug!("read_csv_ballots: lineno: {:?} row: {:?}", lineno, markers);
        rows.push(markers);
    }
    if rows.len() != header.declared_ballots {
        warn!(
            "read_csv_ballots: {:?} declares {} ballots but contains {}",
            path,
            header.declared_ballots,
            rows.len()
        );
    }
    Ok(ParsedInputs { header, rows })
}

/// Reads several ballot files as one election. The ballots are kept in
/// reading order. The candidate names come from the first file.
pub fn read_inputs(paths: &[String]) -> CountResult<ParsedInputs> {
    let (first_path, rest) = paths.split_first().context(NoInputSnafu {})?;
    let mut res = read_csv_ballots(first_path)?;
    for path in rest {
        let other = read_csv_ballots(path)?;
        ensure!(
            other.header.kind == res.header.kind,
            InputMismatchSnafu {
                path,
                field: "election kind"
            }
        );
        ensure!(
            other.header.seats == res.header.seats,
            InputMismatchSnafu {
                path,
                field: "seats"
            }
        );
        ensure!(
            other.header.names.len() == res.header.names.len(),
            InputMismatchSnafu {
                path,
                field: "number of candidates"
            }
        );
        if other.header.names != res.header.names {
            warn!(
                "read_inputs: {:?} names the candidates {:?}, using {:?}",
                path, other.header.names, res.header.names
            );
        }
        res.header.declared_ballots += other.header.declared_ballots;
        res.rows.extend(other.rows);
    }
    Ok(res)
}

fn get_records(path: &str) -> CountResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}

fn next_header_record(
    records: &mut csv::StringRecordsIntoIter<File>,
    path: &str,
    field: &str,
    lineno: usize,
) -> CountResult<StringRecord> {
    records
        .next()
        .context(CsvMissingHeaderSnafu { path, field })?
        .context(CsvLineParseSnafu { path, lineno })
}

// Header lines hold a single value.
fn next_header_line(
    records: &mut csv::StringRecordsIntoIter<File>,
    path: &str,
    field: &str,
    lineno: usize,
) -> CountResult<String> {
    let line = next_header_record(records, path, field, lineno)?;
    Ok(line.get(0).unwrap_or("").to_string())
}

fn parse_header_number<T: std::str::FromStr>(
    records: &mut csv::StringRecordsIntoIter<File>,
    path: &str,
    field: &str,
    lineno: usize,
) -> CountResult<T> {
    let value = next_header_line(records, path, field, lineno)?;
    value
        .parse::<T>()
        .ok()
        .context(CsvInvalidHeaderSnafu { path, field, value })
}

fn is_blank(line: &StringRecord) -> bool {
    line.iter().all(|s| s.is_empty()) && line.len() <= 1
}
