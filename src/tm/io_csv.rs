// Primitives for reading CSV files.

use crate::tm::{io_common::assemble_table, *};

/// The separators tried when the delimiter is not given, in order of preference.
const CANDIDATE_DELIMITERS: &[u8] = &[b'\t', b';', b',', b'|'];

const SNIFF_LINES: usize = 10;

pub fn read_csv_table(path: &str, delimiter: Option<u8>) -> TmResult<TargetTable> {
    let bytes = fs::read(path).context(OpeningCsvSnafu { path })?;
    let contents = decode_contents(bytes);
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(contents));
    debug!(
        "read_csv_table: path: {:?} delimiter: {:?}",
        path, delimiter as char
    );
    parse_csv_table(contents, delimiter)
}

/// The content as UTF-8. Files that are not valid UTF-8 are read as Windows-1252,
/// the encoding of most CSV exports from Excel.
pub fn decode_contents(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            debug!("decode_contents: not UTF-8, read as Windows-1252");
            decoded.into_owned()
        }
    }
}

pub fn parse_csv_table(contents: &str, delimiter: u8) -> TmResult<TargetTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<Cell> = line
            .iter()
            .map(|s| {
                if s.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.to_string())
                }
            })
            .collect();
        debug!("parse_csv_table: lineno: {:?} row: {:?}", lineno, &row);
        rows.push(row);
    }
    Ok(assemble_table(rows))
}

/// Finds the most likely field delimiter from the first lines of the content.
///
/// A delimiter must split the first line in more than one field. Among these, the one that
/// gives the same number of fields on the most lines wins, weighted by the number of fields.
pub fn sniff_delimiter(contents: &str) -> u8 {
    let sample_lines: Vec<&str> = contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = b',';
    let mut best_score = 0u64;
    for &delim in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }
    best
}
