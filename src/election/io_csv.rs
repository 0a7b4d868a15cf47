// Primitives for reading CSV files.

use std::io::Read;
use std::path::Path;

use crate::election::*;

pub fn read_csv_ranking(path: String, cfs: &FileSource) -> TidemanResult<Vec<ParsedBallot>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    parse_csv_ranking(rdr, &simplify_file_name(&path), cfs)
}

pub fn parse_csv_ranking<R: Read>(
    rdr: csv::Reader<R>,
    source_name: &str,
    cfs: &FileSource,
) -> TidemanResult<Vec<ParsedBallot>> {
    let first_row = cfs.first_vote_row_index()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate().skip(first_row) {
        // Line numbers start at 1
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("parse_csv_ranking: lineno: {:?} line: {:?}", lineno, line);

        let count: Option<u64> = match count_idx_o {
            Some(count_idx) => {
                let s = line
                    .get(count_idx)
                    .context(CsvLineTooShortSnafu { lineno })?
                    .trim();
                let c = s
                    .parse::<u64>()
                    .ok()
                    .context(InvalidCountSnafu { lineno, content: s })?;
                Some(c)
            }
            None => None,
        };

        let choices: Vec<String> = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != count_idx_o)
            .map(|(_, s)| s.trim())
            // Empty cells do not rank anybody.
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        // Completely empty lines are not ballots.
        if choices.is_empty() && count.is_none() {
            debug!("parse_csv_ranking: lineno: {:?}: skipping empty line", lineno);
            continue;
        }

        res.push(ParsedBallot {
            id: Some(format!("{}-{:08}", source_name, lineno)),
            count,
            choices,
        });
    }
    Ok(res)
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
