use log::{debug, info, warn};

use ranked_pairs::builder::Builder;
use ranked_pairs::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;

mod config_reader;
mod io_csv;
mod io_prompt;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum TidemanError {
    #[snafu(display("Usage: tideman [candidate ...]"))]
    NoCandidates {},
    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },

    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},
    #[snafu(display("Unknown ballot provider {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Unknown rule for invalid ballots {rule:?}"))]
    UnknownRule { rule: String },

    #[snafu(display("Error opening file {path}: {source}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line: {source}"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno}: the line is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: {content:?} is not a valid ballot count"))]
    InvalidCount { lineno: usize, content: String },

    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook does not contain the worksheet {name:?}"))]
    MissingWorksheet { name: String },
    #[snafu(display("The workbook has {count} worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { count: usize },
    #[snafu(display("Line {lineno}: unexpected cell content {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },

    #[snafu(display("Error reading the ballots: {source}"))]
    ReadingInput { source: io::Error },
    #[snafu(display("Error writing the prompt: {source}"))]
    WritingPrompt { source: io::Error },
    #[snafu(display("The input ended before all the ballots were read"))]
    UnexpectedEndOfInput {},
    #[snafu(display("Error writing {path}: {source}"))]
    WritingOutput { source: io::Error, path: String },

    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TidemanResult<T> = Result<T, TidemanError>;

// Process exit codes.
pub const EXIT_USAGE: i32 = 1;
pub const EXIT_CAPACITY: i32 = 2;
pub const EXIT_INVALID_VOTE: i32 = 3;

pub fn exit_code(e: &TidemanError) -> i32 {
    match e {
        TidemanError::Voting {
            source: VotingErrors::TooManyCandidates { .. },
        } => EXIT_CAPACITY,
        TidemanError::Voting { source } if source.kind() == ErrorKind::InvalidVote => {
            EXIT_INVALID_VOTE
        }
        _ => EXIT_USAGE,
    }
}

/// A ballot, as parsed by the readers.
/// This is before checking the names against the candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

/// Where the ballots come from.
#[derive(Eq, PartialEq, Debug, Clone)]
enum BallotInput {
    Prompt,
    Files {
        root_path: PathBuf,
        sources: Vec<FileSource>,
    },
}

fn validate_rules(rules: &Option<ElectionRules>, args: &Args) -> TidemanResult<VoteRules> {
    let mut res = VoteRules::DEFAULT_RULES;
    if let Some(r) = rules {
        if let Some(max) = r.max_candidates {
            res.max_candidates = max;
        }
        res.invalid_ballot_mode = match r.invalid_ballot_rule.as_deref() {
            None | Some("abortElection") => InvalidBallotMode::AbortElection,
            Some("skipBallot") => InvalidBallotMode::SkipBallot,
            Some(x) => {
                return UnknownRuleSnafu { rule: x }.fail();
            }
        };
    }
    if let Some(max) = args.max_candidates {
        res.max_candidates = max;
    }
    if args.skip_invalid_ballots {
        res.invalid_ballot_mode = InvalidBallotMode::SkipBallot;
    }
    Ok(res)
}

fn ballot_input(args: &Args, config: &Option<(ElectionConfig, PathBuf)>) -> TidemanResult<BallotInput> {
    let input_type = args.input_type.as_deref();
    if let Some(input) = args.input.clone() {
        let provider = input_type.unwrap_or("csv");
        if provider == "prompt" {
            whatever!("Input file {} cannot be used with the prompt input type", input);
        }
        return Ok(BallotInput::Files {
            root_path: PathBuf::new(),
            sources: vec![FileSource::from_path(
                provider,
                &input,
                args.excel_worksheet_name.clone(),
            )],
        });
    }
    match (input_type, config) {
        (None | Some("prompt"), None) => Ok(BallotInput::Prompt),
        (Some("prompt"), Some(_)) => Ok(BallotInput::Prompt),
        (None, Some((c, _))) if c.ballot_sources.is_empty() => Ok(BallotInput::Prompt),
        (None, Some((c, root_path))) => Ok(BallotInput::Files {
            root_path: root_path.clone(),
            sources: c.ballot_sources.clone(),
        }),
        (Some(x), _) => whatever!("Input type {} requires an input file (--input)", x),
    }
}

fn read_ranking_data(root_path: &Path, cfs: &FileSource) -> TidemanResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(p2, cfs),
        "xlsx" => io_xlsx::read_xlsx_ranking(p2, cfs),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

fn add_parsed_ballots(builder: &mut Builder, ballots: &[ParsedBallot]) -> TidemanResult<()> {
    for pb in ballots.iter() {
        debug!("Choices for ballot {:?}: {:?}", pb.id, pb.choices);
        // Default of 1 if not specified
        let count = pb.count.unwrap_or(1);
        builder.add_vote(&pb.choices, count).context(VotingSnafu)?;
    }
    Ok(())
}

fn build_summary_js(settings: &Option<OutputSettings>, rv: &VotingResult) -> JSValue {
    let c = match settings {
        Some(s) => OutputConfig {
            contest: s.contest_name.clone(),
            date: s.contest_date.clone(),
            jurisdiction: s.contest_jurisdiction.clone(),
            office: s.contest_office.clone(),
        },
        None => OutputConfig {
            contest: "Tideman election".to_string(),
            date: None,
            jurisdiction: None,
            office: None,
        },
    };

    let mut preferences: JSMap<String, JSValue> = JSMap::new();
    for (name, row) in rv.preferences.iter() {
        let mut counts: JSMap<String, JSValue> = JSMap::new();
        for (other, count) in row.iter() {
            counts.insert(other.clone(), json!(count.to_string()));
        }
        preferences.insert(name.clone(), JSValue::Object(counts));
    }

    let pairs: Vec<JSValue> = rv
        .pairs
        .iter()
        .map(|p| {
            json!({
                "winner": p.winner,
                "loser": p.loser,
                "votesFor": p.votes_for.to_string(),
                "votesAgainst": p.votes_against.to_string(),
                "margin": p.margin.to_string(),
                "locked": p.locked,
            })
        })
        .collect();

    json!({
        "config": c,
        "results": {
            "ballots": rv.num_ballots.to_string(),
            "skippedBallots": rv.skipped_ballots.to_string(),
            "preferences": preferences,
            "pairs": pairs,
            "winners": rv.winners,
        }
    })
}

fn write_summary(out: &str, pretty_js: &str) -> TidemanResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> TidemanResult<()> {
    let summary_ref = read_summary(reference_path.to_string())?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

/// Runs a complete election as described by the command line arguments.
pub fn run_election(args: &Args) -> TidemanResult<VotingResult> {
    let config: Option<(ElectionConfig, PathBuf)> = match args.config.clone() {
        Some(config_path) => {
            let config = read_config(&config_path)?;
            info!("config: {:?}", config);
            let root_p = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            Some((config, root_p))
        }
        None => None,
    };

    let candidates: Vec<String> = if !args.candidates.is_empty() {
        args.candidates.clone()
    } else if let Some((c, _)) = &config {
        c.candidates.iter().map(|c| c.name.clone()).collect()
    } else {
        Vec::new()
    };
    ensure!(!candidates.is_empty(), NoCandidatesSnafu {});

    let rules = validate_rules(&config.as_ref().and_then(|(c, _)| c.rules.clone()), args)?;
    info!("rules: {:?}", rules);

    // The candidates are checked before any ballot is read.
    let mut builder = Builder::new(&rules)
        .and_then(|b| b.candidates(&candidates))
        .context(VotingSnafu)?;

    match ballot_input(args, &config)? {
        BallotInput::Prompt => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            io_prompt::read_prompt_ballots(&mut stdin.lock(), &mut stdout.lock(), &mut builder)?;
        }
        BallotInput::Files { root_path, sources } => {
            for cfs in sources.iter() {
                let ballots = read_ranking_data(&root_path, cfs)?;
                add_parsed_ballots(&mut builder, &ballots)?;
            }
        }
    }

    let result = builder.tabulate().context(VotingSnafu)?;
    info!("result: {:?}", result);

    if args.out.is_some() || args.reference.is_some() {
        let settings = config.as_ref().and_then(|(c, _)| c.output_settings.clone());
        let result_js = build_summary_js(&settings, &result);
        let pretty_js_stats =
            serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
        if let Some(out) = &args.out {
            write_summary(out, &pretty_js_stats)?;
        }
        // The reference summary, if provided for comparison
        if let Some(reference) = &args.reference {
            check_reference(reference, &pretty_js_stats)?;
        }
    }

    Ok(result)
}
