use clap::Parser;

/// This is a ranked pairs (Tideman) election program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// The names of the candidates, in order. If provided, they replace the candidates listed
    /// in the election configuration.
    #[clap(value_parser)]
    pub candidates: Vec<String>,

    /// (file path, optional) The file containing the election description in JSON format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, tideman will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the ballots. Setting this option overrides the ballot sources
    /// that may be specified with the --config option. If neither is given, the ballots are asked for interactively.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv, xlsx or prompt) The type of the input. Defaults to csv when an input file is given, prompt otherwise.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 9) The maximum number of candidates.
    #[clap(long, value_parser)]
    pub max_candidates: Option<usize>,

    /// If passed as an argument, invalid ballots are skipped instead of stopping the election.
    #[clap(long, takes_value = false)]
    pub skip_invalid_ballots: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
