use clap::Parser;

/// This is a raffle program: it reads a list of participants and draws the winners.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON format describing the draw.
    /// All the other options override the values found in this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The file containing the participants. It must have a header row with
    /// a 'number' column and a 'name' column. Setting this option overrides the path that
    /// may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default 5) The number of winners to draw.
    #[clap(short, long, value_parser, allow_hyphen_values = true)]
    pub winners: Option<i64>,

    /// (integer, optional) Seed for the random generator. The same seed and the same input
    /// always produce the same winners.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (default 3000) How long to wait, in milliseconds, before revealing the winners.
    #[clap(long, value_parser)]
    pub suspense_ms: Option<u64>,

    /// (list of column names) Accepted headers for the number column, in addition to the defaults.
    #[clap(long, value_parser)]
    pub number_column: Option<Vec<String>>,

    /// (list of column names) Accepted headers for the name column, in addition to the defaults.
    #[clap(long, value_parser)]
    pub name_column: Option<Vec<String>>,

    /// (single character, default ',') The field separator of the input.
    #[clap(long, value_parser)]
    pub delimiter: Option<char>,

    /// (file path, 'stdout' or empty) If specified, the summary of the draw will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of a draw in JSON format. If provided,
    /// luckydraw will check that its output matches the reference. Use it with --seed.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
