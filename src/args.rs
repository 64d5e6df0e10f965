use clap::Parser;

/// This is a seat-based election tabulation program (STV, plurality and municipal voting).
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, repeatable) A CSV file containing ballots. All the files are counted together.
    /// Setting this option overrides the files that may be listed with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path, optional) A JSON file with the options of the election.
    /// For more information about the file format, read the manual of the seat_tally library.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default audit.txt) Where to write the audit report.
    #[clap(short, long, value_parser)]
    pub audit: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, seattally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, the ballots are counted in the order they are read and ties
    /// between candidates are broken by roster order.
    #[clap(long, takes_value = false)]
    pub no_shuffle: bool,

    /// (number) Seed for the shuffles. Two runs with the same seed give the same result.
    #[clap(long, value_parser)]
    pub seed: Option<u32>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
