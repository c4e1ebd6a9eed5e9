/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub input: std::path::PathBuf,
    pub output: std::path::PathBuf,
    pub threads: Option<usize>,
    pub short_window: usize,
    pub long_window: usize,
    pub discover: bool,
    pub local_time: bool,
    pub check: bool,
}

/// Command-line arguments parser using Clap.
///
/// Supports the data and export directories, threading, moving-average windows,
/// the layout source and an optional read-back check.
impl Args {
    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Args {
            input: matches
                .get_one::<String>("input")
                .map(std::path::PathBuf::from)
                .unwrap_or_default(),
            output: matches
                .get_one::<String>("output")
                .map(std::path::PathBuf::from)
                .unwrap_or_default(),
            threads: matches.get_one::<usize>("threads").cloned(),
            short_window: matches.get_one::<usize>("short").cloned().unwrap_or(5),
            long_window: matches.get_one::<usize>("long").cloned().unwrap_or(20),
            discover: matches.get_flag("discover"),
            local_time: matches.get_flag("local-time"),
            check: matches.get_flag("check"),
        }
    }
}

/// Builds the clap command. Counts go through `parse_usize_positive`.
pub fn command() -> clap::Command {
    clap::Command::new("price_dashboard")
        .version("0.1.0")
        .about("Load CSV price history, compute moving averages and export dashboard charts")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("Directory holding the CSV price files")
                .default_value("dummy data")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("output")
            .short('o')
            .long("output")
            .help("Directory the chart payloads are written to")
            .required(true)
            .num_args(1),
        )
        .arg(
            clap::Arg::new("threads")
            .short('t')
            .long("threads")
            .help("Number of threads to use (default: all available)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("short")
            .long("short")
            .help("Short moving-average window in bars")
            .default_value("5")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("long")
            .long("long")
            .help("Long moving-average window in bars")
            .default_value("20")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("discover")
            .long("discover")
            .help("Chart every CSV/TXT file in the input directory instead of the default twelve")
            .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("local-time")
            .long("local-time")
            .help("Read CSV datetimes in the local timezone instead of UTC")
            .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("check")
            .short('c')
            .long("check")
            .help("After export, read the payloads back and print the first 5 rows of each series")
            .required(false)
            .action(clap::ArgAction::SetTrue),
        )
}

/// Validates that a count (threads, window size) is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number.
///
/// # Returns
/// * `Result<usize>` - Validated number.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}
