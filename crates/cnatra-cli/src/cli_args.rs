use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Retrieve published CNATRA squadron flight schedules.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level unless CNATRA_LOG or RUST_LOG say otherwise.
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch every missing schedule tracked by the store.
    Sweep(SweepArgs),
    /// Fetch schedules for one squadron and print them as JSON.
    Fetch(SquadronDatesArgs),
    /// Add dates to the store's watch list for a squadron.
    Track(TrackArgs),
    /// Print the calendar widget's date number for a date.
    DateNumber {
        /// Date in YYYY-MM-DD form.
        date: String,
    },
    /// Print the front page PDF URL for a squadron and date.
    FrontPage {
        squadron: String,
        /// Date in YYYY-MM-DD form.
        date: String,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Settings shared by commands that touch the network.
#[derive(Debug, Clone, Args, Default)]
pub struct NetworkArgs {
    /// Override the schedule page URL (the squadron id is appended).
    #[arg(long = "schedule-url", value_name = "URL", value_hint = ValueHint::Url)]
    pub schedule_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Args, Default)]
pub struct SweepArgs {
    /// Squadron sessions to run at once.
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub concurrency: Option<usize>,

    /// Store file path.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub store: Option<String>,

    /// Attempts per squadron before giving up.
    #[arg(long = "max-retries", value_name = "N")]
    pub max_retries: Option<usize>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SquadronDatesArgs {
    /// Squadron id, e.g. vt-7.
    pub squadron: String,

    /// Dates in YYYY-MM-DD form.
    #[arg(required = true, num_args = 1..)]
    pub dates: Vec<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Debug, Clone, Args)]
pub struct TrackArgs {
    pub squadron: String,

    #[arg(required = true, num_args = 1..)]
    pub dates: Vec<String>,

    /// Store file path.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration.
    Show,
    /// Write the default configuration file if none exists.
    Init {
        /// Overwrite an existing file.
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}
