use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "icovid")]
#[command(about = "Daily per-country case statistics kept in a dated snapshot store")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Default)]
pub struct GlobalArgs {
    /// Store file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging and detailed summaries
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    /// Disable coloured output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every source and store the records under today's date
    Update(UpdateArgs),

    /// Display the countries stored for a date
    Show(ShowArgs),

    /// List the stored dates in the order they were recorded
    Dates,

    /// Show the recent time series of a country
    History(HistoryArgs),

    /// Compare a country between two dates
    Diff(DiffArgs),
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Country record files to read, in addition to the configured sources
    #[arg(long = "source", value_name = "FILE")]
    pub sources: Vec<PathBuf>,

    /// Skip region counts that cannot be parsed instead of failing the source
    /// (applies to --source files)
    #[arg(long, default_value_t = false)]
    pub skip_bad_regions: bool,

    /// Date to store the records under, e.g. "20 May 2020" (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Run unattended: answer prompts with defaults and repeat every interval
    #[arg(long, default_value_t = false)]
    pub server: bool,

    /// Delay between cycles in server mode, e.g. "1h" or "30m"
    #[arg(long)]
    pub interval: Option<String>,

    /// Output the update summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Date to display, e.g. "20 May 2020" (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Country name as stored
    pub country: String,

    /// Number of most recent points to show (defaults to the configured value)
    #[arg(long)]
    pub days: Option<usize>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Country name as stored
    pub country: String,

    /// Earlier date (defaults to the day before --to)
    #[arg(long)]
    pub from: Option<String>,

    /// Later date (defaults to today)
    #[arg(long)]
    pub to: Option<String>,
}
