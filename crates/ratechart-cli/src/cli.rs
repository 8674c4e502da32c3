//! CLI argument definitions for ratechart.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dates` | Expand a date range into calendar days |
//! | `currencies` | List selectable currencies |
//! | `chart` | Fetch a range for some currencies and print chart data |
//! | `session` | Interactive session reading commands from stdin |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat failed fetches as errors |
//! | `--source` | `cbr` | Rate source (cbr, synthetic) |
//! | `--timeout-ms` | `5000` | HTTP timeout per upstream request |
//! | `--fetch-timeout-ms` | none | Deadline for a whole currency fetch |
//! | `--lang` | `en` | Label language (en, ru) |
//! | `--log-level` | `warn` | Log filter when `RUST_LOG` is unset |
//! | `--no-cache` | `false` | Bypass the in-memory archive cache |
//!
//! # Examples
//!
//! ```bash
//! ratechart dates --from 2024-01-01 --to 2024-01-03
//! ratechart chart --from 2024-01-01 --to 2024-01-10 --currency usd --currency eur --pretty
//! ratechart --source synthetic --format table session
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Exchange rates of EUR, USD and CNY against the rouble.
#[derive(Debug, Parser)]
#[command(
    name = "ratechart",
    author,
    version,
    about = "Exchange-rate history viewer for EUR, USD and CNY against the rouble"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Exit with code 5 when any currency fetch failed.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Rate source: cbr (Central Bank of Russia archive) or synthetic (offline).
    #[arg(long, global = true, default_value = "cbr")]
    pub source: String,

    /// Timeout of a single upstream HTTP request in milliseconds.
    #[arg(long, global = true, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Deadline for fetching one currency over the whole range; unset waits indefinitely.
    #[arg(long, global = true)]
    pub fetch_timeout_ms: Option<u64>,

    /// Label language: en or ru.
    #[arg(long, global = true, default_value = "en")]
    pub lang: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Do not read or write the in-memory archive cache.
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every calendar day of a range, both ends included.
    ///
    /// An inverted range prints an empty list.
    Dates(RangeArgs),

    /// List the currencies that can be charted.
    Currencies,

    /// Fetch rates for the given currencies and print chart data.
    ///
    /// # Examples
    ///
    ///   ratechart chart --currency usd
    ///   ratechart chart --from 2024-01-01 --to 2024-01-31 --currency eur --currency cny
    Chart(ChartArgs),

    /// Interactive session: toggle currencies and move the range, one command per line.
    ///
    /// Commands: toggle <CODE>, range <FROM> <TO>, show, stats, wait, help, quit.
    Session(RangeArgs),
}

/// Date range; defaults to the trailing five days ending today.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First day, YYYY-MM-DD.
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD.
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Currency to chart (EUR, USD, CNY); repeatable.
    #[arg(long = "currency", short = 'c')]
    pub currencies: Vec<String>,
}
