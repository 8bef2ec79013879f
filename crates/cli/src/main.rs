// invgrid - harvest gains/losses and land transition matrices from national
// inventory reporting workbooks

mod exit_codes;
mod harvest;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use invgrid_io::IoError;
use invgrid_recon::ReconError;

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "invgrid")]
#[command(about = "Harvest reporting-table matrices from national inventory workbooks")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// HWP gains and losses (24 metrics) from Table4.Gs1
    #[command(after_help = "\
Examples:
  invgrid hwp -d CRF -s 1990 -e 2021 --eu
  invgrid hwp -d CRF -s 1990 -e 2021 -c AUT FIN SWE --format csv
  invgrid hwp -d CRF -s 1990 -e 2021 -l --json > run.json")]
    Hwp(HarvestArgs),

    /// Land transition matrix (81 metrics) from Table4.1
    #[command(after_help = "\
Examples:
  invgrid land-transition -d CRF -s 1990 -e 2021 --euplus
  invgrid land-transition -d CRF -s 1990 -e 2021 --amissing --shape wide")]
    LandTransition(HarvestArgs),

    /// Parse and validate a configuration file
    ValidateConfig {
        /// TOML configuration file
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Inventory parties directory (one sub-directory per country)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub directory: PathBuf,

    /// First inventory year (usually 1990)
    #[arg(short = 's', long, value_name = "YEAR")]
    pub start: i32,

    /// Last inventory year
    #[arg(short = 'e', long, value_name = "YEAR")]
    pub end: i32,

    #[command(flatten)]
    pub selection: CountrySelection,

    /// TOML configuration (built-in defaults when omitted)
    #[arg(long, value_name = "FILE", env = "INVGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output path (default: <group>_<table>_<start>_<end>.xlsx in the current directory)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format. csv writes one file per metric into a directory.
    #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
    pub format: OutputFormat,

    /// Output layout
    #[arg(long, value_enum, default_value_t = Shape::Long)]
    pub shape: Shape,

    /// Print the run report (summary + diagnostics) as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON run report to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,
}

/// Exactly one way of choosing countries.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct CountrySelection {
    /// EU-27
    #[arg(long)]
    pub eu: bool,

    /// EU-27 plus GBR, ISL and NOR
    #[arg(long)]
    pub euplus: bool,

    /// EU plus other reporting countries
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Explicit country codes
    #[arg(short = 'c', long, num_args = 1.., value_name = "CODE")]
    pub countries: Vec<String>,

    /// Every country directory found under --directory
    #[arg(short = 'l', long)]
    pub list: bool,

    /// All countries, using the short lists for parties with gaps
    #[arg(long)]
    pub amissing: bool,

    /// As --amissing, without EUA
    #[arg(long)]
    pub amissingnoeua: bool,

    /// Named group (eu, eu_plus, all, all_with_gaps, all_with_gaps_no_eua)
    #[arg(short = 'g', long, value_name = "NAME")]
    pub group: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    /// index, country, year, value
    Long,
    /// One row per country, one column per year
    Wide,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("INVGRID_COMMIT"), ")",
        "\nengine:  invgrid-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Hwp(args) => harvest::cmd_harvest(harvest::Kind::Hwp, args, cli.quiet),
        Commands::LandTransition(args) => {
            harvest::cmd_harvest(harvest::Kind::LandTransition, args, cli.quiet)
        }
        Commands::ValidateConfig { file, json } => harvest::cmd_validate_config(&file, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Open { .. } | IoError::Read { .. } => {
                Self::input(err.to_string()).with_hint("check --directory")
            }
            IoError::Glob { .. } => Self::config(err.to_string()),
            IoError::Write { .. } => Self::write(err.to_string()),
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Self::config(err.to_string())
            }
            ReconError::UnknownCountryGroup(_) => Self::usage(err.to_string())
                .with_hint("groups: eu, eu_plus, all, all_with_gaps, all_with_gaps_no_eua"),
            ReconError::InvalidYearRange { .. } | ReconError::YearOutOfBounds { .. } => {
                Self::usage(err.to_string())
            }
        }
    }
}
