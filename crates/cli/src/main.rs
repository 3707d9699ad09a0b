//! `rollcall` - reconcile an event attendance log against a registration
//! roster and total credit hours per person.

mod apply;
mod exit_codes;
mod files;
mod propose;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rollcall_engine::EngineError;

use crate::exit_codes::{
    EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_MALFORMED_INPUT, EXIT_USAGE,
};

#[derive(Parser)]
#[command(
    name = "rollcall",
    about = "Match an attendance log against a registration roster and total credit hours",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score attendance names against the roster and write a review sheet
    #[command(after_help = "Examples:
  rollcall propose attendance.csv roster.csv
  rollcall propose attendance.csv roster.csv --out-dir run1 --min-score 0.8
  rollcall propose attendance.csv roster.csv --json -q")]
    Propose {
        /// Attendance log CSV (FullName, CreditHours, EventName)
        file_a: PathBuf,
        /// Registration roster CSV (Category, Subcategory, FullName, Country,
        /// Email, CCEmail, FirstConference)
        file_b: PathBuf,
        /// Directory the generated CSVs are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Match settings TOML
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minimum composite score for listing a candidate
        #[arg(long)]
        min_score: Option<f64>,
        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,
        /// Suppress progress output on stderr
        #[arg(short, long)]
        quiet: bool,
    },
    /// Fold the reviewed sheet back in and write the final credit totals
    #[command(after_help = "Examples:
  rollcall apply attendance.csv roster.csv
  rollcall apply attendance.csv roster.csv --decisions reviewed.csv --overrides fixes.csv
  rollcall apply attendance.csv roster.csv --category Member --out-dir run1

Exit code 6 means the outputs were written but some names are still
unresolved. Finish the review and re-run.")]
    Apply {
        /// Attendance log CSV (FullName, CreditHours, EventName)
        file_a: PathBuf,
        /// Registration roster CSV (Category, Subcategory, FullName, Country,
        /// Email, CCEmail, FirstConference)
        file_b: PathBuf,
        /// Reviewed proposals sheet; defaults to proposed_matches.csv in the
        /// output directory
        #[arg(long)]
        decisions: Option<PathBuf>,
        /// Manual override CSV (FullName_A, Override_FullName_B, Override_Email)
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Directory the generated CSVs are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Match settings TOML
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minimum composite score for listing a candidate
        #[arg(long)]
        min_score: Option<f64>,
        /// Keep only master rows whose roster category equals this value
        #[arg(long)]
        category: Option<String>,
        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,
        /// Suppress progress output on stderr
        #[arg(short, long)]
        quiet: bool,
    },
    /// Check a match settings file without running anything
    #[command(after_help = "Examples:
  rollcall validate match.toml")]
    Validate {
        /// Match settings TOML
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Propose {
            file_a,
            file_b,
            out_dir,
            config,
            min_score,
            json,
            quiet,
        } => propose::cmd_propose(file_a, file_b, out_dir, config, min_score, json, quiet),
        Commands::Apply {
            file_a,
            file_b,
            decisions,
            overrides,
            out_dir,
            config,
            min_score,
            category,
            json,
            quiet,
        } => apply::cmd_apply(
            file_a, file_b, decisions, overrides, out_dir, config, min_score, category, json,
            quiet,
        ),
        Commands::Validate { config } => validate::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

/// A command failure carrying the exit code to report.
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn error(message: impl Into<String>) -> Self {
        CliError {
            code: EXIT_ERROR,
            message: message.into(),
            hint: None,
        }
    }

    pub fn args(message: impl Into<String>) -> Self {
        CliError {
            code: EXIT_USAGE,
            message: message.into(),
            hint: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        CliError {
            code: EXIT_IO,
            message: message.into(),
            hint: None,
        }
    }

    /// Map an engine failure onto the exit-code registry.
    pub fn engine(err: EngineError) -> Self {
        let code = match &err {
            EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
            EngineError::MalformedInput { .. }
            | EngineError::SchemaMismatch { .. }
            | EngineError::Csv { .. } => EXIT_MALFORMED_INPUT,
        };
        CliError {
            code,
            message: err.to_string(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
