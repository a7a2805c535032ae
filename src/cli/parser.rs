//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::artifact::DEFAULT_RESULTS_DIR;
use crate::checkpoint::DEFAULT_CHECKPOINT_DIR;
use crate::query::DEFAULT_DATE_RANGE;
use crate::search::SourceSelector;

/// claimcheck: prior-art conflict analysis for patent claims.
///
/// Extracts search terms from a claim, queries patent databases, and
/// scores every result for conflict risk. Long jobs are checkpointed and
/// can be resumed.
#[derive(Parser, Debug)]
#[command(name = "claimcheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding job checkpoints.
    #[arg(long, env = "CLAIMCHECK_CHECKPOINT_DIR", global = true)]
    pub checkpoint_dir: Option<PathBuf>,

    /// Directory receiving result artifacts.
    #[arg(long, env = "CLAIMCHECK_RESULTS_DIR", global = true)]
    pub results_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Search the generated query and score the results.
    #[arg(short, long)]
    pub execute: bool,

    /// Date range for the search (e.g. `last_5_years`, `2015-01-01 TO 2020-12-31`).
    #[arg(short, long, default_value = DEFAULT_DATE_RANGE)]
    pub date_range: String,

    /// Checkpoint ID for resumable runs.
    #[arg(long)]
    pub checkpoint: Option<String>,

    /// Resume from the checkpoint if it exists.
    #[arg(long)]
    pub resume: bool,

    /// Drop results scoring below this risk (1-10, 0 keeps all).
    #[arg(short = 't', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub risk_threshold: u8,

    /// Search source: projectpq, lens, or all.
    #[arg(short, long, default_value = "all")]
    pub source: SourceSelector,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single claim.
    #[command(after_help = r#"Examples:
  claimcheck analyze "A method for ..."                 # Analysis and query only
  claimcheck analyze --file claim.txt --execute         # Search and score
  claimcheck analyze --file claim.txt -e --checkpoint c1 --resume
  claimcheck analyze --checkpoint c1 --resume -e        # Continue a stored job
  claimcheck --format json analyze -e "..." | jq '.risk_summary'
"#)]
    Analyze {
        /// Claim text.
        text: Option<String>,

        /// Read the claim from a file.
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Treat the claim as dependent.
        #[arg(long)]
        dependent: bool,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Analyze every claim in a claims file.
    #[command(after_help = r#"Examples:
  claimcheck analyze-multiple claims.txt
  claimcheck analyze-multiple claims.txt -e --resume   # Checkpoint named after the file
"#)]
    AnalyzeMultiple {
        /// File containing one or more claims.
        file: PathBuf,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Run a raw boolean query.
    #[command(after_help = r#"Examples:
  claimcheck search '(ABST/"rotor blade")'
  claimcheck search '(ABST/"rotor")' --source lens
  claimcheck search '(ABST/"rotor")' --claim-file claim.txt -t 5
"#)]
    Search {
        /// Query text.
        query: String,

        /// Claim to score the results against.
        #[arg(long, conflicts_with = "claim_file")]
        claim: Option<String>,

        /// Read the claim to score against from a file.
        #[arg(long)]
        claim_file: Option<PathBuf>,

        /// Date range appended to the query.
        #[arg(short, long, default_value = DEFAULT_DATE_RANGE)]
        date_range: String,

        /// Drop results scoring below this risk (1-10, 0 keeps all).
        #[arg(short = 't', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=10))]
        risk_threshold: u8,

        /// Search source: projectpq, lens, or all.
        #[arg(short, long, default_value = "all")]
        source: SourceSelector,
    },
}

impl Cli {
    /// Returns the checkpoint directory, using the default if not specified.
    #[must_use]
    pub fn get_checkpoint_dir(&self) -> PathBuf {
        self.checkpoint_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINT_DIR))
    }

    /// Returns the results directory, using the default if not specified.
    #[must_use]
    pub fn get_results_dir(&self) -> PathBuf {
        self.results_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR))
    }
}
