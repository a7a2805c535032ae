//! CLI command implementations.
//!
//! Each command builds a [`Pipeline`] from the environment, runs one
//! pipeline operation on a tokio runtime, and renders the payload.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::agent::{AgentConfig, create_provider};
use crate::artifact::ArtifactWriter;
use crate::checkpoint::FileCheckpointStore;
use crate::cli::output::{OutputFormat, format_claim, format_claims, format_search, to_json};
use crate::cli::parser::{Cli, Commands, JobArgs};
use crate::error::{CommandError, Result};
use crate::pipeline::{JobOptions, Pipeline, SearchOptions};
use crate::search::{SearchConfig, SearchOrchestrator};

/// Executes the CLI command.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if arguments are inconsistent, configuration is
/// missing, or the pipeline operation fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Analyze {
            text,
            file,
            dependent,
            job,
        } => {
            let claim = read_input(text.as_deref(), file.as_deref())?;
            if claim.is_none() && !(job.checkpoint.is_some() && job.resume) {
                return Err(CommandError::InvalidArgument(
                    "provide claim text or --file, or --checkpoint with --resume".to_string(),
                )
                .into());
            }
            let pipeline = build_pipeline(cli)?;
            let options = job_options(job);
            let result = block_on(pipeline.analyze(claim.as_deref(), !dependent, &options))?
                .map_err(|e| CommandError::ExecutionFailed(format!("Analysis failed: {e}")))?;
            render(format, &result, format_claim)
        }

        Commands::AnalyzeMultiple { file, job } => {
            let document = fs::read_to_string(file)?;
            let source_name = file_name(file);
            let pipeline = build_pipeline(cli)?;
            let options = job_options(job);
            let results = block_on(pipeline.analyze_multiple(&document, &source_name, &options))?
                .map_err(|e| {
                    CommandError::ExecutionFailed(format!("Multiple claim analysis failed: {e}"))
                })?;
            render(format, results.as_slice(), format_claims)
        }

        Commands::Search {
            query,
            claim,
            claim_file,
            date_range,
            risk_threshold,
            source,
        } => {
            let options = SearchOptions {
                date_range: Some(date_range.clone()),
                source: *source,
                claim: read_input(claim.as_deref(), claim_file.as_deref())?,
                risk_threshold: *risk_threshold,
            };
            let pipeline = build_pipeline(cli)?;
            let report = block_on(pipeline.search(query, &options))?
                .map_err(|e| CommandError::ExecutionFailed(format!("Search failed: {e}")))?;
            render(format, &report, format_search)
        }
    }
}

/// Returns inline text, else the trimmed contents of `file`, else `None`.
fn read_input(text: Option<&str>, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(Some(text.to_string()));
    }
    match file {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let content = content.trim();
            if content.is_empty() {
                return Err(CommandError::InvalidArgument(format!(
                    "file '{}' is empty",
                    path.display()
                ))
                .into());
            }
            Ok(Some(content.to_string()))
        }
        None => Ok(None),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn job_options(args: &JobArgs) -> JobOptions {
    JobOptions {
        checkpoint: args.checkpoint.clone(),
        resume: args.resume,
        execute: args.execute,
        date_range: Some(args.date_range.clone()),
        risk_threshold: args.risk_threshold,
        source: args.source,
    }
}

fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let config = AgentConfig::from_env().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;
    let provider = create_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;
    let search = SearchOrchestrator::from_config(&SearchConfig::from_env())
        .map_err(|e| CommandError::ExecutionFailed(format!("Search setup failed: {e}")))?;

    Ok(Pipeline::new(
        provider,
        &config,
        search,
        Arc::new(FileCheckpointStore::new(cli.get_checkpoint_dir())),
        ArtifactWriter::new(cli.get_results_dir()),
    ))
}

/// Runs `future` on a fresh tokio runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;
    Ok(rt.block_on(future))
}

fn render<T, F>(format: OutputFormat, payload: &T, text: F) -> Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => Ok(text(payload)),
        OutputFormat::Json => Ok(to_json(payload)?),
    }
}
