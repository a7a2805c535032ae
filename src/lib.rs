//! # claimcheck
//!
//! Resumable prior-art conflict analysis for patent claims.
//!
//! A claim is turned into a structured analysis by a reasoning provider,
//! the analysis into a boolean search query, and the query is sent to one
//! or more patent record providers. Every returned record is then scored
//! for conflict risk in fixed-size batches that share one conversation,
//! and the scores are summarized into risk tiers.
//!
//! Jobs are checkpointed at stage boundaries (and after every claim of a
//! multi-claim document), so an interrupted run resumes without repeating
//! finished work.
//!
//! ## Modules
//!
//! - [`agent`]: reasoning-provider client and the analysis, scoring and
//!   claim-splitting agents
//! - [`search`]: record providers and the multi-source orchestrator
//! - [`checkpoint`]: durable job state (file and `SQLite` backends)
//! - [`pipeline`]: stage sequencing and resume logic
//! - [`retry`]: exponential backoff per dependency class
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use claimcheck::agent::{AgentConfig, create_provider};
//! use claimcheck::artifact::ArtifactWriter;
//! use claimcheck::checkpoint::FileCheckpointStore;
//! use claimcheck::pipeline::{JobOptions, Pipeline};
//! use claimcheck::search::{SearchConfig, SearchOrchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::from_env()?;
//! let pipeline = Pipeline::new(
//!     create_provider(&config)?,
//!     &config,
//!     SearchOrchestrator::from_config(&SearchConfig::from_env())?,
//!     Arc::new(FileCheckpointStore::new("data/checkpoints")),
//!     ArtifactWriter::new("results"),
//! );
//!
//! let options = JobOptions {
//!     execute: true,
//!     ..JobOptions::default()
//! };
//! let result = pipeline
//!     .analyze(Some("A method of pitching a rotor blade ..."), true, &options)
//!     .await?;
//! println!("{:?}", result.risk_summary);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod aggregate;
pub mod artifact;
pub mod checkpoint;
pub mod cli;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod retry;
pub mod search;

pub use crate::checkpoint::{CheckpointStore, FileCheckpointStore};
#[cfg(feature = "sqlite")]
pub use crate::checkpoint::SqliteCheckpointStore;
pub use crate::core::{ClaimAnalysis, Job, JobPatch, Record, RiskSummary, RiskTier, SearchQuery, Source};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{ClaimResult, JobOptions, Pipeline};
pub use crate::retry::RetryPolicy;
