//! Core data model shared by every pipeline stage.
//!
//! These types carry no I/O. They are serialized into checkpoints and
//! result artifacts, so field names are part of the on-disk format.

pub mod analysis;
pub mod job;
pub mod record;
pub mod risk;

pub use analysis::{ClaimAnalysis, SearchQuery};
pub use job::{Job, JobPatch, derive_job_id};
pub use record::{Record, Source, SourceCounts};
pub use risk::{RiskEntry, RiskSummary, RiskTier};
