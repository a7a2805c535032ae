//! Reasoning-provider agents.
//!
//! Every stage that needs the reasoning provider is an [`Agent`] with its
//! own system prompt, driven through the pluggable [`LlmProvider`] trait.
//!
//! # Architecture
//!
//! ```text
//! claim text ─► ClaimAnalyzer ─► ClaimAnalysis
//! claims file ─► ClaimSplitter ─► Vec<String>
//! claim + records ─► RiskScorer
//!   ├── batch 1: rubric + claim + records[0..B]      (no history)
//!   ├── batch 2: records[B..2B]   + replayed context
//!   └── ...
//! ```
//!
//! Provider calls and response parsing are retried together under the
//! agent's [`RetryPolicy`](crate::retry::RetryPolicy).

pub mod analyzer;
pub mod client;
pub mod config;
pub mod extract;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod scorer;
pub mod splitter;
pub mod traits;

// Re-export key types
pub use analyzer::ClaimAnalyzer;
pub use client::create_provider;
pub use config::AgentConfig;
pub use extract::{ParseOutcome, ParseStrategy, extract_json};
pub use message::{ChatMessage, ChatRequest, ChatResponse, ConversationContext, Role, TokenUsage};
pub use provider::LlmProvider;
pub use scorer::{Assessment, RiskScorer};
pub use splitter::ClaimSplitter;
pub use traits::{Agent, AgentResponse, execute_and_parse};
