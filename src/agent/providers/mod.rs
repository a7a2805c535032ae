//! Concrete [`LlmProvider`](super::LlmProvider) implementations.

mod openai;

pub use openai::OpenAiProvider;
