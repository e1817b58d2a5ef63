//! Question answering port for the ask-AI endpoint.

use crate::domain::foundation::DomainError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Answer to a customer question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,

    /// Model that produced the answer.
    pub model: String,

    /// Provider token usage, when reported.
    pub usage: Option<serde_json::Value>,
}

#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Answer a non-empty, trimmed question.
    async fn answer(&self, question: &str) -> Result<Answer, DomainError>;

    /// Whether a real model is wired in.
    fn is_ready(&self) -> bool;
}
