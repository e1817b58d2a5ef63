//! Placeholder question answerer.
//!
//! Echoes the question back until a model provider is wired in. Reports
//! itself as not ready so the health endpoint reflects that.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{Answer, QuestionAnswerer};

const STUB_MODEL: &str = "stub";

#[derive(Debug, Clone, Copy, Default)]
pub struct StubQuestionAnswerer;

impl StubQuestionAnswerer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuestionAnswerer for StubQuestionAnswerer {
    async fn answer(&self, question: &str) -> Result<Answer, DomainError> {
        tracing::debug!(question_len = question.len(), "Answering with stub model");
        Ok(Answer {
            answer: format!("[stub] Received your question: \"{}\"", question),
            model: STUB_MODEL.to_string(),
            usage: None,
        })
    }

    fn is_ready(&self) -> bool {
        false
    }
}
