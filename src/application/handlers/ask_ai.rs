//! AskAiHandler - Command handler for customer questions.

use std::sync::Arc;

use crate::domain::errors::StoreError;
use crate::ports::{Answer, QuestionAnswerer};

#[derive(Debug, Clone)]
pub struct AskAiCommand {
    pub question: String,
}

pub struct AskAiHandler {
    answerer: Arc<dyn QuestionAnswerer>,
}

impl AskAiHandler {
    pub fn new(answerer: Arc<dyn QuestionAnswerer>) -> Self {
        Self { answerer }
    }

    pub async fn handle(&self, cmd: AskAiCommand) -> Result<Answer, StoreError> {
        let question = cmd.question.trim();
        if question.is_empty() {
            return Err(StoreError::validation("question is required"));
        }
        Ok(self.answerer.answer(question).await?)
    }

    /// Whether a real model backs the answers.
    pub fn is_ready(&self) -> bool {
        self.answerer.is_ready()
    }
}
