use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::error::DomainError;

/// Literal the operator must type to allow a destructive run
pub const CONFIRMATION_LITERAL: &str = "DELETE";

/// Asks the operator a question and returns the raw answer
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Only the exact literal counts; surrounding whitespace from the line ending is ignored
pub fn is_confirmed(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']) == CONFIRMATION_LITERAL
}
