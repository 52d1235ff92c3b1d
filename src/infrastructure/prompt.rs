use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::domain::cleanup::Confirmation;
use crate::domain::DomainError;

/// Reads the confirmation answer from the terminal
#[derive(Debug, Default)]
pub struct StdinConfirmation;

#[async_trait]
impl Confirmation for StdinConfirmation {
    async fn ask(&self, prompt: &str) -> Result<String, DomainError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(prompt.as_bytes())
            .await
            .and(stdout.flush().await)
            .map_err(|e| DomainError::internal(format!("Failed to write prompt: {}", e)))?;

        let mut answer = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await
            .map_err(|e| DomainError::internal(format!("Failed to read answer: {}", e)))?;

        Ok(answer)
    }
}
