use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::RetrievedChunk;
use crate::domain::error::DomainError;

/// Runtime calls against knowledge bases and agent aliases
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query: &str,
    ) -> Result<Vec<RetrievedChunk>, DomainError>;

    /// Invokes an agent alias and returns the concatenated streamed completion
    async fn invoke_agent(
        &self,
        agent_id: &str,
        alias_id: &str,
        session_id: &str,
        input: &str,
    ) -> Result<String, DomainError>;
}
