use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::CreateAgentRequest;
use crate::domain::error::DomainError;

/// Management operations on agents, their aliases and action groups.
/// All version-scoped calls target the draft version.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AgentAdmin: Send + Sync {
    /// Creates an agent and returns its ID
    async fn create_agent(&self, request: CreateAgentRequest) -> Result<String, DomainError>;

    async fn get_agent_status(&self, agent_id: &str) -> Result<String, DomainError>;

    async fn prepare_agent(&self, agent_id: &str) -> Result<(), DomainError>;

    async fn associate_knowledge_base(
        &self,
        agent_id: &str,
        knowledge_base_id: &str,
        description: &str,
    ) -> Result<(), DomainError>;

    /// Creates an action group derived from a built-in signature and returns its ID.
    /// Returns `DomainError::Conflict` when the group already exists.
    async fn create_action_group(
        &self,
        agent_id: &str,
        name: &str,
        parent_signature: &str,
    ) -> Result<String, DomainError>;

    async fn get_action_group_state(
        &self,
        agent_id: &str,
        action_group_id: &str,
    ) -> Result<String, DomainError>;

    /// Creates an alias and returns its ID
    async fn create_agent_alias(&self, agent_id: &str, alias_name: &str)
        -> Result<String, DomainError>;

    async fn get_agent_alias_status(
        &self,
        agent_id: &str,
        alias_id: &str,
    ) -> Result<String, DomainError>;
}
