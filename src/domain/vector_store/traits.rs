use async_trait::async_trait;
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use super::entity::{
    AccessPolicySummary, CollectionEndpoint, CollectionSummary, IndexCreation, SecurityPolicyKind,
};
use crate::domain::error::DomainError;

/// OpenSearch Serverless control-plane operations.
/// Create calls return `DomainError::Conflict` when the resource already exists.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CollectionAdmin: Send + Sync {
    async fn create_security_policy(
        &self,
        name: &str,
        kind: SecurityPolicyKind,
        policy: String,
    ) -> Result<(), DomainError>;

    async fn create_access_policy(&self, name: &str, policy: String) -> Result<(), DomainError>;

    /// Lists data access policies that cover the given resource (e.g. `collection/demo`)
    async fn list_access_policies(
        &self,
        resource: &str,
    ) -> Result<Vec<AccessPolicySummary>, DomainError>;

    async fn update_access_policy(
        &self,
        name: &str,
        version: &str,
        policy: String,
    ) -> Result<(), DomainError>;

    /// Creates a `VECTORSEARCH` collection
    async fn create_collection(&self, name: &str) -> Result<(), DomainError>;

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, DomainError>;
}

/// Signed calls against a collection's search endpoint
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorIndexApi: Send + Sync {
    async fn create_index(
        &self,
        endpoint: &CollectionEndpoint,
        index_name: &str,
        definition: Value,
    ) -> Result<IndexCreation, DomainError>;

    async fn index_exists(
        &self,
        endpoint: &CollectionEndpoint,
        index_name: &str,
    ) -> Result<bool, DomainError>;
}
