//! Knowledge base management API trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{
    CreateDataSourceRequest, CreateKnowledgeBaseRequest, DataSourceSummary, IngestionJob,
    KnowledgeBasePage,
};
use crate::domain::error::DomainError;

/// Management operations on knowledge bases, data sources and ingestion jobs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KnowledgeBaseAdmin: Send + Sync {
    /// Fetches one page of knowledge bases
    async fn list_knowledge_bases(
        &self,
        max_results: Option<i32>,
        next_token: Option<String>,
    ) -> Result<KnowledgeBasePage, DomainError>;

    /// Lists every data source of a knowledge base, following pagination
    async fn list_data_sources(
        &self,
        knowledge_base_id: &str,
    ) -> Result<Vec<DataSourceSummary>, DomainError>;

    /// Re-submits the data source with its current name and configuration and
    /// a `RETAIN` data deletion policy
    async fn retain_data_source_data(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<(), DomainError>;

    async fn delete_data_source(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<(), DomainError>;

    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), DomainError>;

    /// Creates a knowledge base and returns its ID
    async fn create_knowledge_base(
        &self,
        request: CreateKnowledgeBaseRequest,
    ) -> Result<String, DomainError>;

    async fn get_knowledge_base_status(
        &self,
        knowledge_base_id: &str,
    ) -> Result<String, DomainError>;

    /// Creates a data source and returns its ID
    async fn create_data_source(
        &self,
        request: CreateDataSourceRequest,
    ) -> Result<String, DomainError>;

    async fn start_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, DomainError>;

    async fn get_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
        ingestion_job_id: &str,
    ) -> Result<IngestionJob, DomainError>;
}
