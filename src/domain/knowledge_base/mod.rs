//! Knowledge base domain - records and management API

mod admin;
mod entity;

pub use admin::KnowledgeBaseAdmin;
pub use entity::{
    ingestion_status, kb_status, CreateDataSourceRequest, CreateKnowledgeBaseRequest,
    DataSourceSummary, FieldMapping, FixedSizeChunking, IngestionJob, KnowledgeBasePage,
    KnowledgeBaseSummary,
};

#[cfg(test)]
pub use admin::MockKnowledgeBaseAdmin;
