//! Knowledge base, data source and ingestion records

use serde::Serialize;

/// Status values reported by the provider for knowledge bases
pub mod kb_status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const FAILED: &str = "FAILED";
}

/// Status values reported by the provider for ingestion jobs
pub mod ingestion_status {
    pub const COMPLETE: &str = "COMPLETE";
    pub const FAILED: &str = "FAILED";
}

/// Summary of a knowledge base as returned by the list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseSummary {
    pub id: String,
    pub name: String,
    pub status: String,
}

impl KnowledgeBaseSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
        }
    }
}

/// One page of a knowledge base listing
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBasePage {
    pub items: Vec<KnowledgeBaseSummary>,
    pub next_token: Option<String>,
}

/// Summary of a data source attached to a knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceSummary {
    pub id: String,
    pub name: String,
    pub status: String,
}

impl DataSourceSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
        }
    }
}

/// State of an ingestion job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionJob {
    pub id: String,
    pub status: String,
    pub failure_reasons: Vec<String>,
}

/// Field names inside the vector index that the knowledge base writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub vector_field: String,
    pub text_field: String,
    pub metadata_field: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            vector_field: "vector".to_string(),
            text_field: "text".to_string(),
            metadata_field: "metadata".to_string(),
        }
    }
}

/// Request to create a vector knowledge base backed by an OpenSearch Serverless index
#[derive(Debug, Clone)]
pub struct CreateKnowledgeBaseRequest {
    pub name: String,
    pub description: String,
    pub role_arn: String,
    pub embedding_model_arn: String,
    pub collection_arn: String,
    pub vector_index_name: String,
    pub field_mapping: FieldMapping,
}

impl CreateKnowledgeBaseRequest {
    /// Generates a name of the form `kb-xxxxxx` (six hex characters)
    pub fn generated_name() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("kb-{}", &suffix[..6])
    }
}

/// Fixed-size chunking parameters for ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunking {
    pub max_tokens: i32,
    pub overlap_percentage: i32,
}

impl Default for FixedSizeChunking {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap_percentage: 20,
        }
    }
}

/// Request to attach an S3 data source to a knowledge base
#[derive(Debug, Clone)]
pub struct CreateDataSourceRequest {
    pub knowledge_base_id: String,
    pub name: String,
    pub bucket_arn: String,
    pub inclusion_prefixes: Vec<String>,
    pub chunking: FixedSizeChunking,
}
