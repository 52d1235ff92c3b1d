//! OpenSearch Serverless collection, policy and index definitions

use serde_json::{json, Value};

use crate::domain::error::DomainError;

/// Status values reported for collections
pub mod collection_status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const FAILED: &str = "FAILED";
}

/// Security policy flavours applied to collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityPolicyKind {
    Encryption,
    Network,
}

impl SecurityPolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encryption => "encryption",
            Self::Network => "network",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: String,
    pub status: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicySummary {
    pub name: String,
    pub version: String,
}

/// Outcome of an index creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCreation {
    Created,
    AlreadyExists,
}

/// Data-plane endpoint of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEndpoint {
    pub region: String,
    pub base_url: String,
}

impl CollectionEndpoint {
    pub fn new(region: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            base_url: base_url.into(),
        }
    }

    /// Derives the endpoint from a collection ARN of the form
    /// `arn:aws:aoss:<region>:<account>:collection/<id>`
    pub fn from_arn(arn: &str) -> Result<Self, DomainError> {
        let region = arn
            .split(':')
            .nth(3)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| DomainError::validation(format!("No region in collection ARN '{}'", arn)))?;

        let collection_id = arn
            .rsplit_once('/')
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                DomainError::validation(format!("No collection ID in collection ARN '{}'", arn))
            })?;

        Ok(Self::new(
            region,
            format!("https://{}.{}.aoss.amazonaws.com", collection_id, region),
        ))
    }

    pub fn index_url(&self, index_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), index_name)
    }

    pub fn cat_index_url(&self, index_name: &str) -> String {
        format!(
            "{}/_cat/indices/{}?format=json",
            self.base_url.trim_end_matches('/'),
            index_name
        )
    }
}

/// Encryption policy covering every collection with an AWS-owned key
pub fn encryption_policy() -> Value {
    json!({
        "Rules": [{"ResourceType": "collection", "Resource": ["collection/*"]}],
        "AWSOwnedKey": true
    })
}

/// Network policy allowing public access to every collection
pub fn network_policy() -> Value {
    json!([{
        "Rules": [{"ResourceType": "collection", "Resource": ["collection/*"]}],
        "AllowFromPublic": true
    }])
}

/// Data access policy granting the principals full access to one collection and index
pub fn data_access_policy(collection: &str, index: &str, principals: &[String]) -> Value {
    json!([{
        "Rules": [
            {
                "ResourceType": "collection",
                "Resource": [format!("collection/{}", collection)],
                "Permission": ["aoss:*"]
            },
            {
                "ResourceType": "index",
                "Resource": [format!("index/{}/{}", collection, index)],
                "Permission": ["aoss:*"]
            }
        ],
        "Principal": principals
    }])
}

/// k-NN index layout expected by a Bedrock knowledge base (HNSW on faiss, L2)
pub fn vector_index_definition(dimension: u32) -> Value {
    json!({
        "settings": {
            "index": {
                "knn": true,
                "knn.algo_param.ef_search": 512
            }
        },
        "mappings": {
            "properties": {
                "vector": {
                    "type": "knn_vector",
                    "dimension": dimension,
                    "method": {
                        "name": "hnsw",
                        "space_type": "l2",
                        "engine": "faiss",
                        "parameters": {
                            "ef_construction": 512,
                            "m": 16
                        }
                    }
                },
                "text": {"type": "text"},
                "metadata": {"type": "keyword"}
            }
        }
    })
}
