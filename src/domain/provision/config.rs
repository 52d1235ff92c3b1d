use std::time::Duration;

use crate::domain::error::DomainError;
use crate::domain::wait::WaitPolicy;

/// Polling cadence per resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionWaits {
    pub collection: WaitPolicy,
    pub index: WaitPolicy,
    pub knowledge_base: WaitPolicy,
    pub ingestion: WaitPolicy,
    pub agent: WaitPolicy,
    pub action_group: WaitPolicy,
    pub alias: WaitPolicy,
}

impl Default for ProvisionWaits {
    fn default() -> Self {
        Self {
            collection: WaitPolicy::from_secs(10, 900),
            index: WaitPolicy::from_secs(5, 120),
            knowledge_base: WaitPolicy::from_secs(5, 600),
            ingestion: WaitPolicy::from_secs(10, 3600),
            agent: WaitPolicy::from_secs(5, 300),
            action_group: WaitPolicy::from_secs(2, 300),
            alias: WaitPolicy::from_secs(5, 600),
        }
    }
}

/// Everything the demo pipeline creates, by name and ARN
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    pub collection_name: String,
    pub index_name: String,
    pub vector_dimension: u32,
    pub encryption_policy_name: String,
    pub network_policy_name: String,
    pub data_policy_name: String,
    /// IAM principals granted access to the collection and index
    pub principals: Vec<String>,

    pub embedding_model_arn: String,
    pub knowledge_base_role_arn: String,
    pub knowledge_base_description: String,

    pub s3_bucket_arn: String,
    pub s3_prefix: String,
    pub data_source_name: String,

    pub agent_name: String,
    pub agent_description: String,
    pub agent_instruction: String,
    pub base_prompt_template: Option<String>,
    pub foundation_model: String,
    pub idle_session_ttl_seconds: i32,
    pub alias_name: String,

    pub retrieval_query: String,
    pub retrieval_preview_count: usize,
    pub retrieval_preview_chars: usize,

    /// Pause between the index appearing and creating the knowledge base
    pub index_settle: Duration,
    pub waits: ProvisionWaits,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            collection_name: "genai-demo".to_string(),
            index_name: "genai-index".to_string(),
            vector_dimension: 1536,
            encryption_policy_name: "encryption-policy-genai".to_string(),
            network_policy_name: "network-policy-genai".to_string(),
            data_policy_name: "data-policy-genai".to_string(),
            principals: Vec::new(),
            embedding_model_arn:
                "arn:aws:bedrock:us-east-1::foundation-model/amazon.titan-embed-text-v1"
                    .to_string(),
            knowledge_base_role_arn: String::new(),
            knowledge_base_description: "Auto-created KB".to_string(),
            s3_bucket_arn: String::new(),
            s3_prefix: String::new(),
            data_source_name: "s3-data".to_string(),
            agent_name: "genai-agent".to_string(),
            agent_description: "Agent answering questions from the demo knowledge base"
                .to_string(),
            agent_instruction: "You are a helpful assistant that answers questions using the \
                                knowledge base. For questions about data transformations, respond \
                                with the source tables, target tables, and transformation logic \
                                in JSON format."
                .to_string(),
            base_prompt_template: None,
            foundation_model: String::new(),
            idle_session_ttl_seconds: 600,
            alias_name: "prod".to_string(),
            retrieval_query: "What is this document about?".to_string(),
            retrieval_preview_count: 5,
            retrieval_preview_chars: 300,
            index_settle: Duration::from_secs(30),
            waits: ProvisionWaits::default(),
        }
    }
}

impl ProvisionConfig {
    /// Checks that the account-specific values are present
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("provision.collection_name", self.collection_name.as_str()),
            ("provision.index_name", self.index_name.as_str()),
            ("provision.embedding_model_arn", self.embedding_model_arn.as_str()),
            (
                "provision.knowledge_base_role_arn",
                self.knowledge_base_role_arn.as_str(),
            ),
            ("provision.s3_bucket_arn", self.s3_bucket_arn.as_str()),
            ("provision.agent_name", self.agent_name.as_str()),
            ("provision.foundation_model", self.foundation_model.as_str()),
            ("provision.alias_name", self.alias_name.as_str()),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(DomainError::configuration(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.principals.iter().all(|p| p.trim().is_empty()) {
            return Err(DomainError::configuration(
                "provision.principals must list at least one IAM principal ARN",
            ));
        }

        if self.vector_dimension == 0 {
            return Err(DomainError::configuration(
                "provision.vector_dimension must be greater than zero",
            ));
        }

        Ok(())
    }
}
