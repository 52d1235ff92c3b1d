use std::time::Duration;

use serde::Deserialize;

use crate::domain::cleanup::{CallDeadlines, CleanupConfig, CleanupDelays};
use crate::domain::provision::ProvisionConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub aws: AwsConfig,
    pub cleanup: CleanupSettings,
    pub provision: ProvisionSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Region and transport settings shared by every AWS client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    pub batch_size: usize,
    pub max_retries: u32,

    pub list_knowledge_bases_timeout_secs: u64,
    pub list_data_sources_timeout_secs: u64,
    pub update_deletion_policy_timeout_secs: u64,
    pub delete_data_source_timeout_secs: u64,
    pub delete_knowledge_base_timeout_secs: u64,

    pub page_delay_ms: u64,
    pub timeout_retry_delay_secs: u64,
    pub vector_store_retry_delay_secs: u64,
    pub settle_delay_secs: u64,
    pub knowledge_base_retry_delay_secs: u64,
    pub item_delay_secs: u64,
    pub batch_delay_secs: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self::from(&CleanupConfig::default())
    }
}

impl From<&CleanupConfig> for CleanupSettings {
    fn from(config: &CleanupConfig) -> Self {
        let d = &config.deadlines;
        let p = &config.delays;

        Self {
            batch_size: config.batch_size,
            max_retries: config.max_retries,
            list_knowledge_bases_timeout_secs: d.list_knowledge_bases.as_secs(),
            list_data_sources_timeout_secs: d.list_data_sources.as_secs(),
            update_deletion_policy_timeout_secs: d.update_deletion_policy.as_secs(),
            delete_data_source_timeout_secs: d.delete_data_source.as_secs(),
            delete_knowledge_base_timeout_secs: d.delete_knowledge_base.as_secs(),
            page_delay_ms: p.page.as_millis() as u64,
            timeout_retry_delay_secs: p.timeout_retry.as_secs(),
            vector_store_retry_delay_secs: p.vector_store_retry.as_secs(),
            settle_delay_secs: p.settle.as_secs(),
            knowledge_base_retry_delay_secs: p.knowledge_base_retry.as_secs(),
            item_delay_secs: p.item.as_secs(),
            batch_delay_secs: p.batch.as_secs(),
        }
    }
}

impl CleanupSettings {
    pub fn to_cleanup_config(&self) -> CleanupConfig {
        CleanupConfig::default()
            .with_batch_size(self.batch_size)
            .with_max_retries(self.max_retries)
            .with_deadlines(CallDeadlines {
                list_knowledge_bases: Duration::from_secs(self.list_knowledge_bases_timeout_secs),
                list_data_sources: Duration::from_secs(self.list_data_sources_timeout_secs),
                update_deletion_policy: Duration::from_secs(
                    self.update_deletion_policy_timeout_secs,
                ),
                delete_data_source: Duration::from_secs(self.delete_data_source_timeout_secs),
                delete_knowledge_base: Duration::from_secs(self.delete_knowledge_base_timeout_secs),
            })
            .with_delays(CleanupDelays {
                page: Duration::from_millis(self.page_delay_ms),
                timeout_retry: Duration::from_secs(self.timeout_retry_delay_secs),
                vector_store_retry: Duration::from_secs(self.vector_store_retry_delay_secs),
                settle: Duration::from_secs(self.settle_delay_secs),
                knowledge_base_retry: Duration::from_secs(self.knowledge_base_retry_delay_secs),
                item: Duration::from_secs(self.item_delay_secs),
                batch: Duration::from_secs(self.batch_delay_secs),
            })
    }
}

/// Names and ARNs for the demo provisioning pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionSettings {
    pub collection_name: String,
    pub index_name: String,
    pub vector_dimension: u32,
    pub encryption_policy_name: String,
    pub network_policy_name: String,
    pub data_policy_name: String,
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
    pub index_settle_secs: u64,
    pub default_query: String,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        let defaults = ProvisionConfig::default();

        Self {
            collection_name: defaults.collection_name,
            index_name: defaults.index_name,
            vector_dimension: defaults.vector_dimension,
            encryption_policy_name: defaults.encryption_policy_name,
            network_policy_name: defaults.network_policy_name,
            data_policy_name: defaults.data_policy_name,
            principals: defaults.principals,
            embedding_model_arn: defaults.embedding_model_arn,
            knowledge_base_role_arn: defaults.knowledge_base_role_arn,
            knowledge_base_description: defaults.knowledge_base_description,
            s3_bucket_arn: defaults.s3_bucket_arn,
            s3_prefix: defaults.s3_prefix,
            data_source_name: defaults.data_source_name,
            agent_name: defaults.agent_name,
            agent_description: defaults.agent_description,
            agent_instruction: defaults.agent_instruction,
            base_prompt_template: defaults.base_prompt_template,
            foundation_model: defaults.foundation_model,
            idle_session_ttl_seconds: defaults.idle_session_ttl_seconds,
            alias_name: defaults.alias_name,
            retrieval_query: defaults.retrieval_query,
            index_settle_secs: defaults.index_settle.as_secs(),
            default_query: "List all the source-to-target mappings described in the document"
                .to_string(),
        }
    }
}

impl ProvisionSettings {
    pub fn to_provision_config(&self) -> ProvisionConfig {
        ProvisionConfig {
            collection_name: self.collection_name.clone(),
            index_name: self.index_name.clone(),
            vector_dimension: self.vector_dimension,
            encryption_policy_name: self.encryption_policy_name.clone(),
            network_policy_name: self.network_policy_name.clone(),
            data_policy_name: self.data_policy_name.clone(),
            principals: self
                .principals
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            embedding_model_arn: self.embedding_model_arn.clone(),
            knowledge_base_role_arn: self.knowledge_base_role_arn.clone(),
            knowledge_base_description: self.knowledge_base_description.clone(),
            s3_bucket_arn: self.s3_bucket_arn.clone(),
            s3_prefix: self.s3_prefix.clone(),
            data_source_name: self.data_source_name.clone(),
            agent_name: self.agent_name.clone(),
            agent_description: self.agent_description.clone(),
            agent_instruction: self.agent_instruction.clone(),
            base_prompt_template: self
                .base_prompt_template
                .clone()
                .filter(|template| !template.trim().is_empty()),
            foundation_model: self.foundation_model.clone(),
            idle_session_ttl_seconds: self.idle_session_ttl_seconds,
            alias_name: self.alias_name.clone(),
            retrieval_query: self.retrieval_query.clone(),
            index_settle: Duration::from_secs(self.index_settle_secs),
            ..ProvisionConfig::default()
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("KB_OPS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("provision.principals")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
