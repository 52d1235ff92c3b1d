//! Bedrock Agent control plane: knowledge bases, data sources, agents

use async_trait::async_trait;
use aws_sdk_bedrockagent::types::{
    ActionGroupSignature, ActionGroupState, ChunkingConfiguration, ChunkingStrategy, CreationMode,
    DataDeletionPolicy, DataSourceConfiguration, DataSourceType, FixedSizeChunkingConfiguration,
    InferenceConfiguration, KnowledgeBaseConfiguration, KnowledgeBaseState,
    KnowledgeBaseStorageType, KnowledgeBaseType, MemoryConfiguration, MemoryType,
    OpenSearchServerlessConfiguration, OpenSearchServerlessFieldMapping, OrchestrationType,
    PromptConfiguration, PromptOverrideConfiguration, PromptState, PromptType,
    S3DataSourceConfiguration, SessionSummaryConfiguration, StorageConfiguration,
    VectorIngestionConfiguration, VectorKnowledgeBaseConfiguration,
};
use aws_sdk_bedrockagent::Client;
use tracing::debug;

use crate::domain::agent::{AgentAdmin, CreateAgentRequest, OrchestrationPrompt, DRAFT_VERSION};
use crate::domain::knowledge_base::{
    CreateDataSourceRequest, CreateKnowledgeBaseRequest, DataSourceSummary, IngestionJob,
    KnowledgeBaseAdmin, KnowledgeBasePage, KnowledgeBaseSummary,
};
use crate::domain::DomainError;
use crate::infrastructure::aws::{build_error, map_sdk_error};

const PROVIDER: &str = "bedrock-agent";

/// `KnowledgeBaseAdmin` and `AgentAdmin` over the Bedrock Agent SDK client
#[derive(Debug, Clone)]
pub struct BedrockAgentClient {
    client: Client,
}

impl BedrockAgentClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    fn missing(what: &str) -> DomainError {
        DomainError::provider(PROVIDER, format!("Response did not include {}", what))
    }
}

fn orchestration_override(
    prompt: &OrchestrationPrompt,
) -> Result<PromptOverrideConfiguration, DomainError> {
    let inference = InferenceConfiguration::builder()
        .maximum_length(prompt.inference.maximum_length)
        .temperature(prompt.inference.temperature)
        .top_p(prompt.inference.top_p)
        .top_k(prompt.inference.top_k)
        .set_stop_sequences(Some(prompt.inference.stop_sequences.clone()))
        .build();

    let configuration = PromptConfiguration::builder()
        .prompt_type(PromptType::Orchestration)
        .prompt_creation_mode(CreationMode::Overridden)
        .prompt_state(PromptState::Enabled)
        .base_prompt_template(&prompt.base_prompt_template)
        .parser_mode(CreationMode::Default)
        .inference_configuration(inference)
        .build();

    PromptOverrideConfiguration::builder()
        .prompt_configurations(configuration)
        .build()
        .map_err(|e| build_error(PROVIDER, "prompt override configuration", e))
}

#[async_trait]
impl KnowledgeBaseAdmin for BedrockAgentClient {
    async fn list_knowledge_bases(
        &self,
        max_results: Option<i32>,
        next_token: Option<String>,
    ) -> Result<KnowledgeBasePage, DomainError> {
        let output = self
            .client
            .list_knowledge_bases()
            .set_max_results(max_results)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        let items = output
            .knowledge_base_summaries()
            .iter()
            .map(|kb| {
                KnowledgeBaseSummary::new(kb.knowledge_base_id(), kb.name(), kb.status().as_str())
            })
            .collect();

        Ok(KnowledgeBasePage {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_data_sources(
        &self,
        knowledge_base_id: &str,
    ) -> Result<Vec<DataSourceSummary>, DomainError> {
        let mut data_sources = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_data_sources()
                .knowledge_base_id(knowledge_base_id)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| map_sdk_error(PROVIDER, e))?;

            data_sources.extend(output.data_source_summaries().iter().map(|ds| {
                DataSourceSummary::new(ds.data_source_id(), ds.name(), ds.status().as_str())
            }));

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        debug!(kb_id = knowledge_base_id, count = data_sources.len(), "Listed data sources");
        Ok(data_sources)
    }

    async fn retain_data_source_data(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<(), DomainError> {
        let output = self
            .client
            .get_data_source()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        let data_source = output
            .data_source()
            .ok_or_else(|| Self::missing("the data source"))?;

        self.client
            .update_data_source()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .name(data_source.name())
            .set_data_source_configuration(data_source.data_source_configuration().cloned())
            .data_deletion_policy(DataDeletionPolicy::Retain)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn delete_data_source(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<(), DomainError> {
        self.client
            .delete_data_source()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), DomainError> {
        self.client
            .delete_knowledge_base()
            .knowledge_base_id(knowledge_base_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn create_knowledge_base(
        &self,
        request: CreateKnowledgeBaseRequest,
    ) -> Result<String, DomainError> {
        let vector = VectorKnowledgeBaseConfiguration::builder()
            .embedding_model_arn(&request.embedding_model_arn)
            .build()
            .map_err(|e| build_error(PROVIDER, "vector configuration", e))?;

        let kb_config = KnowledgeBaseConfiguration::builder()
            .r#type(KnowledgeBaseType::Vector)
            .vector_knowledge_base_configuration(vector)
            .build()
            .map_err(|e| build_error(PROVIDER, "knowledge base configuration", e))?;

        let field_mapping = OpenSearchServerlessFieldMapping::builder()
            .vector_field(&request.field_mapping.vector_field)
            .text_field(&request.field_mapping.text_field)
            .metadata_field(&request.field_mapping.metadata_field)
            .build()
            .map_err(|e| build_error(PROVIDER, "field mapping", e))?;

        let opensearch = OpenSearchServerlessConfiguration::builder()
            .collection_arn(&request.collection_arn)
            .vector_index_name(&request.vector_index_name)
            .field_mapping(field_mapping)
            .build()
            .map_err(|e| build_error(PROVIDER, "OpenSearch Serverless configuration", e))?;

        let storage = StorageConfiguration::builder()
            .r#type(KnowledgeBaseStorageType::OpensearchServerless)
            .opensearch_serverless_configuration(opensearch)
            .build()
            .map_err(|e| build_error(PROVIDER, "storage configuration", e))?;

        let output = self
            .client
            .create_knowledge_base()
            .name(&request.name)
            .description(&request.description)
            .role_arn(&request.role_arn)
            .knowledge_base_configuration(kb_config)
            .storage_configuration(storage)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .knowledge_base()
            .map(|kb| kb.knowledge_base_id().to_string())
            .ok_or_else(|| Self::missing("the knowledge base"))
    }

    async fn get_knowledge_base_status(
        &self,
        knowledge_base_id: &str,
    ) -> Result<String, DomainError> {
        let output = self
            .client
            .get_knowledge_base()
            .knowledge_base_id(knowledge_base_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .knowledge_base()
            .map(|kb| kb.status().as_str().to_string())
            .ok_or_else(|| Self::missing("the knowledge base"))
    }

    async fn create_data_source(
        &self,
        request: CreateDataSourceRequest,
    ) -> Result<String, DomainError> {
        let s3 = S3DataSourceConfiguration::builder()
            .bucket_arn(&request.bucket_arn)
            .set_inclusion_prefixes(
                (!request.inclusion_prefixes.is_empty()).then(|| request.inclusion_prefixes.clone()),
            )
            .build()
            .map_err(|e| build_error(PROVIDER, "S3 configuration", e))?;

        let source = DataSourceConfiguration::builder()
            .r#type(DataSourceType::S3)
            .s3_configuration(s3)
            .build()
            .map_err(|e| build_error(PROVIDER, "data source configuration", e))?;

        let fixed_size = FixedSizeChunkingConfiguration::builder()
            .max_tokens(request.chunking.max_tokens)
            .overlap_percentage(request.chunking.overlap_percentage)
            .build()
            .map_err(|e| build_error(PROVIDER, "fixed-size chunking", e))?;

        let chunking = ChunkingConfiguration::builder()
            .chunking_strategy(ChunkingStrategy::FixedSize)
            .fixed_size_chunking_configuration(fixed_size)
            .build()
            .map_err(|e| build_error(PROVIDER, "chunking configuration", e))?;

        let output = self
            .client
            .create_data_source()
            .knowledge_base_id(&request.knowledge_base_id)
            .name(&request.name)
            .data_source_configuration(source)
            .vector_ingestion_configuration(
                VectorIngestionConfiguration::builder()
                    .chunking_configuration(chunking)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .data_source()
            .map(|ds| ds.data_source_id().to_string())
            .ok_or_else(|| Self::missing("the data source"))
    }

    async fn start_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, DomainError> {
        let output = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .ingestion_job()
            .map(to_ingestion_job)
            .ok_or_else(|| Self::missing("the ingestion job"))
    }

    async fn get_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
        ingestion_job_id: &str,
    ) -> Result<IngestionJob, DomainError> {
        let output = self
            .client
            .get_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .ingestion_job_id(ingestion_job_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .ingestion_job()
            .map(to_ingestion_job)
            .ok_or_else(|| Self::missing("the ingestion job"))
    }
}

fn to_ingestion_job(job: &aws_sdk_bedrockagent::types::IngestionJob) -> IngestionJob {
    IngestionJob {
        id: job.ingestion_job_id().to_string(),
        status: job.status().as_str().to_string(),
        failure_reasons: job.failure_reasons().to_vec(),
    }
}

#[async_trait]
impl AgentAdmin for BedrockAgentClient {
    async fn create_agent(&self, request: CreateAgentRequest) -> Result<String, DomainError> {
        let memory = MemoryConfiguration::builder()
            .enabled_memory_types(MemoryType::SessionSummary)
            .storage_days(request.memory.storage_days)
            .session_summary_configuration(
                SessionSummaryConfiguration::builder()
                    .max_recent_sessions(request.memory.max_recent_sessions)
                    .build(),
            )
            .build()
            .map_err(|e| build_error(PROVIDER, "memory configuration", e))?;

        let prompt_override = request
            .orchestration_prompt
            .as_ref()
            .map(orchestration_override)
            .transpose()?;

        let output = self
            .client
            .create_agent()
            .agent_name(&request.name)
            .agent_resource_role_arn(&request.role_arn)
            .instruction(&request.instruction)
            .description(&request.description)
            .foundation_model(&request.foundation_model)
            .idle_session_ttl_in_seconds(request.idle_session_ttl_seconds)
            .orchestration_type(OrchestrationType::Default)
            .memory_configuration(memory)
            .set_prompt_override_configuration(prompt_override)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .agent()
            .map(|agent| agent.agent_id().to_string())
            .ok_or_else(|| Self::missing("the agent"))
    }

    async fn get_agent_status(&self, agent_id: &str) -> Result<String, DomainError> {
        let output = self
            .client
            .get_agent()
            .agent_id(agent_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .agent()
            .map(|agent| agent.agent_status().as_str().to_string())
            .ok_or_else(|| Self::missing("the agent"))
    }

    async fn prepare_agent(&self, agent_id: &str) -> Result<(), DomainError> {
        self.client
            .prepare_agent()
            .agent_id(agent_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn associate_knowledge_base(
        &self,
        agent_id: &str,
        knowledge_base_id: &str,
        description: &str,
    ) -> Result<(), DomainError> {
        self.client
            .associate_agent_knowledge_base()
            .agent_id(agent_id)
            .agent_version(DRAFT_VERSION)
            .knowledge_base_id(knowledge_base_id)
            .description(description)
            .knowledge_base_state(KnowledgeBaseState::Enabled)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn create_action_group(
        &self,
        agent_id: &str,
        name: &str,
        parent_signature: &str,
    ) -> Result<String, DomainError> {
        let output = self
            .client
            .create_agent_action_group()
            .agent_id(agent_id)
            .agent_version(DRAFT_VERSION)
            .action_group_name(name)
            .parent_action_group_signature(ActionGroupSignature::from(parent_signature))
            .action_group_state(ActionGroupState::Enabled)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .agent_action_group()
            .map(|group| group.action_group_id().to_string())
            .ok_or_else(|| Self::missing("the action group"))
    }

    async fn get_action_group_state(
        &self,
        agent_id: &str,
        action_group_id: &str,
    ) -> Result<String, DomainError> {
        let output = self
            .client
            .get_agent_action_group()
            .agent_id(agent_id)
            .agent_version(DRAFT_VERSION)
            .action_group_id(action_group_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .agent_action_group()
            .map(|group| group.action_group_state().as_str().to_string())
            .ok_or_else(|| Self::missing("the action group"))
    }

    async fn create_agent_alias(
        &self,
        agent_id: &str,
        alias_name: &str,
    ) -> Result<String, DomainError> {
        let output = self
            .client
            .create_agent_alias()
            .agent_id(agent_id)
            .agent_alias_name(alias_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .agent_alias()
            .map(|alias| alias.agent_alias_id().to_string())
            .ok_or_else(|| Self::missing("the agent alias"))
    }

    async fn get_agent_alias_status(
        &self,
        agent_id: &str,
        alias_id: &str,
    ) -> Result<String, DomainError> {
        let output = self
            .client
            .get_agent_alias()
            .agent_id(agent_id)
            .agent_alias_id(alias_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        output
            .agent_alias()
            .map(|alias| alias.agent_alias_status().as_str().to_string())
            .ok_or_else(|| Self::missing("the agent alias"))
    }
}
