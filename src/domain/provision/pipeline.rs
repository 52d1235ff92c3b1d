//! Demo pipeline: collection, index, knowledge base, ingestion, agent, query

use std::sync::Arc;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::ProvisionConfig;
use crate::domain::agent::{
    action_group_state, agent_status, alias_status, AgentAdmin, AgentRuntime,
    BuiltinActionGroup, CreateAgentRequest, OrchestrationPrompt, PromptInference, SessionMemory,
};
use crate::domain::error::DomainError;
use crate::domain::knowledge_base::{
    ingestion_status, kb_status, CreateDataSourceRequest, CreateKnowledgeBaseRequest,
    FieldMapping, FixedSizeChunking, IngestionJob, KnowledgeBaseAdmin,
};
use crate::domain::vector_store::{
    collection_status, data_access_policy, encryption_policy, network_policy,
    vector_index_definition, CollectionAdmin, CollectionEndpoint, IndexCreation,
    SecurityPolicyKind, VectorIndexApi,
};
use crate::domain::wait::{wait_for, PollStatus, StatusTarget};

const AGENT_TERMINAL: &[&str] = &[
    agent_status::FAILED,
    agent_status::DELETING,
    agent_status::DELETED,
];

/// Provider clients the pipeline drives
#[derive(Clone)]
pub struct ProvisionClients {
    pub collections: Arc<dyn CollectionAdmin>,
    pub index: Arc<dyn VectorIndexApi>,
    pub knowledge_bases: Arc<dyn KnowledgeBaseAdmin>,
    pub agents: Arc<dyn AgentAdmin>,
    pub runtime: Arc<dyn AgentRuntime>,
}

/// Identifiers of everything created, plus the agent's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    pub collection_arn: String,
    pub knowledge_base_id: String,
    pub data_source_id: String,
    pub ingestion_job_id: String,
    pub retrieved_chunks: usize,
    pub agent_id: String,
    pub alias_id: String,
    pub answer: String,
}

pub struct Provisioner {
    clients: ProvisionClients,
    config: ProvisionConfig,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("config", &self.config)
            .finish()
    }
}

impl Provisioner {
    pub fn new(clients: ProvisionClients, config: ProvisionConfig) -> Self {
        Self { clients, config }
    }

    /// Runs the whole pipeline and asks the agent `query`
    pub async fn run(&self, query: &str) -> Result<ProvisionOutcome, DomainError> {
        self.config.validate()?;

        self.ensure_security_policies().await?;

        let collection_arn = self.create_collection().await?;
        let endpoint = CollectionEndpoint::from_arn(&collection_arn)?;
        self.create_vector_index(&endpoint).await;
        self.wait_for_index(&endpoint).await?;

        if !self.config.index_settle.is_zero() {
            info!(
                wait_secs = self.config.index_settle.as_secs(),
                "Letting the index settle"
            );
            sleep(self.config.index_settle).await;
        }

        let knowledge_base_id = self.create_knowledge_base(&collection_arn).await?;
        let data_source_id = self.create_data_source(&knowledge_base_id).await?;
        let ingestion = self.run_ingestion(&knowledge_base_id, &data_source_id).await?;
        let retrieved_chunks = self.sample_retrieval(&knowledge_base_id).await;

        let (agent_id, alias_id) = self.create_agent(&knowledge_base_id).await?;
        self.enable_action_groups(&agent_id).await?;
        self.wait_for_alias(&agent_id, &alias_id).await?;

        let answer = self.invoke_agent(&agent_id, &alias_id, query).await;

        Ok(ProvisionOutcome {
            collection_arn,
            knowledge_base_id,
            data_source_id,
            ingestion_job_id: ingestion.id,
            retrieved_chunks,
            agent_id,
            alias_id,
            answer,
        })
    }

    /// Creates the encryption, network and data access policies, tolerating existing ones
    pub async fn ensure_security_policies(&self) -> Result<(), DomainError> {
        info!("Ensuring OpenSearch Serverless security policies");

        let security_policies = [
            (
                &self.config.encryption_policy_name,
                SecurityPolicyKind::Encryption,
                encryption_policy(),
            ),
            (
                &self.config.network_policy_name,
                SecurityPolicyKind::Network,
                network_policy(),
            ),
        ];

        for (name, kind, document) in security_policies {
            match self
                .clients
                .collections
                .create_security_policy(name, kind, document.to_string())
                .await
            {
                Ok(()) => info!(policy = %name, kind = kind.as_str(), "Policy created"),
                Err(e) if e.is_conflict() => {
                    info!(policy = %name, kind = kind.as_str(), "Policy already exists")
                }
                Err(e) => return Err(e),
            }
        }

        let document = data_access_policy(
            &self.config.collection_name,
            &self.config.index_name,
            &self.config.principals,
        )
        .to_string();

        match self
            .clients
            .collections
            .create_access_policy(&self.config.data_policy_name, document.clone())
            .await
        {
            Ok(()) => {
                info!(policy = %self.config.data_policy_name, "Data access policy created");
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                info!(
                    policy = %self.config.data_policy_name,
                    "Data access policy already exists, updating it"
                );
                self.update_data_access_policy(document).await
            }
            Err(e) => Err(e),
        }
    }

    async fn update_data_access_policy(&self, document: String) -> Result<(), DomainError> {
        let resource = format!("collection/{}", self.config.collection_name);
        let policies = self
            .clients
            .collections
            .list_access_policies(&resource)
            .await?;

        let Some(existing) = policies
            .into_iter()
            .find(|p| p.name == self.config.data_policy_name)
        else {
            warn!(
                policy = %self.config.data_policy_name,
                "Could not find the existing data access policy to update"
            );
            return Ok(());
        };

        match self
            .clients
            .collections
            .update_access_policy(&existing.name, &existing.version, document)
            .await
        {
            Ok(()) => {
                info!(policy = %existing.name, "Data access policy updated");
                Ok(())
            }
            Err(e) if e.to_string().contains("No changes detected") => {
                info!(policy = %existing.name, "No changes to update in data access policy");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Creates the vector search collection and waits until it is active; returns its ARN
    pub async fn create_collection(&self) -> Result<String, DomainError> {
        let name = &self.config.collection_name;
        info!(collection = %name, "Creating OpenSearch collection");

        match self.clients.collections.create_collection(name).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => info!(collection = %name, "Collection already exists"),
            Err(e) => return Err(e),
        }

        let arn = wait_for("collection", self.config.waits.collection, move || async move {
            let summaries = self.clients.collections.list_collections().await?;

            Ok(match summaries.into_iter().find(|c| &c.name == name) {
                Some(c) if c.status == collection_status::ACTIVE => PollStatus::Ready(c.arn),
                Some(c) if c.status == collection_status::FAILED => PollStatus::Failed(c.status),
                Some(c) => PollStatus::Pending(c.status),
                None => PollStatus::Pending("NOT_LISTED".to_string()),
            })
        })
        .await?;

        info!(collection = %name, arn = %arn, "Collection is ACTIVE");
        Ok(arn)
    }

    /// Creation failures are logged; the availability wait decides whether to go on
    async fn create_vector_index(&self, endpoint: &CollectionEndpoint) {
        let index_name = &self.config.index_name;
        info!(index = %index_name, "Creating vector index");

        let definition = vector_index_definition(self.config.vector_dimension);

        match self
            .clients
            .index
            .create_index(endpoint, index_name, definition)
            .await
        {
            Ok(IndexCreation::Created) => info!(index = %index_name, "Vector index created"),
            Ok(IndexCreation::AlreadyExists) => {
                info!(index = %index_name, "Vector index already exists")
            }
            Err(e) => error!(index = %index_name, error = %e, "Vector index creation failed"),
        }
    }

    async fn wait_for_index(&self, endpoint: &CollectionEndpoint) -> Result<(), DomainError> {
        let index_name = &self.config.index_name;
        info!(index = %index_name, "Waiting for index to become available");

        wait_for("vector index", self.config.waits.index, move || async move {
            match self.clients.index.index_exists(endpoint, index_name).await {
                Ok(true) => Ok(PollStatus::Ready(())),
                Ok(false) => Ok(PollStatus::Pending("NOT_FOUND".to_string())),
                Err(e) => {
                    debug!(error = %e, "Index availability check failed");
                    Ok(PollStatus::Pending("UNREACHABLE".to_string()))
                }
            }
        })
        .await?;

        info!(index = %index_name, "Index is available");
        Ok(())
    }

    /// Creates the knowledge base and waits for it to become active
    pub async fn create_knowledge_base(&self, collection_arn: &str) -> Result<String, DomainError> {
        info!("Creating knowledge base");

        let request = CreateKnowledgeBaseRequest {
            name: CreateKnowledgeBaseRequest::generated_name(),
            description: self.config.knowledge_base_description.clone(),
            role_arn: self.config.knowledge_base_role_arn.clone(),
            embedding_model_arn: self.config.embedding_model_arn.clone(),
            collection_arn: collection_arn.to_string(),
            vector_index_name: self.config.index_name.clone(),
            field_mapping: FieldMapping::default(),
        };

        let kb_id = self.clients.knowledge_bases.create_knowledge_base(request).await?;
        info!(kb_id = %kb_id, "Knowledge base created");

        let target = StatusTarget::new(&[kb_status::ACTIVE], &[kb_status::FAILED]);
        let kb_ref = kb_id.as_str();

        wait_for("knowledge base", self.config.waits.knowledge_base, move || async move {
            let status = self
                .clients
                .knowledge_bases
                .get_knowledge_base_status(kb_ref)
                .await?;
            Ok(target.classify(status))
        })
        .await?;

        info!(kb_id = %kb_id, "Knowledge base is ACTIVE");
        Ok(kb_id)
    }

    async fn create_data_source(&self, kb_id: &str) -> Result<String, DomainError> {
        info!(kb_id, "Adding S3 data source");

        let request = CreateDataSourceRequest {
            knowledge_base_id: kb_id.to_string(),
            name: self.config.data_source_name.clone(),
            bucket_arn: self.config.s3_bucket_arn.clone(),
            inclusion_prefixes: if self.config.s3_prefix.is_empty() {
                Vec::new()
            } else {
                vec![self.config.s3_prefix.clone()]
            },
            chunking: FixedSizeChunking::default(),
        };

        let data_source_id = self.clients.knowledge_bases.create_data_source(request).await?;
        info!(kb_id, data_source_id = %data_source_id, "Data source added");
        Ok(data_source_id)
    }

    /// Starts ingestion and waits for a terminal state; a failed job aborts the pipeline
    pub async fn run_ingestion(
        &self,
        kb_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, DomainError> {
        info!(kb_id, data_source_id, "Starting ingestion");

        let started = self
            .clients
            .knowledge_bases
            .start_ingestion_job(kb_id, data_source_id)
            .await?;
        info!(ingestion_job_id = %started.id, "Ingestion job started");

        let job_id = started.id.as_str();

        let job = wait_for("ingestion job", self.config.waits.ingestion, move || async move {
            let job = self
                .clients
                .knowledge_bases
                .get_ingestion_job(kb_id, data_source_id, job_id)
                .await?;

            if job.status == ingestion_status::COMPLETE || job.status == ingestion_status::FAILED
            {
                Ok(PollStatus::Ready(job))
            } else {
                Ok(PollStatus::Pending(job.status))
            }
        })
        .await?;

        if job.status == ingestion_status::FAILED {
            error!(
                ingestion_job_id = %job.id,
                failure_reasons = ?job.failure_reasons,
                "Ingestion failed"
            );
            return Err(DomainError::failed(format!(
                "Ingestion job {} failed: {}",
                job.id,
                job.failure_reasons.join("; ")
            )));
        }

        info!(
            ingestion_job_id = %job.id,
            failure_reasons = ?job.failure_reasons,
            "Ingestion complete"
        );
        Ok(job)
    }

    /// Retrieves a few chunks to show what was indexed; returns how many came back
    async fn sample_retrieval(&self, kb_id: &str) -> usize {
        info!(kb_id, "Retrieving a few chunks from the knowledge base");

        let chunks = match self
            .clients
            .runtime
            .retrieve(kb_id, &self.config.retrieval_query)
            .await
        {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(kb_id, error = %e, "Error while retrieving chunks");
                return 0;
            }
        };

        info!(count = chunks.len(), "Retrieved chunks");

        for (index, chunk) in chunks
            .iter()
            .take(self.config.retrieval_preview_count)
            .enumerate()
        {
            let metadata = serde_json::to_string_pretty(&chunk.metadata).unwrap_or_default();
            info!(
                "Chunk {}:\n   Text: {}\n   Metadata: {}",
                index + 1,
                chunk.preview(self.config.retrieval_preview_chars),
                metadata
            );
        }

        chunks.len()
    }

    /// Creates and prepares the agent, attaches the knowledge base and creates the alias
    pub async fn create_agent(&self, kb_id: &str) -> Result<(String, String), DomainError> {
        info!(agent = %self.config.agent_name, "Creating agent");

        let request = CreateAgentRequest {
            name: self.config.agent_name.clone(),
            description: self.config.agent_description.clone(),
            role_arn: self.config.knowledge_base_role_arn.clone(),
            instruction: self.config.agent_instruction.clone(),
            foundation_model: self.config.foundation_model.clone(),
            idle_session_ttl_seconds: self.config.idle_session_ttl_seconds,
            memory: SessionMemory::default(),
            orchestration_prompt: self.config.base_prompt_template.as_ref().map(|template| {
                OrchestrationPrompt {
                    base_prompt_template: template.clone(),
                    inference: PromptInference::default(),
                }
            }),
        };

        let agent_id = self.clients.agents.create_agent(request).await?;
        info!(agent_id = %agent_id, "Agent created");
        self.wait_for_agent(&agent_id, agent_status::NOT_PREPARED).await?;

        self.prepare_agent(&agent_id).await?;

        info!(agent_id = %agent_id, kb_id, "Attaching knowledge base");
        self.clients
            .agents
            .associate_knowledge_base(&agent_id, kb_id, "Attach KB to agent")
            .await?;

        self.prepare_agent(&agent_id).await?;

        info!(alias = %self.config.alias_name, "Creating alias");
        let alias_id = self
            .clients
            .agents
            .create_agent_alias(&agent_id, &self.config.alias_name)
            .await?;
        info!(alias_id = %alias_id, "Alias created");

        Ok((agent_id, alias_id))
    }

    async fn prepare_agent(&self, agent_id: &str) -> Result<(), DomainError> {
        info!(agent_id, "Preparing agent");
        self.clients.agents.prepare_agent(agent_id).await?;
        self.wait_for_agent(agent_id, agent_status::PREPARED).await
    }

    /// Read errors count as `UNKNOWN` and keep the wait going
    async fn wait_for_agent(&self, agent_id: &str, expected: &str) -> Result<(), DomainError> {
        let resource = format!("agent {}", agent_id);

        wait_for(&resource, self.config.waits.agent, move || async move {
            let status = match self.clients.agents.get_agent_status(agent_id).await {
                Ok(status) => status,
                Err(e) => {
                    debug!(agent_id, error = %e, "Agent status read failed");
                    agent_status::UNKNOWN.to_string()
                }
            };

            let ready = [expected];
            Ok(match StatusTarget::new(&ready, AGENT_TERMINAL).classify(status) {
                PollStatus::Ready(_) => PollStatus::Ready(()),
                PollStatus::Failed(status) => PollStatus::Failed(status),
                PollStatus::Pending(status) => PollStatus::Pending(status),
            })
        })
        .await?;

        info!(agent_id, status = expected, "Agent reached status");
        Ok(())
    }

    /// Enables the user-input and code-interpreter action groups, then re-prepares
    pub async fn enable_action_groups(&self, agent_id: &str) -> Result<(), DomainError> {
        info!(agent_id, "Enabling built-in action groups");

        let mut created = Vec::new();

        for group in BuiltinActionGroup::ALL {
            match self
                .clients
                .agents
                .create_action_group(agent_id, group.action_group_name(), group.signature())
                .await
            {
                Ok(id) => created.push((group, id)),
                Err(e) if e.is_conflict() => info!(
                    action_group = group.action_group_name(),
                    "Action group already exists"
                ),
                Err(e) => return Err(e),
            }
        }

        for (group, action_group_id) in &created {
            let target = StatusTarget::new(&[action_group_state::ENABLED], &[]);
            let action_group_id = action_group_id.as_str();

            wait_for(group.label(), self.config.waits.action_group, move || async move {
                let state = self
                    .clients
                    .agents
                    .get_action_group_state(agent_id, action_group_id)
                    .await?;
                Ok(target.classify(state))
            })
            .await?;

            info!(action_group = group.label(), "Action group ENABLED");
        }

        self.prepare_agent(agent_id).await
    }

    async fn wait_for_alias(&self, agent_id: &str, alias_id: &str) -> Result<(), DomainError> {
        info!(alias_id, "Waiting for agent alias to become READY or PREPARED");

        let target = StatusTarget::new(
            &[alias_status::READY, alias_status::PREPARED],
            &[alias_status::FAILED],
        );

        let status = wait_for("agent alias", self.config.waits.alias, move || async move {
            let status = self
                .clients
                .agents
                .get_agent_alias_status(agent_id, alias_id)
                .await?;
            Ok(target.classify(status))
        })
        .await?;

        info!(alias_id, status = %status, "Agent alias is ready");
        Ok(())
    }

    /// Asks the agent one question in a fresh session; failures yield an empty answer
    pub async fn invoke_agent(&self, agent_id: &str, alias_id: &str, query: &str) -> String {
        info!(question = query, "Asking agent");

        let session_id = Uuid::new_v4().to_string();

        match self
            .clients
            .runtime
            .invoke_agent(agent_id, alias_id, &session_id, query)
            .await
        {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                info!("Agent response:\n{}", answer);
                answer
            }
            Err(e) => {
                error!(agent_id, error = %e, "Agent invocation failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::agent::{MockAgentAdmin, MockAgentRuntime, RetrievedChunk};
    use crate::domain::knowledge_base::MockKnowledgeBaseAdmin;
    use crate::domain::vector_store::{
        AccessPolicySummary, CollectionSummary, MockCollectionAdmin, MockVectorIndexApi,
    };

    const COLLECTION_ARN: &str = "arn:aws:aoss:us-east-1:123456789012:collection/abc123";

    fn config() -> ProvisionConfig {
        ProvisionConfig {
            collection_name: "demo".into(),
            index_name: "demo-index".into(),
            principals: vec!["arn:aws:iam::123456789012:role/KbRole".into()],
            knowledge_base_role_arn: "arn:aws:iam::123456789012:role/KbRole".into(),
            s3_bucket_arn: "arn:aws:s3:::docs".into(),
            s3_prefix: "kb/".into(),
            foundation_model: "anthropic.claude-3-haiku-20240307-v1:0".into(),
            index_settle: std::time::Duration::ZERO,
            ..Default::default()
        }
    }

    struct Mocks {
        collections: MockCollectionAdmin,
        index: MockVectorIndexApi,
        knowledge_bases: MockKnowledgeBaseAdmin,
        agents: MockAgentAdmin,
        runtime: MockAgentRuntime,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                collections: MockCollectionAdmin::new(),
                index: MockVectorIndexApi::new(),
                knowledge_bases: MockKnowledgeBaseAdmin::new(),
                agents: MockAgentAdmin::new(),
                runtime: MockAgentRuntime::new(),
            }
        }

        fn into_provisioner(self, config: ProvisionConfig) -> Provisioner {
            Provisioner::new(
                ProvisionClients {
                    collections: Arc::new(self.collections),
                    index: Arc::new(self.index),
                    knowledge_bases: Arc::new(self.knowledge_bases),
                    agents: Arc::new(self.agents),
                    runtime: Arc::new(self.runtime),
                },
                config,
            )
        }
    }

    fn expect_vector_store(mocks: &mut Mocks) {
        mocks
            .collections
            .expect_create_security_policy()
            .times(2)
            .returning(|_, _, _| Ok(()));
        mocks
            .collections
            .expect_create_access_policy()
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .collections
            .expect_create_collection()
            .withf(|name| name == "demo")
            .times(1)
            .returning(|_| Ok(()));

        let mut polls = 0;
        mocks
            .collections
            .expect_list_collections()
            .returning(move || {
                polls += 1;
                let status = if polls < 2 { "CREATING" } else { "ACTIVE" };
                Ok(vec![CollectionSummary {
                    name: "demo".into(),
                    status: status.into(),
                    arn: COLLECTION_ARN.into(),
                }])
            });

        mocks
            .index
            .expect_create_index()
            .withf(|endpoint, name, _| {
                endpoint.base_url == "https://abc123.us-east-1.aoss.amazonaws.com"
                    && name == "demo-index"
            })
            .times(1)
            .returning(|_, _, _| Ok(IndexCreation::Created));
        mocks
            .index
            .expect_index_exists()
            .returning(|_, _| Ok(true));
    }

    fn expect_knowledge_base(mocks: &mut Mocks, ingestion_result: &'static str) {
        mocks
            .knowledge_bases
            .expect_create_knowledge_base()
            .withf(|request| {
                request.collection_arn == COLLECTION_ARN
                    && request.vector_index_name == "demo-index"
                    && request.name.starts_with("kb-")
            })
            .times(1)
            .returning(|_| Ok("KB1".into()));
        mocks
            .knowledge_bases
            .expect_get_knowledge_base_status()
            .returning(|_| Ok("ACTIVE".into()));
        mocks
            .knowledge_bases
            .expect_create_data_source()
            .withf(|request| {
                request.knowledge_base_id == "KB1"
                    && request.inclusion_prefixes == vec!["kb/".to_string()]
            })
            .times(1)
            .returning(|_| Ok("DS1".into()));
        mocks
            .knowledge_bases
            .expect_start_ingestion_job()
            .times(1)
            .returning(|_, _| {
                Ok(IngestionJob {
                    id: "JOB1".into(),
                    status: "STARTING".into(),
                    failure_reasons: vec![],
                })
            });
        mocks
            .knowledge_bases
            .expect_get_ingestion_job()
            .returning(move |_, _, _| {
                Ok(IngestionJob {
                    id: "JOB1".into(),
                    status: ingestion_result.into(),
                    failure_reasons: if ingestion_result == "FAILED" {
                        vec!["Access denied to bucket".into()]
                    } else {
                        vec![]
                    },
                })
            });
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_pipeline() {
        let mut mocks = Mocks::new();
        expect_vector_store(&mut mocks);
        expect_knowledge_base(&mut mocks, "COMPLETE");

        mocks
            .runtime
            .expect_retrieve()
            .withf(|kb_id, query| kb_id == "KB1" && query == "What is this document about?")
            .times(1)
            .returning(|_, _| {
                Ok(vec![RetrievedChunk {
                    text: "Quarterly ETL mappings".into(),
                    metadata: Default::default(),
                }])
            });

        let prepared = Arc::new(Mutex::new(false));
        let agent_calls: Arc<Mutex<Vec<String>>> = Arc::default();

        mocks
            .agents
            .expect_create_agent()
            .withf(|request| {
                request.idle_session_ttl_seconds == 600
                    && request.memory.max_recent_sessions == 3
                    && request.orchestration_prompt.is_none()
            })
            .times(1)
            .returning(|_| Ok("AGENT1".into()));

        let status_flag = prepared.clone();
        mocks.agents.expect_get_agent_status().returning(move |_| {
            Ok(if *status_flag.lock().unwrap() {
                "PREPARED".into()
            } else {
                "NOT_PREPARED".into()
            })
        });

        let prepare_flag = prepared.clone();
        let prepare_log = agent_calls.clone();
        mocks
            .agents
            .expect_prepare_agent()
            .times(3)
            .returning(move |_| {
                *prepare_flag.lock().unwrap() = true;
                prepare_log.lock().unwrap().push("prepare".into());
                Ok(())
            });

        let associate_log = agent_calls.clone();
        mocks
            .agents
            .expect_associate_knowledge_base()
            .withf(|agent_id, kb_id, _| agent_id == "AGENT1" && kb_id == "KB1")
            .times(1)
            .returning(move |_, _, _| {
                associate_log.lock().unwrap().push("associate".into());
                Ok(())
            });

        mocks
            .agents
            .expect_create_agent_alias()
            .withf(|_, alias| alias == "prod")
            .times(1)
            .returning(|_, _| Ok("ALIAS1".into()));
        mocks
            .agents
            .expect_create_action_group()
            .times(2)
            .returning(|_, name, _| Ok(format!("AG-{}", name)));
        mocks
            .agents
            .expect_get_action_group_state()
            .times(2)
            .returning(|_, _| Ok("ENABLED".into()));

        let mut alias_polls = 0;
        mocks
            .agents
            .expect_get_agent_alias_status()
            .returning(move |_, _| {
                alias_polls += 1;
                let status = if alias_polls < 3 { "CREATING" } else { "PREPARED" };
                Ok(status.to_string())
            });

        mocks
            .runtime
            .expect_invoke_agent()
            .withf(|agent_id, alias_id, session_id, input| {
                agent_id == "AGENT1"
                    && alias_id == "ALIAS1"
                    && Uuid::parse_str(session_id).is_ok()
                    && input == "List the mappings"
            })
            .times(1)
            .returning(|_, _, _, _| Ok("  mapping answer \n".into()));

        let provisioner = mocks.into_provisioner(config());
        let outcome = provisioner.run("List the mappings").await.unwrap();

        assert_eq!(outcome.collection_arn, COLLECTION_ARN);
        assert_eq!(outcome.knowledge_base_id, "KB1");
        assert_eq!(outcome.data_source_id, "DS1");
        assert_eq!(outcome.ingestion_job_id, "JOB1");
        assert_eq!(outcome.retrieved_chunks, 1);
        assert_eq!(outcome.agent_id, "AGENT1");
        assert_eq!(outcome.alias_id, "ALIAS1");
        assert_eq!(outcome.answer, "mapping answer");
        assert_eq!(
            *agent_calls.lock().unwrap(),
            vec!["prepare", "associate", "prepare", "prepare"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ingestion_stops_before_agent() {
        let mut mocks = Mocks::new();
        expect_vector_store(&mut mocks);
        expect_knowledge_base(&mut mocks, "FAILED");
        mocks.runtime.expect_retrieve().never();
        mocks.agents.expect_create_agent().never();

        let provisioner = mocks.into_provisioner(config());
        let err = provisioner.run("question").await.unwrap_err();

        assert!(matches!(err, DomainError::Failed { .. }));
        assert!(err.to_string().contains("Access denied to bucket"));
    }

    #[tokio::test]
    async fn test_invalid_config_makes_no_calls() {
        let provisioner = Mocks::new().into_provisioner(ProvisionConfig::default());
        let err = provisioner.run("question").await.unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_existing_policies_are_tolerated_and_updated() {
        let mut mocks = Mocks::new();
        mocks
            .collections
            .expect_create_security_policy()
            .times(2)
            .returning(|name, _, _| Err(DomainError::conflict(format!("{} exists", name))));
        mocks
            .collections
            .expect_create_access_policy()
            .times(1)
            .returning(|_, _| Err(DomainError::conflict("exists")));
        mocks
            .collections
            .expect_list_access_policies()
            .withf(|resource| resource == "collection/demo")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    AccessPolicySummary {
                        name: "other".into(),
                        version: "v0".into(),
                    },
                    AccessPolicySummary {
                        name: "data-policy-genai".into(),
                        version: "v7".into(),
                    },
                ])
            });
        mocks
            .collections
            .expect_update_access_policy()
            .withf(|name, version, _| name == "data-policy-genai" && version == "v7")
            .times(1)
            .returning(|_, _, _| {
                Err(DomainError::provider(
                    "opensearchserverless",
                    "ValidationException: No changes detected in policy",
                ))
            });

        let provisioner = mocks.into_provisioner(config());
        assert!(provisioner.ensure_security_policies().await.is_ok());
    }

    #[tokio::test]
    async fn test_policy_errors_other_than_conflict_propagate() {
        let mut mocks = Mocks::new();
        mocks
            .collections
            .expect_create_security_policy()
            .times(1)
            .returning(|_, _, _| Err(DomainError::provider("opensearchserverless", "AccessDenied")));

        let provisioner = mocks.into_provisioner(config());
        assert!(provisioner.ensure_security_policies().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_action_groups_are_not_polled() {
        let mut mocks = Mocks::new();
        mocks
            .agents
            .expect_create_action_group()
            .times(2)
            .returning(|_, name, _| {
                if name == "UserInputAction" {
                    Err(DomainError::conflict("UserInputAction exists"))
                } else {
                    Ok("AG2".into())
                }
            });
        mocks
            .agents
            .expect_get_action_group_state()
            .withf(|_, id| id == "AG2")
            .times(1)
            .returning(|_, _| Ok("ENABLED".into()));
        mocks.agents.expect_prepare_agent().times(1).returning(|_| Ok(()));
        mocks
            .agents
            .expect_get_agent_status()
            .returning(|_| Ok("PREPARED".into()));

        let provisioner = mocks.into_provisioner(config());
        assert!(provisioner.enable_action_groups("AGENT1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_agent_wait_fails_on_terminal_status() {
        let mut mocks = Mocks::new();
        mocks.agents.expect_prepare_agent().returning(|_| Ok(()));

        let mut reads = 0;
        mocks.agents.expect_get_agent_status().returning(move |_| {
            reads += 1;
            if reads == 1 {
                Err(DomainError::provider("bedrock-agent", "ThrottlingException"))
            } else {
                Ok("FAILED".into())
            }
        });

        let provisioner = mocks.into_provisioner(config());
        let err = provisioner.prepare_agent("AGENT1").await.unwrap_err();

        assert!(matches!(err, DomainError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_invocation_error_yields_empty_answer() {
        let mut mocks = Mocks::new();
        mocks
            .runtime
            .expect_invoke_agent()
            .returning(|_, _, _, _| Err(DomainError::provider("bedrock-agent-runtime", "stream reset")));

        let provisioner = mocks.into_provisioner(config());
        let answer = provisioner.invoke_agent("AGENT1", "ALIAS1", "hello").await;

        assert!(answer.is_empty());
    }
}
