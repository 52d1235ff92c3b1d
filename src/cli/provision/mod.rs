//! Provision command - builds the demo knowledge base and agent, then queries it

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::domain::provision::{ProvisionClients, ProvisionOutcome, Provisioner};
use crate::infrastructure::aws::{load_sdk_config, verify_credentials};
use crate::infrastructure::{
    BedrockAgentClient, BedrockRuntimeClient, OpenSearchServerlessClient, SignedIndexClient,
};

/// Arguments for the provision command
#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// AWS region (overrides config)
    #[arg(long)]
    pub region: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Question to ask the agent once it is ready (overrides config)
    #[arg(long)]
    pub query: Option<String>,
}

/// Run the provisioning pipeline
pub async fn run(args: ProvisionArgs) -> anyhow::Result<()> {
    let config = super::bootstrap(args.debug);

    let provision = config.provision.to_provision_config();
    provision.validate().context("Invalid provisioning configuration")?;

    let sdk_config = load_sdk_config(&config.aws, args.region.as_deref()).await;
    verify_credentials(&sdk_config)
        .await
        .context("AWS credentials check failed")?;

    let agent_client = Arc::new(BedrockAgentClient::new(&sdk_config));
    let index_client = SignedIndexClient::new(
        &sdk_config,
        Duration::from_secs(config.aws.read_timeout_secs),
    )?;

    let clients = ProvisionClients {
        collections: Arc::new(OpenSearchServerlessClient::new(&sdk_config)),
        index: Arc::new(index_client),
        knowledge_bases: agent_client.clone(),
        agents: agent_client,
        runtime: Arc::new(BedrockRuntimeClient::new(&sdk_config)),
    };

    let query = args
        .query
        .unwrap_or_else(|| config.provision.default_query.clone());

    info!(collection = %provision.collection_name, "Starting provisioning");

    let outcome = Provisioner::new(clients, provision)
        .run(&query)
        .await
        .context("Provisioning failed")?;

    print!("{}", render_outcome(&outcome));
    Ok(())
}

pub fn render_outcome(outcome: &ProvisionOutcome) -> String {
    let answer = if outcome.answer.is_empty() {
        "The agent returned no answer.".to_string()
    } else {
        format!("Agent response:\n{}", outcome.answer)
    };

    format!(
        "\n\
         Collection ARN:    {}\n\
         Knowledge base:    {}\n\
         Data source:       {}\n\
         Ingestion job:     {}\n\
         Retrieved chunks:  {}\n\
         Agent:             {}\n\
         Alias:             {}\n\
         \n\
         {}\n",
        outcome.collection_arn,
        outcome.knowledge_base_id,
        outcome.data_source_id,
        outcome.ingestion_job_id,
        outcome.retrieved_chunks,
        outcome.agent_id,
        outcome.alias_id,
        answer
    )
}
