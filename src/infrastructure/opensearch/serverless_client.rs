use async_trait::async_trait;
use aws_sdk_opensearchserverless::types::{AccessPolicyType, CollectionType, SecurityPolicyType};
use aws_sdk_opensearchserverless::Client;

use crate::domain::vector_store::{
    AccessPolicySummary, CollectionAdmin, CollectionSummary, SecurityPolicyKind,
};
use crate::domain::DomainError;
use crate::infrastructure::aws::map_sdk_error;

const PROVIDER: &str = "opensearchserverless";

/// `CollectionAdmin` over the OpenSearch Serverless SDK client
#[derive(Debug, Clone)]
pub struct OpenSearchServerlessClient {
    client: Client,
}

impl OpenSearchServerlessClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

fn security_policy_type(kind: SecurityPolicyKind) -> SecurityPolicyType {
    match kind {
        SecurityPolicyKind::Encryption => SecurityPolicyType::Encryption,
        SecurityPolicyKind::Network => SecurityPolicyType::Network,
    }
}

#[async_trait]
impl CollectionAdmin for OpenSearchServerlessClient {
    async fn create_security_policy(
        &self,
        name: &str,
        kind: SecurityPolicyKind,
        policy: String,
    ) -> Result<(), DomainError> {
        self.client
            .create_security_policy()
            .name(name)
            .r#type(security_policy_type(kind))
            .policy(policy)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn create_access_policy(&self, name: &str, policy: String) -> Result<(), DomainError> {
        self.client
            .create_access_policy()
            .name(name)
            .r#type(AccessPolicyType::Data)
            .policy(policy)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn list_access_policies(
        &self,
        resource: &str,
    ) -> Result<Vec<AccessPolicySummary>, DomainError> {
        let mut policies = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_access_policies()
                .r#type(AccessPolicyType::Data)
                .resource(resource)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| map_sdk_error(PROVIDER, e))?;

            policies.extend(output.access_policy_summaries().iter().filter_map(|p| {
                Some(AccessPolicySummary {
                    name: p.name()?.to_string(),
                    version: p.policy_version()?.to_string(),
                })
            }));

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(policies)
    }

    async fn update_access_policy(
        &self,
        name: &str,
        version: &str,
        policy: String,
    ) -> Result<(), DomainError> {
        self.client
            .update_access_policy()
            .name(name)
            .r#type(AccessPolicyType::Data)
            .policy_version(version)
            .policy(policy)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn create_collection(&self, name: &str) -> Result<(), DomainError> {
        self.client
            .create_collection()
            .name(name)
            .r#type(CollectionType::Vectorsearch)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, DomainError> {
        let mut collections = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_collections()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| map_sdk_error(PROVIDER, e))?;

            collections.extend(output.collection_summaries().iter().filter_map(|c| {
                Some(CollectionSummary {
                    name: c.name()?.to_string(),
                    status: c.status().map(|s| s.as_str()).unwrap_or("UNKNOWN").to_string(),
                    arn: c.arn().unwrap_or_default().to_string(),
                })
            }));

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(collections)
    }
}
