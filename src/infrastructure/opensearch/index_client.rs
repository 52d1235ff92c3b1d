//! SigV4-signed HTTP client for the collection data plane (service `aoss`)

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    sign, PayloadChecksumKind, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::domain::vector_store::{CollectionEndpoint, IndexCreation, VectorIndexApi};
use crate::domain::DomainError;

const PROVIDER: &str = "opensearch";
const SIGNING_NAME: &str = "aoss";
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

pub struct SignedIndexClient {
    http: reqwest::Client,
    credentials: SharedCredentialsProvider,
}

impl std::fmt::Debug for SignedIndexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedIndexClient").finish_non_exhaustive()
    }
}

impl SignedIndexClient {
    pub fn new(sdk_config: &aws_config::SdkConfig, timeout: Duration) -> Result<Self, DomainError> {
        let credentials = sdk_config
            .credentials_provider()
            .ok_or_else(|| DomainError::credential("No AWS credentials provider is configured"))?;

        Self::with_credentials(credentials, timeout)
    }

    pub fn with_credentials(
        credentials: SharedCredentialsProvider,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, credentials })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        region: &str,
        body: Vec<u8>,
    ) -> Result<(StatusCode, String), DomainError> {
        let credentials = self.credentials.provide_credentials().await.map_err(|e| {
            DomainError::credential(format!("AWS credentials not found or invalid: {}", e))
        })?;
        let identity: Identity = credentials.into();

        let mut settings = SigningSettings::default();
        settings.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(region)
            .name(SIGNING_NAME)
            .time(SystemTime::now())
            .settings(settings)
            .build()
            .map_err(|e| DomainError::internal(format!("Invalid signing parameters: {}", e)))?
            .into();

        let headers = [("content-type", "application/json")];
        let signable = SignableRequest::new(
            method.as_str(),
            url,
            headers.iter().copied(),
            SignableBody::Bytes(&body),
        )
        .map_err(|e| DomainError::internal(format!("Request cannot be signed: {}", e)))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| DomainError::internal(format!("Request signing failed: {}", e)))?
            .into_parts();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header("content-type", "application/json")
            .body(body);

        for (name, value) in instructions.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::timeout(format!("{} {} timed out", method, url))
            } else {
                DomainError::provider(PROVIDER, format!("{} {} failed: {}", method, url, e))
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(method = %method, url, status = status.as_u16(), "Index request finished");

        Ok((status, text))
    }
}

#[async_trait]
impl VectorIndexApi for SignedIndexClient {
    async fn create_index(
        &self,
        endpoint: &CollectionEndpoint,
        index_name: &str,
        definition: Value,
    ) -> Result<IndexCreation, DomainError> {
        let body = serde_json::to_vec(&definition).map_err(|e| {
            DomainError::internal(format!("Failed to serialize index definition: {}", e))
        })?;

        let (status, text) = self
            .send(
                Method::PUT,
                &endpoint.index_url(index_name),
                &endpoint.region,
                body,
            )
            .await?;

        if status == StatusCode::OK {
            return Ok(IndexCreation::Created);
        }

        if status == StatusCode::BAD_REQUEST && text.contains(ALREADY_EXISTS) {
            return Ok(IndexCreation::AlreadyExists);
        }

        Err(DomainError::provider(
            PROVIDER,
            format!("Index creation returned {}: {}", status.as_u16(), text),
        ))
    }

    async fn index_exists(
        &self,
        endpoint: &CollectionEndpoint,
        index_name: &str,
    ) -> Result<bool, DomainError> {
        let (status, text) = self
            .send(
                Method::GET,
                &endpoint.cat_index_url(index_name),
                &endpoint.region,
                Vec::new(),
            )
            .await?;

        match status {
            StatusCode::OK => {
                let indices: Vec<Value> = serde_json::from_str(&text).unwrap_or_default();
                Ok(indices
                    .iter()
                    .any(|entry| entry.get("index").and_then(Value::as_str) == Some(index_name)))
            }
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(DomainError::provider(
                PROVIDER,
                format!("Index lookup returned {}: {}", other.as_u16(), text),
            )),
        }
    }
}
