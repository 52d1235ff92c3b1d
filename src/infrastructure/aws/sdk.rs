use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use tracing::{debug, info};

use crate::config::AwsConfig;
use crate::domain::DomainError;

/// Loads the shared SDK configuration.
///
/// `region_override` (the `--region` flag) wins over the configured region. Every
/// client built from the result gets connect/read timeouts and adaptive retries.
pub async fn load_sdk_config(config: &AwsConfig, region_override: Option<&str>) -> SdkConfig {
    let region = region_override
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(&config.region)
        .to_string();

    let timeouts = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .build();

    let retries = RetryConfig::adaptive().with_max_attempts(config.max_attempts.max(1));

    debug!(
        region = %region,
        connect_timeout_secs = config.connect_timeout_secs,
        read_timeout_secs = config.read_timeout_secs,
        max_attempts = config.max_attempts,
        "Loading AWS configuration"
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region))
        .timeout_config(timeouts)
        .retry_config(retries)
        .load()
        .await
}

/// Resolves credentials once so a missing profile fails before any API call
pub async fn verify_credentials(sdk_config: &SdkConfig) -> Result<(), DomainError> {
    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        DomainError::credential("No AWS credentials provider is configured")
    })?;

    let credentials = provider.provide_credentials().await.map_err(|e| {
        DomainError::credential(format!("AWS credentials not found or invalid: {}", e))
    })?;

    info!(
        region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("unknown"),
        access_key_prefix = %credentials.access_key_id().chars().take(4).collect::<String>(),
        "AWS credentials resolved"
    );

    Ok(())
}
