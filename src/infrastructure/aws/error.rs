use std::error::Error;
use std::fmt::Debug;

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use crate::domain::DomainError;

const CONFLICT_CODE: &str = "ConflictException";

/// Maps an SDK error onto the domain buckets.
///
/// Timeouts become `Timeout`, a `ConflictException` code becomes `Conflict`, and
/// everything else becomes `Provider` with the full error chain plus the service
/// message, so callers can match on known substrings.
pub fn map_sdk_error<E, R>(provider: &str, err: SdkError<E, R>) -> DomainError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let mut message = DisplayErrorContext(&err).to_string();

    if let Some(service_message) = err.as_service_error().and_then(|e| e.message()) {
        if !message.contains(service_message) {
            message = format!("{}: {}", message, service_message);
        }
    }

    match &err {
        SdkError::TimeoutError(_) => return DomainError::timeout(message),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            return DomainError::timeout(message)
        }
        _ => {}
    }

    if err.as_service_error().and_then(|e| e.code()) == Some(CONFLICT_CODE) {
        return DomainError::conflict(message);
    }

    DomainError::provider(provider, message)
}

/// Maps an SDK builder error (missing required field)
pub fn build_error(provider: &str, what: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::provider(provider, format!("Failed to build {}: {}", what, err))
}
