//! Domain layer - resource models, provider traits and the cleanup/provision workflows

pub mod agent;
pub mod cleanup;
pub mod error;
pub mod knowledge_base;
pub mod provision;
pub mod vector_store;
pub mod wait;

pub use cleanup::{CleanupConfig, CleanupOutcome, CleanupReport, Confirmation, KnowledgeBaseCleaner};
pub use error::DomainError;
pub use provision::{ProvisionClients, ProvisionConfig, ProvisionOutcome, Provisioner};
pub use wait::{wait_for, with_deadline, PollStatus, StatusTarget, WaitPolicy};
