//! End-to-end demo provisioning of a knowledge base backed agent

mod config;
mod pipeline;

pub use config::{ProvisionConfig, ProvisionWaits};
pub use pipeline::{ProvisionClients, ProvisionOutcome, Provisioner};
