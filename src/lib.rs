//! Bedrock KB Ops
//!
//! Operational tooling for AWS Bedrock knowledge bases:
//! - Bulk cleanup of knowledge bases and their data sources, in paced batches
//! - End-to-end provisioning of a demo OpenSearch Serverless collection,
//!   knowledge base and agent

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
