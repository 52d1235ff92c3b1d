//! Infrastructure layer - AWS clients, logging and terminal I/O

pub mod aws;
pub mod bedrock;
pub mod logging;
pub mod opensearch;
pub mod prompt;

pub use bedrock::{BedrockAgentClient, BedrockRuntimeClient};
pub use opensearch::{OpenSearchServerlessClient, SignedIndexClient};
pub use prompt::StdinConfirmation;
