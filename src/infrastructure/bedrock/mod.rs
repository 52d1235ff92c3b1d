//! AWS Bedrock clients - agent control plane and runtime

mod agent_client;
mod runtime_client;

pub use agent_client::BedrockAgentClient;
pub use runtime_client::BedrockRuntimeClient;
