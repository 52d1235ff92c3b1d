//! Agent domain - agents, aliases, action groups and the runtime API

mod admin;
mod entity;
mod runtime;

pub use admin::AgentAdmin;
pub use entity::{
    action_group_state, agent_status, alias_status, BuiltinActionGroup, CreateAgentRequest,
    OrchestrationPrompt, PromptInference, RetrievedChunk, SessionMemory, DRAFT_VERSION,
};
pub use runtime::AgentRuntime;

#[cfg(test)]
pub use admin::MockAgentAdmin;
#[cfg(test)]
pub use runtime::MockAgentRuntime;
