//! Agent, alias and action group records

use std::collections::HashMap;

/// Status values reported for agents
pub mod agent_status {
    pub const NOT_PREPARED: &str = "NOT_PREPARED";
    pub const PREPARED: &str = "PREPARED";
    pub const FAILED: &str = "FAILED";
    pub const DELETING: &str = "DELETING";
    pub const DELETED: &str = "DELETED";
    pub const UNKNOWN: &str = "UNKNOWN";
}

/// Status values reported for agent aliases
pub mod alias_status {
    pub const PREPARED: &str = "PREPARED";
    pub const READY: &str = "READY";
    pub const FAILED: &str = "FAILED";
}

/// State values reported for action groups
pub mod action_group_state {
    pub const ENABLED: &str = "ENABLED";
}

/// Agent version that management calls operate on before an alias pins one
pub const DRAFT_VERSION: &str = "DRAFT";

/// Built-in action groups the demo agent enables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinActionGroup {
    UserInput,
    CodeInterpreter,
}

impl BuiltinActionGroup {
    pub const ALL: [BuiltinActionGroup; 2] = [Self::UserInput, Self::CodeInterpreter];

    /// Parent action group signature understood by the provider
    pub fn signature(&self) -> &'static str {
        match self {
            Self::UserInput => "AMAZON.UserInput",
            Self::CodeInterpreter => "AMAZON.CodeInterpreter",
        }
    }

    pub fn action_group_name(&self) -> &'static str {
        match self {
            Self::UserInput => "UserInputAction",
            Self::CodeInterpreter => "CodeInterpreterAction",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UserInput => "UserInput",
            Self::CodeInterpreter => "CodeInterpreter",
        }
    }
}

/// Inference parameters for an overridden orchestration prompt
#[derive(Debug, Clone, PartialEq)]
pub struct PromptInference {
    pub maximum_length: i32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    pub stop_sequences: Vec<String>,
}

impl Default for PromptInference {
    fn default() -> Self {
        Self {
            maximum_length: 4000,
            temperature: 0.5,
            top_p: 0.9,
            top_k: 250,
            stop_sequences: Vec::new(),
        }
    }
}

/// Orchestration prompt override
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationPrompt {
    pub base_prompt_template: String,
    pub inference: PromptInference,
}

/// Session-summary memory settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMemory {
    pub max_recent_sessions: i32,
    pub storage_days: i32,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self {
            max_recent_sessions: 3,
            storage_days: 1,
        }
    }
}

/// Request to create a conversational agent
#[derive(Debug, Clone)]
pub struct CreateAgentRequest {
    pub name: String,
    pub description: String,
    pub role_arn: String,
    pub instruction: String,
    pub foundation_model: String,
    pub idle_session_ttl_seconds: i32,
    pub memory: SessionMemory,
    pub orchestration_prompt: Option<OrchestrationPrompt>,
}

/// A chunk returned by knowledge base retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RetrievedChunk {
    /// The first `max_chars` characters of the chunk text, trimmed
    pub fn preview(&self, max_chars: usize) -> String {
        self.text
            .chars()
            .take(max_chars)
            .collect::<String>()
            .trim()
            .to_string()
    }
}
