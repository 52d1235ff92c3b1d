use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types::{KnowledgeBaseQuery, ResponseStream};
use aws_sdk_bedrockagentruntime::Client;
use aws_smithy_types::Document as SmithyDocument;
use tracing::debug;

use crate::domain::agent::{AgentRuntime, RetrievedChunk};
use crate::domain::DomainError;
use crate::infrastructure::aws::map_sdk_error;

const PROVIDER: &str = "bedrock-agent-runtime";

/// `AgentRuntime` over the Bedrock Agent Runtime SDK client
#[derive(Debug, Clone)]
pub struct BedrockRuntimeClient {
    client: Client,
}

impl BedrockRuntimeClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl AgentRuntime for BedrockRuntimeClient {
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query: &str,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        let query = KnowledgeBaseQuery::builder().text(query).build();

        let response = self
            .client
            .retrieve()
            .knowledge_base_id(knowledge_base_id)
            .retrieval_query(query)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        let chunks = response
            .retrieval_results()
            .iter()
            .filter_map(|r| {
                let text = r.content()?.text().to_string();

                let metadata: HashMap<String, serde_json::Value> = r
                    .metadata()
                    .map(|m| {
                        m.iter()
                            .filter_map(|(key, doc)| Some((key.clone(), doc_to_json(doc)?)))
                            .collect()
                    })
                    .unwrap_or_default();

                Some(RetrievedChunk { text, metadata })
            })
            .collect();

        Ok(chunks)
    }

    /// Collects every completion chunk of the response stream into one string
    async fn invoke_agent(
        &self,
        agent_id: &str,
        alias_id: &str,
        session_id: &str,
        input: &str,
    ) -> Result<String, DomainError> {
        let mut output = self
            .client
            .invoke_agent()
            .agent_id(agent_id)
            .agent_alias_id(alias_id)
            .session_id(session_id)
            .input_text(input)
            .send()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?;

        let mut answer = String::new();

        while let Some(event) = output
            .completion
            .recv()
            .await
            .map_err(|e| map_sdk_error(PROVIDER, e))?
        {
            match event {
                ResponseStream::Chunk(part) => {
                    if let Some(bytes) = part.bytes() {
                        answer.push_str(&String::from_utf8_lossy(bytes.as_ref()));
                    }
                }
                other => debug!(event = ?other, "Ignoring non-chunk agent event"),
            }
        }

        Ok(answer)
    }
}

fn doc_to_json(doc: &SmithyDocument) -> Option<serde_json::Value> {
    match doc {
        SmithyDocument::String(s) => Some(serde_json::Value::String(s.clone())),
        SmithyDocument::Number(n) => Some(serde_json::json!(n.to_f64_lossy())),
        SmithyDocument::Bool(b) => Some(serde_json::Value::Bool(*b)),
        SmithyDocument::Null => Some(serde_json::Value::Null),
        SmithyDocument::Array(arr) => Some(serde_json::Value::Array(
            arr.iter().filter_map(doc_to_json).collect(),
        )),
        SmithyDocument::Object(obj) => Some(serde_json::Value::Object(
            obj.iter()
                .filter_map(|(k, v)| Some((k.clone(), doc_to_json(v)?)))
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use aws_smithy_types::Number;

    use super::*;

    #[test]
    fn test_doc_to_json_nested() {
        let doc = SmithyDocument::Object(HashMap::from([
            (
                "x-amz-bedrock-kb-source-uri".to_string(),
                SmithyDocument::String("s3://docs/kb/mappings.pdf".into()),
            ),
            (
                "pages".to_string(),
                SmithyDocument::Array(vec![SmithyDocument::Number(Number::PosInt(3))]),
            ),
        ]));

        let json = doc_to_json(&doc).unwrap();

        assert_eq!(json["x-amz-bedrock-kb-source-uri"], "s3://docs/kb/mappings.pdf");
        assert_eq!(json["pages"][0], 3.0);
    }
}
