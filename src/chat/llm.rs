// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Chat-completions provider interface and the OpenAI-compatible client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Function call requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments as sent by the model
    pub arguments: String,
}

/// Tool offered to the model
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One message of the conversation sent to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct LlmMessage {
    pub role: Role,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_call_id: Option<String>,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Assistant turn that requested tools
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn to_wire(&self) -> Value {
        let mut msg = json!({ "role": self.role, "content": self.content });
        if !self.tool_calls.is_empty() {
            msg["tool_calls"] = Value::Array(
                self.tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": { "name": tc.name, "arguments": tc.arguments }
                        })
                    })
                    .collect(),
            );
        }
        if let Some(id) = &self.tool_call_id {
            msg["tool_call_id"] = Value::String(id.clone());
        }
        msg
    }
}

/// Model output for one completion call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model(&self) -> &str;

    /// Whether credentials are present
    fn is_configured(&self) -> bool {
        true
    }

    /// Run one completion. An empty `tools` slice disables tool calling.
    async fn complete(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolDefinition],
    ) -> Result<Completion, LlmError>;
}

pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request_body(&self, messages: &[LlmMessage], tools: &[ToolDefinition]) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages.iter().map(LlmMessage::to_wire).collect::<Vec<_>>(),
        });
        if let Some(t) = self.config.temperature {
            body["temperature"] = json!(t);
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(
                tools
                    .iter()
                    .map(|tool| {
                        json!({
                            "type": "function",
                            "function": {
                                "name": tool.name,
                                "description": tool.description,
                                "parameters": tool.parameters
                            }
                        })
                    })
                    .collect(),
            );
        }
        body
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn complete(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolDefinition],
    ) -> Result<Completion, LlmError> {
        let body = self.build_request_body(messages, tools);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body_text = response.text().await?;
        debug!(status, model = %self.config.model, "Chat completion");

        if !(200..300).contains(&status) {
            warn!(status, body = %body_text, "LLM provider rejected the request");
            return Err(LlmError::Status(status));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&body_text)
            .map_err(|e| LlmError::Decode(format!("Failed to parse response: {}", e)))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(Completion {
            content: message.content,
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    arguments: tc.function.arguments,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(
            reqwest::Client::new(),
            LlmConfig {
                base_url: format!("{}/v1", server.uri()),
                api_key: "sk-test".to_string(),
                ..LlmConfig::default()
            },
        )
    }

    fn kb_tool() -> ToolDefinition {
        ToolDefinition {
            name: "get_kb_chunks".into(),
            description: "lookup".into(),
            parameters: json!({"type": "object"}),
        }
    }

    #[tokio::test]
    async fn test_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"tools": [{"type": "function", "function": {"name": "get_kb_chunks"}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null, "tool_calls": [
                    {"id": "call_1", "type": "function",
                     "function": {"name": "get_kb_chunks", "arguments": "{\"query\":\"sso\"}"}}
                ]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server)
            .complete(&[LlmMessage::user("sso?")], &[kb_tool()])
            .await
            .unwrap();
        assert_eq!(out.content, None);
        assert_eq!(out.tool_calls.len(), 1);
        assert_eq!(out.tool_calls[0].name, "get_kb_chunks");
        assert_eq!(out.tool_calls[0].arguments, "{\"query\":\"sso\"}");
    }

    #[tokio::test]
    async fn test_non_success_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&[LlmMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Status(429)));
        assert!(!err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&[LlmMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[test]
    fn test_wire_format_for_tool_messages() {
        let call = ToolCall {
            id: "c1".into(),
            name: "get_kb_chunks".into(),
            arguments: "{}".into(),
        };
        let assistant = LlmMessage::assistant_tool_calls(None, vec![call]).to_wire();
        assert_eq!(assistant["role"], "assistant");
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "get_kb_chunks");

        let tool = LlmMessage::tool_result("c1", "[]").to_wire();
        assert_eq!(tool, json!({"role": "tool", "content": "[]", "tool_call_id": "c1"}));
    }
}
