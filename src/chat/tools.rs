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

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::chat::llm::ToolDefinition;
use crate::constants::KB_TOOL_NAME;
use crate::error::CmsError;
use crate::knowledge::{ContextDoc, KnowledgeManager, ToolDoc};

/// Source of context documents for the retrieval tool
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, limit: Option<usize>)
        -> Result<Vec<ContextDoc>, CmsError>;
}

#[async_trait]
impl KnowledgeRetriever for KnowledgeManager {
    async fn retrieve(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ContextDoc>, CmsError> {
        self.search(query, limit).await
    }
}

pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: KB_TOOL_NAME.to_string(),
        description: "Search the website knowledge base and return the most relevant documents. Call this before answering any question about the site, its products or policies.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look up, in natural language"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of documents to return"
                }
            },
            "required": ["query"]
        }),
    }]
}

/// Parsed `get_kb_chunks` arguments
#[derive(Debug, Clone, PartialEq)]
pub struct KbToolArgs {
    pub query: String,
    pub limit: Option<usize>,
}

impl KbToolArgs {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(if raw.trim().is_empty() { "{}" } else { raw })
            .map_err(|e| format!("Invalid arguments: {}", e))?;

        let query = value
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| "Missing required parameter: query".to_string())?
            .to_string();

        let limit = value
            .get("limit")
            .and_then(Value::as_f64)
            .filter(|l| l.is_finite())
            .map(|l| l.max(1.0) as usize);

        Ok(Self { query, limit })
    }
}

/// Outcome of one tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Content sent back to the model
    pub content: String,
    /// Documents returned, when the call succeeded
    pub docs: Option<Vec<ContextDoc>>,
}

/// Run the retrieval tool. Bad arguments are reported back to the model
/// as a JSON error rather than failing the chat.
pub async fn execute_kb_tool(
    retriever: &dyn KnowledgeRetriever,
    arguments: &str,
) -> Result<ToolOutput, CmsError> {
    let args = match KbToolArgs::parse(arguments) {
        Ok(args) => args,
        Err(message) => {
            return Ok(ToolOutput {
                content: json!({ "error": message }).to_string(),
                docs: None,
            })
        }
    };

    let docs = retriever.retrieve(&args.query, args.limit).await?;
    debug!(query = %args.query, limit = ?args.limit, docs = docs.len(), "KB tool executed");

    let payload: Vec<ToolDoc> = docs.iter().map(ToolDoc::from).collect();
    let content = serde_json::to_string(&payload).map_err(|e| CmsError::Decode(e.to_string()))?;
    Ok(ToolOutput {
        content,
        docs: Some(docs),
    })
}
