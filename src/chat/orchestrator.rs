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

//! Tool-calling chat loop.
//!
//! ```text
//! Idle -> AwaitingModel -> (ToolCallRequested -> ToolExecuting -> AwaitingModel)*
//!      -> StreamingOutput -> Done
//! any  -> Failed
//! ```
//!
//! After `max_tool_rounds` tool round trips the model is asked once more with
//! tools disabled. A tool request at that point fails the run.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::chat::llm::{LlmClient, LlmMessage, ToolCall, ToolDefinition};
use crate::chat::render::render_answer;
use crate::chat::tools::{execute_kb_tool, get_tool_definitions, KnowledgeRetriever};
use crate::config::{ChatConfig, LlmConfig, OutputFormat};
use crate::constants::KB_TOOL_NAME;
use crate::error::ChatError;
use crate::knowledge::assembler::references;
use crate::knowledge::{ContextDoc, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingModel,
    ToolCallRequested,
    ToolExecuting,
    StreamingOutput,
    Done,
    Failed,
}

/// Finished answer ready to be streamed
#[derive(Debug, Clone)]
pub struct ChatAnswer {
    /// Answer after the output transform
    pub body: String,
    pub format: OutputFormat,
    pub references: Vec<Reference>,
    pub tool_rounds: usize,
    /// Every state the run passed through
    pub trace: Vec<ChatState>,
}

struct ChatRun {
    trace: Vec<ChatState>,
}

impl ChatRun {
    fn new() -> Self {
        Self {
            trace: vec![ChatState::Idle],
        }
    }

    fn enter(&mut self, state: ChatState) {
        self.trace.push(state);
    }

    fn fail(&mut self, error: ChatError) -> ChatError {
        self.enter(ChatState::Failed);
        warn!(error = %error, states = ?self.trace, "Chat run failed");
        error
    }
}

pub struct ChatOrchestrator {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn KnowledgeRetriever>,
    system_prompt: String,
    max_tool_rounds: usize,
    output_format: OutputFormat,
}

impl ChatOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        retriever: Arc<dyn KnowledgeRetriever>,
        chat: &ChatConfig,
        llm_config: &LlmConfig,
    ) -> Self {
        Self {
            llm,
            retriever,
            system_prompt: chat.system_prompt.clone(),
            max_tool_rounds: llm_config.max_tool_rounds,
            output_format: chat.output_format,
        }
    }

    pub async fn run(&self, query: &str) -> Result<ChatAnswer, ChatError> {
        let mut run = ChatRun::new();

        if !self.llm.is_configured() {
            return Err(run.fail(ChatError::MissingApiKey));
        }

        let tools = get_tool_definitions();
        let mut messages = vec![
            LlmMessage::system(self.system_prompt.clone()),
            LlmMessage::user(query),
        ];
        let mut rounds = 0usize;
        let mut last_docs = None;

        let text = loop {
            run.enter(ChatState::AwaitingModel);
            let tools_enabled = rounds < self.max_tool_rounds;
            let offered: &[ToolDefinition] = if tools_enabled { &tools[..] } else { &[] };

            let completion = match self.llm.complete(&messages, offered).await {
                Ok(c) => c,
                Err(e) => return Err(run.fail(e.into())),
            };

            if completion.tool_calls.is_empty() {
                break completion.content.unwrap_or_default();
            }

            if !tools_enabled {
                let error = match completion.tool_calls.iter().find(|c| c.name != KB_TOOL_NAME)
                {
                    Some(unknown) => ChatError::UnknownTool(unknown.name.clone()),
                    None => ChatError::ToolRoundsExceeded(rounds),
                };
                return Err(run.fail(error));
            }

            run.enter(ChatState::ToolCallRequested);
            rounds += 1;
            messages.push(LlmMessage::assistant_tool_calls(
                completion.content,
                completion.tool_calls.clone(),
            ));

            run.enter(ChatState::ToolExecuting);
            for call in &completion.tool_calls {
                match self.execute(call).await {
                    Ok((content, docs)) => {
                        if docs.is_some() {
                            last_docs = docs;
                        }
                        messages.push(LlmMessage::tool_result(&call.id, content));
                    }
                    Err(e) => return Err(run.fail(e)),
                }
            }
        };

        run.enter(ChatState::StreamingOutput);
        let refs = last_docs.as_deref().map(references).unwrap_or_default();
        let body = render_answer(&text, self.output_format);
        run.enter(ChatState::Done);

        info!(
            model = self.llm.model(),
            query_len = query.len(),
            tool_rounds = rounds,
            references = refs.len(),
            answer_len = body.len(),
            "Chat answered"
        );

        Ok(ChatAnswer {
            body,
            format: self.output_format,
            references: refs,
            tool_rounds: rounds,
            trace: run.trace,
        })
    }

    async fn execute(
        &self,
        call: &ToolCall,
    ) -> Result<(String, Option<Vec<ContextDoc>>), ChatError> {
        if call.name != KB_TOOL_NAME {
            // reported back so the model can recover
            let content = json!({ "error": format!("Unknown tool '{}'", call.name) }).to_string();
            return Ok((content, None));
        }
        let output = execute_kb_tool(self.retriever.as_ref(), &call.arguments).await?;
        Ok((output.content, output.docs))
    }
}
