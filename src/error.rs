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

//! Typed errors for the service modules.
//!
//! Command glue uses `anyhow`; the modules below the HTTP layer return these
//! so handlers can choose a status code per variant.

/// Failures talking to the headless CMS
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error(
        "Missing Contentful env vars (CONTENTFUL_SPACE_ID, CONTENTFUL_ENV, CONTENTFUL_CDA_TOKEN)."
    )]
    MissingConfig,

    #[error("CMS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS returned status {0}")]
    Status(u16),

    /// GraphQL-level `errors` array, serialized as received
    #[error("CMS query error: {0}")]
    Query(String),

    #[error("CMS response could not be decoded: {0}")]
    Decode(String),
}

/// Failures of a single chat-completions call
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider body is logged where it is received, never carried here
    #[error("LLM provider error {0}")]
    Status(u16),

    #[error("LLM response could not be decoded: {0}")]
    Decode(String),

    #[error("LLM returned no choices")]
    EmptyResponse,
}

/// Failures of a whole chat run
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Missing LLM API key")]
    MissingApiKey,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Knowledge(#[from] CmsError),

    #[error("Model requested unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Model kept requesting tools after {0} rounds")]
    ToolRoundsExceeded(usize),
}

impl ChatError {
    /// Configuration problems as opposed to upstream failures
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ChatError::MissingApiKey | ChatError::Knowledge(CmsError::MissingConfig)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message() {
        assert_eq!(ChatError::MissingApiKey.to_string(), "Missing LLM API key");
        assert!(ChatError::MissingApiKey.is_config());
    }

    #[test]
    fn test_transparent_llm_error() {
        let err: ChatError = LlmError::Status(429).into();
        assert_eq!(err.to_string(), "LLM provider error 429");
        assert!(!err.is_config());
    }
}
