// Copyright 2025 Muvon Un Limited
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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub upstream_timeout_secs: u64,
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            upstream_timeout_secs: 30,
            cors_allow_any: true,
        }
    }
}

/// Headless CMS (GraphQL content API) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub endpoint_base: String,
    pub space_id: String,
    pub environment: String,
    pub delivery_token: String,
    pub preview_token: Option<String>,
    pub page_size: usize,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint_base: "https://graphql.contentful.com".to_string(),
            space_id: String::new(),
            environment: "master".to_string(),
            delivery_token: String::new(),
            preview_token: None,
            page_size: 200,
        }
    }
}

impl CmsConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/content/v1/spaces/{}/environments/{}",
            self.endpoint_base.trim_end_matches('/'),
            self.space_id,
            self.environment
        )
    }
}

/// Chat-completions provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tool_rounds: usize,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tool_rounds: 3,
            temperature: None,
        }
    }
}

/// Knowledge-base loading and context budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub max_doc_chars: usize,
    pub max_docs: usize,
    pub per_doc_chars: usize,
    pub max_context_chars: usize,
    pub cache_ttl_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            max_doc_chars: 8000,
            max_docs: 3,
            per_doc_chars: 800,
            max_context_chars: 5000,
            cache_ttl_secs: 600,
        }
    }
}

/// Chunked replay of the final answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub chunk_size: usize,
    pub delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            delay_ms: 10,
        }
    }
}

impl StreamConfig {
    pub const MIN_CHUNK: usize = 16;
    pub const MAX_CHUNK: usize = 256;
    pub const MAX_DELAY_MS: u64 = 80;

    /// Chunk size clamped to the supported range
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.clamp(Self::MIN_CHUNK, Self::MAX_CHUNK)
    }

    pub fn effective_delay_ms(&self) -> u64 {
        self.delay_ms.min(Self::MAX_DELAY_MS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown as produced by the model
    #[default]
    Text,
    /// Markdown rendered to sanitized HTML
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "markdown" | "plain" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            other => anyhow::bail!("Unknown output format: {}", other),
        }
    }
}

/// Chat answer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub output_format: OutputFormat,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            system_prompt: [
                "You are a helpful assistant for this website.",
                "Use ONLY knowledge returned by the get_kb_chunks function. If none is relevant, say you don't know.",
                "Respond in concise Markdown.",
            ]
            .join("\n"),
        }
    }
}

/// External numeric data providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub openweather_base: String,
    pub worldbank_base: String,
    pub openweather_api_key: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            openweather_base: "https://api.openweathermap.org".to_string(),
            worldbank_base: "https://api.worldbank.org".to_string(),
            openweather_api_key: None,
        }
    }
}

/// Lifetimes of cached CMS-derived responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub list_ttl_secs: u64,
    pub page_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl_secs: 300,
            page_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RevalidateConfig {
    /// Shared secret; when unset the endpoint is open
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write daily-rotated JSON logs here instead of the console
    pub directory: Option<String>,
    pub json: bool,
}

/// Main configuration for sitechat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cms: CmsConfig,
    pub llm: LlmConfig,
    pub knowledge: KnowledgeConfig,
    pub stream: StreamConfig,
    pub chat: ChatConfig,
    pub metrics: MetricsConfig,
    pub cache: CacheConfig,
    pub revalidate: RevalidateConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from config.toml file, then apply environment overrides.
    /// An explicit path wins; otherwise the system config directory is used and
    /// seeded from the embedded template on first run.
    ///
    /// Overrides that could not be applied are returned rather than logged,
    /// since logging is configured from the result.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Vec<RejectedOverride>)> {
        let mut config = match explicit {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                toml::from_str::<Self>(&content)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::load_system()?,
        };

        let rejected = config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok((config, rejected))
    }

    fn load_system() -> Result<Self> {
        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Config doesn't exist, create from template
            let template_content = include_str!("../config-templates/default.toml");
            let config: Self = toml::from_str(template_content)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, template_content)?;

            Ok(config)
        }
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests. Values that do not parse are skipped
    /// and reported back.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Vec<RejectedOverride>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut rejected = Vec::new();

        if let Some(v) = text("SITECHAT_BIND") {
            self.server.bind = v;
        }

        if let Some(v) = text("CONTENTFUL_SPACE_ID") {
            self.cms.space_id = v;
        }
        if let Some(v) = text("CONTENTFUL_ENV") {
            self.cms.environment = v;
        }
        if let Some(v) = text("CONTENTFUL_CDA_TOKEN") {
            self.cms.delivery_token = v;
        }
        if let Some(v) = text("CONTENTFUL_CPA_TOKEN") {
            self.cms.preview_token = Some(v);
        }

        if let Some(v) = text("OPENAI_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = text("OPENAI_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = text("OPENAI_MODEL") {
            self.llm.model = v;
        }

        if let Some(v) = text("OPENWEATHER_API_KEY") {
            self.metrics.openweather_api_key = Some(v);
        }

        if let Some(v) = parse_num(&text, &mut rejected, "KB_DOCS_LIMIT") {
            self.knowledge.max_docs = v;
        }
        if let Some(v) = parse_num(&text, &mut rejected, "KB_PER_DOC_CHARS") {
            self.knowledge.per_doc_chars = v;
        }
        if let Some(v) = parse_num(&text, &mut rejected, "KB_MAX_CONTEXT_CHARS") {
            self.knowledge.max_context_chars = v;
        }
        if let Some(v) = parse_num(&text, &mut rejected, "KB_CACHE_TTL") {
            self.knowledge.cache_ttl_secs = v;
        }

        if let Some(v) = parse_num(&text, &mut rejected, "STREAM_CHUNK_SIZE") {
            self.stream.chunk_size = v;
        }
        if let Some(v) = parse_num(&text, &mut rejected, "STREAM_DELAY_MS") {
            self.stream.delay_ms = v;
        }

        if let Some(v) = text("CHAT_OUTPUT_FORMAT") {
            match v.parse() {
                Ok(format) => self.chat.output_format = format,
                Err(_) => rejected.push(RejectedOverride::new("CHAT_OUTPUT_FORMAT", v)),
            }
        }

        if let Some(v) = text("REVALIDATE_SECRET") {
            self.revalidate.secret = Some(v);
        }

        if let Some(v) = text("SITECHAT_LOG_DIR") {
            self.logging.directory = Some(v);
        }
        if let Some(v) = text("SITECHAT_LOG_JSON") {
            self.logging.json = matches!(v.as_str(), "1" | "true" | "yes");
        }

        rejected
    }
}

/// An environment override whose value could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    pub key: &'static str,
    pub value: String,
}

impl RejectedOverride {
    fn new(key: &'static str, value: String) -> Self {
        Self { key, value }
    }
}

/// Report skipped overrides once a subscriber is installed
pub fn log_rejected_overrides(rejected: &[RejectedOverride]) {
    for item in rejected {
        warn!(
            key = item.key,
            value = %item.value,
            "Ignoring unparseable environment override"
        );
    }
}

fn parse_num<T, F>(text: &F, rejected: &mut Vec<RejectedOverride>, key: &'static str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = text(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            rejected.push(RejectedOverride::new(key, raw));
            None
        }
    }
}
