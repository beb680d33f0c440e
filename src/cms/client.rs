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

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::CmsConfig;
use crate::error::CmsError;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Value>,
}

/// GraphQL client for the content delivery and preview APIs
#[derive(Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    config: CmsConfig,
}

impl CmsClient {
    pub fn new(http: reqwest::Client, config: CmsConfig) -> Self {
        Self { http, config }
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size.max(1)
    }

    /// Preview requests use the preview token when one is configured
    fn token(&self, preview: bool) -> Option<&str> {
        let token = match (&self.config.preview_token, preview) {
            (Some(p), true) if !p.is_empty() => p.as_str(),
            _ => self.config.delivery_token.as_str(),
        };
        (!token.is_empty()).then_some(token)
    }

    /// Run a query and decode its `data` object into `T`
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        preview: bool,
    ) -> Result<T, CmsError> {
        let token = self.token(preview);
        let token = match token {
            Some(t) if !self.config.space_id.is_empty() && !self.config.environment.is_empty() => {
                t
            }
            _ => return Err(CmsError::MissingConfig),
        };

        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), preview, "CMS query");
        if !status.is_success() {
            return Err(CmsError::Status(status.as_u16()));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| CmsError::Decode(e.to_string()))?;

        if let Some(errors) = body.errors.filter(|e| !e.is_null()) {
            return Err(CmsError::Query(errors.to_string()));
        }

        serde_json::from_value(body.data.unwrap_or(Value::Null))
            .map_err(|e| CmsError::Decode(e.to_string()))
    }
}
