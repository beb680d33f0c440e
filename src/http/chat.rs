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

use std::fmt::Write as _;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, error, info};

use super::error::ApiError;
use super::AppState;
use crate::chat::render::content_type;
use crate::chat::stream::replay;
use crate::constants::{CHAT_CACHE_CONTROL, HEADER_KB_REFS, HEADER_KB_TITLE, HEADER_KB_URL};
use crate::knowledge::Reference;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    query: Option<String>,
}

/// `POST /api/chat`: run the tool loop, then replay the answer in chunks
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let query = serde_json::from_slice::<ChatRequest>(&body)
        .ok()
        .and_then(|r| r.query)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'query' in request body"))?;

    info!(query_len = query.len(), "Chat request");

    let answer = state.chat.run(&query).await.map_err(|e| {
        error!(error = %e, config = e.is_config(), "Chat failed");
        ApiError::from(e)
    })?;
    debug!(
        tool_rounds = answer.tool_rounds,
        states = ?answer.trace,
        references = answer.references.len(),
        "Streaming chat answer"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type(answer.format)),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(CHAT_CACHE_CONTROL));
    citation_headers(&mut headers, &answer.references);

    let stream = replay(answer.body, &state.config.stream);
    Ok((headers, Body::from_stream(stream)).into_response())
}

fn citation_headers(headers: &mut HeaderMap, references: &[Reference]) {
    if let Some(top) = references.first() {
        // clients read header values as ASCII; X-KB-Refs still carries the rest
        for (name, value) in [(HEADER_KB_TITLE, &top.title), (HEADER_KB_URL, &top.url)] {
            if !value.is_ascii() {
                continue;
            }
            if let Ok(v) = HeaderValue::from_str(value) {
                headers.insert(name, v);
            }
        }
    }
    if references.is_empty() {
        return;
    }
    if let Some(v) = serde_json::to_string(references)
        .ok()
        .map(|raw| ascii_json(&raw))
        .and_then(|raw| HeaderValue::from_str(&raw).ok())
    {
        headers.insert(HEADER_KB_REFS, v);
    }
}

/// Escape every non-ASCII char of serialized JSON as `\uXXXX`. serde_json only
/// emits such chars inside strings, so the result parses to the same value.
pub fn ascii_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_json_round_trips() {
        let refs = vec![Reference {
            title: "Café 🚀".into(),
            url: "https://site/café".into(),
        }];
        let raw = ascii_json(&serde_json::to_string(&refs).unwrap());
        assert!(raw.is_ascii());
        let back: Vec<Reference> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, refs);
    }

    #[test]
    fn test_citation_headers() {
        let mut headers = HeaderMap::new();
        citation_headers(
            &mut headers,
            &[
                Reference {
                    title: "Pricing".into(),
                    url: "https://site/pricing".into(),
                },
                Reference {
                    title: "Über uns".into(),
                    url: "https://site/about".into(),
                },
            ],
        );
        assert_eq!(headers[HEADER_KB_TITLE], "Pricing");
        assert_eq!(headers[HEADER_KB_URL], "https://site/pricing");
        assert!(headers[HEADER_KB_REFS]
            .to_str()
            .unwrap()
            .contains("\\u00dcber"));

        let mut empty = HeaderMap::new();
        citation_headers(&mut empty, &[]);
        assert!(empty.is_empty());
    }
}
