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

//! Page cache invalidation.
//!
//! Paths arrive in a JSON body (`{path}` / `{paths:[...]}`) or in the query
//! string (`path=`, `paths=` as a JSON array or single value). The body wins
//! when it yields at least one usable path.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::AppState;
use crate::constants::{HEADER_REVALIDATE_TOKEN, HOME_SLUG, NO_STORE, NS_PAGE};

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    secret: Option<String>,
    path: Option<String>,
    paths: Option<String>,
}

pub async fn revalidate(
    State(state): State<AppState>,
    Query(params): Query<RevalidateQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(required) = state
        .config
        .revalidate
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        let provided = params
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                headers
                    .get(HEADER_REVALIDATE_TOKEN)
                    .and_then(|v| v.to_str().ok())
            });
        if !provided.is_some_and(|p| secrets_match(p, required)) {
            warn!("Revalidate rejected: invalid secret");
            return respond(
                StatusCode::UNAUTHORIZED,
                json!({ "revalidated": false, "error": "Invalid secret" }),
            );
        }
    }

    let mut paths = paths_from_body(&body);
    if paths.is_empty() {
        paths = paths_from_query(&params);
    }
    if paths.is_empty() {
        return respond(
            StatusCode::BAD_REQUEST,
            json!({ "revalidated": false, "error": "Provide a path or paths to revalidate" }),
        );
    }

    let mut revalidated = Vec::new();
    let mut failed = Vec::new();
    for path in paths {
        let slug = slug_for_path(&path);
        if is_valid_slug(slug) {
            state.cache.invalidate(NS_PAGE, slug);
            revalidated.push(path);
        } else {
            failed.push(path);
        }
    }

    let ok = failed.is_empty();
    info!(
        revalidated = revalidated.len(),
        failed = failed.len(),
        cached_entries = state.cache.len(),
        "Pages revalidated"
    );
    respond(
        if ok {
            StatusCode::OK
        } else {
            StatusCode::MULTI_STATUS
        },
        json!({
            "revalidated": ok,
            "paths": revalidated,
            "failed": failed,
            "now": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

fn respond(status: StatusCode, body: Value) -> Response {
    (status, [(CACHE_CONTROL, NO_STORE)], Json(body)).into_response()
}

/// Compare digests so the check does not depend on where strings diverge
fn secrets_match(provided: &str, required: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(required.as_bytes())
}

fn paths_from_body(body: &[u8]) -> Vec<String> {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return Vec::new();
    };
    let candidate = value.get("paths").or_else(|| value.get("path"));
    candidate.map(normalize_paths).unwrap_or_default()
}

fn paths_from_query(params: &RevalidateQuery) -> Vec<String> {
    if let Some(raw) = params.paths.as_deref().filter(|s| !s.is_empty()) {
        let candidate =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        return normalize_paths(&candidate);
    }
    params
        .path
        .as_deref()
        .map(|p| normalize_paths(&Value::String(p.to_string())))
        .unwrap_or_default()
}

/// Strings only; trimmed, bare slugs prefixed with `/`, deduplicated in
/// order, anything else not starting with `/` dropped
pub fn normalize_paths(candidate: &Value) -> Vec<String> {
    let raw: Vec<&str> = match candidate {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let mut out: Vec<String> = Vec::new();
    for item in raw {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        let path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else if !trimmed.contains('/') {
            format!("/{}", trimmed)
        } else {
            continue;
        };
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

/// `/` is the home page; otherwise the last non-empty segment
pub fn slug_for_path(path: &str) -> &str {
    path.split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .unwrap_or(HOME_SLUG)
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
