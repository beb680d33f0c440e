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

//! CMS-backed lists for the chat widget. Upstream failures degrade to an
//! empty list so the widget still renders.

use std::future::Future;

use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::{debug, warn};

use super::AppState;
use crate::cms::{list_ctas, list_faq_suggestions, list_featured_pages};
use crate::constants::{LIST_CACHE_CONTROL, NS_CTAS, NS_FAQ_SUGGESTIONS, NS_FEATURED_PAGES};
use crate::error::CmsError;

const LIST_KEY: &str = "published";

async fn cached_list<T, F, Fut>(state: &AppState, namespace: &str, load: F) -> Vec<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, CmsError>>,
{
    if let Some(hit) = state.cache.get::<Vec<T>>(namespace, LIST_KEY) {
        debug!(namespace, items = hit.len(), "List cache hit");
        return hit;
    }

    match load().await {
        Ok(items) => {
            state.cache.set(
                namespace,
                LIST_KEY,
                items.clone(),
                state.config.cache.list_ttl_secs,
            );
            items
        }
        Err(e) => {
            warn!(namespace, error = %e, "List fetch failed, serving empty list");
            Vec::new()
        }
    }
}

pub async fn suggestions(State(state): State<AppState>) -> impl IntoResponse {
    let items = cached_list(&state, NS_FAQ_SUGGESTIONS, || {
        list_faq_suggestions(&state.cms, false)
    })
    .await;
    (
        [(CACHE_CONTROL, LIST_CACHE_CONTROL)],
        Json(json!({ "suggestions": items })),
    )
}

pub async fn featured_pages(State(state): State<AppState>) -> impl IntoResponse {
    let items = cached_list(&state, NS_FEATURED_PAGES, || {
        list_featured_pages(&state.cms, false)
    })
    .await;
    (
        [(CACHE_CONTROL, LIST_CACHE_CONTROL)],
        Json(json!({ "items": items })),
    )
}

pub async fn ctas(State(state): State<AppState>) -> impl IntoResponse {
    let items = cached_list(&state, NS_CTAS, || list_ctas(&state.cms, false)).await;
    (
        [(CACHE_CONTROL, LIST_CACHE_CONTROL)],
        Json(json!({ "items": items })),
    )
}
