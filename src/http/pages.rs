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

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::ApiError;
use super::AppState;
use crate::cms::blocks::{CalloutData, DEFAULT_CALLOUT_FALLBACK};
use crate::cms::{page_by_slug, Block, Page};
use crate::constants::NS_PAGE;
use crate::metrics::MetricsFetcher;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    preview: Option<String>,
}

impl PageQuery {
    /// `true`, `1` and `yes` turn preview on; anything else is published content
    fn preview(&self) -> bool {
        self.preview.as_deref().is_some_and(|v| {
            matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        })
    }
}

/// `GET /api/pages/{slug}`. Preview requests skip the cache.
pub async fn page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page>, ApiError> {
    let preview = params.map(|Query(q)| q.preview()).unwrap_or(false);
    if !preview {
        if let Some(hit) = state.cache.get::<Page>(NS_PAGE, &slug) {
            debug!(slug = %slug, "Page cache hit");
            return Ok(Json(hit));
        }
    }

    let mut page = match page_by_slug(&state.cms, &slug, preview).await {
        Ok(Some(page)) => page,
        Ok(None) => return Err(ApiError::not_found(format!("Page '{}' not found", slug))),
        Err(e) => {
            warn!(slug = %slug, error = %e, "Page fetch failed");
            return Err(ApiError::bad_gateway(e.to_string()));
        }
    };

    resolve_callouts(&state.metrics, &mut page.sections).await;

    if !preview {
        state
            .cache
            .set(NS_PAGE, &slug, page.clone(), state.config.cache.page_ttl_secs);
    }
    Ok(Json(page))
}

/// Attach live metrics to every product data callout. Lookups run
/// concurrently; a failed one shows the block's fallback text instead.
pub async fn resolve_callouts(metrics: &MetricsFetcher, sections: &mut [Block]) {
    let lookups = sections.iter().enumerate().filter_map(|(i, block)| match block {
        Block::ProductDataCallout {
            data_source,
            location_or_query,
            metric_keys,
            format,
            ..
        } => Some(async move {
            let result = metrics
                .fetch_named(data_source, location_or_query, metric_keys, format.as_deref())
                .await;
            (i, result)
        }),
        _ => None,
    });
    let results = join_all(lookups).await;

    for (i, result) in results {
        let Some(Block::ProductDataCallout {
            fallback_text,
            resolved,
            ..
        }) = sections.get_mut(i)
        else {
            continue;
        };

        *resolved = Some(if result.ok {
            CalloutData {
                ok: true,
                data: result.data,
                as_of: result.as_of,
                display_text: None,
            }
        } else {
            CalloutData {
                ok: false,
                data: None,
                as_of: None,
                display_text: Some(
                    fallback_text
                        .clone()
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_CALLOUT_FALLBACK.to_string()),
                ),
            }
        });
    }
}
