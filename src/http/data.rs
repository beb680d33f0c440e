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
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use super::AppState;
use crate::constants::{DATA_ERR_CACHE_CONTROL, DATA_OK_CACHE_CONTROL};
use crate::metrics::parse_metric_keys;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    query: Option<String>,
    metric_keys: Option<String>,
    format: Option<String>,
}

/// `GET /api/data/{source}`: always 200, failures are reported as `ok:false`.
/// A query string that does not deserialize is treated as empty.
pub async fn live_data(
    State(state): State<AppState>,
    Path(source): Path<String>,
    params: Result<Query<DataQuery>, QueryRejection>,
) -> impl IntoResponse {
    let params = params
        .map(|Query(q)| q)
        .unwrap_or_else(|rejection| {
            debug!(error = %rejection, "Unreadable data query");
            DataQuery::default()
        });
    let keys = parse_metric_keys(params.metric_keys.as_deref());
    let result = state
        .metrics
        .fetch_named(
            &source,
            params.query.as_deref().unwrap_or(""),
            &keys,
            params.format.as_deref(),
        )
        .await;

    let cache_control = if result.ok {
        DATA_OK_CACHE_CONTROL
    } else {
        DATA_ERR_CACHE_CONTROL
    };
    ([(CACHE_CONTROL, cache_control)], Json(result))
}
