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

//! HTTP surface of the service: chat, live data, CMS lists, pages and cache
//! invalidation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod chat;
pub mod data;
pub mod error;
pub mod lists;
pub mod pages;
pub mod revalidate;


use crate::cache::TtlCache;
use crate::chat::{ChatOrchestrator, KnowledgeRetriever, LlmClient, OpenAiClient};
use crate::cms::CmsClient;
use crate::config::Config;
use crate::constants::{HEADER_KB_REFS, HEADER_KB_TITLE, HEADER_KB_URL};
use crate::knowledge::KnowledgeManager;
use crate::metrics::MetricsFetcher;

/// Shared by every handler; clones share the same cache and clients
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: TtlCache,
    pub cms: CmsClient,
    pub metrics: Arc<MetricsFetcher>,
    pub chat: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = upstream_client(&config)?;
        let cache = TtlCache::new();
        let cms = CmsClient::new(http.clone(), config.cms.clone());
        let knowledge = KnowledgeManager::new(config.knowledge.clone(), cms.clone(), cache.clone());
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(http.clone(), config.llm.clone()));
        let retriever: Arc<dyn KnowledgeRetriever> = Arc::new(knowledge);
        let chat = ChatOrchestrator::new(llm, retriever, &config.chat, &config.llm);

        Ok(Self {
            metrics: Arc::new(MetricsFetcher::new(http, config.metrics.clone())),
            chat: Arc::new(chat),
            config: Arc::new(config),
            cache,
            cms,
        })
    }
}

/// One client for every upstream, bounded by the configured timeout
pub fn upstream_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.upstream_timeout_secs.max(1)))
        .build()
        .context("Failed to build HTTP client")
}

pub fn router(state: AppState) -> Router {
    let allow_any = state.config.server.cors_allow_any;

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/chat", post(chat::chat))
        .route("/api/data/{source}", get(data::live_data))
        .route("/api/suggestions", get(lists::suggestions))
        .route("/api/featured-pages", get(lists::featured_pages))
        .route("/api/cta", get(lists::ctas))
        .route("/api/pages/{slug}", get(pages::page))
        .route(
            "/api/revalidate",
            get(revalidate::revalidate).post(revalidate::revalidate),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if allow_any {
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            HeaderName::from_static(HEADER_KB_TITLE),
            HeaderName::from_static(HEADER_KB_URL),
            HeaderName::from_static(HEADER_KB_REFS),
        ])
        .max_age(Duration::from_secs(3600))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn serve(config: Config) -> Result<()> {
    let bind = config.server.bind.clone();
    let state = AppState::new(config)?;
    let app = router(state);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("listening on {bind}");
    axum::serve(listener, app).await?;
    Ok(())
}
