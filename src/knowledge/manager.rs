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

use std::sync::Arc;

use tracing::debug;

use crate::cache::TtlCache;
use crate::cms::{list_knowledge_base, CmsClient};
use crate::config::KnowledgeConfig;
use crate::constants::NS_KNOWLEDGE_BASE;
use crate::error::CmsError;
use crate::knowledge::assembler::assemble;
use crate::knowledge::ranker::rank;
use crate::knowledge::types::{ContextDoc, KbEntry, RankedEntry};

/// Cached access to the knowledge base plus retrieval over it
#[derive(Clone)]
pub struct KnowledgeManager {
    config: KnowledgeConfig,
    cms: CmsClient,
    cache: TtlCache,
}

impl KnowledgeManager {
    pub fn new(config: KnowledgeConfig, cms: CmsClient, cache: TtlCache) -> Self {
        Self { config, cms, cache }
    }

    /// All entries, served from cache until the TTL runs out
    pub async fn entries(&self, preview: bool) -> Result<Arc<Vec<KbEntry>>, CmsError> {
        let key = if preview { "preview" } else { "published" };
        if let Some(entries) = self.cache.get::<Arc<Vec<KbEntry>>>(NS_KNOWLEDGE_BASE, key) {
            debug!(count = entries.len(), "Knowledge base cache hit");
            return Ok(entries);
        }

        let entries = Arc::new(
            list_knowledge_base(&self.cms, preview, self.config.max_doc_chars).await?,
        );
        self.cache.set(
            NS_KNOWLEDGE_BASE,
            key,
            entries.clone(),
            self.config.cache_ttl_secs,
        );
        Ok(entries)
    }

    pub async fn rank(&self, query: &str) -> Result<Vec<RankedEntry>, CmsError> {
        let entries = self.entries(false).await?;
        Ok(rank(&entries, query))
    }

    /// Rank against `query` and assemble the prompt context.
    /// `limit` overrides the configured document count when at least 1.
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ContextDoc>, CmsError> {
        let ranked = self.rank(query).await?;
        let max_docs = limit.filter(|l| *l >= 1).unwrap_or(self.config.max_docs);
        let docs = assemble(
            &ranked,
            max_docs,
            self.config.max_context_chars,
            self.config.per_doc_chars,
        );
        debug!(
            query_len = query.len(),
            ranked = ranked.len(),
            selected = docs.len(),
            "Knowledge search"
        );
        Ok(docs)
    }
}
