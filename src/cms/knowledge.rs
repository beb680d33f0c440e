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

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::CmsClient;
use super::richtext::flatten_rich_text;
use crate::error::CmsError;
use crate::knowledge::types::KbEntry;

const KNOWLEDGE_BASE_QUERY: &str = r#"
query ChatbotKnowledgeBase($preview: Boolean = false, $limit: Int = 200, $skip: Int = 0) {
  chatbotKnowledgeBaseCollection(limit: $limit, skip: $skip, preview: $preview) {
    total
    items {
      contentName
      sourceUrl
      content { json }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseData {
    chatbot_knowledge_base_collection: Option<KnowledgeBaseCollection>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgeBaseCollection {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    items: Vec<KnowledgeBaseItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseItem {
    content_name: Option<String>,
    source_url: Option<String>,
    content: Option<Value>,
}

/// Load every knowledge-base record, following pagination until `total`
/// entries were seen or a page comes back empty.
pub async fn list_knowledge_base(
    client: &CmsClient,
    preview: bool,
    max_doc_chars: usize,
) -> Result<Vec<KbEntry>, CmsError> {
    let page_size = client.page_size();

    let first = fetch_page(client, preview, page_size, 0).await?;
    let total = first.total.unwrap_or(0) as usize;
    let mut items = first.items;
    let mut fetched = items.len();

    while fetched < total {
        let next = fetch_page(client, preview, page_size, fetched).await?;
        if next.items.is_empty() {
            break;
        }
        fetched += next.items.len();
        items.extend(next.items);
    }

    let entries: Vec<KbEntry> = items
        .into_iter()
        .filter_map(|item| to_entry(item, max_doc_chars))
        .collect();

    info!(total, fetched, kept = entries.len(), "Knowledge base loaded");
    Ok(entries)
}

async fn fetch_page(
    client: &CmsClient,
    preview: bool,
    limit: usize,
    skip: usize,
) -> Result<KnowledgeBaseCollection, CmsError> {
    debug!(limit, skip, "Fetching knowledge base page");
    let data: KnowledgeBaseData = client
        .query(
            KNOWLEDGE_BASE_QUERY,
            json!({ "preview": preview, "limit": limit, "skip": skip }),
            preview,
        )
        .await?;
    Ok(data.chatbot_knowledge_base_collection.unwrap_or_default())
}

fn to_entry(item: KnowledgeBaseItem, max_doc_chars: usize) -> Option<KbEntry> {
    let name = item.content_name.unwrap_or_default().trim().to_string();
    let text = item
        .content
        .map(|c| flatten_rich_text(&c, max_doc_chars))
        .unwrap_or_default();
    if name.is_empty() || text.is_empty() {
        return None;
    }
    Some(KbEntry {
        name,
        source_url: item.source_url.filter(|u| !u.is_empty()),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::client::tests::{test_config, ENDPOINT_PATH};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(i: usize) -> Value {
        json!({
            "contentName": format!("Doc {i}"),
            "sourceUrl": format!("https://example.com/{i}"),
            "content": {"json": {"nodeType": "document", "content": [
                {"nodeType": "text", "value": format!("Body of doc {i}")}
            ]}}
        })
    }

    fn page(total: usize, range: std::ops::Range<usize>) -> Value {
        json!({"data": {"chatbotKnowledgeBaseCollection": {
            "total": total,
            "items": range.map(item).collect::<Vec<_>>()
        }}})
    }

    #[tokio::test]
    async fn test_pagination_makes_three_requests_for_450() {
        let server = MockServer::start().await;
        for (skip, range) in [(0, 0..200), (200, 200..400), (400, 400..450)] {
            Mock::given(method("POST"))
                .and(path(ENDPOINT_PATH))
                .and(body_partial_json(
                    json!({"variables": {"skip": skip, "limit": 200}}),
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(page(450, range)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        let entries = list_knowledge_base(&client, false, 8000).await.unwrap();
        assert_eq!(entries.len(), 450);
        assert_eq!(entries[0].name, "Doc 0");
        assert_eq!(entries[449].text, "Body of doc 449");
    }

    #[tokio::test]
    async fn test_empty_page_stops_early() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"skip": 0}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(1000, 0..200)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"skip": 200}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(1000, 0..0)))
            .expect(1)
            .mount(&server)
            .await;

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        let entries = list_knowledge_base(&client, false, 8000).await.unwrap();
        assert_eq!(entries.len(), 200);
    }

    #[tokio::test]
    async fn test_entries_without_name_or_text_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "chatbotKnowledgeBaseCollection": {"total": 3, "items": [
                    {"contentName": "  ", "content": {"json": {"value": "orphan"}}},
                    {"contentName": "Empty", "content": {"json": {"content": []}}},
                    {"contentName": " Shipping ", "sourceUrl": "", "content": {"json": {"value": "Ships   fast"}}}
                ]}
            }})))
            .mount(&server)
            .await;

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        let entries = list_knowledge_base(&client, false, 8000).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Shipping");
        assert_eq!(entries[0].text, "Ships fast");
        assert!(entries[0].source_url.is_none());
    }
}
