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

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::CmsClient;
use crate::error::CmsError;

/// A named link, used for chat CTAs and featured pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub name: String,
    pub url: String,
}

const CTAS_QUERY: &str = r#"
query ChatbotCTAs($preview: Boolean = false) {
  chatbotCtAsCollection(limit: 200, preview: $preview) {
    items { ctaName ctaUrl }
  }
}"#;

const FEATURED_PAGES_QUERY: &str = r#"
query ChatbotFeaturedPages($preview: Boolean = false) {
  chatbotFeaturedPagesCollection(limit: 200, preview: $preview) {
    items { pageName pageUrl }
  }
}"#;

const FAQS_QUERY: &str = r#"
query ChatbotFaqs($preview: Boolean = false) {
  chatbotFaQsCollection(limit: 200, preview: $preview) {
    items { question }
  }
}"#;

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CtasData {
    chatbot_ct_as_collection: Option<Collection<CtaItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CtaItem {
    cta_name: Option<String>,
    cta_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeaturedPagesData {
    chatbot_featured_pages_collection: Option<Collection<FeaturedPageItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeaturedPageItem {
    page_name: Option<String>,
    page_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaqsData {
    #[serde(rename = "chatbotFaQsCollection")]
    chatbot_faqs_collection: Option<Collection<FaqItem>>,
}

#[derive(Debug, Deserialize)]
struct FaqItem {
    question: Option<String>,
}

fn link(name: Option<String>, url: Option<String>) -> Option<LinkItem> {
    let name = name.unwrap_or_default();
    let url = url.unwrap_or_default();
    (!name.is_empty() && !url.is_empty()).then_some(LinkItem { name, url })
}

pub async fn list_ctas(client: &CmsClient, preview: bool) -> Result<Vec<LinkItem>, CmsError> {
    let data: CtasData = client
        .query(CTAS_QUERY, json!({ "preview": preview }), preview)
        .await?;
    Ok(data
        .chatbot_ct_as_collection
        .map(|c| c.items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| link(i.cta_name, i.cta_url))
        .collect())
}

pub async fn list_featured_pages(
    client: &CmsClient,
    preview: bool,
) -> Result<Vec<LinkItem>, CmsError> {
    let data: FeaturedPagesData = client
        .query(FEATURED_PAGES_QUERY, json!({ "preview": preview }), preview)
        .await?;
    Ok(data
        .chatbot_featured_pages_collection
        .map(|c| c.items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| link(i.page_name, i.page_url))
        .collect())
}

/// FAQ questions, trimmed, with blanks and repeats removed
pub async fn list_faq_suggestions(
    client: &CmsClient,
    preview: bool,
) -> Result<Vec<String>, CmsError> {
    let data: FaqsData = client
        .query(FAQS_QUERY, json!({ "preview": preview }), preview)
        .await?;
    let mut seen = HashSet::new();
    Ok(data
        .chatbot_faqs_collection
        .map(|c| c.items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| {
            let q = i.question.unwrap_or_default().trim().to_string();
            (!q.is_empty() && seen.insert(q.clone())).then_some(q)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::client::tests::test_config;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_faq_suggestions_trimmed_and_deduped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("chatbotFaQsCollection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "chatbotFaQsCollection": {"items": [
                    {"question": " How much? "},
                    {"question": "How much?"},
                    {"question": ""},
                    {"question": null},
                    {"question": "Do you ship?"}
                ]}
            }})))
            .mount(&server)
            .await;

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        let faqs = list_faq_suggestions(&client, false).await.unwrap();
        assert_eq!(faqs, vec!["How much?", "Do you ship?"]);
    }

    #[tokio::test]
    async fn test_ctas_require_name_and_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("chatbotCtAsCollection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "chatbotCtAsCollection": {"items": [
                    {"ctaName": "Book a demo", "ctaUrl": "/demo"},
                    {"ctaName": "No url"},
                    {"ctaUrl": "/nameless"}
                ]}
            }})))
            .mount(&server)
            .await;

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        let ctas = list_ctas(&client, false).await.unwrap();
        assert_eq!(
            ctas,
            vec![LinkItem {
                name: "Book a demo".into(),
                url: "/demo".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_featured_pages_missing_collection_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let client = CmsClient::new(reqwest::Client::new(), test_config(&server));
        assert!(list_featured_pages(&client, false).await.unwrap().is_empty());
    }
}
