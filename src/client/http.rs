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

use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::client::session::ChatSession;
use crate::constants::HEADER_KB_REFS;
use crate::knowledge::Reference;

/// Talks to a running chat endpoint and feeds the streamed body into a
/// [`ChatSession`].
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

/// What the server told us about the finished reply
#[derive(Debug, Clone, Default)]
pub struct ReplyMeta {
    pub html: bool,
    pub references: Vec<Reference>,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send `query` and stream the answer into `session`. `on_text` receives
    /// each newly flushed piece of the reply along with the response metadata.
    pub async fn ask<F>(
        &self,
        session: &mut ChatSession,
        query: &str,
        mut on_text: F,
    ) -> Result<ReplyMeta>
    where
        F: FnMut(&ReplyMeta, &str),
    {
        if session.send(query).is_none() {
            return Err(anyhow!("Nothing to send or a reply is still in flight"));
        }
        session.begin_assistant();

        let url = format!("{}/api/chat", self.base_url);
        let response = match self.http.post(&url).json(&json!({ "query": query })).send().await
        {
            Ok(r) => r,
            Err(e) => {
                session.fail(&e.to_string());
                return Err(e).with_context(|| format!("Failed to reach {}", url));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            session.fail(&message);
            return Err(anyhow!(message));
        }

        let meta = ReplyMeta {
            html: is_html(response.headers()),
            references: parse_references(response.headers()),
        };

        let mut shown = 0usize;
        let mut body = response.bytes_stream();
        let mut ticker = tokio::time::interval(session.flush_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let flushed = tokio::select! {
                next = body.next() => match next {
                    Some(Ok(bytes)) => session.push_chunk(&bytes, Instant::now()),
                    Some(Err(e)) => {
                        session.fail(&e.to_string());
                        return Err(e).context("Chat stream interrupted");
                    }
                    None => break,
                },
                _ = ticker.tick() => session.tick(Instant::now()),
            };
            if flushed {
                if let Some(msg) = session.streaming_message() {
                    on_text(&meta, msg.content.get(shown..).unwrap_or(""));
                    shown = msg.content.len();
                }
            }
        }

        session.finish(meta.references.clone(), Instant::now());
        // remainder that was still sitting in the accumulator
        if let Some(tail) = session
            .messages()
            .last()
            .and_then(|msg| msg.content.get(shown..))
        {
            if !tail.is_empty() {
                on_text(&meta, tail);
            }
        }

        debug!(
            references = meta.references.len(),
            html = meta.html,
            "Chat reply finished"
        );
        Ok(meta)
    }
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// `X-KB-Refs` is a JSON array of `{title,url}`; anything unreadable is
/// treated as no references.
pub fn parse_references(headers: &HeaderMap) -> Vec<Reference> {
    headers
        .get(HEADER_KB_REFS)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_references() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_KB_REFS,
            HeaderValue::from_static(r#"[{"title":"SSO","url":"https://site/sso"}]"#),
        );
        assert_eq!(
            parse_references(&headers),
            vec![Reference {
                title: "SSO".into(),
                url: "https://site/sso".into()
            }]
        );

        headers.insert(HEADER_KB_REFS, HeaderValue::from_static("not json"));
        assert!(parse_references(&headers).is_empty());
    }

    #[tokio::test]
    async fn test_ask_streams_into_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({ "query": "What is SSO?" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain; charset=utf-8")
                    .insert_header(HEADER_KB_REFS, r#"[{"title":"SSO","url":"/sso"}]"#)
                    .set_body_string("SSO is supported.\n\nFollow-up questions:\n- How?"),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(reqwest::Client::new(), server.uri());
        let mut session = ChatSession::default();
        let mut printed = String::new();
        let meta = client
            .ask(&mut session, "What is SSO?", |_, t| printed.push_str(t))
            .await
            .unwrap();

        assert!(!meta.html);
        assert_eq!(meta.references.len(), 1);
        let reply = session.messages().last().unwrap();
        assert_eq!(reply.content, "SSO is supported.\n");
        assert_eq!(reply.follow_ups, vec!["How?"]);
        assert!(printed.starts_with("SSO is supported."));
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn test_stalled_stream_still_shows_received_text() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::time::Duration;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;
        use tokio::sync::oneshot;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen_rx) = oneshot::channel::<()>();
        let shown_mid_stream = Arc::new(AtomicBool::new(false));
        let flag = shown_mid_stream.clone();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !String::from_utf8_lossy(&request).ends_with('}') {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: text/plain; charset=utf-8\r\n\
                      transfer-encoding: chunked\r\nconnection: close\r\n\r\n5\r\nHello\r\n",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            socket.write_all(b"7\r\n, world\r\n").await.unwrap();

            // hold the body open until the client has rendered the second piece
            let seen = tokio::time::timeout(Duration::from_secs(2), seen_rx).await;
            flag.store(matches!(seen, Ok(Ok(()))), Ordering::SeqCst);
            socket.write_all(b"0\r\n\r\n").await.unwrap();
        });

        let client = ChatClient::new(reqwest::Client::new(), format!("http://{}", addr));
        let mut session = ChatSession::default();
        let mut printed = String::new();
        let mut seen_tx = Some(seen_tx);
        client
            .ask(&mut session, "hi", |_, t| {
                printed.push_str(t);
                if printed.contains("world") {
                    if let Some(tx) = seen_tx.take() {
                        let _ = tx.send(());
                    }
                }
            })
            .await
            .unwrap();
        server.await.unwrap();

        assert!(shown_mid_stream.load(Ordering::SeqCst));
        assert_eq!(printed, "Hello, world");
        assert_eq!(session.messages().last().unwrap().content, "Hello, world");
    }

    #[tokio::test]
    async fn test_ask_reports_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "Missing LLM API key" })),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(reqwest::Client::new(), format!("{}/", server.uri()));
        let mut session = ChatSession::default();
        let err = client.ask(&mut session, "hi", |_, _| {}).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing LLM API key");
        assert_eq!(
            session.messages().last().unwrap().content,
            "Error: Missing LLM API key"
        );
    }
}
