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

//! Client-side state of one chat conversation.
//!
//! Streamed bytes are decoded incrementally and flushed into the visible
//! message on a throttle, so a renderer redraws at a bounded rate.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::followups::extract_follow_ups;
use crate::knowledge::Reference;

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub streaming: bool,
    pub references: Vec<Reference>,
    pub follow_ups: Vec<String>,
}

impl ChatMessage {
    fn new(role: MessageRole, content: String, streaming: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            streaming,
            references: Vec::new(),
            follow_ups: Vec::new(),
        }
    }
}

/// Auto-scroll behaviour of the transcript view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Follow the newest content
    Bottom,
    /// Keep the latest user message anchored at the top while the reply grows
    TopAnchor,
    /// User scrolled away; no automatic movement until the next send
    Manual,
}

/// Holds back the tail of a UTF-8 sequence split across chunks
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix decodes
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    /// Whatever is left at end of stream
    fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    scroll: ScrollMode,
    in_flight: bool,
    carry: Utf8Carry,
    accumulator: String,
    last_flush: Option<Instant>,
    flush_interval: Duration,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL)
    }
}

impl ChatSession {
    pub fn new(flush_interval: Duration) -> Self {
        Self {
            messages: Vec::new(),
            scroll: ScrollMode::Bottom,
            in_flight: false,
            carry: Utf8Carry::default(),
            accumulator: String::new(),
            last_flush: None,
            flush_interval,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn scroll_mode(&self) -> ScrollMode {
        self.scroll
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn streaming_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.streaming)
    }

    /// Queue a user turn. Returns `None` for blank text or while a reply is
    /// still in flight.
    pub fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.scroll = ScrollMode::TopAnchor;
        self.messages
            .push(ChatMessage::new(MessageRole::User, text.to_string(), false));
        self.messages.last()
    }

    /// Append the empty streaming placeholder for the reply
    pub fn begin_assistant(&mut self) -> bool {
        if self.streaming_message().is_some() {
            return false;
        }
        self.carry = Utf8Carry::default();
        self.accumulator.clear();
        self.last_flush = None;
        self.messages
            .push(ChatMessage::new(MessageRole::Assistant, String::new(), true));
        true
    }

    /// Feed raw response bytes. Returns true when the visible content was
    /// updated.
    pub fn push_chunk(&mut self, bytes: &[u8], now: Instant) -> bool {
        let decoded = self.carry.decode(bytes);
        self.accumulator.push_str(&decoded);
        self.tick(now)
    }

    /// Flush held-back text once the interval has passed since the last
    /// flush. Driven by a timer too, so a stalled stream still shows what
    /// already arrived.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.accumulator.is_empty() {
            return false;
        }
        let due = match self.last_flush {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.flush_interval,
        };
        if due {
            self.flush(now);
        }
        due
    }

    fn flush(&mut self, now: Instant) {
        let pending = std::mem::take(&mut self.accumulator);
        if let Some(msg) = self.messages.iter_mut().rev().find(|m| m.streaming) {
            msg.content.push_str(&pending);
        }
        self.last_flush = Some(now);
    }

    /// Close the reply: final flush, follow-up extraction, references
    pub fn finish(&mut self, references: Vec<Reference>, now: Instant) {
        let tail = self.carry.finish();
        self.accumulator.push_str(&tail);
        self.flush(now);

        if let Some(msg) = self.messages.iter_mut().rev().find(|m| m.streaming) {
            let extraction = extract_follow_ups(&msg.content);
            if !extraction.cleaned.is_empty() {
                msg.content = extraction.cleaned;
            }
            msg.follow_ups = extraction.follow_ups;
            msg.references = references;
            msg.streaming = false;
        }

        self.in_flight = false;
        if self.scroll != ScrollMode::Manual {
            self.scroll = ScrollMode::Bottom;
        }
    }

    /// End the turn with an error shown in place of the reply
    pub fn fail(&mut self, message: &str) {
        let content = format!("Error: {}", message);
        match self.messages.iter_mut().rev().find(|m| m.streaming) {
            Some(msg) => {
                msg.content = content;
                msg.streaming = false;
            }
            None => self
                .messages
                .push(ChatMessage::new(MessageRole::Assistant, content, false)),
        }
        self.accumulator.clear();
        self.carry = Utf8Carry::default();
        self.in_flight = false;
    }

    pub fn user_scrolled(&mut self) {
        self.scroll = ScrollMode::Manual;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> (ChatSession, Instant) {
        let mut session = ChatSession::default();
        session.send("  What is SSO?  ").unwrap();
        assert!(session.begin_assistant());
        (session, Instant::now())
    }

    #[test]
    fn test_send_trims_and_refuses() {
        let mut session = ChatSession::default();
        assert!(session.send("   ").is_none());
        let msg = session.send(" hi ").unwrap();
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.role, MessageRole::User);
        assert!(session.send("again").is_none());
        assert_eq!(session.scroll_mode(), ScrollMode::TopAnchor);
    }

    #[test]
    fn test_single_streaming_placeholder() {
        let (mut session, _) = started();
        assert!(!session.begin_assistant());
        assert_eq!(session.messages().iter().filter(|m| m.streaming).count(), 1);
    }

    #[test]
    fn test_throttle() {
        let (mut session, t0) = started();
        assert!(session.push_chunk(b"Hello", t0));
        assert_eq!(session.streaming_message().unwrap().content, "Hello");

        assert!(!session.push_chunk(b", wor", t0 + Duration::from_millis(20)));
        assert_eq!(session.streaming_message().unwrap().content, "Hello");

        assert!(session.push_chunk(b"ld", t0 + Duration::from_millis(50)));
        assert_eq!(session.streaming_message().unwrap().content, "Hello, world");
    }

    #[test]
    fn test_tick_flushes_held_back_text() {
        let (mut session, t0) = started();
        assert!(session.push_chunk(b"Hello", t0));
        assert!(!session.push_chunk(b", wor", t0 + Duration::from_millis(10)));

        assert!(!session.tick(t0 + Duration::from_millis(30)));
        assert_eq!(session.streaming_message().unwrap().content, "Hello");

        assert!(session.tick(t0 + Duration::from_millis(50)));
        assert_eq!(session.streaming_message().unwrap().content, "Hello, wor");

        // nothing pending
        assert!(!session.tick(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_split_utf8_sequence() {
        let (mut session, t0) = started();
        let bytes = "né🚀".as_bytes();
        // cut inside 'é' and again inside the rocket
        session.push_chunk(&bytes[..2], t0);
        session.push_chunk(&bytes[2..5], t0 + Duration::from_millis(60));
        session.push_chunk(&bytes[5..], t0 + Duration::from_millis(120));
        assert_eq!(session.streaming_message().unwrap().content, "né🚀");
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.decode(b"a\xffb"), "a\u{fffd}b");
        assert_eq!(carry.decode(b"\xe2\x82"), "");
        assert_eq!(carry.finish(), "\u{fffd}");
    }

    #[test]
    fn test_finish_flushes_and_extracts() {
        let (mut session, t0) = started();
        session.push_chunk(b"Yes.", t0);
        session.push_chunk(
            b"\n\nFollow-up questions:\n- How to enable?",
            t0 + Duration::from_millis(1),
        );
        let refs = vec![Reference {
            title: "SSO".into(),
            url: "https://site/sso".into(),
        }];
        session.finish(refs.clone(), t0 + Duration::from_millis(2));

        let msg = session.messages().last().unwrap();
        assert!(!msg.streaming);
        assert_eq!(msg.content, "Yes.\n");
        assert_eq!(msg.follow_ups, vec!["How to enable?"]);
        assert_eq!(msg.references, refs);
        assert_eq!(session.scroll_mode(), ScrollMode::Bottom);
        assert!(!session.is_in_flight());
    }

    #[test]
    fn test_manual_scroll_survives_finish_until_next_send() {
        let (mut session, t0) = started();
        session.user_scrolled();
        session.push_chunk(b"text", t0);
        session.finish(Vec::new(), t0);
        assert_eq!(session.scroll_mode(), ScrollMode::Manual);

        session.send("next").unwrap();
        assert_eq!(session.scroll_mode(), ScrollMode::TopAnchor);
    }

    #[test]
    fn test_fail_replaces_placeholder() {
        let (mut session, _) = started();
        session.fail("HTTP 500");
        let msg = session.messages().last().unwrap();
        assert_eq!(msg.content, "Error: HTTP 500");
        assert!(!msg.streaming);
        assert!(session.send("retry").is_some());
    }
}
