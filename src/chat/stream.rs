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

//! Chunked replay of a finished answer.
//!
//! The answer is cut into byte-sized pieces on UTF-8 boundaries and pushed
//! through a bounded channel by a producer task, pausing between chunks.

use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::config::StreamConfig;

const CHANNEL_CAPACITY: usize = 8;

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Split `text` into pieces of at most `chunk_size` bytes. A piece is never
/// empty and never splits a character; one wider than `chunk_size` is
/// emitted whole.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;

    while start < text.len() {
        let mut end = floor_char_boundary(text, start + chunk_size);
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }
        chunks.push(&text[start..end]);
        start = end;
    }

    chunks
}

/// Replay `text` as a stream of byte chunks using the clamped settings.
/// The producer stops as soon as the receiving side is dropped.
pub fn replay(text: String, config: &StreamConfig) -> ReceiverStream<Result<Bytes, Infallible>> {
    replay_with(
        text,
        config.effective_chunk_size(),
        Duration::from_millis(config.effective_delay_ms()),
    )
}

pub fn replay_with(
    text: String,
    chunk_size: usize,
    delay: Duration,
) -> ReceiverStream<Result<Bytes, Infallible>> {
    spawn_replay(text, chunk_size, delay).0
}

/// Start the producer. Its handle resolves to the number of chunks that were
/// delivered before the replay ended.
fn spawn_replay(
    text: String,
    chunk_size: usize,
    delay: Duration,
) -> (ReceiverStream<Result<Bytes, Infallible>>, JoinHandle<usize>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let producer = tokio::spawn(async move {
        let chunks = chunk_text(&text, chunk_size);
        let count = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            if tx
                .send(Ok(Bytes::copy_from_slice(chunk.as_bytes())))
                .await
                .is_err()
            {
                debug!(sent = i, total = count, "Client went away, replay stopped");
                return i;
            }
            if i + 1 < count {
                if delay.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        count
    });

    (ReceiverStream::new(rx), producer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_reassembly_any_size() {
        let text = "Grüße aus Köln, 東京 🚀 done.";
        for size in 1..=text.len() + 2 {
            let chunks = chunk_text(text, size);
            assert_eq!(chunks.concat(), text, "size {size}");
            assert!(chunks.iter().all(|c| !c.is_empty()));
            for chunk in &chunks {
                assert!(chunk.len() <= size || chunk.chars().count() == 1);
            }
        }
    }

    #[test]
    fn test_size_one_is_one_char_per_chunk() {
        let chunks = chunk_text("aé🚀", 1);
        assert_eq!(chunks, vec!["a", "é", "🚀"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 16).is_empty());
    }

    #[tokio::test]
    async fn test_replay_yields_all_chunks() {
        let text = "x".repeat(100);
        let chunks: Vec<_> = replay_with(text.clone(), 16, Duration::ZERO)
            .map(|r| match r {
                Ok(b) => b,
                Err(never) => match never {},
            })
            .collect()
            .await;
        assert_eq!(chunks.len(), 7);
        let joined: Vec<u8> = chunks.iter().flat_map(|b| b.to_vec()).collect();
        assert_eq!(joined, text.as_bytes());
    }

    #[tokio::test]
    async fn test_replay_stops_when_receiver_dropped() {
        // 625 chunks at 5ms each would take over three seconds to finish
        let (mut stream, producer) = spawn_replay("y".repeat(10_000), 16, Duration::from_millis(5));
        assert!(stream.next().await.is_some());
        drop(stream);

        let delivered = tokio::time::timeout(Duration::from_millis(500), producer)
            .await
            .expect("producer kept running after the receiver was dropped")
            .expect("producer panicked");
        assert!(delivered >= 1);
        assert!(delivered <= CHANNEL_CAPACITY + 2, "delivered {delivered}");
    }

    #[tokio::test]
    async fn test_producer_reports_full_delivery() {
        let (stream, producer) = spawn_replay("z".repeat(40), 16, Duration::ZERO);
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(producer.await.unwrap(), 3);
    }
}
