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

use super::types::{ContextDoc, RankedEntry, Reference};

fn section(name: &str, url: Option<&str>, text: &str) -> String {
    match url {
        Some(url) => format!("\n\n### {} ({})\n{}", name, url, text),
        None => format!("\n\n### {}\n{}", name, text),
    }
}

/// Pick the leading ranked entries that fit the prompt budget.
///
/// Each snippet is cut to `per_doc_chars`; selection stops after `max_docs`
/// documents or at the first one whose rendered section would exceed
/// `max_total_chars`.
pub fn assemble(
    ranked: &[RankedEntry],
    max_docs: usize,
    max_total_chars: usize,
    per_doc_chars: usize,
) -> Vec<ContextDoc> {
    let max_docs = max_docs.max(1);
    let mut docs = Vec::new();
    let mut total = 0usize;

    for item in ranked {
        if docs.len() >= max_docs {
            break;
        }
        let text: String = item.snippet.chars().take(per_doc_chars).collect();
        let url = item.entry.source_url.as_deref();
        let cost = section(&item.entry.name, url, &text).chars().count();
        if total + cost > max_total_chars {
            break;
        }
        total += cost;
        docs.push(ContextDoc {
            name: item.entry.name.clone(),
            source_url: item.entry.source_url.clone(),
            text,
        });
    }

    docs
}

/// Knowledge block appended to the system prompt
pub fn render_context(docs: &[ContextDoc]) -> String {
    docs.iter()
        .map(|d| section(&d.name, d.source_url.as_deref(), &d.text))
        .collect()
}

pub fn references(docs: &[ContextDoc]) -> Vec<Reference> {
    docs.iter()
        .filter_map(|d| {
            d.source_url.as_ref().map(|url| Reference {
                title: d.name.clone(),
                url: url.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::types::KbEntry;

    fn ranked(name: &str, url: Option<&str>, snippet: &str) -> RankedEntry {
        RankedEntry {
            entry: KbEntry {
                name: name.to_string(),
                source_url: url.map(String::from),
                text: snippet.to_string(),
            },
            score: 1,
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_per_doc_cap() {
        let items = vec![ranked("A", None, &"a".repeat(2000))];
        let docs = assemble(&items, 3, 5000, 800);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text.chars().count(), 800);
    }

    #[test]
    fn test_budget_stops_at_first_overflow() {
        let items = vec![
            ranked("A", Some("https://a"), &"a".repeat(100)),
            ranked("B", None, &"b".repeat(500)),
            ranked("C", None, &"c".repeat(10)),
        ];
        // "\n\n### A (https://a)\n" is 20 chars
        let docs = assemble(&items, 5, 200, 800);
        assert_eq!(docs.len(), 1);
        assert_eq!(render_context(&docs).chars().count(), 120);
    }

    #[test]
    fn test_total_never_exceeds_budget() {
        let items: Vec<_> = (0..10)
            .map(|i| ranked(&format!("Doc {i}"), None, &"z".repeat(300)))
            .collect();
        for budget in [0, 50, 315, 1000, 5000] {
            let docs = assemble(&items, 10, budget, 250);
            assert!(render_context(&docs).chars().count() <= budget);
            assert!(docs.iter().all(|d| d.text.chars().count() <= 250));
        }
    }

    #[test]
    fn test_max_docs_at_least_one() {
        let items = vec![ranked("A", None, "x"), ranked("B", None, "y")];
        assert_eq!(assemble(&items, 0, 5000, 800).len(), 1);
        assert_eq!(assemble(&items, 1, 5000, 800).len(), 1);
    }

    #[test]
    fn test_references_skip_docs_without_url() {
        let items = vec![
            ranked("A", Some("https://a"), "x"),
            ranked("B", None, "y"),
        ];
        let docs = assemble(&items, 5, 5000, 800);
        assert_eq!(
            references(&docs),
            vec![Reference {
                title: "A".into(),
                url: "https://a".into()
            }]
        );
    }
}
