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

//! Lexical relevance ranking of knowledge-base entries.
//!
//! Scoring weights:
//! - exact query in title: 20
//! - exact query in body: 8
//! - each query token in title: 5
//! - each query token in body: 1
//!
//! Entries scoring zero are left out. Ties keep input order.

use std::collections::HashSet;

use super::types::{KbEntry, RankedEntry};

const EXACT_TITLE_WEIGHT: u32 = 20;
const EXACT_BODY_WEIGHT: u32 = 8;
const TOKEN_TITLE_WEIGHT: u32 = 5;
const TOKEN_BODY_WEIGHT: u32 = 1;

const MIN_TOKEN_CHARS: usize = 2;

pub const SNIPPET_LEAD_CHARS: usize = 300;
pub const SNIPPET_CHARS: usize = 900;

/// Lowercase alphanumeric runs of at least two characters, first-seen order
pub fn tokenize(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    fold(query)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|s| seen.insert(s.to_string()))
        .map(|s| s.to_string())
        .collect()
}

/// Per-char lowercase that keeps char offsets aligned with the input
fn fold(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

pub fn rank(entries: &[KbEntry], query: &str) -> Vec<RankedEntry> {
    let phrase = fold(query.trim());
    let tokens = tokenize(query);

    let mut ranked: Vec<RankedEntry> = entries
        .iter()
        .filter_map(|entry| {
            let title = fold(&entry.name);
            let body = fold(&entry.text);
            let score = score_entry(&title, &body, &phrase, &tokens);
            if score == 0 {
                return None;
            }
            Some(RankedEntry {
                entry: entry.clone(),
                score,
                snippet: snippet(&entry.text, &body, &tokens),
            })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

fn score_entry(title: &str, body: &str, phrase: &str, tokens: &[String]) -> u32 {
    let mut score = 0;
    if !phrase.is_empty() {
        if title.contains(phrase) {
            score += EXACT_TITLE_WEIGHT;
        }
        if body.contains(phrase) {
            score += EXACT_BODY_WEIGHT;
        }
    }
    for token in tokens {
        if title.contains(token.as_str()) {
            score += TOKEN_TITLE_WEIGHT;
        }
        if body.contains(token.as_str()) {
            score += TOKEN_BODY_WEIGHT;
        }
    }
    score
}

/// Window of the original text around the earliest token hit.
/// `folded` is the per-char lowercased form of `text`.
fn snippet(text: &str, folded: &str, tokens: &[String]) -> String {
    let first_hit = tokens
        .iter()
        .filter_map(|t| folded.find(t.as_str()))
        .min()
        .map(|byte_idx| folded[..byte_idx].chars().count());

    let start = first_hit
        .map(|pos| pos.saturating_sub(SNIPPET_LEAD_CHARS))
        .unwrap_or(0);
    text.chars().skip(start).take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, text: &str) -> KbEntry {
        KbEntry {
            name: name.to_string(),
            source_url: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("What's the SSO price? sso, a b"),
            vec!["what", "the", "sso", "price"]
        );
        assert!(tokenize("  ").is_empty());
    }

    #[test]
    fn test_title_exact_beats_body_only() {
        let entries = vec![
            entry("Overview", "We support single sign-on for every plan."),
            entry("Single sign-on", "Set up your identity provider."),
        ];
        let ranked = rank(&entries, "single sign-on");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entry.name, "Single sign-on");
        // exact title 20 + tokens "single","sign","on" in title 15
        assert_eq!(ranked[0].score, 35);
        // exact body 8 + three body tokens
        assert_eq!(ranked[1].score, 11);
    }

    #[test]
    fn test_zero_score_excluded_and_ties_stable() {
        let entries = vec![
            entry("Alpha", "pricing details"),
            entry("Beta", "nothing relevant"),
            entry("Gamma", "pricing again"),
        ];
        let ranked = rank(&entries, "pricing");
        let names: Vec<_> = ranked.iter().map(|r| r.entry.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn test_empty_query_ranks_nothing() {
        let entries = vec![entry("Alpha", "text")];
        assert!(rank(&entries, "   ").is_empty());
    }

    #[test]
    fn test_snippet_window() {
        let body = format!("{}needle{}", "x ".repeat(500), "y".repeat(2000));
        let entries = vec![entry("Doc", &body)];
        let ranked = rank(&entries, "needle");
        let snippet = &ranked[0].snippet;
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS);
        // match at char 1000, window starts at 700
        assert_eq!(snippet.find("needle"), Some(SNIPPET_LEAD_CHARS));
    }

    #[test]
    fn test_snippet_defaults_to_prefix_and_is_char_safe() {
        let body = "é".repeat(1200);
        let entries = vec![entry("Résumé tips", &body)];
        let ranked = rank(&entries, "résumé");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].snippet.chars().count(), SNIPPET_CHARS);
        assert!(ranked[0].snippet.chars().all(|c| c == 'é'));
    }
}
