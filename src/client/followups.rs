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

//! Pull "follow-up questions" lists out of a finished answer.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Answer with the heading and list removed
    pub cleaned: String,
    pub follow_ups: Vec<String>,
}

static HTML_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)<(?:p|h[1-6])[^>]*>\s*(?:<strong>|<b>)?\s*",
        r"(?:here\s+are\s+(?:some|the)\s+)?(?:(?:proposed|suggested|recommended)\s+)?(?:next\s+)?",
        r"(?:follow(?:[-\s\x{2011}]?up)?\s+)?questions\s*:?",
        r"(?:</strong>|</b>)?\s*</(?:p|h[1-6])>\s*<ul[^>]*>([\s\S]*?)</ul>",
    ))
    .expect("valid regex")
});

static LI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li[^>]*>([\s\S]*?)</li>").expect("valid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static HEADING_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^\s*(?:#{1,6}\s*)?(?:\*\*)?\s*(?:here\s+are\s+(?:some|the)\s+)?(?:(?:proposed|suggested|recommended)\s+)?(?:next\s+)?follow(?:[-\s\x{2011}]?up)?\s+questions\s*:?(?:\s*\*\*)?\s*$",
        r"(?i)^\s*(?:#{1,6}\s*)?(?:\*\*)?\s*(?:here\s+are\s+(?:some|the)\s+)?(?:suggested|recommended|related|next)\s+questions\s*:?(?:\s*\*\*)?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*\x{2022}\x{2013}\x{2014}]|\d+\.)\s+(.*\S)\s*$").expect("valid regex")
});

/// Find a follow-up heading followed by a list. HTML answers are checked
/// first; otherwise the Markdown form is tried line by line.
pub fn extract_follow_ups(input: &str) -> Extraction {
    if let Some(found) = extract_html(input) {
        return found;
    }
    extract_markdown(input).unwrap_or_else(|| Extraction {
        cleaned: input.to_string(),
        follow_ups: Vec::new(),
    })
}

fn extract_html(input: &str) -> Option<Extraction> {
    let caps = HTML_SECTION_RE.captures(input)?;
    let whole = caps.get(0)?;
    let list = caps.get(1).map(|m| m.as_str()).unwrap_or("");

    let follow_ups = LI_RE
        .captures_iter(list)
        .filter_map(|c| c.get(1))
        .map(|m| {
            TAG_RE
                .replace_all(m.as_str(), "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
        .collect();

    let mut cleaned = String::with_capacity(input.len());
    cleaned.push_str(&input[..whole.start()]);
    cleaned.push_str(&input[whole.end()..]);
    Some(Extraction {
        cleaned,
        follow_ups,
    })
}

fn extract_markdown(input: &str) -> Option<Extraction> {
    let lines: Vec<&str> = input.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let header = lines
        .iter()
        .position(|line| HEADING_RES.iter().any(|re| re.is_match(line)))?;

    let mut idx = header + 1;
    if idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }

    let mut follow_ups = Vec::new();
    let mut end = idx;
    while end < lines.len() {
        let Some(caps) = BULLET_RE.captures(lines[end]) else {
            break;
        };
        let text = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if !text.is_empty() {
            follow_ups.push(text.to_string());
        }
        end += 1;
    }

    if follow_ups.is_empty() {
        return None;
    }

    let cleaned = lines[..header]
        .iter()
        .chain(lines[end..].iter())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    Some(Extraction {
        cleaned,
        follow_ups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_heading_with_blank_line() {
        let input = "SSO is available on all plans.\n\n**Follow-up questions:**\n\n- How do I enable SSO?\n- Which IdPs are supported?\n\nThanks!";
        let out = extract_follow_ups(input);
        assert_eq!(
            out.follow_ups,
            vec!["How do I enable SSO?", "Which IdPs are supported?"]
        );
        assert_eq!(out.cleaned, "SSO is available on all plans.\n\n\nThanks!");
    }

    #[test]
    fn test_markdown_numbered_list_and_hash_heading() {
        let input = "Answer.\n## Suggested questions\n1. What does it cost?\n2. Is there a trial?";
        let out = extract_follow_ups(input);
        assert_eq!(out.follow_ups, vec!["What does it cost?", "Is there a trial?"]);
        assert_eq!(out.cleaned, "Answer.");
    }

    #[test]
    fn test_here_are_some_variant() {
        let input = "Text\nHere are some follow up questions:\n* One?\n* Two?";
        let out = extract_follow_ups(input);
        assert_eq!(out.follow_ups, vec!["One?", "Two?"]);
    }

    #[test]
    fn test_heading_without_list_is_left_alone() {
        let input = "Follow-up questions:\nnone today";
        let out = extract_follow_ups(input);
        assert!(out.follow_ups.is_empty());
        assert_eq!(out.cleaned, input);
    }

    #[test]
    fn test_html_variant() {
        let input = "<p>Answer body.</p>\n<p><strong>Suggested follow-up questions:</strong></p>\n<ul>\n<li>How do I <em>start</em>?</li>\n<li>  What   next? </li>\n</ul>\n<p>Bye</p>";
        let out = extract_follow_ups(input);
        assert_eq!(out.follow_ups, vec!["How do I start?", "What next?"]);
        assert_eq!(out.cleaned, "<p>Answer body.</p>\n\n<p>Bye</p>");
    }

    #[test]
    fn test_plain_answer_untouched() {
        let out = extract_follow_ups("Just an answer with questions inside it.");
        assert!(out.follow_ups.is_empty());
    }
}
