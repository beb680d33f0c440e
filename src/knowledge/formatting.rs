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

use colored::Colorize;

use crate::cms::richtext::truncate_chars;
use crate::knowledge::assembler::render_context;
use crate::knowledge::types::{ContextDoc, KbEntry, RankedEntry};

pub fn format_ranked(results: &[RankedEntry]) -> String {
    if results.is_empty() {
        return "No results found".to_string();
    }

    let mut output = String::new();

    for result in results {
        output.push_str(&"━".repeat(60));
        output.push('\n');

        output.push_str(&result.entry.name.blue().bold().to_string());
        output.push('\n');

        if let Some(url) = &result.entry.source_url {
            output.push_str(&url.bright_black().to_string());
            output.push('\n');
        }

        // Snippet preview (first 200 chars)
        let preview = if result.snippet.chars().count() > 200 {
            format!("{}...", truncate_chars(&result.snippet, 200))
        } else {
            result.snippet.clone()
        };
        output.push_str(&preview);
        output.push('\n');

        output.push_str(&format!("score {}", result.score).green().to_string());
        output.push_str("\n\n");
    }

    output
}

/// Documents the chat tool would hand to the model
pub fn format_context(docs: &[ContextDoc]) -> String {
    if docs.is_empty() {
        return "No documents fit the context budget".to_string();
    }

    let mut output = String::new();
    output.push_str(&"Selected context".bold().to_string());
    output.push('\n');
    for (i, doc) in docs.iter().enumerate() {
        output.push_str(&format!(
            "{:>2}. {} {}\n",
            i + 1,
            doc.name.cyan(),
            format!("({} chars)", doc.text.chars().count()).bright_black()
        ));
    }
    output.push_str(
        &format!(
            "{} chars of prompt context\n",
            render_context(docs).chars().count()
        )
        .green()
        .to_string(),
    );
    output
}

pub fn format_entry_list(entries: &[KbEntry]) -> String {
    if entries.is_empty() {
        return "Knowledge base is empty".to_string();
    }

    let mut output = String::new();

    output.push_str(
        &format!("{:<42} {:<52} {}\n", "Name", "Source URL", "Chars")
            .bold()
            .to_string(),
    );
    output.push_str(&"─".repeat(104));
    output.push('\n');

    for entry in entries {
        let name = if entry.name.chars().count() > 40 {
            format!("{}...", truncate_chars(&entry.name, 37))
        } else {
            entry.name.clone()
        };

        let url = entry.source_url.as_deref().unwrap_or("-");
        let url = if url.chars().count() > 50 {
            format!("{}...", truncate_chars(url, 47))
        } else {
            url.to_string()
        };

        output.push_str(&format!(
            "{:<42} {:<52} {}\n",
            name,
            url,
            entry.text.chars().count()
        ));
    }

    output.push_str(&format!("\n{} entries\n", entries.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_list_truncates_long_names() {
        colored::control::set_override(false);
        let entries = vec![KbEntry {
            name: "n".repeat(60),
            source_url: None,
            text: "body".to_string(),
        }];
        let out = format_entry_list(&entries);
        assert!(out.contains(&format!("{}...", "n".repeat(37))));
        assert!(out.contains("1 entries"));
    }

    #[test]
    fn test_entry_list_truncates_on_char_boundaries() {
        colored::control::set_override(false);
        let entries = vec![KbEntry {
            name: "é".repeat(45),
            source_url: Some(format!("https://site/{}", "ü".repeat(60))),
            text: String::new(),
        }];
        let out = format_entry_list(&entries);
        assert!(out.contains(&format!("{}...", "é".repeat(37))));
        assert!(out.contains(&format!("https://site/{}...", "ü".repeat(34))));
    }

    #[test]
    fn test_context_reports_prompt_size() {
        colored::control::set_override(false);
        let docs = vec![ContextDoc {
            name: "A".to_string(),
            source_url: Some("https://a".to_string()),
            text: "x".repeat(10),
        }];
        let out = format_context(&docs);
        assert!(out.contains(" 1. A (10 chars)"));
        assert!(out.ends_with("30 chars of prompt context\n"));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(format_ranked(&[]), "No results found");
        assert_eq!(format_entry_list(&[]), "Knowledge base is empty");
    }
}
