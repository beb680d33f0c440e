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

//! Markdown answer rendering for the html output format.
//!
//! Model output is untrusted: the rendered HTML passes an explicit
//! allow-list of tags, attributes and URL schemes.

use std::collections::{HashMap, HashSet};

use ammonia::{Builder, UrlRelative};
use pulldown_cmark::{html, Options, Parser};

use crate::config::OutputFormat;

const ALLOWED_TAGS: &[&str] = &[
    "a", "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "em", "del", "code",
    "pre", "blockquote", "ul", "ol", "li", "table", "thead", "tbody", "tr", "th", "td",
];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Render Markdown to sanitized HTML
pub fn markdown_to_safe_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, parser);

    sanitize_html(&rendered)
}

pub fn sanitize_html(input: &str) -> String {
    let tags: HashSet<&str> = ALLOWED_TAGS.iter().copied().collect();
    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].into_iter().collect());
    tag_attributes.insert("ol", ["start"].into_iter().collect());
    tag_attributes.insert("th", ["align"].into_iter().collect());
    tag_attributes.insert("td", ["align"].into_iter().collect());

    let mut builder = Builder::empty();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .clean_content_tags(["script", "style"].into_iter().collect())
        .url_schemes(ALLOWED_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some("noopener noreferrer"));
    builder.clean(input).to_string()
}

/// Apply the configured output format to a finished answer
pub fn render_answer(answer: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => answer.to_string(),
        OutputFormat::Html => markdown_to_safe_html(answer),
    }
}

pub fn content_type(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "text/plain; charset=utf-8",
        OutputFormat::Html => "text/html; charset=utf-8",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_renders() {
        let html = markdown_to_safe_html("# Title\n\nSome **bold** and a [link](https://example.com).");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_scripts_and_handlers_removed() {
        let hostile = concat!(
            "Hello <script>alert(1)</script>\n\n",
            "<img src=x onerror=\"alert(2)\">\n\n",
            "<a href=\"https://ok.test\" onclick=\"steal()\">click</a>\n\n",
            "<style>body{display:none}</style>\n\n",
            "<div onmouseover=\"x()\">hover</div>",
        );
        let html = markdown_to_safe_html(hostile);
        let lower = html.to_lowercase();
        assert!(!lower.contains("<script"));
        assert!(!lower.contains("alert(1)"));
        assert!(!lower.contains("onerror="));
        assert!(!lower.contains("onclick="));
        assert!(!lower.contains("onmouseover="));
        assert!(!lower.contains("display:none"));
        assert!(html.contains("click"));
        assert!(html.contains("hover"));
    }

    #[test]
    fn test_disallowed_schemes_stripped() {
        let html = markdown_to_safe_html("[x](javascript:alert(1)) [m](mailto:a@b.c)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("mailto:a@b.c"));
    }

    #[test]
    fn test_text_format_passthrough() {
        assert_eq!(render_answer("**hi**", OutputFormat::Text), "**hi**");
        assert_eq!(content_type(OutputFormat::Html), "text/html; charset=utf-8");
    }
}
