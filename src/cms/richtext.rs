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

use serde_json::Value;

/// Flatten a rich-text document to plain text.
///
/// Accepts either the document node or a `{ "json": document }` wrapper.
/// Leaf `value` strings are collected depth-first, joined with spaces,
/// whitespace-collapsed and cut to `max_chars` characters.
pub fn flatten_rich_text(root: &Value, max_chars: usize) -> String {
    let doc = match root.get("json") {
        Some(inner) => inner,
        None => root,
    };

    let mut parts: Vec<&str> = Vec::new();
    collect_values(doc, &mut parts);

    let joined = parts.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

fn collect_values<'a>(node: &'a Value, parts: &mut Vec<&'a str>) {
    let Value::Object(map) = node else {
        return;
    };
    if let Some(Value::String(value)) = map.get("value") {
        parts.push(value);
    }
    if let Some(Value::Array(children)) = map.get("content") {
        for child in children {
            collect_values(child, parts);
        }
    }
}

/// Cut to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
