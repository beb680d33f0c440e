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

use serde::{Deserialize, Serialize};

/// One knowledge-base document as loaded from the CMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbEntry {
    pub name: String,
    pub source_url: Option<String>,
    /// Flattened plain text
    pub text: String,
}

/// Entry scored against a query
#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub entry: KbEntry,
    pub score: u32,
    pub snippet: String,
}

/// Document chosen for the prompt, text already capped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDoc {
    pub name: String,
    pub source_url: Option<String>,
    pub text: String,
}

/// Citation exposed to the chat client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

/// Shape returned to the model by the retrieval tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDoc {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub text: String,
}

impl From<&ContextDoc> for ToolDoc {
    fn from(doc: &ContextDoc) -> Self {
        ToolDoc {
            title: doc.name.clone(),
            url: doc.source_url.clone(),
            text: doc.text.clone(),
        }
    }
}
