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

// Cache namespaces
pub const NS_KNOWLEDGE_BASE: &str = "contentful_chatbot_knowledge_base";
pub const NS_FEATURED_PAGES: &str = "contentful_chatbot_featured_pages";
pub const NS_CTAS: &str = "contentful_chatbot_ctas";
pub const NS_FAQ_SUGGESTIONS: &str = "contentful_chatbot_faqs";
pub const NS_PAGE: &str = "page";

// Response headers carrying citations for the chat widget
pub const HEADER_KB_TITLE: &str = "x-kb-title";
pub const HEADER_KB_URL: &str = "x-kb-url";
pub const HEADER_KB_REFS: &str = "x-kb-refs";

pub const HEADER_REVALIDATE_TOKEN: &str = "x-revalidate-token";

pub const LIST_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=60";
pub const DATA_OK_CACHE_CONTROL: &str = "s-maxage=300, stale-while-revalidate=60";
pub const DATA_ERR_CACHE_CONTROL: &str = "s-maxage=60";
pub const NO_STORE: &str = "no-store";
pub const CHAT_CACHE_CONTROL: &str = "no-store, no-transform";

/// Name of the retrieval tool offered to the model
pub const KB_TOOL_NAME: &str = "get_kb_chunks";

pub const HOME_SLUG: &str = "home";
