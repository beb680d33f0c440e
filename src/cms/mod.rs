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

pub mod blocks;
pub mod client;
pub mod knowledge;
pub mod lists;
pub mod richtext;

pub use blocks::{page_by_slug, Block, Page};
pub use client::CmsClient;
pub use knowledge::list_knowledge_base;
pub use lists::{list_ctas, list_faq_suggestions, list_featured_pages};
