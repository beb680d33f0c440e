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

use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cache::TtlCache;
use crate::cli::{Commands, KbCommand};
use crate::client::{ChatClient, ChatSession};
use crate::cms::CmsClient;
use crate::config::Config;
use crate::http::{serve, upstream_client};
use crate::knowledge::formatting::{format_context, format_entry_list, format_ranked};
use crate::knowledge::KnowledgeManager;
use crate::metrics::{parse_metric_keys, MetricsFetcher};

const TERMINAL_WIDTH: usize = 100;

pub async fn execute(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Serve { bind, .. } => {
            let mut config = config.clone();
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            serve(config).await
        }
        Commands::Ask { query, server } => ask(config, &server, &query).await,
        Commands::Kb { command } => execute_kb(config, command).await,
        Commands::Data {
            source,
            query,
            metric_keys,
            format,
        } => {
            let fetcher = MetricsFetcher::new(upstream_client(config)?, config.metrics.clone());
            let keys = parse_metric_keys(metric_keys.as_deref());
            let result = fetcher
                .fetch_named(&source, &query, &keys, format.as_deref())
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

async fn execute_kb(config: &Config, command: KbCommand) -> Result<()> {
    let cms = CmsClient::new(upstream_client(config)?, config.cms.clone());
    let manager = KnowledgeManager::new(config.knowledge.clone(), cms, TtlCache::new());

    match command {
        KbCommand::List { preview, format } => {
            let entries = manager
                .entries(preview)
                .await
                .context("Failed to load knowledge base")?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(entries.as_ref())?);
            } else {
                print!("{}", format_entry_list(&entries));
            }
        }
        KbCommand::Search {
            query,
            limit,
            format,
        } => {
            let ranked = manager
                .rank(&query)
                .await
                .context("Failed to rank knowledge base")?;
            let docs = manager.search(&query, limit).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else {
                print!("{}", format_ranked(&ranked));
                println!("{}", format_context(&docs));
            }
        }
    }
    Ok(())
}

async fn ask(config: &Config, server: &str, query: &str) -> Result<()> {
    let client = ChatClient::new(upstream_client(config)?, server);
    let mut session = ChatSession::default();
    let mut stdout = std::io::stdout();

    let meta = client
        .ask(&mut session, query, |meta, text| {
            // html replies are converted once the whole document is in
            if !meta.html {
                print!("{}", text);
                let _ = stdout.flush();
            }
        })
        .await?;

    let Some(reply) = session.messages().last() else {
        return Ok(());
    };

    if meta.html {
        let text = html2text::config::plain()
            .string_from_read(reply.content.as_bytes(), TERMINAL_WIDTH)
            .unwrap_or_else(|_| reply.content.clone());
        print!("{}", text);
    }
    println!();

    if !reply.references.is_empty() {
        println!("\n{}", "Sources".bold());
        for reference in &reply.references {
            println!("  {} {}", reference.title.cyan(), reference.url.bright_black());
        }
    }
    if !reply.follow_ups.is_empty() {
        println!("\n{}", "You could also ask".bold());
        for question in &reply.follow_ups {
            println!("  - {}", question);
        }
    }
    Ok(())
}
