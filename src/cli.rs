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

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sitechat")]
#[command(version, author = "Muvon Un Limited <opensource@muvon.io>")]
#[command(about = "Knowledge-grounded chat and content API for CMS-driven sites", long_about = None)]
pub struct Cli {
    /// Path to a config.toml (defaults to the system config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,

        /// Write logs to the default log directory instead of the console
        #[arg(long)]
        log_to_file: bool,
    },

    /// Ask a running server a question and stream the answer
    Ask {
        /// The question
        query: String,

        /// Base URL of the server
        #[arg(short, long, default_value = "http://127.0.0.1:8080")]
        server: String,
    },

    /// Inspect the knowledge base
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },

    /// Fetch live metrics the way a product data callout would
    Data {
        /// Provider: openweather or worldbank
        source: String,

        /// City name, or COUNTRY:INDICATOR for worldbank
        query: String,

        /// Keys to keep (JSON array or comma-separated)
        #[arg(short = 'k', long)]
        metric_keys: Option<String>,

        /// Units for openweather: metric or imperial
        #[arg(short, long)]
        format: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum KbCommand {
    /// List every knowledge-base entry
    List {
        /// Use the preview API
        #[arg(long)]
        preview: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Rank entries against a query and show the assembled context
    Search {
        /// What to look for
        query: String,

        /// Maximum number of documents to select
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kb_search() {
        let cli = Cli::parse_from(["sitechat", "kb", "search", "pricing", "-l", "2"]);
        match cli.command {
            Commands::Kb {
                command: KbCommand::Search { query, limit, format },
            } => {
                assert_eq!(query, "pricing");
                assert_eq!(limit, Some(2));
                assert_eq!(format, "text");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["sitechat", "serve", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::Serve { bind: None, .. }));
    }
}
