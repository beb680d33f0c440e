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

use anyhow::Result;
use clap::Parser;

mod cache;
mod chat;
mod cli;
mod client;
mod cms;
mod commands;
mod config;
mod constants;
mod error;
mod http;
mod knowledge;
mod logging;
mod metrics;
mod storage;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let (mut config, rejected_overrides) = Config::load(cli.config.as_deref())?;

    if let Commands::Serve {
        log_to_file: true, ..
    } = &cli.command
    {
        if config.logging.directory.is_none() {
            let dir = storage::get_default_log_dir()?;
            config.logging.directory = Some(dir.to_string_lossy().into_owned());
        }
    }

    logging::init_logging(&config.logging, cli.debug)?;
    config::log_rejected_overrides(&rejected_overrides);

    // Execute the command
    if let Err(e) = commands::execute(&config, cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
