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
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, fmt::Layer, prelude::*, registry::Registry, EnvFilter};

use crate::config::LoggingConfig;

fn env_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("info,sitechat=debug")
        } else {
            EnvFilter::new("sitechat=info,tower_http=info")
        }
    })
}

/// Initialize logging for the process.
///
/// With a log directory configured, logs go to daily-rotated JSON files.
/// Otherwise they go to stderr, as JSON when `json` is set.
pub fn init_logging(config: &LoggingConfig, debug_mode: bool) -> Result<(), anyhow::Error> {
    match &config.directory {
        Some(dir) => init_file_logging(PathBuf::from(dir), debug_mode),
        None => {
            let builder = fmt()
                .with_env_filter(env_filter(debug_mode))
                .with_target(false)
                .with_writer(std::io::stderr);
            if config.json {
                builder.json().init();
            } else {
                builder.init();
            }
            Ok(())
        }
    }
}

fn init_file_logging(log_dir: PathBuf, debug_mode: bool) -> Result<(), anyhow::Error> {
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "sitechat.log");

    // File layer with JSON formatting for structured logs
    let file_layer = Layer::new()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json();

    let registry = Registry::default()
        .with(file_layer)
        .with(env_filter(debug_mode));
    registry.init();

    info!(
        log_directory = %log_dir.display(),
        debug_mode = debug_mode,
        "File logging initialized"
    );

    Ok(())
}
