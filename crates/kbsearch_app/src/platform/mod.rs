mod app;
mod commands;
mod config;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Context;

use config::{AppConfig, CONFIG_FILENAME};

/// Load config, install logging and run the REPL on a single-threaded runtime.
pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    let mut config = AppConfig::load(&config_path)?;
    config.apply_env(|key| std::env::var(key).ok());
    logging::initialize(config.log, config.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(app::run(config))
}
