//! punchsync library root.
//! Exposes the sync engine, the scheduler, the record store and the
//! maintenance CLI dispatcher.

pub mod agent;
pub mod cli;
pub mod collab;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod export;
pub mod models;
pub mod scheduler;
pub mod utils;

pub use agent::SyncAgent;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::AppConfig;
use errors::AppResult;
use std::path::{Path, PathBuf};

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &AppConfig, config_path: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cfg, config_path),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Records { .. } => cli::commands::records::handle(&cli.command, cfg),
        Commands::Add { .. } => cli::commands::add::handle(&cli.command, cfg),
        Commands::Edit { .. } => cli::commands::edit::handle(&cli.command, cfg),
        Commands::Retry { .. } => cli::commands::retry::handle(&cli.command, cfg),
        Commands::Del { .. } => cli::commands::del::handle(&cli.command, cfg),
        Commands::Logs { .. } => cli::commands::logs::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
        Commands::Jobs => cli::commands::jobs::handle(cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Settings are loaded once and passed down explicitly.
    let config_path = cli
        .config
        .as_deref()
        .map(utils::path::expand_tilde)
        .unwrap_or_else(AppConfig::config_file);
    let mut cfg = AppConfig::load_from(&config_path)?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    cfg.database = expand(&cfg.database);

    init_logging(&cfg.log_level);

    dispatch(&cli, &cfg, &config_path)
}

fn expand(path: &str) -> String {
    let p: PathBuf = utils::path::expand_tilde(path);
    p.to_string_lossy().to_string()
}

/// `RUST_LOG` wins over the settings file.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}
