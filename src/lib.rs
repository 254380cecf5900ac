pub mod cache;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod services;
pub mod state;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
pub use config::Config;
pub use state::Engine;
use clients::HttpEstateClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Some(Commands::Init)) {
        let created = Config::create_default_if_missing()?;
        if created {
            println!("Created domik.toml");
        } else {
            println!("domik.toml already exists");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let api = HttpEstateClient::new(
        &config.api.base_url,
        &config.api.identity_token,
        Duration::from_secs(config.api.request_timeout_seconds),
    )
    .context("Failed to build the API client")?;

    let engine = Engine::new(&config, Arc::new(api));
    info!("Engine ready against {}", config.api.base_url);

    match cli.command {
        Some(Commands::Search(args)) => cli::run_search(&engine, &config, args).await,
        Some(Commands::Favorites) => cli::run_favorites(&engine).await,
        Some(Commands::Favorite { id, remove }) => cli::run_favorite(&engine, &id, !remove).await,
        Some(Commands::Map) => cli::run_map(&engine).await,
        Some(Commands::Offer(args)) => cli::run_offer(&engine, args).await,
        Some(Commands::Init) | None => {
            println!("Nothing to do; try `domik search --help`");
            Ok(())
        }
    }
}
