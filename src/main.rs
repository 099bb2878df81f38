//! memelite - keyword-triggered meme generator
//!
//! Matches chat messages against a catalog of image templates, gathers
//! avatars, images and text from the conversation and hands them to an
//! image-composition engine.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `cache` - Bounded avatar cache and Moka-backed profile cache
//! - `options` - Schema-driven flag parsing for template options
//! - `catalog` - Template catalog and disabled list
//! - `bot` - Dispatcher, collaborator traits and the console runtime
//! - `plugins` - Command and meme handlers (extensible)
//! - `error` - Domain error types

mod bot;
mod cache;
mod catalog;
mod config;
mod error;
mod options;
mod plugins;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::console::{DryRunEngine, FsAvatarSource};
use bot::{AppState, DispatchSettings, Dispatcher};
use catalog::Catalog;
use config::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("memelite=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting memelite...");

    let config = Config::from_env();
    info!("Configuration loaded successfully");

    let catalog = Catalog::load(&config.catalog_path)?.with_disabled(&config.disabled_memes);
    let catalog = Arc::new(catalog);

    if config.avatar_cache.max_entries <= 0 {
        info!("Avatar cache disabled");
    } else {
        info!(
            "Avatar cache: {} entries, {} bytes max",
            config.avatar_cache.max_entries, config.avatar_cache.max_bytes
        );
    }

    let state = AppState::new(
        catalog,
        config.avatar_cache,
        config.profile_ttl,
        Arc::new(FsAvatarSource::new(config.avatar_dir.clone())),
        Arc::new(DryRunEngine),
        DispatchSettings::from(&config),
    );
    let dispatcher = Dispatcher::new(state);

    bot::run(&config, dispatcher).await
}
