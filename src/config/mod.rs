//! Configuration module for memelite.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::BlobCacheConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON template catalog.
    pub catalog_path: PathBuf,

    /// Wake prefixes (comma-separated), e.g. `/`.
    pub wake_prefix: Vec<String>,

    /// Only react to prefixed messages or messages starting with @bot.
    pub prefix_mode: bool,

    /// Match keywords anywhere in the message instead of the first word.
    pub fuzzy_match: bool,

    /// Memes disabled at startup (comma-separated keywords).
    pub disabled_memes: Vec<String>,

    // Caches
    pub avatar_cache: BlobCacheConfig,
    pub profile_ttl: Duration,

    // Console runtime
    pub avatar_dir: PathBuf,
    pub self_id: String,
    pub console_user_id: String,
    pub console_user_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is required; malformed values fall back to their defaults
    /// with a warning.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = BlobCacheConfig::default();

        Self {
            catalog_path: env::var("MEME_CATALOG_PATH")
                .unwrap_or_else(|_| "memes.json".to_string())
                .into(),
            wake_prefix: env::var("WAKE_PREFIX")
                .map(|s| split_list(&s))
                .unwrap_or_else(|_| vec!["/".to_string()]),
            prefix_mode: parse_var("PREFIX_MODE", false),
            fuzzy_match: parse_var("FUZZY_MATCH", true),
            disabled_memes: split_list(&env::var("DISABLED_MEMES").unwrap_or_default()),
            avatar_cache: BlobCacheConfig::new(
                parse_var("AVATAR_CACHE_MAX_ENTRIES", defaults.max_entries),
                parse_var("AVATAR_CACHE_MAX_BYTES", defaults.max_bytes),
            ),
            profile_ttl: Duration::from_secs(parse_var("PROFILE_CACHE_TTL_SECS", 600)),
            avatar_dir: env::var("AVATAR_DIR")
                .unwrap_or_else(|_| "avatars".to_string())
                .into(),
            self_id: env::var("SELF_ID").unwrap_or_else(|_| "10000".to_string()),
            console_user_id: env::var("CONSOLE_USER_ID").unwrap_or_else(|_| "10001".to_string()),
            console_user_name: env::var("CONSOLE_USER_NAME")
                .unwrap_or_else(|_| "console".to_string()),
        }
    }
}

/// Split a comma-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid value for {}: {:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
