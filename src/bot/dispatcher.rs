//! Message dispatcher setup.
//!
//! Routes each incoming message to a management command or to meme
//! generation.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::collab::{AvatarSource, MemeEngine, Profile};
use super::message::{IncomingMessage, Reply, Segment};
use crate::cache::{BlobCacheConfig, BoundedBlobCache, CacheConfig, TypedCache};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::plugins;

/// How messages are recognised as addressed to the bot.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub wake_prefix: Vec<String>,
    /// Only react to messages starting with a wake prefix or an @bot.
    pub prefix_mode: bool,
    /// Search the whole message for a keyword instead of the first word.
    pub fuzzy_match: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            wake_prefix: vec!["/".to_string()],
            prefix_mode: false,
            fuzzy_match: true,
        }
    }
}

impl From<&Config> for DispatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            wake_prefix: config.wake_prefix.clone(),
            prefix_mode: config.prefix_mode,
            fuzzy_match: config.fuzzy_match,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Templates and the disabled list.
    pub catalog: Arc<Catalog>,

    /// Avatar bytes keyed by user id.
    pub avatars: BoundedBlobCache,

    /// Profile lookups keyed by user id; `None` is cached too.
    pub profiles: TypedCache<String, Option<Profile>>,

    pub source: Arc<dyn AvatarSource>,

    pub engine: Arc<dyn MemeEngine>,

    pub settings: DispatchSettings,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        catalog: Arc<Catalog>,
        avatar_limits: BlobCacheConfig,
        profile_ttl: Duration,
        source: Arc<dyn AvatarSource>,
        engine: Arc<dyn MemeEngine>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            catalog,
            avatars: BoundedBlobCache::new(avatar_limits),
            profiles: TypedCache::new("profiles", CacheConfig::profiles(profile_ttl)),
            source,
            engine,
            settings,
        }
    }

    /// Strip a wake prefix from the start of `text`, if one is there.
    pub fn strip_prefix<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.settings
            .wake_prefix
            .iter()
            .filter(|p| !p.is_empty())
            .find_map(|p| text.strip_prefix(p.as_str()))
    }
}

/// Routes messages to handlers. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    state: AppState,
}

impl Dispatcher {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle one message. `None` means the bot stays silent.
    pub async fn handle(&self, msg: &IncomingMessage) -> Option<Reply> {
        if self.state.settings.prefix_mode && !self.is_addressed(msg) {
            return None;
        }

        let text = msg.text();
        if text.is_empty() {
            return None;
        }

        if let Some(command) = plugins::Command::parse(&text, &self.state) {
            debug!("Command from {}: {:?}", msg.sender_id, command);
            return Some(plugins::run_command(command, &self.state));
        }

        plugins::meme::meme_handler(&self.state, msg, &text).await
    }

    /// Prefix mode gate: first segment is a prefixed text or an @bot.
    fn is_addressed(&self, msg: &IncomingMessage) -> bool {
        match msg.segments.first() {
            Some(Segment::Plain(text)) => self.state.strip_prefix(text.trim_start()).is_some(),
            Some(Segment::At { user_id }) => *user_id == msg.self_id,
            _ => false,
        }
    }
}
