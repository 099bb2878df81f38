//! Collaborators the dispatcher depends on but does not implement.
//!
//! Network access and image composition live behind these traits so the
//! dispatcher can be driven by any platform adapter (or by tests).

use futures::future::BoxFuture;
use serde::Deserialize;

use super::message::MemeImage;
use crate::error::GenerateError;
use crate::options::ParsedOptions;

/// Extra user details some platforms expose.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub nickname: String,
    #[serde(default)]
    pub gender: String,
}

/// Source of user avatars, message images and profiles.
pub trait AvatarSource: Send + Sync {
    /// Fetch the avatar of a user.
    fn fetch_avatar<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>>;

    /// Download an image attached to a message.
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>>;

    /// Look up a user's profile. `Ok(None)` when the platform has none.
    fn profile<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<Profile>>>;
}

/// Everything the engine needs for one image.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub key: String,
    pub images: Vec<MemeImage>,
    pub texts: Vec<String>,
    pub options: ParsedOptions,
}

/// The image-composition engine. Calls are blocking.
pub trait MemeEngine: Send + Sync {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, GenerateError>;
}
