//! Console platform adapter.
//!
//! Lets the dispatcher run from a terminal: messages are typed as lines,
//! avatars and profiles come from a local directory, and the engine only
//! describes what it would render.
//!
//! Line markup:
//! - `@<id>` - mention a user
//! - `[img:<path>]` - attach an image file (the path may contain spaces)
//! - a line starting with `> ` is quoted by the next message

use std::path::PathBuf;

use anyhow::Context;
use futures::future::BoxFuture;
use serde_json::json;
use url::Url;

use super::collab::{AvatarSource, GenerateRequest, MemeEngine, Profile};
use super::message::Segment;
use crate::error::GenerateError;

/// Reads `<dir>/<id>.png` avatars and optional `<dir>/<id>.json` profiles.
#[derive(Debug, Clone)]
pub struct FsAvatarSource {
    dir: PathBuf,
}

impl FsAvatarSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AvatarSource for FsAvatarSource {
    fn fetch_avatar<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>> {
        Box::pin(async move {
            let path = self.dir.join(format!("{}.png", user_id));
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("no avatar at {}", path.display()))
        })
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>> {
        Box::pin(async move {
            let path = local_path(url);
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read image {}", path.display()))
        })
    }

    fn profile<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<Profile>>> {
        Box::pin(async move {
            let path = self.dir.join(format!("{}.json", user_id));
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Ok(None);
            }
            let raw = tokio::fs::read_to_string(&path).await?;
            let profile: Profile = serde_json::from_str(&raw)
                .with_context(|| format!("invalid profile {}", path.display()))?;
            Ok::<_, anyhow::Error>(Some(profile))
        })
    }
}

/// `file://` URLs map to their path; anything else is taken as a path.
fn local_path(url: &str) -> PathBuf {
    Url::parse(url)
        .ok()
        .filter(|u| u.scheme() == "file")
        .and_then(|u| u.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(url))
}

/// Engine stand-in that returns a JSON description of the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunEngine;

impl MemeEngine for DryRunEngine {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, GenerateError> {
        let images: Vec<_> = request
            .images
            .iter()
            .map(|img| json!({ "name": img.name, "bytes": img.data.len() }))
            .collect();

        let description = json!({
            "key": request.key,
            "images": images,
            "texts": request.texts,
            "options": request.options,
        });

        serde_json::to_vec_pretty(&description).map_err(|e| GenerateError::ImageEncode(e.to_string()))
    }
}

/// Turn one typed line into message segments.
pub fn parse_line(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut words: Vec<&str> = Vec::new();
    let mut rest = line;

    // Image markers are found before splitting so paths may contain spaces.
    while let Some((before, path, after)) = take_image(rest) {
        push_words(before, &mut words, &mut segments);
        flush(&mut words, &mut segments);
        if !path.is_empty() {
            segments.push(Segment::Image {
                url: path.to_string(),
            });
        }
        rest = after;
    }
    push_words(rest, &mut words, &mut segments);
    flush(&mut words, &mut segments);

    segments
}

/// Split `text` around its first complete `[img:<path>]` marker.
fn take_image(text: &str) -> Option<(&str, &str, &str)> {
    let start = text.find("[img:")?;
    let body = &text[start + "[img:".len()..];
    let end = body.find(']')?;
    Some((&text[..start], body[..end].trim(), &body[end + 1..]))
}

fn push_words<'a>(text: &'a str, words: &mut Vec<&'a str>, segments: &mut Vec<Segment>) {
    for word in text.split_whitespace() {
        if let Some(id) = word.strip_prefix('@').filter(|id| !id.is_empty()) {
            flush(words, segments);
            segments.push(Segment::At {
                user_id: id.to_string(),
            });
        } else {
            words.push(word);
        }
    }
}

fn flush(words: &mut Vec<&str>, segments: &mut Vec<Segment>) {
    if !words.is_empty() {
        segments.push(Segment::Plain(words.join(" ")));
        words.clear();
    }
}

/// A quoted line (`> ...`), returned without its marker.
pub fn quoted(line: &str) -> Option<&str> {
    line.strip_prefix("> ")
}
