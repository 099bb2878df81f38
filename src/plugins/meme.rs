//! Meme generation plugin.
//!
//! Matches a keyword, gathers images/texts/options from the conversation and
//! hands them to the engine.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::bot::collab::{GenerateRequest, Profile};
use crate::bot::dispatcher::AppState;
use crate::bot::message::{IncomingMessage, MemeImage, Reply, Segment};
use crate::catalog::Template;
use crate::error::GenerateError;
use crate::options::{self, OptionValue, ParsedOptions};

/// Image label used for pictures found in a quoted message.
const QUOTED_NAME: &str = "this guy";

/// Image label used for the bot's own avatar.
const SELF_NAME: &str = "me";

/// Handle a message that may trigger a meme.
pub async fn meme_handler(state: &AppState, msg: &IncomingMessage, text: &str) -> Option<Reply> {
    let keyword = state
        .catalog
        .match_keyword(text, state.settings.fuzzy_match)?
        .to_string();

    if state.catalog.is_disabled(&keyword) {
        debug!("Meme '{}' is disabled, ignoring", keyword);
        return None;
    }

    let Some(template) = state.catalog.find(&keyword) else {
        return Some(Reply::Text("No matching meme found.".to_string()));
    };

    let request = collect_params(state, msg, &keyword, template).await;
    info!(
        "Generating '{}' for {} ({} images, {} texts, {} options)",
        request.key,
        msg.sender_id,
        request.images.len(),
        request.texts.len(),
        request.options.len()
    );

    match generate(state, request).await {
        Ok(image) => Some(Reply::Image(image)),
        Err(e) => {
            error!("Failed to generate '{}': {}", keyword, e);
            Some(Reply::Text(format!("Meme generation failed: {}", e)))
        }
    }
}

/// Run the engine on the blocking pool.
async fn generate(state: &AppState, request: GenerateRequest) -> Result<Vec<u8>, GenerateError> {
    let engine = Arc::clone(&state.engine);
    match tokio::task::spawn_blocking(move || engine.generate(&request)).await {
        Ok(Ok(image)) if image.is_empty() => Err(GenerateError::Empty),
        Ok(result) => result,
        Err(e) => Err(GenerateError::Feedback(format!("engine task failed: {}", e))),
    }
}

/// Accumulated inputs while walking message segments.
#[derive(Default)]
struct Collected {
    images: Vec<MemeImage>,
    words: Vec<String>,
    extras: ParsedOptions,
    target_ids: Vec<String>,
    target_names: Vec<String>,
}

/// Gather everything the engine needs for `template`.
async fn collect_params(
    state: &AppState,
    msg: &IncomingMessage,
    keyword: &str,
    template: &Template,
) -> GenerateRequest {
    let params = &template.params;
    let mut collected = Collected::default();

    if let Some(quoted) = msg.reply_segments() {
        for seg in quoted {
            process_segment(state, msg, keyword, seg, QUOTED_NAME, &mut collected).await;
        }
    }

    for seg in &msg.segments {
        process_segment(state, msg, keyword, seg, &msg.sender_name, &mut collected).await;
    }

    let (mut texts, parsed) = options::resolve(&collected.words, &params.options);

    if collected.target_ids.is_empty()
        && let Some(profile) = profile(state, &msg.sender_id).await
    {
        apply_profile(&mut collected, profile);
    }

    if collected.target_names.is_empty() {
        collected.target_names.push(msg.sender_name.clone());
    }

    // Explicit flags beat platform-provided extras.
    let mut options = collected.extras;
    options.extend(parsed);

    let mut images = collected.images;
    if images.len() < params.max_images {
        let data = avatar(state, &msg.sender_id).await;
        images.insert(0, MemeImage::new(msg.sender_name.clone(), data));
    }
    if images.len() < params.max_images {
        let data = avatar(state, &msg.self_id).await;
        images.push(MemeImage::new(SELF_NAME, data));
    }
    images.truncate(params.max_images);

    texts.extend(collected.target_names);
    texts.extend(params.default_texts.iter().cloned());
    texts.truncate(params.max_texts);

    GenerateRequest {
        key: template.key.clone(),
        images,
        texts,
        options,
    }
}

async fn process_segment(
    state: &AppState,
    msg: &IncomingMessage,
    keyword: &str,
    seg: &Segment,
    name: &str,
    collected: &mut Collected,
) {
    match seg {
        Segment::Image { url } => match state.source.download(url).await {
            Ok(data) => collected.images.push(MemeImage::new(name, data.into())),
            Err(e) => warn!("Image download failed: {:#}", e),
        },
        Segment::At { user_id } => {
            if *user_id == msg.self_id {
                return;
            }
            collected.target_ids.push(user_id.clone());
            let data = avatar(state, user_id).await;
            if let Some(profile) = profile(state, user_id).await {
                collected
                    .images
                    .push(MemeImage::new(profile.nickname.clone(), data));
                apply_profile(collected, profile);
            }
        }
        Segment::Plain(text) => {
            let words = text
                .split_whitespace()
                .filter(|word| !is_trigger_word(state, keyword, word))
                .map(str::to_string);
            collected.words.extend(words);
        }
        // Quotes are walked separately, before the message itself.
        Segment::Reply(_) => {}
    }
}

/// The keyword itself, a bare wake prefix, or prefix + keyword.
fn is_trigger_word(state: &AppState, keyword: &str, word: &str) -> bool {
    word == keyword
        || state.settings.wake_prefix.iter().any(|prefix| {
            word == prefix.as_str() || word.strip_prefix(prefix.as_str()) == Some(keyword)
        })
}

fn apply_profile(collected: &mut Collected, profile: Profile) {
    collected
        .extras
        .insert("name".to_string(), OptionValue::Str(profile.nickname.clone()));
    collected
        .extras
        .insert("gender".to_string(), OptionValue::Str(profile.gender));
    collected.target_names.push(profile.nickname);
}

/// Avatar bytes for a user, through the blob cache.
///
/// Concurrent misses for the same user may both fetch; the last `put` wins.
/// A failed fetch yields an empty image and is not cached.
pub async fn avatar(state: &AppState, user_id: &str) -> Arc<[u8]> {
    if let Some(blob) = state.avatars.get(user_id) {
        debug!("Avatar cache hit: {}", user_id);
        return blob;
    }

    match state.source.fetch_avatar(user_id).await {
        Ok(bytes) if !bytes.is_empty() => {
            let blob: Arc<[u8]> = bytes.into();
            state.avatars.put(user_id, Arc::clone(&blob));
            let stats = state.avatars.stats();
            debug!(
                "Avatar cached: {} ({} entries, {} bytes)",
                user_id, stats.entries, stats.bytes
            );
            blob
        }
        Ok(_) => Arc::from(Vec::<u8>::new()),
        Err(e) => {
            error!("Avatar download failed for {}: {:#}", user_id, e);
            Arc::from(Vec::<u8>::new())
        }
    }
}

/// Profile for a user, through the profile cache.
async fn profile(state: &AppState, user_id: &str) -> Option<Profile> {
    let key = user_id.to_string();
    if let Some(cached) = state.profiles.get(&key) {
        return cached;
    }

    match state.source.profile(user_id).await {
        Ok(profile) => {
            state.profiles.insert(key, profile.clone());
            profile
        }
        Err(e) => {
            warn!("Profile lookup failed for {}: {:#}", user_id, e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::BoxFuture;
    use parking_lot::Mutex;

    use super::*;
    use crate::bot::collab::{AvatarSource, MemeEngine};
    use crate::bot::dispatcher::{DispatchSettings, Dispatcher};
    use crate::cache::BlobCacheConfig;
    use crate::catalog::tests::sample;

    #[derive(Default)]
    pub(crate) struct FakeSource {
        avatar_fetches: AtomicUsize,
        profiles: HashMap<String, Profile>,
    }

    impl AvatarSource for FakeSource {
        fn fetch_avatar<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>> {
            Box::pin(async move {
                self.avatar_fetches.fetch_add(1, Ordering::SeqCst);
                if user_id == "broken" {
                    anyhow::bail!("timeout");
                }
                Ok(format!("avatar:{}", user_id).into_bytes())
            })
        }

        fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>> {
            Box::pin(async move { Ok::<_, anyhow::Error>(format!("image:{}", url).into_bytes()) })
        }

        fn profile<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<Profile>>> {
            Box::pin(async move { Ok::<_, anyhow::Error>(self.profiles.get(user_id).cloned()) })
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub(crate) requests: Mutex<Vec<GenerateRequest>>,
        fail_with: Option<GenerateError>,
    }

    impl MemeEngine for RecordingEngine {
        fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, GenerateError> {
            self.requests.lock().push(request.clone());
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(b"png".to_vec()),
            }
        }
    }

    pub(crate) fn setup(
        source: FakeSource,
        engine: RecordingEngine,
        settings: DispatchSettings,
    ) -> (Dispatcher, Arc<FakeSource>, Arc<RecordingEngine>) {
        let source = Arc::new(source);
        let engine = Arc::new(engine);
        let state = AppState::new(
            Arc::new(sample()),
            BlobCacheConfig::new(10, 1024),
            Duration::from_secs(60),
            source.clone(),
            engine.clone(),
            settings,
        );
        (Dispatcher::new(state), source, engine)
    }

    pub(crate) fn message(segments: Vec<Segment>) -> IncomingMessage {
        IncomingMessage {
            sender_id: "100".into(),
            sender_name: "alice".into(),
            self_id: "1".into(),
            segments,
        }
    }

    pub(crate) fn plain(text: &str) -> Segment {
        Segment::Plain(text.to_string())
    }

    #[tokio::test]
    async fn test_texts_and_options_resolved() {
        let (dispatcher, _, engine) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());

        let reply = dispatcher
            .handle(&message(vec![plain("say --size 30 hi there --mystery 1.5")]))
            .await;
        assert_eq!(reply, Some(Reply::Image(b"png".to_vec())));

        let requests = engine.requests.lock();
        let request = &requests[0];
        assert_eq!(request.key, "say");
        assert!(request.images.is_empty());
        assert_eq!(request.texts, vec!["hi", "there"]);
        assert_eq!(request.options.get("size"), Some(&OptionValue::Int(30)));
        assert_eq!(request.options.get("mystery"), Some(&OptionValue::Float(1.5)));
    }

    #[tokio::test]
    async fn test_default_texts_fill_slots() {
        let (dispatcher, _, engine) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());

        dispatcher.handle(&message(vec![plain("/say")])).await;

        // sender name first, then default text, capped at max_texts = 2
        let requests = engine.requests.lock();
        assert_eq!(requests[0].texts, vec!["alice", "hello"]);
    }

    #[tokio::test]
    async fn test_avatars_fill_images_and_are_cached() {
        let (dispatcher, source, engine) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());

        dispatcher.handle(&message(vec![plain("pat")])).await;
        dispatcher.handle(&message(vec![plain("pat -c")])).await;

        assert_eq!(source.avatar_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.state().avatars.count(), 1);

        let requests = engine.requests.lock();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].images.len(), 1);
        assert_eq!(requests[1].images[0].name, "alice");
        assert_eq!(&*requests[1].images[0].data, b"avatar:100");
        assert_eq!(requests[1].options.get("circle"), Some(&OptionValue::Bool(true)));
    }

    #[tokio::test]
    async fn test_mention_uses_profile() {
        let mut source = FakeSource::default();
        source.profiles.insert(
            "200".into(),
            Profile {
                nickname: "bob".into(),
                gender: "male".into(),
            },
        );
        let (dispatcher, _, engine) =
            setup(source, RecordingEngine::default(), DispatchSettings::default());

        dispatcher
            .handle(&message(vec![
                plain("pat"),
                Segment::At { user_id: "200".into() },
                Segment::At { user_id: "1".into() },
            ]))
            .await;

        let requests = engine.requests.lock();
        let request = &requests[0];
        assert_eq!(request.images.len(), 1);
        assert_eq!(request.images[0].name, "bob");
        assert_eq!(request.options.get("name"), Some(&OptionValue::from("bob")));
        assert_eq!(request.options.get("gender"), Some(&OptionValue::from("male")));
    }

    #[tokio::test]
    async fn test_quoted_image_comes_first() {
        let (dispatcher, _, engine) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());

        dispatcher
            .handle(&message(vec![
                Segment::Reply(vec![Segment::Image { url: "q.png".into() }]),
                plain("pat"),
                Segment::Image { url: "own.png".into() },
            ]))
            .await;

        let requests = engine.requests.lock();
        let images = &requests[0].images;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, QUOTED_NAME);
        assert_eq!(&*images[0].data, b"image:q.png");
    }

    #[tokio::test]
    async fn test_failed_avatar_not_cached() {
        let (dispatcher, source, _) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());
        let state = dispatcher.state();

        assert!(avatar(state, "broken").await.is_empty());
        assert!(avatar(state, "broken").await.is_empty());
        assert_eq!(source.avatar_fetches.load(Ordering::SeqCst), 2);
        assert_eq!(state.avatars.count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_meme_ignored() {
        let (dispatcher, _, engine) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());

        let reply = dispatcher.handle(&message(vec![plain("meme-disable say")])).await;
        assert_eq!(reply, Some(Reply::Text("Disabled meme: say".to_string())));

        assert_eq!(dispatcher.handle(&message(vec![plain("say hi")])).await, None);
        assert!(engine.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_mode_gate() {
        let settings = DispatchSettings {
            prefix_mode: true,
            ..Default::default()
        };
        let (dispatcher, _, engine) =
            setup(FakeSource::default(), RecordingEngine::default(), settings);

        assert_eq!(dispatcher.handle(&message(vec![plain("say hi")])).await, None);
        assert!(dispatcher.handle(&message(vec![plain("/say hi")])).await.is_some());
        assert!(
            dispatcher
                .handle(&message(vec![Segment::At { user_id: "1".into() }, plain("say")]))
                .await
                .is_some()
        );
        assert_eq!(engine.requests.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_engine_error_reported() {
        let engine = RecordingEngine {
            fail_with: Some(GenerateError::TextOverLength("a very long caption".into())),
            ..Default::default()
        };
        let (dispatcher, _, _) = setup(FakeSource::default(), engine, DispatchSettings::default());

        let reply = dispatcher.handle(&message(vec![plain("say hi")])).await;
        assert_eq!(
            reply,
            Some(Reply::Text(
                "Meme generation failed: text too long: a very lon...".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_unknown_text_ignored() {
        let (dispatcher, _, _) =
            setup(FakeSource::default(), RecordingEngine::default(), DispatchSettings::default());
        assert_eq!(dispatcher.handle(&message(vec![plain("good morning")])).await, None);
    }
}
