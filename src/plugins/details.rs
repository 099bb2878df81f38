//! Meme details plugin.

use crate::bot::dispatcher::AppState;
use crate::bot::message::Reply;

/// Handle the details command - describes a meme's images, texts and options.
pub fn details_command(state: &AppState, keyword: Option<&str>) -> Reply {
    let Some(keyword) = keyword else {
        return Reply::Text("No meme given.".to_string());
    };

    match state.catalog.details(keyword) {
        Some(details) => Reply::Text(details),
        None => Reply::Text(format!("Unknown meme keyword: {}", keyword)),
    }
}
