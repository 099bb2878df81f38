//! Disabled-meme management plugin.

use tracing::info;

use crate::bot::dispatcher::AppState;
use crate::bot::message::Reply;

/// Handle the disable command.
pub fn disable_command(state: &AppState, keyword: Option<&str>) -> Reply {
    let Some(keyword) = keyword else {
        return Reply::Text("No meme given to disable.".to_string());
    };

    match state.catalog.disable(keyword) {
        Ok(()) => {
            info!("Meme disabled: {}", keyword);
            Reply::Text(format!("Disabled meme: {}", keyword))
        }
        Err(e) => Reply::Text(e.to_string()),
    }
}

/// Handle the enable command.
pub fn enable_command(state: &AppState, keyword: Option<&str>) -> Reply {
    let Some(keyword) = keyword else {
        return Reply::Text("No meme given to enable.".to_string());
    };

    match state.catalog.enable(keyword) {
        Ok(()) => {
            info!("Meme enabled: {}", keyword);
            Reply::Text(format!("Enabled meme: {}", keyword))
        }
        Err(e) => Reply::Text(e.to_string()),
    }
}

/// Handle the blacklist command.
pub fn list_command(state: &AppState) -> Reply {
    let disabled = state.catalog.disabled();
    if disabled.is_empty() {
        Reply::Text("No memes are disabled.".to_string())
    } else {
        Reply::Text(format!("Disabled memes: {}", disabled.join(", ")))
    }
}
