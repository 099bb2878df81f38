//! Help command plugin.

use crate::bot::dispatcher::AppState;
use crate::bot::message::Reply;

/// Handle the help command - lists every trigger keyword.
pub fn help_command(state: &AppState) -> Reply {
    let catalog = &state.catalog;
    let prefix = state
        .settings
        .wake_prefix
        .first()
        .map(String::as_str)
        .unwrap_or("");

    let mut text = format!("{} memes available. Trigger one with its keyword:\n", catalog.len());
    text.push_str(&catalog.keywords().join(" | "));
    text.push_str(&format!(
        "\n\nUse {}meme-details <keyword> to see what a meme needs.",
        prefix
    ));

    Reply::Text(text)
}
