//! Plugin system for command handlers.
//!
//! Add new commands by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding a variant to `Command` and a branch to `run_command()`

pub mod blacklist;
pub mod details;
pub mod help;
pub mod meme;

use crate::bot::dispatcher::AppState;
use crate::bot::message::Reply;

/// Management commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List trigger keywords
    Help,
    /// Show what a meme needs
    Details(Option<String>),
    /// Disable a meme
    Disable(Option<String>),
    /// Re-enable a meme
    Enable(Option<String>),
    /// List disabled memes
    Blacklist,
}

impl Command {
    /// Parse a command from message text.
    ///
    /// The command word may carry a wake prefix (`/meme-help`) or not.
    pub fn parse(text: &str, state: &AppState) -> Option<Self> {
        let mut words = text.split_whitespace();
        let first = words.next()?;
        let name = state.strip_prefix(first).unwrap_or(first);
        let arg = words.next().map(str::to_string);

        let command = match name.to_lowercase().as_str() {
            "meme-help" => Self::Help,
            "meme-details" => Self::Details(arg),
            "meme-disable" => Self::Disable(arg),
            "meme-enable" => Self::Enable(arg),
            "meme-blacklist" => Self::Blacklist,
            _ => return None,
        };
        Some(command)
    }
}

/// Run a parsed command and build its reply.
pub fn run_command(command: Command, state: &AppState) -> Reply {
    match command {
        Command::Help => help::help_command(state),
        Command::Details(keyword) => details::details_command(state, keyword.as_deref()),
        Command::Disable(keyword) => blacklist::disable_command(state, keyword.as_deref()),
        Command::Enable(keyword) => blacklist::enable_command(state, keyword.as_deref()),
        Command::Blacklist => blacklist::list_command(state),
    }
}
