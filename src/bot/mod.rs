//! Bot module - Core dispatch functionality.

pub mod collab;
pub mod console;
pub mod dispatcher;
pub mod message;
mod runtime;

pub use dispatcher::{AppState, DispatchSettings, Dispatcher};
pub use runtime::run;
