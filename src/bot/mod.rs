//! Chat front end: commands, routing and the Telegram dispatcher.

mod commands;
mod dispatch;
mod media_groups;
mod router;

pub use commands::{Command, CommandError, HELP_TEXT, MAX_LAST};
pub use dispatch::run_dispatcher;
pub use media_groups::MediaGroupCollector;
pub use router::{CommandRouter, Inbound};
