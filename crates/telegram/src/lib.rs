//! Telegram transport for the channel relay.
//!
//! Receives updates with teloxide long polling, turns channel posts into
//! relay events and text commands into operator commands, and implements
//! the relay's outbound send capability with the Bot API.

pub mod bot;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod inbound;
pub mod outbound;
pub mod state;
#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod test_support;

pub use {
    bot::{RunningBot, start_polling},
    error::{Error, Result},
    outbound::TelegramSender,
    state::RelayBot,
};
