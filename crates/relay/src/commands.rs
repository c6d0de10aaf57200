//! Operator commands and their replies.
//!
//! Commands arrive already parsed; this module applies them to the
//! [`RelayStore`] and renders the text sent back to the operator.

use std::{collections::BTreeSet, fmt::Write as _};

use tracing::{info, warn};

#[cfg(feature = "metrics")]
use {crate::metric_names as relay_metrics, metrics::counter};

use crate::{
    error::{Error, join_missing},
    event::ChannelId,
    store::{RelaySnapshot, RelayStore},
};

pub const SET_SOURCE_USAGE: &str = "Usage: /setsource <channel_id1> <channel_id2> ...";
pub const SET_DESTINATION_USAGE: &str = "Usage: /setdestination <channel_id>";

const COMMAND_LIST: &str = "\
Available Commands:

/help - Information about the bot.
/setsource <channel_id1> <channel_id2> ... - Set the IDs of channels to copy messages from.
/setdestination <channel_id> - Set the ID of the channel to post messages to.
/startcopy - Start copying messages.
/stopcopy - Stop copying messages.
/removesource - Remove source channel IDs.
/removedestination - Remove destination channel ID.
/status - View the current status of the bot.";

/// A structured operator request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Help,
    /// Raw id tokens, validated by the store.
    SetSources(Vec<String>),
    SetDestination(Option<String>),
    StartCopy,
    StopCopy,
    RemoveSource,
    RemoveDestination,
    Status,
}

impl OperatorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::SetSources(_) => "setsource",
            Self::SetDestination(_) => "setdestination",
            Self::StartCopy => "startcopy",
            Self::StopCopy => "stopcopy",
            Self::RemoveSource => "removesource",
            Self::RemoveDestination => "removedestination",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Rejected,
}

/// Text to send back to the operator chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub text: String,
    pub outcome: CommandOutcome,
}

impl CommandReply {
    fn applied(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: CommandOutcome::Applied,
        }
    }

    fn rejected(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: CommandOutcome::Rejected,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == CommandOutcome::Applied
    }
}

/// Apply `command` to `store` and build the operator reply.
pub fn execute(store: &RelayStore, command: OperatorCommand) -> CommandReply {
    let name = command.name();
    let reply = match command {
        OperatorCommand::Start => CommandReply::applied(format!(
            "Hello! This bot copies messages from other Telegram channels and posts them to your channel.\n\n{COMMAND_LIST}\n\nTo get started, set the source and destination channel IDs."
        )),
        OperatorCommand::Help => CommandReply::applied(format!(
            "This bot copies messages from other Telegram channels and posts them to your channel.\n\n{COMMAND_LIST}"
        )),
        OperatorCommand::SetSources(tokens) => match store.set_sources(tokens.as_slice()) {
            Ok(sources) => CommandReply::applied(format!(
                "Source channel IDs set: {}",
                format_ids(&sources)
            )),
            Err(e) => usage(name, &e, SET_SOURCE_USAGE),
        },
        OperatorCommand::SetDestination(token) => match store.set_destination(token.as_deref()) {
            Ok(id) => CommandReply::applied(format!("Destination channel ID set: {id}")),
            Err(e) => usage(name, &e, SET_DESTINATION_USAGE),
        },
        OperatorCommand::StartCopy => match store.enable() {
            Ok(()) => CommandReply::applied("Started copying messages."),
            Err(Error::PreconditionFailed { missing }) => {
                warn!(command = name, missing = %join_missing(&missing), "operator command rejected");
                CommandReply::rejected(format!("Please set the {} first.", join_missing(&missing)))
            },
            Err(e) => CommandReply::rejected(e.to_string()),
        },
        OperatorCommand::StopCopy => {
            store.disable();
            CommandReply::applied("Stopped copying messages.")
        },
        OperatorCommand::RemoveSource => {
            store.clear_sources();
            CommandReply::applied("Source channel IDs removed.")
        },
        OperatorCommand::RemoveDestination => {
            store.clear_destination();
            CommandReply::applied("Destination channel ID removed.")
        },
        OperatorCommand::Status => CommandReply::applied(format_status(&store.snapshot())),
    };

    info!(command = name, applied = reply.is_applied(), "operator command handled");
    #[cfg(feature = "metrics")]
    counter!(
        relay_metrics::COMMANDS_TOTAL,
        "command" => name,
        "outcome" => if reply.is_applied() { "applied" } else { "rejected" }
    )
    .increment(1);

    reply
}

fn usage(command: &'static str, error: &Error, text: &str) -> CommandReply {
    warn!(command, error = %error, "operator command rejected");
    CommandReply::rejected(text)
}

/// Render the current configuration for the `status` command.
pub fn format_status(config: &RelaySnapshot) -> String {
    let mut out = String::from("Current Bot Status:\n\n");
    let _ = writeln!(out, "Copying enabled: {}", config.enabled);
    let sources = if config.sources.is_empty() {
        "None".to_string()
    } else {
        format_ids(&config.sources)
    };
    let _ = writeln!(out, "Source channel IDs: {sources}");
    match config.destination {
        Some(id) => {
            let _ = write!(out, "Destination channel ID: {id}");
        },
        None => out.push_str("Destination channel ID: None"),
    }
    out
}

fn format_ids(ids: &BTreeSet<ChannelId>) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_sources_reports_accepted_ids() {
        let store = RelayStore::new();
        let reply = execute(
            &store,
            OperatorCommand::SetSources(tokens(&["-1002", "-1001"])),
        );
        assert!(reply.is_applied());
        assert_eq!(reply.text, "Source channel IDs set: -1002, -1001");
    }

    #[test]
    fn set_sources_without_ids_replies_with_usage() {
        let store = RelayStore::new();
        store.set_sources(&["7"]).unwrap();
        let reply = execute(&store, OperatorCommand::SetSources(Vec::new()));
        assert_eq!(reply, CommandReply {
            text: SET_SOURCE_USAGE.into(),
            outcome: CommandOutcome::Rejected,
        });
        assert_eq!(store.snapshot().sources, BTreeSet::from([7]));
    }

    #[test]
    fn set_sources_with_bad_id_replies_with_usage() {
        let store = RelayStore::new();
        let reply = execute(
            &store,
            OperatorCommand::SetSources(tokens(&["12", "@mychannel"])),
        );
        assert_eq!(reply.text, SET_SOURCE_USAGE);
        assert!(store.snapshot().sources.is_empty());
    }

    #[test]
    fn set_destination_validates_and_reports() {
        let store = RelayStore::new();
        let reply = execute(&store, OperatorCommand::SetDestination(None));
        assert_eq!(reply.text, SET_DESTINATION_USAGE);

        let reply = execute(
            &store,
            OperatorCommand::SetDestination(Some("-100300".into())),
        );
        assert_eq!(reply.text, "Destination channel ID set: -100300");
    }

    #[test]
    fn startcopy_names_missing_fields() {
        let store = RelayStore::new();
        let reply = execute(&store, OperatorCommand::StartCopy);
        assert_eq!(reply.outcome, CommandOutcome::Rejected);
        assert_eq!(
            reply.text,
            "Please set the source channel IDs and destination channel ID first."
        );

        store.set_destination(Some("5")).unwrap();
        let reply = execute(&store, OperatorCommand::StartCopy);
        assert_eq!(reply.text, "Please set the source channel IDs first.");
        assert!(!store.snapshot().enabled);
    }

    #[test]
    fn start_and_stop_copy() {
        let store = RelayStore::new();
        store.set_sources(&["1"]).unwrap();
        store.set_destination(Some("2")).unwrap();

        let reply = execute(&store, OperatorCommand::StartCopy);
        assert_eq!(reply.text, "Started copying messages.");
        assert!(store.snapshot().enabled);

        let reply = execute(&store, OperatorCommand::StopCopy);
        assert_eq!(reply.text, "Stopped copying messages.");
        assert!(!store.snapshot().enabled);
    }

    #[test]
    fn remove_commands_always_succeed() {
        let store = RelayStore::new();
        assert_eq!(
            execute(&store, OperatorCommand::RemoveSource).text,
            "Source channel IDs removed."
        );
        assert_eq!(
            execute(&store, OperatorCommand::RemoveDestination).text,
            "Destination channel ID removed."
        );
    }

    #[test]
    fn status_of_empty_config() {
        let store = RelayStore::new();
        let reply = execute(&store, OperatorCommand::Status);
        assert_eq!(
            reply.text,
            "Current Bot Status:\n\nCopying enabled: false\nSource channel IDs: None\nDestination channel ID: None"
        );
    }

    #[test]
    fn status_of_active_config() {
        let store = RelayStore::new();
        store.set_sources(&["200", "100"]).unwrap();
        store.set_destination(Some("300")).unwrap();
        store.enable().unwrap();
        assert_eq!(
            format_status(&store.snapshot()),
            "Current Bot Status:\n\nCopying enabled: true\nSource channel IDs: 100, 200\nDestination channel ID: 300"
        );
    }

    #[test]
    fn help_lists_every_operator_command() {
        let reply = execute(&RelayStore::new(), OperatorCommand::Help);
        for cmd in [
            "/setsource",
            "/setdestination",
            "/startcopy",
            "/stopcopy",
            "/removesource",
            "/removedestination",
            "/status",
        ] {
            assert!(reply.text.contains(cmd), "help is missing {cmd}");
        }
    }
}
