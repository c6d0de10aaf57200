use {
    teloxide::{
        payloads::SendMessageSetters,
        prelude::*,
        types::ReplyParameters,
    },
    tracing::{debug, warn},
};

use tgrelay_relay::{ChatKind, DispatchOutcome, commands};

use crate::{
    commands::parse_command,
    error::Result,
    inbound::{classify_chat, inbound_event},
    state::RelayBot,
};

/// What happened to one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandledAs {
    /// An operator command was applied or rejected and answered.
    Command,
    /// The message went through the relay dispatcher.
    Relay(DispatchOutcome),
    /// A private or group message that is not a command.
    Ignored,
}

/// Handle a message or channel post delivered by polling.
///
/// Channel posts always go to the dispatcher, which applies the forwarding
/// policy; their text is never read as a command. Commands are accepted
/// from private chats and groups and answered in the same chat.
pub async fn handle_message(msg: Message, state: &RelayBot) -> Result<HandledAs> {
    if classify_chat(&msg.chat) == ChatKind::Channel {
        let event = inbound_event(&msg);
        let outcome = state.dispatcher.handle(&event).await;
        return Ok(HandledAs::Relay(outcome));
    }

    let Some(command) = msg
        .text()
        .and_then(|text| parse_command(text, state.bot_username.as_deref()))
    else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-command message");
        return Ok(HandledAs::Ignored);
    };

    let name = command.name();
    let reply = commands::execute(&state.store, command);
    debug!(chat_id = msg.chat.id.0, command = name, "replying to operator command");
    send_reply(&state.bot, &msg, &reply.text).await?;
    Ok(HandledAs::Command)
}

async fn send_reply(bot: &Bot, msg: &Message, text: &str) -> Result<()> {
    let sent = bot
        .send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id).allow_sending_without_reply())
        .await;
    if let Err(e) = sent {
        warn!(chat_id = msg.chat.id.0, error = %e, "failed to send command reply");
        return Err(e.into());
    }
    Ok(())
}
