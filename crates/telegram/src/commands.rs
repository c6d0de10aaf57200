//! Text command parsing and Bot API command registration.

use teloxide::types::BotCommand;

use tgrelay_relay::OperatorCommand;

/// Parse a `/command[@bot] args...` message into an operator command.
///
/// Returns `None` for plain text, unknown commands and commands addressed
/// to a different bot.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<OperatorCommand> {
    let body = text.trim_start().strip_prefix('/')?;
    let mut parts = body.split_whitespace();
    let head = parts.next()?;

    let (name, target) = match head.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (head, None),
    };
    if let (Some(target), Some(me)) = (target, bot_username)
        && !target.eq_ignore_ascii_case(me)
    {
        return None;
    }

    let command = match name.to_ascii_lowercase().as_str() {
        "start" => OperatorCommand::Start,
        "help" => OperatorCommand::Help,
        "setsource" => OperatorCommand::SetSources(parts.map(str::to_string).collect()),
        "setdestination" => OperatorCommand::SetDestination(parts.next().map(str::to_string)),
        "startcopy" => OperatorCommand::StartCopy,
        "stopcopy" => OperatorCommand::StopCopy,
        "removesource" => OperatorCommand::RemoveSource,
        "removedestination" => OperatorCommand::RemoveDestination,
        "status" => OperatorCommand::Status,
        _ => return None,
    };
    Some(command)
}

/// Commands advertised to Telegram clients for autocomplete.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("help", "Information about the bot"),
        BotCommand::new("setsource", "Set the IDs of channels to copy messages from"),
        BotCommand::new("setdestination", "Set the ID of the channel to post messages to"),
        BotCommand::new("startcopy", "Start copying messages"),
        BotCommand::new("stopcopy", "Stop copying messages"),
        BotCommand::new("removesource", "Remove source channel IDs"),
        BotCommand::new("removedestination", "Remove destination channel ID"),
        BotCommand::new("status", "View the current status of the bot"),
    ]
}
