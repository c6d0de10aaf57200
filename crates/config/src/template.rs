//! Default configuration template written by `tgrelay config init`.

pub fn default_config_template() -> String {
    r##"# tgrelay configuration
#
# Environment variable substitution is supported: ${ENV_VAR} or
# ${ENV_VAR:-default}. TGRELAY_BOT_TOKEN and TGRELAY_SEND_TIMEOUT_SECS also
# override the values below directly.
#
# Relay sources, destination and the on/off switch are set at runtime with
# bot commands (/setsource, /setdestination, /startcopy) and are not stored.

[telegram]
token = "${TGRELAY_BOT_TOKEN}"   # Bot token from @BotFather
poll_timeout_secs = 30           # getUpdates long-poll timeout
client_timeout_secs = 45         # HTTP timeout, must exceed poll_timeout_secs
register_commands = true         # Publish the command list with setMyCommands
# api_url = "http://localhost:8081/"   # Self-hosted Bot API server

[relay]
send_timeout_secs = 30           # Give up on a single copy after this long
"##
    .to_string()
}
