use std::{sync::Arc, time::Duration};

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, UpdateKind},
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use {
    tgrelay_config::TelegramConfig,
    tgrelay_relay::{Dispatcher, RelayStore},
};

use crate::{
    commands::bot_commands,
    error::{Error, Result},
    handlers,
    outbound::TelegramSender,
    state::RelayBot,
};

/// Pause after a failed `getUpdates` before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Handle to a running polling loop.
pub struct RunningBot {
    pub username: Option<String>,
    pub cancel: CancellationToken,
    pub task: JoinHandle<()>,
}

impl RunningBot {
    /// Stop polling and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "telegram polling task ended abnormally");
        }
    }
}

/// Connect to Telegram and start the polling loop.
///
/// Verifies the token with `getMe`, clears any webhook and spawns a task
/// that feeds messages and channel posts to the handlers until `cancel`
/// fires or another instance takes over the token.
pub async fn start_polling(
    config: &TelegramConfig,
    store: Arc<RelayStore>,
    send_timeout: Duration,
    cancel: CancellationToken,
) -> Result<RunningBot> {
    // The HTTP timeout must outlast the long-poll timeout so the client
    // doesn't abort the request before Telegram responds.
    let client = teloxide::net::default_reqwest_settings()
        .timeout(config.client_timeout())
        .build()
        .map_err(|e| Error::setup("failed to build telegram http client", e))?;
    let mut bot = Bot::with_client(config.token.expose_secret(), client);
    if let Some(api_url) = &config.api_url {
        let url = reqwest::Url::parse(api_url)
            .map_err(|e| Error::setup(format!("invalid telegram api_url {api_url}"), e))?;
        bot = bot.set_api_url(url);
    }

    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    // Long polling does not work while a webhook is set.
    bot.delete_webhook().send().await?;

    if config.register_commands
        && let Err(e) = bot.set_my_commands(bot_commands()).await
    {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?bot_username, "telegram bot connected (webhook cleared)");

    let sender = Arc::new(TelegramSender::new(bot.clone()));
    let dispatcher = Dispatcher::new(store, sender).with_send_timeout(send_timeout);
    let state = Arc::new(RelayBot::new(bot, bot_username.clone(), dispatcher));

    let poll_timeout = config.poll_timeout_secs;
    let poll_cancel = cancel.clone();
    let task = tokio::spawn(async move {
        poll_updates(state, poll_timeout, poll_cancel).await;
    });

    Ok(RunningBot {
        username: bot_username,
        cancel,
        task,
    })
}

async fn poll_updates(state: Arc<RelayBot>, poll_timeout: u32, cancel: CancellationToken) {
    info!("starting telegram polling loop");
    let mut offset: i32 = 0;

    loop {
        let request = state
            .bot
            .get_updates()
            .offset(offset)
            .timeout(poll_timeout)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::ChannelPost])
            .send();

        let result = tokio::select! {
            () = cancel.cancelled() => {
                info!("telegram polling stopped");
                break;
            },
            result = request => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    let msg = match update.kind {
                        UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => msg,
                        other => {
                            debug!("ignoring non-message update: {other:?}");
                            continue;
                        },
                    };
                    let chat_id = msg.chat.id.0;
                    match handlers::handle_message(msg, &state).await {
                        Ok(handled) => debug!(chat_id, ?handled, "telegram message handled"),
                        Err(e) => {
                            error!(chat_id, error = %e, "error handling telegram message");
                        },
                    }
                }
            },
            Err(e) => {
                if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                    warn!(
                        "telegram polling disabled: another instance is already running with this token"
                    );
                    cancel.cancel();
                    break;
                }

                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(POLL_RETRY_DELAY) => {},
                }
            },
        }
    }
}
