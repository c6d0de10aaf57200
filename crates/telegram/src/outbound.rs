use {
    async_trait::async_trait,
    teloxide::{
        payloads::{
            SendAudioSetters, SendDocumentSetters, SendPhotoSetters, SendVideoSetters,
            SendVoiceSetters,
        },
        prelude::*,
        types::{ChatId, InputFile},
    },
    tracing::debug,
};

use tgrelay_relay::{Error, FileRef, OutboundPayload, OutboundRequest, RelaySender, Result};

/// Telegram rejects media captions longer than this many characters.
pub const TELEGRAM_MAX_CAPTION_LEN: usize = 1024;

/// Sends relay requests through the Bot API, reusing Telegram file ids so
/// media is never downloaded.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl RelaySender for TelegramSender {
    async fn send(&self, request: &OutboundRequest) -> Result<()> {
        let chat_id = ChatId(request.destination);
        let bot = &self.bot;

        let sent = match &request.payload {
            OutboundPayload::Text { body } => bot.send_message(chat_id, body).await,
            OutboundPayload::Photo { media, caption } => {
                let mut req = bot.send_photo(chat_id, input_file(media));
                if let Some(caption) = caption {
                    req = req.caption(truncate_caption(caption));
                }
                req.await
            },
            OutboundPayload::Video { media, caption } => {
                let mut req = bot.send_video(chat_id, input_file(media));
                if let Some(caption) = caption {
                    req = req.caption(truncate_caption(caption));
                }
                req.await
            },
            OutboundPayload::Audio { media, caption } => {
                let mut req = bot.send_audio(chat_id, input_file(media));
                if let Some(caption) = caption {
                    req = req.caption(truncate_caption(caption));
                }
                req.await
            },
            OutboundPayload::Document { media, caption } => {
                let mut req = bot.send_document(chat_id, input_file(media));
                if let Some(caption) = caption {
                    req = req.caption(truncate_caption(caption));
                }
                req.await
            },
            OutboundPayload::Sticker { media } => bot.send_sticker(chat_id, input_file(media)).await,
            OutboundPayload::Voice { media, caption } => {
                let mut req = bot.send_voice(chat_id, input_file(media));
                if let Some(caption) = caption {
                    req = req.caption(truncate_caption(caption));
                }
                req.await
            },
            OutboundPayload::VideoNote { media } => {
                bot.send_video_note(chat_id, input_file(media)).await
            },
        };

        let kind = request.kind();
        match sent {
            Ok(message) => {
                debug!(
                    chat_id = request.destination,
                    message_id = message.id.0,
                    kind = kind.as_str(),
                    "telegram send ok"
                );
                Ok(())
            },
            Err(e) => Err(Error::send(format!("telegram send {kind}"), e)),
        }
    }
}

fn input_file(media: &FileRef) -> InputFile {
    InputFile::file_id(media.as_str().to_string())
}

/// Cut a caption to Telegram's limit on a character boundary.
pub fn truncate_caption(caption: &str) -> String {
    match caption.char_indices().nth(TELEGRAM_MAX_CAPTION_LEN) {
        Some((idx, _)) => caption[..idx].to_string(),
        None => caption.to_string(),
    }
}
