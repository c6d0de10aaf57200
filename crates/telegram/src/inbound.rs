//! Conversion from teloxide messages to relay events.

use teloxide::types::{
    Chat, ChatKind as TgChatKind, FileMeta, MediaKind, Message, MessageKind, PublicChatKind,
};

use tgrelay_relay::{ChatKind, FileRef, InboundContent, InboundEvent, PhotoVariant};

/// Build the relay's view of a Telegram message.
pub fn inbound_event(msg: &Message) -> InboundEvent {
    InboundEvent {
        chat_id: msg.chat.id.0,
        chat_kind: classify_chat(&msg.chat),
        sender_chat_id: msg.sender_chat.as_ref().map(|chat| chat.id.0),
        message_id: msg.id.0,
        content: inbound_content(msg),
    }
}

pub fn classify_chat(chat: &Chat) -> ChatKind {
    match &chat.kind {
        TgChatKind::Private(_) => ChatKind::Private,
        TgChatKind::Public(public) => match public.kind {
            PublicChatKind::Channel(_) => ChatKind::Channel,
            _ => ChatKind::Group,
        },
    }
}

fn inbound_content(msg: &Message) -> InboundContent {
    let MessageKind::Common(common) = &msg.kind else {
        return InboundContent::Unsupported {
            description: "service message",
        };
    };

    match &common.media_kind {
        MediaKind::Text(t) => InboundContent::Text {
            text: t.text.clone(),
        },
        MediaKind::Photo(p) => InboundContent::Photo {
            variants: p
                .photo
                .iter()
                .map(|size| PhotoVariant {
                    file: file_ref(&size.file),
                    width: size.width,
                    height: size.height,
                })
                .collect(),
            caption: p.caption.clone(),
        },
        MediaKind::Video(v) => InboundContent::Video {
            media: file_ref(&v.video.file),
            caption: v.caption.clone(),
        },
        MediaKind::Audio(a) => InboundContent::Audio {
            media: file_ref(&a.audio.file),
            performer: a.audio.performer.clone(),
            title: a.audio.title.clone(),
            caption: a.caption.clone(),
        },
        MediaKind::Document(d) => InboundContent::Document {
            media: file_ref(&d.document.file),
            file_name: d.document.file_name.clone(),
            caption: d.caption.clone(),
        },
        MediaKind::Sticker(s) => InboundContent::Sticker {
            media: file_ref(&s.sticker.file),
        },
        MediaKind::Voice(v) => InboundContent::Voice {
            media: file_ref(&v.voice.file),
            caption: v.caption.clone(),
        },
        MediaKind::VideoNote(v) => InboundContent::VideoNote {
            media: file_ref(&v.video_note.file),
        },
        other => InboundContent::Unsupported {
            description: describe_media_kind(other),
        },
    }
}

fn file_ref(file: &FileMeta) -> FileRef {
    FileRef::new(file.id.clone())
}

fn describe_media_kind(kind: &MediaKind) -> &'static str {
    match kind {
        MediaKind::Animation(_) => "animation",
        MediaKind::Contact(_) => "contact",
        MediaKind::Location(_) => "location",
        MediaKind::Venue(_) => "venue",
        MediaKind::Poll(_) => "poll",
        MediaKind::Game(_) => "game",
        _ => "unknown media",
    }
}
