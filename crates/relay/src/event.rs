//! Inbound events as seen by the relay core.

use serde::Serialize;

/// Telegram chat identifier. Channels use negative `-100…` ids.
pub type ChannelId = i64;

/// Kind of chat an event was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

/// Reference to a file already stored on the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef(pub String);

impl FileRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One resolution of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoVariant {
    pub file: FileRef,
    pub width: u32,
    pub height: u32,
}

impl PhotoVariant {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Primary content of an inbound message. A message carries at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundContent {
    Text {
        text: String,
    },
    Photo {
        variants: Vec<PhotoVariant>,
        caption: Option<String>,
    },
    Video {
        media: FileRef,
        caption: Option<String>,
    },
    Audio {
        media: FileRef,
        performer: Option<String>,
        title: Option<String>,
        caption: Option<String>,
    },
    Document {
        media: FileRef,
        file_name: Option<String>,
        caption: Option<String>,
    },
    Sticker {
        media: FileRef,
    },
    Voice {
        media: FileRef,
        caption: Option<String>,
    },
    VideoNote {
        media: FileRef,
    },
    /// Anything else: polls, locations, service messages, ...
    Unsupported {
        description: &'static str,
    },
}

/// A message delivered to the relay, already converted from the platform's
/// wire type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundEvent {
    pub chat_id: ChannelId,
    pub chat_kind: ChatKind,
    /// Chat that authored the post, set by the platform for channel posts
    /// and anonymous group admins.
    pub sender_chat_id: Option<ChannelId>,
    pub message_id: i32,
    pub content: InboundContent,
}

impl InboundEvent {
    /// The channel this event was broadcast from, if it is a channel post.
    pub fn origin_channel(&self) -> Option<ChannelId> {
        match self.chat_kind {
            ChatKind::Channel => self.sender_chat_id,
            ChatKind::Private | ChatKind::Group => None,
        }
    }

    /// Shorthand for a channel post authored by the channel itself.
    pub fn channel_post(channel_id: ChannelId, message_id: i32, content: InboundContent) -> Self {
        Self {
            chat_id: channel_id,
            chat_kind: ChatKind::Channel,
            sender_chat_id: Some(channel_id),
            message_id,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> InboundContent {
        InboundContent::Text { text: s.into() }
    }

    #[test]
    fn channel_post_has_origin() {
        let event = InboundEvent::channel_post(-100_123, 7, text("hi"));
        assert_eq!(event.origin_channel(), Some(-100_123));
    }

    #[test]
    fn group_message_from_channel_identity_has_no_origin() {
        let event = InboundEvent {
            chat_id: -42,
            chat_kind: ChatKind::Group,
            sender_chat_id: Some(-100_123),
            message_id: 1,
            content: text("hi"),
        };
        assert_eq!(event.origin_channel(), None);
    }

    #[test]
    fn channel_message_without_sender_chat_has_no_origin() {
        let event = InboundEvent {
            chat_id: -100_123,
            chat_kind: ChatKind::Channel,
            sender_chat_id: None,
            message_id: 1,
            content: text("hi"),
        };
        assert_eq!(event.origin_channel(), None);
    }
}
