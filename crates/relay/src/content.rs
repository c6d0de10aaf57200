//! Mapping from inbound content to outbound send requests.

use std::fmt;

use serde::Serialize;

use crate::event::{ChannelId, FileRef, InboundContent, PhotoVariant};

/// Content kinds the relay knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Photo,
    Video,
    Audio,
    Document,
    Sticker,
    Voice,
    VideoNote,
    Unsupported,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Sticker => "sticker",
            Self::Voice => "voice",
            Self::VideoNote => "video_note",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InboundContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Photo { .. } => ContentKind::Photo,
            Self::Video { .. } => ContentKind::Video,
            Self::Audio { .. } => ContentKind::Audio,
            Self::Document { .. } => ContentKind::Document,
            Self::Sticker { .. } => ContentKind::Sticker,
            Self::Voice { .. } => ContentKind::Voice,
            Self::VideoNote { .. } => ContentKind::VideoNote,
            Self::Unsupported { .. } => ContentKind::Unsupported,
        }
    }
}

/// What to send to the destination. One variant per supported kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundPayload {
    Text {
        body: String,
    },
    Photo {
        media: FileRef,
        caption: Option<String>,
    },
    Video {
        media: FileRef,
        caption: Option<String>,
    },
    Audio {
        media: FileRef,
        caption: Option<String>,
    },
    Document {
        media: FileRef,
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
}

impl OutboundPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Photo { .. } => ContentKind::Photo,
            Self::Video { .. } => ContentKind::Video,
            Self::Audio { .. } => ContentKind::Audio,
            Self::Document { .. } => ContentKind::Document,
            Self::Sticker { .. } => ContentKind::Sticker,
            Self::Voice { .. } => ContentKind::Voice,
            Self::VideoNote { .. } => ContentKind::VideoNote,
        }
    }

    pub fn caption(&self) -> Option<&str> {
        match self {
            Self::Photo { caption, .. }
            | Self::Video { caption, .. }
            | Self::Audio { caption, .. }
            | Self::Document { caption, .. }
            | Self::Voice { caption, .. } => caption.as_deref(),
            Self::Text { .. } | Self::Sticker { .. } | Self::VideoNote { .. } => None,
        }
    }
}

/// A send request addressed to the destination channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundRequest {
    pub destination: ChannelId,
    pub payload: OutboundPayload,
}

impl OutboundRequest {
    pub fn new(destination: ChannelId, payload: OutboundPayload) -> Self {
        Self {
            destination,
            payload,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.payload.kind()
    }
}

/// Map inbound content to an outbound payload.
///
/// Returns `None` for content the relay does not copy.
pub fn map_content(content: &InboundContent) -> Option<OutboundPayload> {
    let payload = match content {
        InboundContent::Text { text } => OutboundPayload::Text { body: text.clone() },
        InboundContent::Photo { variants, caption } => OutboundPayload::Photo {
            media: largest_variant(variants)?.file.clone(),
            caption: caption.clone(),
        },
        InboundContent::Video { media, caption } => OutboundPayload::Video {
            media: media.clone(),
            caption: caption.clone(),
        },
        InboundContent::Audio {
            media,
            performer,
            title,
            caption,
        } => OutboundPayload::Audio {
            media: media.clone(),
            caption: audio_caption(performer.as_deref(), title.as_deref(), caption.as_deref()),
        },
        InboundContent::Document {
            media,
            file_name,
            caption,
        } => OutboundPayload::Document {
            media: media.clone(),
            caption: join_sections(file_name.as_deref(), caption.as_deref()),
        },
        InboundContent::Sticker { media } => OutboundPayload::Sticker {
            media: media.clone(),
        },
        InboundContent::Voice { media, caption } => OutboundPayload::Voice {
            media: media.clone(),
            caption: caption.clone(),
        },
        InboundContent::VideoNote { media } => OutboundPayload::VideoNote {
            media: media.clone(),
        },
        InboundContent::Unsupported { .. } => return None,
    };
    Some(payload)
}

/// Highest-resolution photo variant; on equal size the later one wins.
fn largest_variant(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
    variants.iter().max_by_key(|v| v.pixels())
}

/// `"{performer} - {title}\n\n{caption}"`, eliding whatever is absent.
pub fn audio_caption(
    performer: Option<&str>,
    title: Option<&str>,
    caption: Option<&str>,
) -> Option<String> {
    let header = match (non_empty(performer), non_empty(title)) {
        (Some(p), Some(t)) => Some(format!("{p} - {t}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    };
    join_sections(header.as_deref(), caption)
}

/// Join a heading and a caption with a blank line; either may be absent.
pub fn join_sections(head: Option<&str>, body: Option<&str>) -> Option<String> {
    match (non_empty(head), non_empty(body)) {
        (Some(h), Some(b)) => Some(format!("{h}\n\n{b}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
