//! Forward/drop decision for inbound events.

use std::fmt;

use crate::{
    event::{ChannelId, InboundEvent},
    store::RelaySnapshot,
};

/// Why an event was not relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Disabled,
    NoDestination,
    NotChannelPost,
    UnknownSource,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "relay disabled",
            Self::NoDestination => "no destination set",
            Self::NotChannelPost => "not a channel post",
            Self::UnknownSource => "origin not in sources",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Forward { destination: ChannelId },
    Drop(DropReason),
}

impl Verdict {
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward { .. })
    }
}

/// Decide whether `event` should be relayed under `config`.
///
/// Only posts authored by a channel in the source set are eligible; private
/// chats and groups are dropped even when their id matches.
pub fn decide(event: &InboundEvent, config: &RelaySnapshot) -> Verdict {
    if !config.enabled {
        return Verdict::Drop(DropReason::Disabled);
    }
    let Some(destination) = config.destination else {
        return Verdict::Drop(DropReason::NoDestination);
    };
    let Some(origin) = event.origin_channel() else {
        return Verdict::Drop(DropReason::NotChannelPost);
    };
    if !config.sources.contains(&origin) {
        return Verdict::Drop(DropReason::UnknownSource);
    }
    Verdict::Forward { destination }
}

pub fn should_forward(event: &InboundEvent, config: &RelaySnapshot) -> bool {
    decide(event, config).is_forward()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::event::{ChatKind, InboundContent},
        rstest::rstest,
        std::collections::BTreeSet,
    };

    fn config(enabled: bool) -> RelaySnapshot {
        RelaySnapshot {
            sources: BTreeSet::from([100, 200]),
            destination: Some(300),
            enabled,
        }
    }

    fn post(chat_kind: ChatKind, chat_id: ChannelId, sender: Option<ChannelId>) -> InboundEvent {
        InboundEvent {
            chat_id,
            chat_kind,
            sender_chat_id: sender,
            message_id: 1,
            content: InboundContent::Text {
                text: "hello".into(),
            },
        }
    }

    #[rstest]
    #[case(ChatKind::Channel, 100, Some(100))]
    #[case(ChatKind::Channel, 200, Some(200))]
    #[case(ChatKind::Channel, 999, Some(999))]
    #[case(ChatKind::Group, 100, Some(100))]
    #[case(ChatKind::Private, 100, None)]
    fn disabled_never_forwards(
        #[case] kind: ChatKind,
        #[case] chat_id: ChannelId,
        #[case] sender: Option<ChannelId>,
    ) {
        let event = post(kind, chat_id, sender);
        assert!(!should_forward(&event, &config(false)));
        assert_eq!(
            decide(&event, &config(false)),
            Verdict::Drop(DropReason::Disabled)
        );
    }

    #[test]
    fn forwards_channel_post_from_source() {
        let event = InboundEvent::channel_post(100, 1, InboundContent::Text {
            text: "hello".into(),
        });
        assert_eq!(decide(&event, &config(true)), Verdict::Forward {
            destination: 300
        });
    }

    #[rstest]
    #[case(999)]
    #[case(300)]
    #[case(-100)]
    fn unknown_origin_is_dropped(#[case] origin: ChannelId) {
        let event = post(ChatKind::Channel, origin, Some(origin));
        assert_eq!(
            decide(&event, &config(true)),
            Verdict::Drop(DropReason::UnknownSource)
        );
    }

    #[test]
    fn group_and_private_messages_are_dropped_even_when_id_matches() {
        let group = post(ChatKind::Group, 100, Some(100));
        let private = post(ChatKind::Private, 100, None);
        for event in [group, private] {
            assert_eq!(
                decide(&event, &config(true)),
                Verdict::Drop(DropReason::NotChannelPost)
            );
        }
    }

    #[test]
    fn missing_destination_drops() {
        let mut cfg = config(true);
        cfg.destination = None;
        let event = post(ChatKind::Channel, 100, Some(100));
        assert_eq!(
            decide(&event, &cfg),
            Verdict::Drop(DropReason::NoDestination)
        );
    }

    #[test]
    fn empty_sources_drop_everything() {
        let mut cfg = config(true);
        cfg.sources.clear();
        let event = post(ChatKind::Channel, 100, Some(100));
        assert!(!should_forward(&event, &cfg));
    }
}
