//! Channel relay core.
//!
//! Decides whether an inbound channel post should be copied to the
//! destination channel, maps its content to an outbound send request and
//! dispatches it through a [`RelaySender`]. Operator commands mutate the
//! shared [`RelayStore`].

pub mod commands;
pub mod content;
pub mod dispatcher;
pub mod error;
pub mod event;
#[cfg(feature = "metrics")]
pub mod metric_names;
pub mod policy;
pub mod store;

pub use {
    commands::{CommandOutcome, CommandReply, OperatorCommand},
    content::{ContentKind, OutboundPayload, OutboundRequest, map_content},
    dispatcher::{DispatchOutcome, Dispatcher, RelaySender},
    error::{Error, MissingField, Result},
    event::{ChannelId, ChatKind, FileRef, InboundContent, InboundEvent, PhotoVariant},
    policy::{DropReason, Verdict, decide, should_forward},
    store::{RelaySnapshot, RelayStore},
};
