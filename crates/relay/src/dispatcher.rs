use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    tracing::{debug, error, info, trace},
};

#[cfg(feature = "metrics")]
use {
    crate::metric_names as relay_metrics,
    metrics::{counter, histogram},
};

use crate::{
    content::{ContentKind, OutboundRequest, map_content},
    error::{Error, Result},
    event::InboundEvent,
    policy::{DropReason, Verdict, decide},
    store::RelayStore,
};

/// Default bound on a single outbound send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound send capability, implemented by the platform adapter.
#[async_trait]
pub trait RelaySender: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<()>;
}

/// Result of handling one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dropped(DropReason),
    Unsupported,
    Relayed(ContentKind),
    Failed(ContentKind),
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dropped(_) => "dropped",
            Self::Unsupported => "unsupported",
            Self::Relayed(_) => "relayed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Runs the relay pipeline for each inbound event.
///
/// Holds no per-event state; events may be handled concurrently from
/// separate tasks.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<RelayStore>,
    sender: Arc<dyn RelaySender>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(store: Arc<RelayStore>, sender: Arc<dyn RelaySender>) -> Self {
        Self {
            store,
            sender,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<RelayStore> {
        &self.store
    }

    /// Relay `event` if the current configuration allows it.
    ///
    /// Send failures are logged and reported in the outcome, never returned.
    pub async fn handle(&self, event: &InboundEvent) -> DispatchOutcome {
        let outcome = self.handle_inner(event).await;
        #[cfg(feature = "metrics")]
        counter!(relay_metrics::EVENTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
        outcome
    }

    async fn handle_inner(&self, event: &InboundEvent) -> DispatchOutcome {
        let config = self.store.snapshot();
        let destination = match decide(event, &config) {
            Verdict::Forward { destination } => destination,
            Verdict::Drop(reason) => {
                trace!(
                    chat_id = event.chat_id,
                    message_id = event.message_id,
                    %reason,
                    "relay: event dropped"
                );
                return DispatchOutcome::Dropped(reason);
            },
        };

        let Some(payload) = map_content(&event.content) else {
            debug!(
                chat_id = event.chat_id,
                message_id = event.message_id,
                content = ?event.content,
                "relay: unsupported content ignored"
            );
            return DispatchOutcome::Unsupported;
        };

        let request = OutboundRequest::new(destination, payload);
        let kind = request.kind();

        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let result = match tokio::time::timeout(self.send_timeout, self.sender.send(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::SendTimeout {
                timeout: self.send_timeout,
            }),
        };

        #[cfg(feature = "metrics")]
        histogram!(relay_metrics::SEND_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                info!(
                    origin = event.chat_id,
                    message_id = event.message_id,
                    destination,
                    %kind,
                    "relay: message copied"
                );
                #[cfg(feature = "metrics")]
                counter!(relay_metrics::RELAYED_TOTAL, "kind" => kind.as_str()).increment(1);
                DispatchOutcome::Relayed(kind)
            },
            Err(e) => {
                error!(
                    origin = event.chat_id,
                    message_id = event.message_id,
                    destination,
                    %kind,
                    error = %e,
                    "relay: failed to copy message"
                );
                #[cfg(feature = "metrics")]
                {
                    let reason = match e {
                        Error::SendTimeout { .. } => "timeout",
                        _ => "error",
                    };
                    counter!(relay_metrics::SEND_FAILURES_TOTAL, "reason" => reason).increment(1);
                }
                DispatchOutcome::Failed(kind)
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            content::OutboundPayload,
            event::{ChannelId, FileRef, InboundContent},
        },
        std::{
            collections::VecDeque,
            sync::{
                Mutex,
                atomic::{AtomicUsize, Ordering},
            },
        },
    };

    /// Records every request; fails or stalls according to a script.
    #[derive(Default)]
    struct MockSender {
        sent: Mutex<Vec<OutboundRequest>>,
        calls: AtomicUsize,
        script: Mutex<VecDeque<Step>>,
    }

    enum Step {
        Fail,
        Hang,
    }

    impl MockSender {
        fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
            Self {
                script: Mutex::new(steps.into_iter().collect()),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<OutboundRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelaySender for MockSender {
        async fn send(&self, request: &OutboundRequest) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.lock().unwrap().pop_front();
            match step {
                Some(Step::Fail) => Err(Error::send(
                    "send message",
                    std::io::Error::other("bad gateway"),
                )),
                Some(Step::Hang) => {
                    std::future::pending::<()>().await;
                    Ok(())
                },
                None => {
                    self.sent.lock().unwrap().push(request.clone());
                    Ok(())
                },
            }
        }
    }

    fn configured_store() -> Arc<RelayStore> {
        let store = Arc::new(RelayStore::new());
        store.set_sources(&["100", "200"]).unwrap();
        store.set_destination(Some("300")).unwrap();
        store.enable().unwrap();
        store
    }

    fn text_post(channel: ChannelId, text: &str) -> InboundEvent {
        InboundEvent::channel_post(channel, 1, InboundContent::Text { text: text.into() })
    }

    #[tokio::test]
    async fn relays_text_from_source_and_ignores_others() {
        let sender = Arc::new(MockSender::default());
        let dispatcher = Dispatcher::new(configured_store(), sender.clone());

        let outcome = dispatcher.handle(&text_post(100, "hello")).await;
        assert_eq!(outcome, DispatchOutcome::Relayed(ContentKind::Text));

        let outcome = dispatcher.handle(&text_post(999, "hi")).await;
        assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::UnknownSource));

        assert_eq!(sender.sent(), vec![OutboundRequest::new(
            300,
            OutboundPayload::Text {
                body: "hello".into()
            }
        )]);
        assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_store_sends_nothing() {
        let store = configured_store();
        store.disable();
        let sender = Arc::new(MockSender::default());
        let dispatcher = Dispatcher::new(store, sender.clone());

        let outcome = dispatcher.handle(&text_post(100, "hello")).await;
        assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::Disabled));
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_content_is_ignored() {
        let sender = Arc::new(MockSender::default());
        let dispatcher = Dispatcher::new(configured_store(), sender.clone());
        let event = InboundEvent::channel_post(100, 1, InboundContent::Unsupported {
            description: "poll",
        });

        assert_eq!(dispatcher.handle(&event).await, DispatchOutcome::Unsupported);
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_send_does_not_block_next_event() {
        let sender = Arc::new(MockSender::scripted([Step::Fail]));
        let dispatcher = Dispatcher::new(configured_store(), sender.clone());
        let event = text_post(200, "same content");

        assert_eq!(
            dispatcher.handle(&event).await,
            DispatchOutcome::Failed(ContentKind::Text)
        );
        assert_eq!(
            dispatcher.handle(&event).await,
            DispatchOutcome::Relayed(ContentKind::Text)
        );
        assert_eq!(sender.sent().len(), 1);
        assert!(dispatcher.store().snapshot().enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_send_times_out() {
        let sender = Arc::new(MockSender::scripted([Step::Hang]));
        let dispatcher = Dispatcher::new(configured_store(), sender.clone())
            .with_send_timeout(Duration::from_secs(5));

        let outcome = dispatcher.handle(&text_post(100, "stuck")).await;
        assert_eq!(outcome, DispatchOutcome::Failed(ContentKind::Text));

        let outcome = dispatcher.handle(&text_post(100, "next")).await;
        assert_eq!(outcome, DispatchOutcome::Relayed(ContentKind::Text));
    }

    #[tokio::test]
    async fn media_caption_is_synthesized_before_send() {
        let sender = Arc::new(MockSender::default());
        let dispatcher = Dispatcher::new(configured_store(), sender.clone());
        let event = InboundEvent::channel_post(100, 9, InboundContent::Audio {
            media: FileRef::new("audio-1"),
            performer: Some("Queen".into()),
            title: Some("Bohemian Rhapsody".into()),
            caption: None,
        });

        assert_eq!(
            dispatcher.handle(&event).await,
            DispatchOutcome::Relayed(ContentKind::Audio)
        );
        assert_eq!(sender.sent(), vec![OutboundRequest::new(
            300,
            OutboundPayload::Audio {
                media: FileRef::new("audio-1"),
                caption: Some("Queen - Bohemian Rhapsody".into()),
            }
        )]);
    }

    #[tokio::test]
    async fn concurrent_events_are_handled_independently() {
        let sender = Arc::new(MockSender::default());
        let dispatcher = Dispatcher::new(configured_store(), sender.clone());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let channel = if i % 2 == 0 { 100 } else { 999 };
                    dispatcher.handle(&text_post(channel, "x")).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(sender.sent().len(), 8);
    }
}
