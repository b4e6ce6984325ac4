//! Subscription lifecycle state machine.

use crate::channel::retry::{RetryConfig, RetryDecision, RetryState};
use crate::channel::subscription::Subscription;
use crate::error::{ChatError, Result};
use crate::traits::PushChannel;
use crate::types::{ChannelEvent, ChatId};
use std::sync::Arc;

/// Lifecycle of the one live subscription a manager may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Unsubscribed,
    Subscribing,
    Subscribed,
}

/// Owns at most one live subscription at a time.
///
/// Switching chats tears the old subscription down before the new one is
/// established: the receiver is closed first (no event can be handed out
/// afterwards), then the server-side binding is released. A dropped stream
/// is reconnected with exponential backoff, preserving the current chat id.
pub struct ChannelManager {
    channel: Arc<dyn PushChannel>,
    state: ChannelState,
    active: Option<Subscription>,
    retry: RetryConfig,
}

impl ChannelManager {
    pub fn new(channel: Arc<dyn PushChannel>) -> Self {
        Self::with_retry(channel, RetryConfig::default())
    }

    pub fn with_retry(channel: Arc<dyn PushChannel>, retry: RetryConfig) -> Self {
        ChannelManager {
            channel,
            state: ChannelState::Unsubscribed,
            active: None,
            retry,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.active.as_ref().map(Subscription::chat_id)
    }

    /// Subscribe to one chat's channel, tearing down any previous
    /// subscription first.
    pub async fn attach(&mut self, chat_id: ChatId) -> Result<()> {
        self.detach().await;

        self.state = ChannelState::Subscribing;
        match self.channel.subscribe(chat_id).await {
            Ok(receiver) => {
                self.active = Some(Subscription::new(chat_id, receiver));
                self.state = ChannelState::Subscribed;
                tracing::debug!(chat_id, "channel subscribed");
                Ok(())
            }
            Err(e) => {
                self.state = ChannelState::Unsubscribed;
                Err(e)
            }
        }
    }

    /// Tear down the active subscription: unbind the receiver, then release
    /// the server-side binding — strictly in that order. Release failures
    /// are logged rather than propagated so the next attach always gets a
    /// clean slate.
    pub async fn detach(&mut self) {
        if let Some(subscription) = self.active.take() {
            let chat_id = subscription.chat_id();
            subscription.close();
            if let Err(e) = self.channel.release(chat_id).await {
                tracing::warn!(chat_id, error = %e, "channel release failed");
            }
            tracing::debug!(chat_id, "channel released");
        }
        self.state = ChannelState::Unsubscribed;
    }

    /// Next event for the current chat.
    ///
    /// Returns `ChatError::SubscriptionClosed` when no subscription is
    /// held. Events tagged with a different chat id are dropped. A dropped
    /// stream triggers a reconnect; exhausted retries surface
    /// `ChatError::Subscription` and leave the manager unsubscribed.
    pub async fn next_event(&mut self) -> Result<ChannelEvent> {
        loop {
            let Some(subscription) = self.active.as_mut() else {
                return Err(ChatError::SubscriptionClosed);
            };
            let chat_id = subscription.chat_id();

            match subscription.next().await {
                Some(event) if event.chat_id() == chat_id => return Ok(event),
                Some(event) => {
                    tracing::warn!(
                        expected = chat_id,
                        received = event.chat_id(),
                        "dropping event for non-current chat"
                    );
                }
                None => {
                    tracing::warn!(chat_id, "channel stream dropped, reconnecting");
                    self.reconnect(chat_id).await?;
                }
            }
        }
    }

    async fn reconnect(&mut self, chat_id: ChatId) -> Result<()> {
        self.active = None;
        self.state = ChannelState::Subscribing;
        let mut retry = RetryState::new(self.retry.clone());

        loop {
            match self.channel.subscribe(chat_id).await {
                Ok(receiver) => {
                    self.active = Some(Subscription::new(chat_id, receiver));
                    self.state = ChannelState::Subscribed;
                    tracing::debug!(chat_id, attempts = retry.attempts, "channel resubscribed");
                    return Ok(());
                }
                Err(e) => match retry.next_attempt() {
                    RetryDecision::Retry(delay) => {
                        tracing::warn!(
                            chat_id,
                            attempt = retry.attempts,
                            error = %e,
                            "resubscribe failed, retrying in {delay:?}"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::GiveUp => {
                        self.state = ChannelState::Unsubscribed;
                        return Err(ChatError::Subscription(format!(
                            "reconnect for chat {chat_id} gave up after {} attempts: {e}",
                            retry.attempts
                        )));
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, MessageId, UserId};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    struct ScriptedChannel {
        // One pre-built feed per expected subscribe call, handed out in order.
        receivers: Mutex<Vec<async_channel::Receiver<ChannelEvent>>>,
        released: Mutex<Vec<ChatId>>,
    }

    impl ScriptedChannel {
        fn with_feeds(n: usize) -> (Arc<Self>, Vec<async_channel::Sender<ChannelEvent>>) {
            let mut senders = Vec::new();
            let mut receivers = Vec::new();
            for _ in 0..n {
                let (tx, rx) = async_channel::unbounded();
                senders.push(tx);
                receivers.push(rx);
            }
            let channel = Arc::new(ScriptedChannel {
                receivers: Mutex::new(receivers),
                released: Mutex::new(Vec::new()),
            });
            (channel, senders)
        }
    }

    #[async_trait]
    impl PushChannel for ScriptedChannel {
        async fn subscribe(
            &self,
            _chat_id: ChatId,
        ) -> Result<async_channel::Receiver<ChannelEvent>> {
            let mut receivers = self.receivers.lock().unwrap();
            if receivers.is_empty() {
                return Err(ChatError::Subscription("no feed scripted".into()));
            }
            Ok(receivers.remove(0))
        }

        async fn release(&self, chat_id: ChatId) -> Result<()> {
            self.released.lock().unwrap().push(chat_id);
            Ok(())
        }
    }

    fn seen(chat_id: ChatId, message_id: MessageId) -> ChannelEvent {
        ChannelEvent::MessageSeen {
            chat_id,
            message_id,
        }
    }

    fn created(chat_id: ChatId, id: MessageId, sender_id: UserId) -> ChannelEvent {
        ChannelEvent::MessageCreated {
            chat_id,
            message: Message {
                id,
                sender_id,
                body: "hello".into(),
                seen: false,
                created_at: Utc::now(),
            },
            local_id: None,
        }
    }

    #[tokio::test]
    async fn test_attach_then_event() {
        let (channel, senders) = ScriptedChannel::with_feeds(1);
        let mut manager = ChannelManager::new(channel);
        assert_eq!(manager.state(), ChannelState::Unsubscribed);

        manager.attach(7).await.unwrap();
        assert_eq!(manager.state(), ChannelState::Subscribed);
        assert_eq!(manager.chat_id(), Some(7));

        senders[0].send(created(7, 1, 20)).await.unwrap();
        let event = manager.next_event().await.unwrap();
        assert_eq!(event.chat_id(), 7);
    }

    #[tokio::test]
    async fn test_attach_tears_down_previous_subscription() {
        let (channel, senders) = ScriptedChannel::with_feeds(2);
        let mut manager = ChannelManager::new(channel.clone());

        manager.attach(1).await.unwrap();
        manager.attach(2).await.unwrap();

        assert_eq!(*channel.released.lock().unwrap(), vec![1]);
        assert_eq!(manager.chat_id(), Some(2));
        // The old feed is closed; its events go nowhere.
        assert!(senders[0].send(seen(1, 9)).await.is_err());
    }

    #[tokio::test]
    async fn test_cross_chat_events_are_dropped() {
        let (channel, senders) = ScriptedChannel::with_feeds(1);
        let mut manager = ChannelManager::new(channel);
        manager.attach(7).await.unwrap();

        senders[0].send(seen(3, 40)).await.unwrap();
        senders[0].send(seen(7, 41)).await.unwrap();

        assert_eq!(manager.next_event().await.unwrap(), seen(7, 41));
    }

    #[tokio::test]
    async fn test_reconnects_after_stream_drop() {
        let (channel, mut senders) = ScriptedChannel::with_feeds(2);
        let mut manager = ChannelManager::with_retry(
            channel,
            RetryConfig::default()
                .with_max_retries(2)
                .with_initial_backoff(std::time::Duration::from_millis(1)),
        );
        manager.attach(7).await.unwrap();

        // First feed dies; the manager must resubscribe onto the second.
        let replacement = senders.pop().unwrap();
        drop(senders);
        replacement.send(seen(7, 5)).await.unwrap();

        assert_eq!(manager.next_event().await.unwrap(), seen(7, 5));
        assert_eq!(manager.state(), ChannelState::Subscribed);
    }

    #[tokio::test]
    async fn test_exhausted_reconnect_surfaces_error() {
        let (channel, senders) = ScriptedChannel::with_feeds(1);
        let mut manager = ChannelManager::with_retry(
            channel,
            RetryConfig::default()
                .with_max_retries(1)
                .with_initial_backoff(std::time::Duration::from_millis(1)),
        );
        manager.attach(7).await.unwrap();
        drop(senders);

        let err = manager.next_event().await.unwrap_err();
        assert!(matches!(err, ChatError::Subscription(_)));
        assert_eq!(manager.state(), ChannelState::Unsubscribed);
    }

    #[tokio::test]
    async fn test_next_event_without_subscription_is_closed() {
        let (channel, _senders) = ScriptedChannel::with_feeds(0);
        let mut manager = ChannelManager::new(channel);
        assert!(matches!(
            manager.next_event().await,
            Err(ChatError::SubscriptionClosed)
        ));
    }

    #[tokio::test]
    async fn test_next_event_after_detach_is_closed() {
        let (channel, _senders) = ScriptedChannel::with_feeds(1);
        let mut manager = ChannelManager::new(channel);
        manager.attach(7).await.unwrap();
        manager.detach().await;
        assert!(matches!(
            manager.next_event().await,
            Err(ChatError::SubscriptionClosed)
        ));
    }
}
