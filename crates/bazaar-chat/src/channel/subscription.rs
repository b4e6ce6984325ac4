//! A live channel binding for one chat.

use crate::types::{ChannelEvent, ChatId};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// One chat's live subscription: the receiving half of the push channel.
///
/// Closing the subscription is the "unbind" half of teardown — after
/// `close()` no further event can be handed out, so the server-side release
/// that follows can never race a dangling handler.
pub struct Subscription {
    chat_id: ChatId,
    receiver: async_channel::Receiver<ChannelEvent>,
}

impl Subscription {
    pub fn new(chat_id: ChatId, receiver: async_channel::Receiver<ChannelEvent>) -> Self {
        Subscription { chat_id, receiver }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Next event, or None once the channel has dropped or been closed.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.receiver.recv().await.ok()
    }

    /// Stop accepting events. Anything still buffered is discarded, not
    /// delivered late.
    pub fn close(&self) {
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }

    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Stream for Subscription {
    type Item = ChannelEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use chrono::Utc;

    fn created(chat_id: ChatId, id: i64) -> ChannelEvent {
        ChannelEvent::MessageCreated {
            chat_id,
            message: Message {
                id,
                sender_id: 20,
                body: "hello".into(),
                seen: false,
                created_at: Utc::now(),
            },
            local_id: None,
        }
    }

    #[tokio::test]
    async fn test_delivers_events_in_order() {
        let (tx, rx) = async_channel::unbounded();
        let mut sub = Subscription::new(7, rx);
        tx.send(created(7, 1)).await.unwrap();
        tx.send(created(7, 2)).await.unwrap();

        assert_eq!(sub.next().await, Some(created(7, 1)));
        assert_eq!(sub.next().await, Some(created(7, 2)));
    }

    #[tokio::test]
    async fn test_close_discards_buffered_events() {
        let (tx, rx) = async_channel::unbounded();
        let mut sub = Subscription::new(7, rx);
        tx.send(created(7, 1)).await.unwrap();

        sub.close();
        assert!(sub.is_closed());
        assert_eq!(sub.next().await, None);
        assert!(tx.send(created(7, 2)).await.is_err());
    }

    #[tokio::test]
    async fn test_sender_drop_ends_stream() {
        let (tx, rx) = async_channel::unbounded::<ChannelEvent>();
        let mut sub = Subscription::new(7, rx);
        drop(tx);
        assert_eq!(sub.next().await, None);
    }
}
