//! Injected seams between the engine and the outside world.
//!
//! Both traits are consumed as `Arc<dyn _>` so the host app wires real
//! implementations and tests substitute fakes. Nothing in the crate holds a
//! module-level client instance.

use crate::error::Result;
use crate::types::{ChannelEvent, ChatId, Message, MessageId, PostId, ResolvedSession, UserId};
use async_trait::async_trait;
use uuid::Uuid;

/// Request layer over the marketplace chat API.
///
/// This layer performs no retries; retry policy belongs to the channel
/// manager and the seen propagator.
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Idempotent open-or-create for the (seller, buyer, post) triple.
    /// The server may return an existing session for the same triple.
    async fn resolve_session(
        &self,
        seller_id: UserId,
        buyer_id: UserId,
        post_id: PostId,
    ) -> Result<ResolvedSession>;

    /// Fetch the ordered history of a known chat.
    async fn fetch_history(&self, chat_id: ChatId) -> Result<Vec<Message>>;

    /// Fire-and-forget send. The authoritative message (server id and
    /// timestamp) arrives later on the push channel, not in this response.
    /// `local_id` rides along so the server can echo it back on the
    /// created event for optimistic reconciliation.
    async fn send_message(&self, chat_id: ChatId, body: &str, local_id: Option<Uuid>)
        -> Result<()>;

    /// Mark one message seen server-side. Repeat calls are server no-ops.
    async fn acknowledge_seen(&self, message_id: MessageId) -> Result<()>;
}

/// Push-channel provider, one topic per chat.
///
/// Authorization and cluster configuration live inside the implementation;
/// the engine only names the chat it wants events for.
#[async_trait]
pub trait PushChannel: Send + Sync + 'static {
    /// Open a live subscription for one chat. The receiver yields events
    /// until the subscription drops or is closed locally.
    async fn subscribe(&self, chat_id: ChatId) -> Result<async_channel::Receiver<ChannelEvent>>;

    /// Release the server-side binding for a chat. Called after the local
    /// receiver has been closed, never before.
    async fn release(&self, chat_id: ChatId) -> Result<()>;
}
