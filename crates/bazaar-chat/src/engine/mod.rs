//! The chat engine facade.

mod composer;
mod reconciler;
mod seen;

pub use composer::{Composer, QUICK_REPLIES};
pub use reconciler::{Delivery, History, HistoryEntry};
pub use seen::SeenPropagator;

use crate::channel::{ChannelManager, ChannelState};
use crate::error::{ChatError, Result};
use crate::traits::{ChatTransport, PushChannel};
use crate::types::{ChannelEvent, ChatId, PostId, SessionContext, UserId};
use std::sync::Arc;

/// Drives one active conversation: resolves or resumes the session, owns
/// the reconciled history, pumps channel events into it, and propagates
/// seen receipts after every mutation.
///
/// The engine is the single logical owner of its state — all mutation goes
/// through `&mut self`, so there are no concurrent writers. Switching
/// sessions replaces state wholesale; an in-flight `open`/`resume` future
/// that the caller drops simply never applies.
pub struct ChatEngine {
    transport: Arc<dyn ChatTransport>,
    channel: ChannelManager,
    local_user: UserId,
    chat_id: Option<ChatId>,
    history: History,
    seen: SeenPropagator,
}

impl ChatEngine {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        push_channel: Arc<dyn PushChannel>,
        session: &SessionContext,
    ) -> Self {
        ChatEngine {
            transport,
            channel: ChannelManager::new(push_channel),
            local_user: session.user_id,
            chat_id: None,
            history: History::new(),
            seen: SeenPropagator::new(),
        }
    }

    pub fn local_user(&self) -> UserId {
        self.local_user
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.chat_id
    }

    /// The reconciled, ordered history of the active session.
    pub fn messages(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    /// The channel state, for a "disconnected" indicator at the UI boundary.
    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Open or resume the conversation for a (seller, buyer, post) triple.
    /// The server may return an existing session for the same triple.
    pub async fn open(
        &mut self,
        seller_id: UserId,
        buyer_id: UserId,
        post_id: PostId,
    ) -> Result<ChatId> {
        self.reset_session().await;

        let resolved = self
            .transport
            .resolve_session(seller_id, buyer_id, post_id)
            .await?;
        tracing::debug!(chat_id = resolved.chat_id, seller_id, buyer_id, post_id, "session resolved");

        self.history.seed(resolved.history);
        self.chat_id = Some(resolved.chat_id);
        self.channel.attach(resolved.chat_id).await?;
        self.propagate_seen().await;
        Ok(resolved.chat_id)
    }

    /// Resume a conversation already known by id, e.g. from a chat-list
    /// entry, without re-resolving the triple.
    pub async fn resume(&mut self, chat_id: ChatId) -> Result<()> {
        self.reset_session().await;

        let messages = self.transport.fetch_history(chat_id).await?;
        tracing::debug!(chat_id, count = messages.len(), "history fetched");

        self.history.seed(messages);
        self.chat_id = Some(chat_id);
        self.channel.attach(chat_id).await?;
        self.propagate_seen().await;
        Ok(())
    }

    /// Tear down the active session (screen exit). Unbinds the channel
    /// receiver before releasing the server-side binding.
    pub async fn close(&mut self) {
        self.reset_session().await;
    }

    /// Send a message: optimistic insert, then the transport call. On
    /// failure the entry is marked failed and stays visible; the error
    /// still bubbles so the UI boundary can surface it.
    pub async fn send(&mut self, body: &str) -> Result<()> {
        let chat_id = self.chat_id.ok_or(ChatError::NoSession)?;
        let local_id = self.history.append_optimistic(body, self.local_user);

        match self
            .transport
            .send_message(chat_id, body, Some(local_id))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                self.history.mark_failed(local_id);
                tracing::warn!(chat_id, error = %e, "send failed, entry marked");
                Err(e)
            }
        }
    }

    /// Apply the next channel event to the history. Returns `Ok(false)`
    /// once the subscription is gone (session closed or reconnect given
    /// up); the caller loops on `Ok(true)`.
    pub async fn pump(&mut self) -> Result<bool> {
        let event = match self.channel.next_event().await {
            Ok(event) => event,
            Err(ChatError::SubscriptionClosed) => return Ok(false),
            Err(e) => return Err(e),
        };

        match event {
            ChannelEvent::MessageCreated {
                message, local_id, ..
            } => {
                self.history.apply_created(message, local_id);
                self.propagate_seen().await;
            }
            ChannelEvent::MessageSeen { message_id, .. } => {
                self.history.apply_seen(message_id);
            }
        }
        Ok(true)
    }

    async fn reset_session(&mut self) {
        self.channel.detach().await;
        self.chat_id = None;
        self.history = History::new();
        self.seen.reset();
    }

    async fn propagate_seen(&mut self) {
        self.seen
            .propagate(&mut self.history, self.local_user, self.transport.as_ref())
            .await;
    }
}
