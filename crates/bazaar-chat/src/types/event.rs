use crate::types::{ChatId, Message, MessageId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound push-channel events. Every event carries the chat it belongs to
/// so a late event from a torn-down subscription is detectable and can be
/// dropped instead of leaking into the new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChannelEvent {
    #[serde(rename_all = "camelCase")]
    MessageCreated {
        chat_id: ChatId,
        message: Message,
        /// Client correlation id echoed back by the server when the message
        /// originated from this client's optimistic send.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        local_id: Option<Uuid>,
    },
    #[serde(rename_all = "camelCase")]
    MessageSeen {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

impl ChannelEvent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            ChannelEvent::MessageCreated { chat_id, .. } => *chat_id,
            ChannelEvent::MessageSeen { chat_id, .. } => *chat_id,
        }
    }
}
