use crate::types::Message;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;
pub type ChatId = i64;

/// Externally-supplied session state: an opaque credential authorizing API
/// and channel calls, and the local user's id for telling "my" messages
/// apart from the counterpart's. Consumed, never produced, by this crate.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub credential: String,
    pub user_id: UserId,
}

impl SessionContext {
    pub fn new(credential: impl Into<String>, user_id: UserId) -> Self {
        Self {
            credential: credential.into(),
            user_id,
        }
    }
}

/// A conversation between exactly two participants, anchored to one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub chat_id: ChatId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub post_id: PostId,
}

/// Result of the open-or-create call: the stable chat id plus the history
/// the server returned alongside it.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub chat_id: ChatId,
    pub history: Vec<Message>,
}
