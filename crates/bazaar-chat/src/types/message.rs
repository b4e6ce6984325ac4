use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MessageId = i64;

/// A server-confirmed chat message. Immutable once created except for
/// `seen`, which flips false→true exactly once and never reverts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub body: String,
    /// Carried on created-event payloads too, so a message that was already
    /// seen when it reaches us never waits for a separate seen event.
    #[serde(default)]
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_defaults_false_on_decode() {
        let m: Message = serde_json::from_str(
            r#"{"id":5,"senderId":20,"body":"hello","createdAt":"2024-06-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(!m.seen);
        assert_eq!(m.sender_id, 20);
    }
}
