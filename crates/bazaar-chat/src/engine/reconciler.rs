//! Canonical ordered chat history and its merge rules.

use crate::types::{Message, MessageId, UserId};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// How far apart (in seconds) an optimistic entry and its authoritative
/// echo may sit and still be treated as the same message when no
/// correlation id was echoed back.
const OPTIMISTIC_MATCH_WINDOW_SECS: i64 = 30;

/// Delivery state of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Optimistic local send, awaiting the authoritative echo.
    Pending,
    /// Server-confirmed.
    Confirmed,
    /// The send call failed; the entry stays visible rather than vanishing.
    Failed,
}

/// One entry in the reconciled history. Confirmed entries carry a server
/// id; optimistic entries carry only the client correlation id until the
/// authoritative echo supersedes them.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: Option<MessageId>,
    pub local_id: Option<Uuid>,
    pub sender_id: UserId,
    pub body: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
    pub delivery: Delivery,
}

impl HistoryEntry {
    fn from_message(message: Message) -> Self {
        HistoryEntry {
            id: Some(message.id),
            local_id: None,
            sender_id: message.sender_id,
            body: message.body,
            seen: message.seen,
            created_at: message.created_at,
            delivery: Delivery::Confirmed,
        }
    }

    /// Ascending `(created_at, id)`; provisional entries (no server id)
    /// order after confirmed ones at the same timestamp.
    fn sort_key(&self) -> (DateTime<Utc>, MessageId) {
        (self.created_at, self.id.unwrap_or(MessageId::MAX))
    }
}

/// The canonical in-memory message list for the active session.
///
/// All mutation goes through the methods below; the externally observable
/// list is always sorted ascending by `(created_at, id)` regardless of the
/// arrival order of the underlying events.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the list wholesale with a fetched history.
    ///
    /// Known ids keep their `seen=true` flag even if the incoming copy is
    /// stale (seen never reverts), and optimistic entries that have not yet
    /// been confirmed survive the reseed. Incoming duplicates by id are
    /// collapsed to the first occurrence.
    pub fn seed(&mut self, messages: Vec<Message>) {
        let previously_seen: Vec<MessageId> = self
            .entries
            .iter()
            .filter(|e| e.seen)
            .filter_map(|e| e.id)
            .collect();

        let mut next: Vec<HistoryEntry> = Vec::with_capacity(messages.len());
        for message in messages {
            if next.iter().any(|e| e.id == Some(message.id)) {
                continue;
            }
            let mut entry = HistoryEntry::from_message(message);
            if entry.id.is_some_and(|id| previously_seen.contains(&id)) {
                entry.seen = true;
            }
            next.push(entry);
        }

        for entry in self.entries.drain(..) {
            if entry.id.is_none() {
                next.push(entry);
            }
        }

        next.sort_by_key(HistoryEntry::sort_key);
        self.entries = next;
    }

    /// Merge an authoritative message-created event.
    ///
    /// Idempotent by id: a duplicate delivery is a no-op. A matching
    /// provisional entry — by echoed correlation id first, then by the
    /// sender/body/time-window heuristic — is superseded in place so the
    /// message never renders twice.
    pub fn apply_created(&mut self, message: Message, local_echo: Option<Uuid>) {
        if self.entries.iter().any(|e| e.id == Some(message.id)) {
            tracing::debug!(message_id = message.id, "duplicate created event ignored");
            return;
        }

        if let Some(index) = self.find_provisional(&message, local_echo) {
            let provisional = self.entries.remove(index);
            let mut entry = HistoryEntry::from_message(message);
            entry.local_id = provisional.local_id;
            self.insert_sorted(entry);
            return;
        }

        self.insert_sorted(HistoryEntry::from_message(message));
    }

    /// Mark one message seen. No-op if the id is unknown — acceptable lost
    /// update, since created-event payloads carry `seen` themselves.
    pub fn apply_seen(&mut self, message_id: MessageId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == Some(message_id)) {
            entry.seen = true;
        }
    }

    /// Insert a provisional entry for a local send and return its
    /// correlation id.
    pub fn append_optimistic(&mut self, body: impl Into<String>, sender_id: UserId) -> Uuid {
        let local_id = Uuid::new_v4();
        self.insert_sorted(HistoryEntry {
            id: None,
            local_id: Some(local_id),
            sender_id,
            body: body.into(),
            seen: false,
            created_at: Utc::now(),
            delivery: Delivery::Pending,
        });
        local_id
    }

    /// Flip a provisional entry to `Failed` after a send error.
    pub fn mark_failed(&mut self, local_id: Uuid) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.local_id == Some(local_id) && e.delivery == Delivery::Pending)
        {
            entry.delivery = Delivery::Failed;
        }
    }

    /// Confirmed inbound messages not yet seen: the candidates for seen
    /// acknowledgement.
    pub fn pending_seen(&self, local_user: UserId) -> Vec<MessageId> {
        self.entries
            .iter()
            .filter(|e| e.sender_id != local_user && !e.seen)
            .filter_map(|e| e.id)
            .collect()
    }

    fn find_provisional(&self, message: &Message, local_echo: Option<Uuid>) -> Option<usize> {
        if let Some(echo) = local_echo {
            if let Some(index) = self
                .entries
                .iter()
                .position(|e| e.id.is_none() && e.local_id == Some(echo))
            {
                return Some(index);
            }
        }

        self.entries.iter().position(|e| {
            e.id.is_none()
                && e.sender_id == message.sender_id
                && e.body == message.body
                && (message.created_at - e.created_at).abs()
                    <= Duration::seconds(OPTIMISTIC_MATCH_WINDOW_SECS)
        })
    }

    fn insert_sorted(&mut self, entry: HistoryEntry) {
        let key = entry.sort_key();
        let position = self
            .entries
            .partition_point(|existing| existing.sort_key() <= key);
        self.entries.insert(position, entry);
    }
}
