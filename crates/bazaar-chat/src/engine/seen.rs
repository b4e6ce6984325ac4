//! Seen-receipt propagation.

use crate::engine::reconciler::History;
use crate::traits::ChatTransport;
use crate::types::{MessageId, UserId};
use std::collections::HashSet;

/// Derives the pending-seen set from the history and issues acknowledgement
/// calls, at most one per message id per engine lifetime.
///
/// Runs after every history mutation — push-driven, never a timer. A
/// message id is marked "requested" before its ack is awaited, so a burst
/// of rapid history changes collapses to a single outbound call.
#[derive(Debug, Default)]
pub struct SeenPropagator {
    requested: HashSet<MessageId>,
}

impl SeenPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the requested markers. Called on session switch; the marker
    /// set belongs to exactly one session.
    pub fn reset(&mut self) {
        self.requested.clear();
    }

    pub async fn propagate(
        &mut self,
        history: &mut History,
        local_user: UserId,
        transport: &dyn ChatTransport,
    ) {
        let pending: Vec<MessageId> = history
            .pending_seen(local_user)
            .into_iter()
            .filter(|id| !self.requested.contains(id))
            .collect();

        for message_id in pending {
            self.requested.insert(message_id);
            match transport.acknowledge_seen(message_id).await {
                // The server does not echo seen back to the acking side, so
                // flip the local flag here to keep the rendered state right.
                Ok(()) => history.apply_seen(message_id),
                Err(e) => {
                    tracing::warn!(message_id, error = %e, "seen acknowledgement failed");
                }
            }
        }
    }
}
