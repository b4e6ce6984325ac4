//! Real-time buyer/seller chat engine for a classifieds marketplace client.
//!
//! The crate is an in-process library: the host UI supplies a session
//! credential and the local user id, injects a [`ChatTransport`] and a
//! [`PushChannel`], and drives a [`ChatEngine`] per open conversation.

pub mod channel;
pub mod engine;
pub mod error;
pub mod traits;
pub mod transport;
pub mod types;

pub use channel::{ChannelManager, ChannelState, RetryConfig, Subscription};
pub use engine::{
    ChatEngine, Composer, Delivery, History, HistoryEntry, SeenPropagator, QUICK_REPLIES,
};
pub use error::{ChatError, Result};
pub use traits::{ChatTransport, PushChannel};
pub use transport::{HttpTransport, TransportConfig};
pub use types::{
    ChannelEvent, ChatId, ChatSession, Message, MessageId, PostId, ResolvedSession,
    SessionContext, UserId,
};
