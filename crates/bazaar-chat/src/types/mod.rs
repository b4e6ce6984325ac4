//! Data model for chat sessions, messages and channel events.

mod event;
mod message;
mod session;

pub use event::ChannelEvent;
pub use message::{Message, MessageId};
pub use session::{ChatId, ChatSession, PostId, ResolvedSession, SessionContext, UserId};
