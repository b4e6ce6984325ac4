//! Push-channel subscription management.

mod manager;
pub mod retry;
mod subscription;

pub use manager::{ChannelManager, ChannelState};
pub use retry::{RetryConfig, RetryDecision, RetryState};
pub use subscription::Subscription;
