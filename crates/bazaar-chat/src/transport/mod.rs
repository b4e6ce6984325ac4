//! HTTP transport for the marketplace chat API.

mod config;
mod http;

pub use config::TransportConfig;
pub use http::HttpTransport;
