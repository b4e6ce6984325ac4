//! Configuration for the HTTP transport.

/// Configuration for the HTTP transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Base URL of the chat API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: 15_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl TransportConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.request_timeout_ms, 15_000);
        assert_eq!(config.connect_timeout_ms, 5_000);
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = TransportConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_builder_override() {
        let config = TransportConfig::new("https://api.example.com").with_request_timeout_ms(500);
        assert_eq!(config.request_timeout_ms, 500);
        assert_eq!(config.connect_timeout_ms, 5_000);
    }
}
