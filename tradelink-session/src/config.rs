/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.

use secrecy::SecretString;
use std::time::Duration;
use tradelink_transport::TransportOptions;

/// Configuration for a venue session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Venue hostname.
    pub host: String,
    /// Venue port.
    pub port: u16,
    /// Account username.
    pub username: String,
    /// Account password; never logged or serialized in the clear.
    pub password: SecretString,
    /// Session token from a previous login, for resumption.
    pub session_token: Option<String>,
    /// Maximum time to wait for the TCP connect.
    pub connect_timeout: Duration,
    /// Maximum time a single socket read may block.
    pub read_timeout: Duration,
    /// Maximum frame payload size in bytes.
    pub max_frame_size: usize,
}

impl SessionConfig {
    /// Creates a configuration with the required fields and defaults.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: SecretString::new(password.into()),
            session_token: None,
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(15),
            max_frame_size: 1024 * 1024,
        }
    }

    /// Sets a previous session token to resume.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the socket read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the maximum frame payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the `host:port` connect address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the transport options derived from this configuration.
    #[must_use]
    pub const fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            max_frame_size: self.max_frame_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::new("venue.example", 3_701, "trader", "abc,123");

        assert_eq!(config.addr(), "venue.example:3701");
        assert_eq!(config.username, "trader");
        assert_eq!(config.password.expose_secret(), "abc,123");
        assert!(config.session_token.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_config_builders() {
        let config = SessionConfig::new("venue.example", 3_701, "trader", "pw")
            .with_session_token("prior-token")
            .with_read_timeout(Duration::from_secs(5))
            .with_max_frame_size(64 * 1024);

        assert_eq!(config.session_token.as_deref(), Some("prior-token"));
        assert_eq!(config.transport_options().read_timeout, Duration::from_secs(5));
        assert_eq!(config.transport_options().max_frame_size, 64 * 1024);
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let config = SessionConfig::new("venue.example", 3_701, "trader", "abc,123");
        let debug = format!("{config:?}");
        assert!(!debug.contains("abc,123"));
    }
}
