/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Out-of-band content fetch.
//!
//! When a message body exceeds the venue's inline threshold, the session
//! receives a redirect notice instead of the content. The full body is
//! retrieved over HTTP through a [`ContentFetcher`]. Retry policy stays
//! with the implementation; the default makes a single bounded attempt.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tradelink_core::error::{ClientError, Result};

/// Fetches redirected message bodies.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Retrieves `url`, returning the content type and raw body bytes.
    ///
    /// # Errors
    /// Returns [`ClientError::Fetch`] on any transport or status failure.
    async fn fetch(&self, url: &str) -> Result<(String, Bytes)>;
}

/// Default fetcher backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with the default 30 second request timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<(String, Bytes)> {
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| ClientError::Fetch {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Fetch {
                reason: format!("unexpected status {status} for {url}"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::Fetch {
                reason: err.to_string(),
            })?;

        Ok((content_type, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn one_shot_http_server(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = sock.read(&mut request).await;

            let header = format!(
                "{status_line}\r\ncontent-type: application/x-tradelink\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            sock.write_all(header.as_bytes()).await.unwrap();
            sock.write_all(body).await.unwrap();
        });

        format!("http://{addr}/events")
    }

    #[tokio::test]
    async fn test_fetch_returns_content_type_and_bytes() {
        let url = one_shot_http_server("HTTP/1.1 200 OK", b"payload-bytes").await;
        let fetcher = HttpFetcher::new().with_request_timeout(Duration::from_secs(5));

        let (content_type, body) = fetcher.fetch(&url).await.unwrap();
        assert_eq!(content_type, "application/x-tradelink");
        assert_eq!(&body[..], b"payload-bytes");
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_fetch_error() {
        let url = one_shot_http_server("HTTP/1.1 404 Not Found", b"").await;
        let fetcher = HttpFetcher::new().with_request_timeout(Duration::from_secs(5));

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, ClientError::Fetch { .. }));
    }
}
