/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Socket lifecycle for the frame transport.
//!
//! A [`FrameTransport`] owns one TCP connection and splits it into a
//! [`FrameWriter`] and a [`FrameReader`]. Each half has exactly one owner:
//! the session's designated writer and designated reader. Reads are bounded
//! by the configured timeout so a stopped peer surfaces as
//! [`TransportError::Disconnected`] instead of blocking forever.

use crate::codec::{CodecError, FrameCodec};
use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};
use tradelink_core::error::TransportError;

/// Socket-level options for a frame transport.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Maximum time to wait for the TCP connect.
    pub connect_timeout: Duration,
    /// Maximum time a single read may block with no bytes.
    pub read_timeout: Duration,
    /// Maximum frame payload size in bytes.
    pub max_frame_size: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(15),
            max_frame_size: FrameCodec::DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::FrameTooLarge { size, max_size } => {
                Self::FrameTooLarge { size, max_size }
            }
            CodecError::Io(reason) => Self::Io(reason),
        }
    }
}

/// One connected socket, split into its designated halves.
#[derive(Debug)]
pub struct FrameTransport {
    writer: FrameWriter,
    reader: FrameReader,
}

impl FrameTransport {
    /// Opens a TCP connection to `addr` and frames it.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectTimeout`] when the connect does not
    /// complete in time and [`TransportError::ConnectFailed`] on refusal.
    pub async fn connect(addr: &str, opts: &TransportOptions) -> Result<Self, TransportError> {
        let stream = match timeout(opts.connect_timeout, TcpStream::connect(addr)).await {
            Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    addr: addr.to_string(),
                });
            }
            Ok(Err(err)) => {
                return Err(TransportError::ConnectFailed {
                    addr: addr.to_string(),
                    reason: err.to_string(),
                });
            }
            Ok(Ok(stream)) => stream,
        };

        if let Err(err) = stream.set_nodelay(true) {
            warn!("failed to set TCP_NODELAY: {}", err);
        }
        debug!("connected to {}", addr);

        let codec = FrameCodec::new().with_max_frame_size(opts.max_frame_size);
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            writer: FrameWriter {
                sink: FramedWrite::new(write_half, codec.clone()),
            },
            reader: FrameReader {
                stream: FramedRead::new(read_half, codec),
                read_timeout: opts.read_timeout,
            },
        })
    }

    /// Splits the transport into its writer and reader halves.
    #[must_use]
    pub fn split(self) -> (FrameWriter, FrameReader) {
        (self.writer, self.reader)
    }
}

/// The single designated writing half of a connection.
#[derive(Debug)]
pub struct FrameWriter {
    sink: FramedWrite<OwnedWriteHalf, FrameCodec>,
}

impl FrameWriter {
    /// Writes one length-delimited frame and flushes it.
    ///
    /// # Errors
    /// Returns [`TransportError::WriteFailed`]; the caller must treat this
    /// as fatal for the connection.
    pub async fn write_frame(&mut self, frame: Bytes) -> Result<(), TransportError> {
        self.sink
            .send(frame)
            .await
            .map_err(|err| TransportError::WriteFailed {
                reason: err.to_string(),
            })
    }

    /// Flushes any buffered outbound bytes.
    ///
    /// # Errors
    /// Returns [`TransportError::WriteFailed`] if the flush fails.
    pub async fn flush(&mut self) -> Result<(), TransportError> {
        SinkExt::<Bytes>::flush(&mut self.sink)
            .await
            .map_err(|err| TransportError::WriteFailed {
                reason: err.to_string(),
            })
    }

    /// Closes the writing half, flushing first.
    pub async fn close(&mut self) {
        if let Err(err) = SinkExt::<Bytes>::close(&mut self.sink).await {
            debug!("close after flush failed: {}", err);
        }
    }
}

/// The single designated reading half of a connection.
#[derive(Debug)]
pub struct FrameReader {
    stream: FramedRead<OwnedReadHalf, FrameCodec>,
    read_timeout: Duration,
}

impl FrameReader {
    /// Reads the next complete frame.
    ///
    /// Blocks until a full frame is buffered, bounded by the read timeout.
    ///
    /// # Errors
    /// Returns [`TransportError::Disconnected`] when the peer closes or the
    /// timeout elapses with no frame, the clean stop signal for an inbound
    /// loop. Any other error is connection-fatal.
    pub async fn next_frame(&mut self) -> Result<BytesMut, TransportError> {
        match timeout(self.read_timeout, self.stream.next()).await {
            Err(_) => {
                debug!("read timed out after {:?}", self.read_timeout);
                Err(TransportError::Disconnected)
            }
            Ok(None) => {
                debug!("peer closed the connection");
                Err(TransportError::Disconnected)
            }
            Ok(Some(Err(err))) => Err(err.into()),
            Ok(Some(Ok(frame))) => Ok(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn test_opts() -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_millis(200),
            ..TransportOptions::default()
        }
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is essentially never listening.
        let result = FrameTransport::connect("127.0.0.1:1", &test_opts()).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectFailed { .. }) | Err(TransportError::ConnectTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_round_trip_over_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            // Echo one framed message back: 5-byte payload "hello".
            sock.write_all(&[0, 0, 0, 5, b'h', b'e', b'l', b'l', b'o'])
                .await
                .unwrap();
        });

        let transport = FrameTransport::connect(&addr, &test_opts()).await.unwrap();
        let (mut writer, mut reader) = transport.split();

        writer.write_frame(Bytes::from_static(b"ping")).await.unwrap();
        let frame = reader.next_frame().await.unwrap();
        assert_eq!(&frame[..], b"hello");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_peer_close_is_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            drop(sock);
        });

        let transport = FrameTransport::connect(&addr, &test_opts()).await.unwrap();
        let (_writer, mut reader) = transport.split();

        let err = reader.next_frame().await.unwrap_err();
        assert!(err.is_disconnect());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_silent_peer_times_out_as_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let transport = FrameTransport::connect(&addr, &test_opts()).await.unwrap();
        let (_writer, mut reader) = transport.split();

        // Server never sends anything; the bounded read must give up.
        let err = reader.next_frame().await.unwrap_err();
        assert!(err.is_disconnect());
    }
}
