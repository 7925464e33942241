/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the tradelink venue client.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all tradelink operations.
//!
//! The taxonomy separates failures by where they terminate:
//! - [`ValidationError`]: malformed application intent, never reaches the wire
//! - [`TransportError`]: socket-level failures, fatal for the current connection
//! - [`SessionError`]: protocol violations, fatal for the session
//! - [`WireError`]: encode/decode failures
//! - [`ClientError`]: umbrella type surfaced at the facade

use thiserror::Error;

/// Result type alias using [`ClientError`] as the error type.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Top-level error type for all tradelink operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid application intent, rejected before any network effect.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Socket-level failure on the current connection.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session layer protocol failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Wire encode/decode failure.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// A registered handler failed while dispatching an inbound payload.
    ///
    /// Dispatch is fail-fast: remaining handlers in the same fan-out may
    /// not have been invoked.
    #[error("handler failed for event {event}: {source}")]
    Handler {
        /// Event name the handler was registered under.
        event: String,
        /// The handler's own error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Out-of-band HTTP fetch failure.
    #[error("fetch error: {reason}")]
    Fetch {
        /// Description of the failure.
        reason: String,
    },
}

impl ClientError {
    /// Returns true if this error is the clean end-of-connection signal.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Transport(t) if t.is_disconnect())
    }
}

/// Errors raised when validating an order or query instruction.
///
/// Validation failures are always local: nothing is encoded and no session
/// state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Price below the venue minimum.
    #[error("price must be at least {min}, got {got}")]
    PriceTooLow {
        /// The rejected price.
        got: u32,
        /// Minimum accepted price.
        min: u32,
    },

    /// Price above the venue maximum.
    #[error("price cannot exceed {max}, got {got}")]
    PriceTooHigh {
        /// The rejected price.
        got: u32,
        /// Maximum accepted price.
        max: u32,
    },

    /// Quantity below the venue minimum.
    #[error("quantity must be at least {min}, got {got}")]
    QuantityTooLow {
        /// The rejected quantity.
        got: u32,
        /// Minimum accepted quantity.
        min: u32,
    },

    /// Quantity above the venue maximum.
    #[error("quantity cannot exceed {max}, got {got}")]
    QuantityTooHigh {
        /// The rejected quantity.
        got: u32,
        /// Maximum accepted quantity.
        max: u32,
    },

    /// Side value not in the accepted set.
    #[error("side must be one of BUY or SELL, got {value}")]
    InvalidSide {
        /// The rejected raw side value.
        value: u8,
    },

    /// Time-in-force value not in the accepted set.
    #[error("time in force must be one of IMMEDIATE_OR_CANCEL or GOOD_TIL_CANCELLED, got {value}")]
    InvalidTimeInForce {
        /// The rejected raw time-in-force value.
        value: u8,
    },

    /// Malformed venue identifier.
    #[error("invalid identifier: {reason}")]
    InvalidId {
        /// Description of why the identifier is invalid.
        reason: String,
    },
}

/// Errors in the frame transport layer.
///
/// All variants are terminal for the current connection. [`Disconnected`]
/// is the distinguished clean-stop signal: the peer closed the socket or a
/// read timed out with no bytes, and the inbound loop should finish rather
/// than crash.
///
/// [`Disconnected`]: TransportError::Disconnected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connect attempt did not complete within the configured timeout.
    #[error("connect to {addr} timed out")]
    ConnectTimeout {
        /// Address that was being connected to.
        addr: String,
    },

    /// Connect attempt was refused or otherwise failed.
    #[error("connect to {addr} failed: {reason}")]
    ConnectFailed {
        /// Address that was being connected to.
        addr: String,
        /// Description of the failure.
        reason: String,
    },

    /// The peer closed the connection or a read timed out with no bytes.
    #[error("socket disconnected")]
    Disconnected,

    /// Writing a frame to an established connection failed.
    #[error("frame write failed: {reason}")]
    WriteFailed {
        /// Description of the failure.
        reason: String,
    },

    /// A frame exceeded the configured maximum size.
    #[error("frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge {
        /// Actual frame size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error from the underlying socket.
    #[error("io error: {0}")]
    Io(String),
}

impl TransportError {
    /// Returns true for the clean end-of-connection stop signal.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation requires an open connection.
    #[error("session is not connected")]
    NotConnected,

    /// Operation requires an authenticated session.
    #[error("session is not authenticated")]
    NotAuthenticated,

    /// The venue rejected the login.
    #[error("login rejected: {reason}")]
    LoginRejected {
        /// Reason for rejection.
        reason: String,
    },

    /// Received sequence number did not match the expected value.
    ///
    /// Always fatal: the session must be torn down. The only permitted
    /// resynchronization is the server-issued reset at login.
    #[error("sequence gap: expected {expected}, received {received}")]
    SequenceGap {
        /// Expected incoming sequence number.
        expected: u32,
        /// Received sequence number.
        received: u32,
    },

    /// Received a payload of an unexpected kind during a handshake.
    #[error("unexpected payload: wanted {wanted}, got {got}")]
    UnexpectedPayload {
        /// Payload kind that was required.
        wanted: &'static str,
        /// Payload kind that arrived.
        got: String,
    },
}

/// Errors during payload encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Buffer ended before the payload was complete.
    #[error("truncated payload: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes needed to continue decoding.
        needed: usize,
        /// Bytes available in the buffer.
        available: usize,
    },

    /// Unknown payload discriminant tag.
    #[error("unknown payload kind: {tag}")]
    UnknownKind {
        /// The unrecognized discriminant.
        tag: u8,
    },

    /// A field carried a value outside its schema range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Bytes remained after a complete payload was decoded.
    #[error("{count} trailing bytes after payload")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },

    /// Invalid UTF-8 in a string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
