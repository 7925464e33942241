/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session engine: transport + sequencer + codec.
//!
//! A [`Session`] is safe to share behind an `Arc`, but it is not designed
//! for concurrent writers or concurrent readers: safety comes from the
//! convention that exactly one task sends and exactly one task reads. The
//! writer half, the reusable outbound payload, and the encode buffer live
//! under one lock; the reader half under another. Sequence counters are
//! owned here and mutated only on the task performing the matching I/O.

use crate::config::SessionConfig;
use crate::sequence::Sequencer;
use crate::state::SessionState;
use bytes::{Bytes, BytesMut};
use parking_lot::RwLock;
use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tradelink_core::error::{Result, SessionError};
use tradelink_transport::{FrameReader, FrameTransport, FrameWriter};
use tradelink_wire::{Body, Control, LogoutReason, Payload, decode, encode};

/// Writer half plus the reusable outbound payload and encode buffer.
///
/// Kept together so the clear-populate-encode-clear discipline and the
/// frame write happen under a single lock, with no interleaving.
#[derive(Debug)]
struct Outbound {
    writer: FrameWriter,
    payload: Payload,
    buf: BytesMut,
}

/// An authenticated, sequence-numbered connection to the venue.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: RwLock<SessionState>,
    seq: Sequencer,
    session_token: RwLock<Option<String>>,
    outbound: Mutex<Option<Outbound>>,
    reader: Mutex<Option<FrameReader>>,
}

impl Session {
    /// Creates a disconnected session from its configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: RwLock::new(SessionState::Disconnected),
            seq: Sequencer::new(),
            session_token: RwLock::new(None),
            outbound: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Returns the `(out_seq, in_seq)` counters.
    #[must_use]
    pub fn sequences(&self) -> (u32, u32) {
        (self.seq.peek_out().value(), self.seq.peek_in().value())
    }

    /// Returns the session token from the last login response, if any.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.session_token.read().clone()
    }

    /// Opens the frame transport.
    ///
    /// A no-op when a connection is already open.
    ///
    /// # Errors
    /// Surfaces the transport's connect failure; the session stays
    /// `Disconnected`.
    pub async fn connect(&self) -> Result<()> {
        if self.state().is_connected() {
            return Ok(());
        }

        let addr = self.config.addr();
        let transport = FrameTransport::connect(&addr, &self.config.transport_options()).await?;
        let (writer, reader) = transport.split();

        *self.outbound.lock().await = Some(Outbound {
            writer,
            payload: Payload::new(),
            buf: BytesMut::with_capacity(256),
        });
        *self.reader.lock().await = Some(reader);
        self.set_state(SessionState::Connecting);

        Ok(())
    }

    /// Sends the login payload, consuming one outbound sequence number.
    ///
    /// With `wait_for_response`, blocks on the next inbound frame, requires
    /// it to be a login response, applies its sequence reset, and returns
    /// the decoded payload so the caller can dispatch it. Otherwise returns
    /// immediately after the send; the response is handled by the normal
    /// read path whenever it arrives.
    ///
    /// # Errors
    /// Fails with [`SessionError::NotConnected`] before [`Session::connect`],
    /// with a transport error if the send fails, and with
    /// [`SessionError::UnexpectedPayload`] if a waited-for response is not a
    /// login response.
    pub async fn login(&self, wait_for_response: bool) -> Result<Option<Payload>> {
        let username = self.config.username.clone();
        let password = self.config.password.expose_secret().clone();
        let resume = self
            .session_token
            .read()
            .clone()
            .or_else(|| self.config.session_token.clone());

        self.send_with(|payload| {
            payload.body = Body::Session(Control::Login {
                username,
                password,
                session: resume,
            });
        })
        .await?;
        self.set_state(SessionState::Connected);

        if !wait_for_response {
            return Ok(None);
        }

        let payload = self.read().await?;
        if !matches!(
            payload.body,
            Body::Session(Control::LoginResponse { .. })
        ) {
            return Err(SessionError::UnexpectedPayload {
                wanted: "session.login_response",
                got: payload.event_name().to_string(),
            }
            .into());
        }
        Ok(Some(payload))
    }

    /// Sends a best-effort logout and releases the transport.
    ///
    /// Always leaves the session `Disconnected`, even if the send fails.
    pub async fn logout(&self) {
        let state = self.state();
        if matches!(state, SessionState::Connected | SessionState::Authenticated) {
            let result = self
                .send_with(|payload| {
                    payload.body = Body::Session(Control::Logout {
                        reason: LogoutReason::Requested,
                    });
                })
                .await;
            if let Err(err) = result {
                warn!("logout send failed: {}", err);
            }
        }

        let mut outbound = self.outbound.lock().await;
        if let Some(out) = outbound.as_mut() {
            out.writer.close().await;
        }
        *outbound = None;
        drop(outbound);

        // The reader lock may be held by a blocked read; that read will
        // observe the closed socket and clear itself.
        if let Ok(mut reader) = self.reader.try_lock() {
            *reader = None;
        }
        self.set_state(SessionState::Disconnected);
    }

    /// Sends one payload using the scoped-builder discipline.
    ///
    /// The reusable outbound payload is cleared, populated by `f`, stamped
    /// with the next outgoing sequence number, encoded, written as one
    /// frame, and cleared again, so stale fields never leak between sends.
    ///
    /// # Errors
    /// A write failure is connection-fatal: the session drops the writer,
    /// becomes `Disconnected`, and surfaces the transport error.
    pub async fn send_with<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Payload),
    {
        if !self.state().can_send() {
            return Err(SessionError::NotConnected.into());
        }

        let mut guard = self.outbound.lock().await;
        let out = guard.as_mut().ok_or(SessionError::NotConnected)?;

        out.payload.clear();
        f(&mut out.payload);
        out.payload.seq = self.seq.next_out_seq();

        out.buf.clear();
        encode(&out.payload, &mut out.buf)?;
        let frame = Bytes::copy_from_slice(&out.buf);

        debug!(
            "sending {} seq={}",
            out.payload.event_name(),
            out.payload.seq
        );
        let result = out.writer.write_frame(frame).await;
        out.payload.clear();

        if let Err(err) = result {
            warn!("frame write failed: {}", err);
            *guard = None;
            self.set_state(SessionState::Disconnected);
            return Err(err.into());
        }
        Ok(())
    }

    /// Reads, decodes, and sequence-validates the next inbound frame.
    ///
    /// A login response is applied here: its session token is stored and
    /// its reset value replaces both counters (the reset is authoritative,
    /// so the response itself is exempt from the strict check). Every other
    /// payload must carry exactly the expected incoming sequence number.
    ///
    /// # Errors
    /// Returns the transport's `Disconnected` as the clean stop signal, a
    /// [`SessionError::SequenceGap`] on any out-of-order frame (fatal: the
    /// connection is torn down), and a wire error on an undecodable frame
    /// (equally fatal).
    pub async fn read(&self) -> Result<Payload> {
        let mut guard = self.reader.lock().await;
        let reader = guard.as_mut().ok_or(SessionError::NotConnected)?;

        let frame = match reader.next_frame().await {
            Ok(frame) => frame,
            Err(err) => {
                *guard = None;
                self.set_state(SessionState::Disconnected);
                return Err(err.into());
            }
        };

        let payload = match decode(&frame) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("undecodable frame: {}", err);
                *guard = None;
                self.set_state(SessionState::Disconnected);
                return Err(err.into());
            }
        };

        if let Body::Session(Control::LoginResponse { session, reset }) = &payload.body {
            *self.session_token.write() = Some(session.clone());
            self.seq.reset(*reset);
            let mut state = self.state.write();
            if *state == SessionState::Connected {
                *state = SessionState::Authenticated;
            }
            drop(state);
            info!("login response applied, sequence counters reset to {}", reset);
        } else if let Err(err) = self.seq.accept_in_seq(payload.seq) {
            warn!("fatal sequence violation: {}", err);
            *guard = None;
            self.set_state(SessionState::Disconnected);
            return Err(err.into());
        }

        Ok(payload)
    }

    /// Flushes any buffered outbound bytes. No state change.
    ///
    /// # Errors
    /// Surfaces a transport write failure.
    pub async fn flush(&self) -> Result<()> {
        let mut guard = self.outbound.lock().await;
        match guard.as_mut() {
            Some(out) => Ok(out.writer.flush().await?),
            None => Err(SessionError::NotConnected.into()),
        }
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        if *state != next {
            debug!("session state {} -> {}", *state, next);
            *state = next;
        }
    }
}
