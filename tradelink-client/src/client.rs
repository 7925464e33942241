/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client facade.
//!
//! Binds the session, the callback registry, and the wire codec into named
//! operations. Every inbound payload is routed to the registry under its
//! derived event name; outbound instructions are validated locally before
//! anything touches the session.

use crate::dispatcher::{CallbackRegistry, Handler};
use crate::fetch::{ContentFetcher, HttpFetcher};
use tracing::debug;
use tradelink_core::error::{Result, SessionError};
use tradelink_core::events::EventQuery;
use tradelink_core::orders::{OrderCancel, OrderCreate, OrdersForMarket};
use tradelink_core::types::Uuid128;
use tradelink_session::Session;
use tradelink_wire::{ApplyTo, Body, Control, Payload, decode};

/// High-level venue client.
///
/// Shareable behind an `Arc`; the single-writer/single-reader discipline of
/// the underlying session still applies; see the harness module.
pub struct Client {
    session: Session,
    callbacks: CallbackRegistry,
    fetcher: Box<dyn ContentFetcher>,
}

impl Client {
    /// Creates a client over `session` with the default HTTP fetcher.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self::with_fetcher(session, Box::new(HttpFetcher::new()))
    }

    /// Creates a client with a custom content fetcher.
    #[must_use]
    pub fn with_fetcher(session: Session, fetcher: Box<dyn ContentFetcher>) -> Self {
        Self {
            session,
            callbacks: CallbackRegistry::new(),
            fetcher,
        }
    }

    /// Returns the underlying session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the callback registry.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Registers `handler` under `name`.
    pub fn add_handler(&self, name: impl Into<String>, handler: &Handler) -> bool {
        self.callbacks.add(name, handler)
    }

    /// Removes `handler` from `name`.
    pub fn remove_handler(&self, name: &str, handler: &Handler) -> bool {
        self.callbacks.remove(name, handler)
    }

    /// Registers a handler invoked for every inbound payload.
    pub fn add_global_handler(&self, handler: &Handler) -> bool {
        self.callbacks.add_global(handler)
    }

    /// Connects and logs in.
    ///
    /// With `wait`, the login response is consumed synchronously and
    /// dispatched under its event name before this returns; otherwise it is
    /// dispatched whenever the read path encounters it.
    ///
    /// # Errors
    /// Connection and handshake failures surface unchanged; no automatic
    /// retry.
    pub async fn login(&self, wait: bool) -> Result<()> {
        self.session.connect().await?;
        if let Some(response) = self.session.login(wait).await? {
            self.callbacks.fire(response.event_name(), &response)?;
        }
        Ok(())
    }

    /// Logs out and releases the connection. Best-effort, never fails.
    pub async fn logout(&self) {
        self.session.logout().await;
    }

    /// Sends a heartbeat. The pong arrives asynchronously under
    /// `session.pong`.
    ///
    /// # Errors
    /// Surfaces the session send failure.
    pub async fn ping(&self) -> Result<()> {
        self.session
            .send_with(|payload| {
                payload.body = Body::Session(Control::Ping);
            })
            .await
    }

    /// Validates and submits an order.
    ///
    /// # Errors
    /// A validation failure is local; nothing reaches the wire.
    pub async fn order(&self, order: &OrderCreate) -> Result<()> {
        order.validate()?;
        self.session.send_with(|payload| order.apply_to(payload)).await
    }

    /// Validates and submits an order cancellation.
    ///
    /// # Errors
    /// A validation failure is local; nothing reaches the wire.
    pub async fn order_cancel(&self, cancel: &OrderCancel) -> Result<()> {
        cancel.validate()?;
        self.session.send_with(|payload| cancel.apply_to(payload)).await
    }

    /// Validates and submits a market-scoped cancel-all.
    ///
    /// # Errors
    /// A validation failure is local; nothing reaches the wire.
    pub async fn cancel_market_orders(&self, request: &OrdersForMarket) -> Result<()> {
        request.validate()?;
        self.session.send_with(|payload| request.apply_to(payload)).await
    }

    /// Subscribes to market data for `market`.
    ///
    /// # Errors
    /// Surfaces the session send failure.
    pub async fn subscribe(&self, market: Uuid128) -> Result<()> {
        self.session
            .send_with(|payload| {
                payload.body = Body::MarketSubscribe { market };
            })
            .await
    }

    /// Unsubscribes from market data for `market`.
    ///
    /// # Errors
    /// Surfaces the session send failure.
    pub async fn unsubscribe(&self, market: Uuid128) -> Result<()> {
        self.session
            .send_with(|payload| {
                payload.body = Body::MarketUnsubscribe { market };
            })
            .await
    }

    /// Sends an event listings query; the query serializes itself into the
    /// outbound payload.
    ///
    /// # Errors
    /// Surfaces the session send failure.
    pub async fn request_events(&self, query: &EventQuery) -> Result<()> {
        self.session.send_with(|payload| query.apply_to(payload)).await
    }

    /// Reads one inbound payload, dispatches it under its event name, and
    /// returns it for direct inspection.
    ///
    /// # Errors
    /// Surfaces session read failures (including the clean disconnect
    /// signal) and fail-fast handler failures.
    pub async fn read(&self) -> Result<Payload> {
        let payload = self.session.read().await?;
        debug!("dispatching {} seq={}", payload.event_name(), payload.seq);
        self.callbacks.fire(payload.event_name(), &payload)?;
        Ok(payload)
    }

    /// Resolves an oversized-body redirect notice.
    ///
    /// Fetches the referenced URL out-of-band and decodes the body as the
    /// full compound payload. No session sequence number is consumed or
    /// validated here; the redirect notice already went through the read
    /// path.
    ///
    /// # Errors
    /// Fails when `payload` is not a redirect notice, the fetch fails, or
    /// the fetched body does not decode.
    pub async fn fetch_http_found(&self, payload: &Payload) -> Result<Payload> {
        let Body::HttpFound { url, seq } = &payload.body else {
            return Err(SessionError::UnexpectedPayload {
                wanted: "http_found",
                got: payload.event_name().to_string(),
            }
            .into());
        };

        let (content_type, body) = self.fetcher.fetch(url).await?;
        debug!(
            "fetched {} bytes of {} for redirected seq {}",
            body.len(),
            content_type,
            seq
        );
        Ok(decode(&body)?)
    }

    /// Flushes buffered outbound bytes.
    ///
    /// # Errors
    /// Surfaces the session flush failure.
    pub async fn flush(&self) -> Result<()> {
        self.session.flush().await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
