/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Tradelink
//!
//! A client for a session-oriented venue trading protocol.
//!
//! Tradelink maintains an authenticated, sequence-numbered connection to a
//! trading venue, exchanges schema-typed binary messages (order entry,
//! market data subscriptions, heartbeats, event queries), and dispatches
//! inbound payloads to registered handlers by logical name.
//!
//! ## Features
//!
//! - **Strict sequencing**: Per-direction counters with fatal gap detection
//!   and server-directed resets at login
//! - **Resumable sessions**: Login responses carry an opaque token for
//!   out-of-band session recovery
//! - **Single-writer discipline**: An outbound worker and an inbound loop
//!   share one socket safely by construction
//! - **Async support**: Built on Tokio for high-performance networking
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tradelink::prelude::*;
//!
//! let config = SessionConfig::new("venue.example", 3701, "trader", "secret");
//! let client = std::sync::Arc::new(Client::new(Session::new(config)));
//!
//! let sender = SendWorker::spawn(client.clone());
//! sender.enqueue_login().await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Fundamental types, errors, and order value objects
//! - [`wire`]: Payload model and binary codec
//! - [`transport`]: Length-delimited frame transport
//! - [`session`]: Sequencing and the session state machine
//! - [`client`]: Facade, callback dispatch, and concurrency harness

pub mod core {
    //! Fundamental types, errors, and order value objects.
    pub use tradelink_core::*;
}

pub mod wire {
    //! Payload model and binary codec.
    pub use tradelink_wire::*;
}

pub mod transport {
    //! Length-delimited frame transport.
    pub use tradelink_transport::*;
}

pub mod session {
    //! Sequencing and the session state machine.
    pub use tradelink_session::*;
}

pub mod client {
    //! Facade, callback dispatch, and concurrency harness.
    pub use tradelink_client::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use tradelink_core::{
        ClientError, EventQuery, OrderCancel, OrderCreate, OrdersForMarket, Result, SeqNum,
        SessionError, Side, TimeInForce, TransportError, Uuid128, ValidationError, WireError,
    };

    // Wire
    pub use tradelink_wire::{ApplyTo, Body, Control, LogoutReason, Payload, Quote};

    // Transport
    pub use tradelink_transport::{CodecError, FrameCodec, FrameTransport, TransportOptions};

    // Session
    pub use tradelink_session::{Sequencer, Session, SessionConfig, SessionState};

    // Client
    pub use tradelink_client::{
        CallbackRegistry, Client, ContentFetcher, Handler, HttpFetcher, ReceiveLoop, SendWorker,
        WorkItem,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        // Verify that prelude imports work
        let _seq = SeqNum::new(1);
        let _side = Side::Buy;
        let _state = SessionState::Disconnected;
    }

    #[test]
    fn test_order_builds_through_prelude() {
        let market = Uuid128::from_hex("1c024").unwrap();
        let contract = Uuid128::from_hex("1cccc").unwrap();
        let order = OrderCreate::new(10_000, 2_500, Side::Buy, market, contract);
        assert!(order.validate().is_ok());
    }
}
