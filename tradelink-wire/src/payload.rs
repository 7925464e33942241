/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Payload model for the venue protocol.
//!
//! Every frame on the wire decodes to one [`Payload`]: a sequence number and
//! a discriminated [`Body`]. Session-control messages (login, logout,
//! heartbeats) travel inside the compound [`Control`] envelope; everything
//! else is an application-level variant.
//!
//! Each payload kind maps to a stable textual event name used purely for
//! handler dispatch; see [`Payload::event_name`].

use chrono::NaiveDate;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use tradelink_core::events::EventQuery;
use tradelink_core::orders::{OrderCancel, OrderCreate, OrdersForMarket};
use tradelink_core::types::{SeqNum, Side, TimeInForce, Uuid128};

/// One decoded frame: sequence number plus body.
///
/// Outbound payloads are recycled between sends; [`Payload::clear`] resets
/// the value so no stale fields leak into the next encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Per-direction sequence number carried by the frame.
    pub seq: SeqNum,
    /// The schema-typed message body.
    pub body: Body,
}

impl Payload {
    /// Creates a cleared payload ready to be populated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seq: SeqNum::new(0),
            body: Body::Session(Control::Ping),
        }
    }

    /// Creates a payload with the given sequence number and body.
    #[must_use]
    pub fn with_body(seq: SeqNum, body: Body) -> Self {
        Self { seq, body }
    }

    /// Resets this payload to the cleared state.
    pub fn clear(&mut self) {
        self.seq = SeqNum::new(0);
        self.body = Body::Session(Control::Ping);
    }

    /// Returns true if this payload is in the cleared state.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.seq.value() == 0 && matches!(self.body, Body::Session(Control::Ping))
    }

    /// Returns the textual event name this payload dispatches under.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        self.body.kind()
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::new()
    }
}

/// Session-control envelope: authentication and liveness messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Credential submission; carries a prior session token when resuming.
    Login {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
        /// Previous session token, for resumption.
        session: Option<String>,
    },
    /// Server response to a login.
    LoginResponse {
        /// Opaque session token for later resumption.
        session: String,
        /// New baseline for both sequence counters.
        reset: u32,
    },
    /// Session termination notice.
    Logout {
        /// Why the session ended.
        reason: LogoutReason,
    },
    /// Client-initiated heartbeat.
    Ping,
    /// Server heartbeat reply.
    Pong,
}

impl Control {
    /// Returns the textual kind of this control message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "session.login",
            Self::LoginResponse { .. } => "session.login_response",
            Self::Logout { .. } => "session.logout",
            Self::Ping => "session.ping",
            Self::Pong => "session.pong",
        }
    }
}

/// Reason attached to a logout notice.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromPrimitive,
    ToPrimitive,
)]
#[repr(u8)]
pub enum LogoutReason {
    /// Orderly client-requested logout.
    Requested = 1,
    /// Server confirmation of a logout.
    Confirmation = 2,
    /// Session dropped after missed heartbeats.
    HeartbeatTimeout = 3,
    /// Presented session token was not accepted.
    UnauthorizedSession = 4,
}

/// One price level in a quote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Price in venue ticks.
    pub price: u32,
    /// Quantity available at this price.
    pub quantity: u32,
}

/// One event in a listings response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    /// Event identifier.
    pub id: Uuid128,
    /// Display name.
    pub name: String,
    /// Markets grouped under this event.
    pub markets: Vec<Uuid128>,
}

/// Message body: discriminant plus nested variant payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Session-control envelope.
    Session(Control),
    /// Limit order submission.
    OrderCreate {
        /// Market the order belongs to.
        market: Uuid128,
        /// Contract within the market.
        contract: Uuid128,
        /// Buy or sell.
        side: Side,
        /// Order quantity.
        quantity: u32,
        /// Limit price in venue ticks.
        price: u32,
        /// Order lifetime.
        time_in_force: TimeInForce,
        /// Client-supplied reference.
        reference: Option<u64>,
    },
    /// Cancel one order.
    OrderCancel {
        /// Identifier of the order to cancel.
        order: Uuid128,
    },
    /// Cancel every resting order in a market.
    OrdersForMarket {
        /// Market whose orders are cancelled.
        market: Uuid128,
    },
    /// Venue accepted an order.
    OrderAccepted {
        /// Venue-assigned order identifier.
        order: Uuid128,
        /// Echo of the client reference.
        reference: Option<u64>,
    },
    /// Venue rejected an order.
    OrderRejected {
        /// Rejection reason text.
        reason: String,
        /// Echo of the client reference.
        reference: Option<u64>,
    },
    /// Venue cancelled an order.
    OrderCancelled {
        /// Identifier of the cancelled order.
        order: Uuid128,
        /// Echo of the client reference.
        reference: Option<u64>,
    },
    /// An order traded.
    OrderExecuted {
        /// Identifier of the executed order.
        order: Uuid128,
        /// Execution price.
        price: u32,
        /// Executed quantity.
        quantity: u32,
    },
    /// Subscribe to market data for a market.
    MarketSubscribe {
        /// Market to subscribe to.
        market: Uuid128,
    },
    /// Unsubscribe from market data.
    MarketUnsubscribe {
        /// Market to unsubscribe from.
        market: Uuid128,
    },
    /// Quote snapshot for a subscribed market.
    MarketQuotes {
        /// Market the snapshot belongs to.
        market: Uuid128,
        /// Bid levels, best first.
        bids: Vec<Quote>,
        /// Offer levels, best first.
        offers: Vec<Quote>,
    },
    /// Event listings query.
    EventsRequest {
        /// Category tag from [`EventQuery::category`].
        category: u8,
        /// Optional date filter.
        date: Option<NaiveDate>,
    },
    /// Event listings response, the compound message behind HTTP redirects.
    Events {
        /// Listed events.
        events: Vec<EventInfo>,
    },
    /// Body exceeded the inline threshold and was redirected to HTTP.
    HttpFound {
        /// Location of the full content.
        url: String,
        /// Sequence number the redirected content answers.
        seq: u32,
    },
}

impl Body {
    /// Returns the stable textual key this body dispatches under.
    ///
    /// Compound kinds derive their name from the nested discriminant as
    /// well, e.g. `session.login_response`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Session(control) => control.kind(),
            Self::OrderCreate { .. } => "order_create",
            Self::OrderCancel { .. } => "order_cancel",
            Self::OrdersForMarket { .. } => "orders_for_market",
            Self::OrderAccepted { .. } => "order_accepted",
            Self::OrderRejected { .. } => "order_rejected",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::OrderExecuted { .. } => "order_executed",
            Self::MarketSubscribe { .. } => "market_subscribe",
            Self::MarketUnsubscribe { .. } => "market_unsubscribe",
            Self::MarketQuotes { .. } => "market_quotes",
            Self::EventsRequest { .. } => "events_request",
            Self::Events { .. } => "events",
            Self::HttpFound { .. } => "http_found",
        }
    }
}

/// Instructions that serialize themselves into an outbound payload.
///
/// Implementations only replace the body; the session stamps the sequence
/// number when the payload is sent.
pub trait ApplyTo {
    /// Writes this instruction into `payload`.
    fn apply_to(&self, payload: &mut Payload);
}

impl ApplyTo for OrderCreate {
    fn apply_to(&self, payload: &mut Payload) {
        payload.body = Body::OrderCreate {
            market: self.market,
            contract: self.contract,
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            // Venue default lifetime applies when the instruction has none.
            time_in_force: self.time_in_force.unwrap_or(TimeInForce::ImmediateOrCancel),
            reference: self.reference,
        };
    }
}

impl ApplyTo for OrderCancel {
    fn apply_to(&self, payload: &mut Payload) {
        payload.body = Body::OrderCancel { order: self.order };
    }
}

impl ApplyTo for OrdersForMarket {
    fn apply_to(&self, payload: &mut Payload) {
        payload.body = Body::OrdersForMarket {
            market: self.market,
        };
    }
}

impl ApplyTo for EventQuery {
    fn apply_to(&self, payload: &mut Payload) {
        payload.body = Body::EventsRequest {
            category: self.category(),
            date: self.date(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_payload() {
        let mut payload = Payload::with_body(
            SeqNum::new(7),
            Body::OrderCancel {
                order: Uuid128::new(0, 0x1fff0),
            },
        );
        assert!(!payload.is_clear());

        payload.clear();
        assert!(payload.is_clear());
        assert_eq!(payload.seq.value(), 0);
    }

    #[test]
    fn test_event_name_includes_nested_discriminant() {
        let payload = Payload::with_body(
            SeqNum::new(1),
            Body::Session(Control::LoginResponse {
                session: "session".to_string(),
                reset: 2,
            }),
        );
        assert_eq!(payload.event_name(), "session.login_response");

        let pong = Payload::with_body(SeqNum::new(2), Body::Session(Control::Pong));
        assert_eq!(pong.event_name(), "session.pong");
    }

    #[test]
    fn test_order_create_applies_default_tif() {
        let market = Uuid128::from_hex("1c024").unwrap();
        let contract = Uuid128::from_hex("1cccc").unwrap();
        let order = OrderCreate::new(10_000, 2_500, Side::Buy, market, contract);

        let mut payload = Payload::new();
        order.apply_to(&mut payload);

        match payload.body {
            Body::OrderCreate {
                time_in_force,
                quantity,
                price,
                ..
            } => {
                assert_eq!(time_in_force, TimeInForce::ImmediateOrCancel);
                assert_eq!(quantity, 10_000);
                assert_eq!(price, 2_500);
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn test_event_query_applies_category_and_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2011, 6, 21).unwrap();
        let query = EventQuery::SportByDate { date };

        let mut payload = Payload::new();
        query.apply_to(&mut payload);

        assert_eq!(
            payload.body,
            Body::EventsRequest {
                category: query.category(),
                date: Some(date),
            }
        );
    }
}
