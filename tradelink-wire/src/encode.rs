/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Payload encoder.
//!
//! Binary layout: one `u8` body tag, the `u32` sequence number, then the
//! variant fields in declaration order. Integers are little-endian. Strings
//! are `u16` length-prefixed UTF-8, optional fields carry a `u8` presence
//! flag, repeated fields a `u16` count prefix. Dates are packed decimal
//! `yyyymmdd` in a `u32`.

use crate::payload::{Body, Control, EventInfo, Payload, Quote};
use bytes::{BufMut, BytesMut};
use chrono::{Datelike, NaiveDate};
use tradelink_core::error::WireError;
use tradelink_core::types::Uuid128;

pub(crate) mod tag {
    pub const SESSION: u8 = 1;
    pub const ORDER_CREATE: u8 = 2;
    pub const ORDER_CANCEL: u8 = 3;
    pub const ORDERS_FOR_MARKET: u8 = 4;
    pub const ORDER_ACCEPTED: u8 = 5;
    pub const ORDER_REJECTED: u8 = 6;
    pub const ORDER_CANCELLED: u8 = 7;
    pub const ORDER_EXECUTED: u8 = 8;
    pub const MARKET_SUBSCRIBE: u8 = 9;
    pub const MARKET_UNSUBSCRIBE: u8 = 10;
    pub const MARKET_QUOTES: u8 = 11;
    pub const EVENTS_REQUEST: u8 = 12;
    pub const EVENTS: u8 = 13;
    pub const HTTP_FOUND: u8 = 14;

    pub const CTRL_LOGIN: u8 = 1;
    pub const CTRL_LOGIN_RESPONSE: u8 = 2;
    pub const CTRL_LOGOUT: u8 = 3;
    pub const CTRL_PING: u8 = 4;
    pub const CTRL_PONG: u8 = 5;
}

/// Encodes a payload into `dst`.
///
/// # Errors
/// Returns [`WireError::InvalidValue`] when a string or repeated field
/// exceeds its length prefix.
pub fn encode(payload: &Payload, dst: &mut BytesMut) -> Result<(), WireError> {
    dst.put_u8(body_tag(&payload.body));
    dst.put_u32_le(payload.seq.value());

    match &payload.body {
        Body::Session(control) => encode_control(control, dst)?,
        Body::OrderCreate {
            market,
            contract,
            side,
            quantity,
            price,
            time_in_force,
            reference,
        } => {
            put_uuid(dst, *market);
            put_uuid(dst, *contract);
            dst.put_u8(*side as u8);
            dst.put_u32_le(*quantity);
            dst.put_u32_le(*price);
            dst.put_u8(*time_in_force as u8);
            put_opt_u64(dst, *reference);
        }
        Body::OrderCancel { order } => put_uuid(dst, *order),
        Body::OrdersForMarket { market } => put_uuid(dst, *market),
        Body::OrderAccepted { order, reference } => {
            put_uuid(dst, *order);
            put_opt_u64(dst, *reference);
        }
        Body::OrderRejected { reason, reference } => {
            put_str(dst, "reason", reason)?;
            put_opt_u64(dst, *reference);
        }
        Body::OrderCancelled { order, reference } => {
            put_uuid(dst, *order);
            put_opt_u64(dst, *reference);
        }
        Body::OrderExecuted {
            order,
            price,
            quantity,
        } => {
            put_uuid(dst, *order);
            dst.put_u32_le(*price);
            dst.put_u32_le(*quantity);
        }
        Body::MarketSubscribe { market } | Body::MarketUnsubscribe { market } => {
            put_uuid(dst, *market);
        }
        Body::MarketQuotes {
            market,
            bids,
            offers,
        } => {
            put_uuid(dst, *market);
            put_quotes(dst, "bids", bids)?;
            put_quotes(dst, "offers", offers)?;
        }
        Body::EventsRequest { category, date } => {
            dst.put_u8(*category);
            put_opt_date(dst, *date);
        }
        Body::Events { events } => put_events(dst, events)?,
        Body::HttpFound { url, seq } => {
            put_str(dst, "url", url)?;
            dst.put_u32_le(*seq);
        }
    }

    Ok(())
}

fn encode_control(control: &Control, dst: &mut BytesMut) -> Result<(), WireError> {
    match control {
        Control::Login {
            username,
            password,
            session,
        } => {
            dst.put_u8(tag::CTRL_LOGIN);
            put_str(dst, "username", username)?;
            put_str(dst, "password", password)?;
            put_opt_str(dst, "session", session.as_deref())?;
        }
        Control::LoginResponse { session, reset } => {
            dst.put_u8(tag::CTRL_LOGIN_RESPONSE);
            put_str(dst, "session", session)?;
            dst.put_u32_le(*reset);
        }
        Control::Logout { reason } => {
            dst.put_u8(tag::CTRL_LOGOUT);
            dst.put_u8(*reason as u8);
        }
        Control::Ping => dst.put_u8(tag::CTRL_PING),
        Control::Pong => dst.put_u8(tag::CTRL_PONG),
    }
    Ok(())
}

const fn body_tag(body: &Body) -> u8 {
    match body {
        Body::Session(_) => tag::SESSION,
        Body::OrderCreate { .. } => tag::ORDER_CREATE,
        Body::OrderCancel { .. } => tag::ORDER_CANCEL,
        Body::OrdersForMarket { .. } => tag::ORDERS_FOR_MARKET,
        Body::OrderAccepted { .. } => tag::ORDER_ACCEPTED,
        Body::OrderRejected { .. } => tag::ORDER_REJECTED,
        Body::OrderCancelled { .. } => tag::ORDER_CANCELLED,
        Body::OrderExecuted { .. } => tag::ORDER_EXECUTED,
        Body::MarketSubscribe { .. } => tag::MARKET_SUBSCRIBE,
        Body::MarketUnsubscribe { .. } => tag::MARKET_UNSUBSCRIBE,
        Body::MarketQuotes { .. } => tag::MARKET_QUOTES,
        Body::EventsRequest { .. } => tag::EVENTS_REQUEST,
        Body::Events { .. } => tag::EVENTS,
        Body::HttpFound { .. } => tag::HTTP_FOUND,
    }
}

fn put_str(dst: &mut BytesMut, field: &'static str, value: &str) -> Result<(), WireError> {
    let len = value.len();
    if len > usize::from(u16::MAX) {
        return Err(WireError::InvalidValue {
            field,
            reason: format!("string of {len} bytes exceeds length prefix"),
        });
    }
    dst.put_u16_le(len as u16);
    dst.put_slice(value.as_bytes());
    Ok(())
}

fn put_opt_str(
    dst: &mut BytesMut,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), WireError> {
    match value {
        Some(s) => {
            dst.put_u8(1);
            put_str(dst, field, s)
        }
        None => {
            dst.put_u8(0);
            Ok(())
        }
    }
}

fn put_uuid(dst: &mut BytesMut, id: Uuid128) {
    dst.put_u64_le(id.high);
    dst.put_u64_le(id.low);
}

fn put_opt_u64(dst: &mut BytesMut, value: Option<u64>) {
    match value {
        Some(v) => {
            dst.put_u8(1);
            dst.put_u64_le(v);
        }
        None => dst.put_u8(0),
    }
}

fn put_opt_date(dst: &mut BytesMut, date: Option<NaiveDate>) {
    match date {
        Some(d) => {
            dst.put_u8(1);
            let packed = d.year() as u32 * 10_000 + d.month() * 100 + d.day();
            dst.put_u32_le(packed);
        }
        None => dst.put_u8(0),
    }
}

fn put_quotes(
    dst: &mut BytesMut,
    field: &'static str,
    quotes: &[Quote],
) -> Result<(), WireError> {
    if quotes.len() > usize::from(u16::MAX) {
        return Err(WireError::InvalidValue {
            field,
            reason: format!("{} levels exceed count prefix", quotes.len()),
        });
    }
    dst.put_u16_le(quotes.len() as u16);
    for quote in quotes {
        dst.put_u32_le(quote.price);
        dst.put_u32_le(quote.quantity);
    }
    Ok(())
}

fn put_events(dst: &mut BytesMut, events: &[EventInfo]) -> Result<(), WireError> {
    if events.len() > usize::from(u16::MAX) {
        return Err(WireError::InvalidValue {
            field: "events",
            reason: format!("{} events exceed count prefix", events.len()),
        });
    }
    dst.put_u16_le(events.len() as u16);
    for event in events {
        put_uuid(dst, event.id);
        put_str(dst, "event name", &event.name)?;
        if event.markets.len() > usize::from(u16::MAX) {
            return Err(WireError::InvalidValue {
                field: "markets",
                reason: format!("{} markets exceed count prefix", event.markets.len()),
            });
        }
        dst.put_u16_le(event.markets.len() as u16);
        for market in &event.markets {
            put_uuid(dst, *market);
        }
    }
    Ok(())
}
