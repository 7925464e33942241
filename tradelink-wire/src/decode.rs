/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Payload decoder.
//!
//! Mirrors the layout produced by [`crate::encode`]. Decoding is strict:
//! unknown discriminants, out-of-range enum values, short buffers, and
//! trailing bytes are all errors: a frame either decodes completely or the
//! connection is considered corrupt.

use crate::encode::tag;
use crate::payload::{Body, Control, EventInfo, LogoutReason, Payload, Quote};
use chrono::NaiveDate;
use num_traits::FromPrimitive;
use tradelink_core::error::WireError;
use tradelink_core::types::{SeqNum, Side, TimeInForce, Uuid128};

/// Decodes one complete payload from `src`.
///
/// # Errors
/// Returns a [`WireError`] on truncation, unknown discriminants, invalid
/// field values, or trailing bytes.
pub fn decode(src: &[u8]) -> Result<Payload, WireError> {
    let mut r = Reader::new(src);

    let body_tag = r.u8()?;
    let seq = SeqNum::new(r.u32()?);

    let body = match body_tag {
        tag::SESSION => Body::Session(decode_control(&mut r)?),
        tag::ORDER_CREATE => Body::OrderCreate {
            market: r.uuid()?,
            contract: r.uuid()?,
            side: decode_enum::<Side>(&mut r, "side")?,
            quantity: r.u32()?,
            price: r.u32()?,
            time_in_force: decode_enum::<TimeInForce>(&mut r, "time_in_force")?,
            reference: r.opt_u64()?,
        },
        tag::ORDER_CANCEL => Body::OrderCancel { order: r.uuid()? },
        tag::ORDERS_FOR_MARKET => Body::OrdersForMarket { market: r.uuid()? },
        tag::ORDER_ACCEPTED => Body::OrderAccepted {
            order: r.uuid()?,
            reference: r.opt_u64()?,
        },
        tag::ORDER_REJECTED => Body::OrderRejected {
            reason: r.string()?,
            reference: r.opt_u64()?,
        },
        tag::ORDER_CANCELLED => Body::OrderCancelled {
            order: r.uuid()?,
            reference: r.opt_u64()?,
        },
        tag::ORDER_EXECUTED => Body::OrderExecuted {
            order: r.uuid()?,
            price: r.u32()?,
            quantity: r.u32()?,
        },
        tag::MARKET_SUBSCRIBE => Body::MarketSubscribe { market: r.uuid()? },
        tag::MARKET_UNSUBSCRIBE => Body::MarketUnsubscribe { market: r.uuid()? },
        tag::MARKET_QUOTES => Body::MarketQuotes {
            market: r.uuid()?,
            bids: decode_quotes(&mut r)?,
            offers: decode_quotes(&mut r)?,
        },
        tag::EVENTS_REQUEST => Body::EventsRequest {
            category: r.u8()?,
            date: decode_opt_date(&mut r)?,
        },
        tag::EVENTS => Body::Events {
            events: decode_events(&mut r)?,
        },
        tag::HTTP_FOUND => Body::HttpFound {
            url: r.string()?,
            seq: r.u32()?,
        },
        other => return Err(WireError::UnknownKind { tag: other }),
    };

    r.finish()?;
    Ok(Payload { seq, body })
}

fn decode_control(r: &mut Reader<'_>) -> Result<Control, WireError> {
    let control_tag = r.u8()?;
    match control_tag {
        tag::CTRL_LOGIN => Ok(Control::Login {
            username: r.string()?,
            password: r.string()?,
            session: r.opt_string()?,
        }),
        tag::CTRL_LOGIN_RESPONSE => Ok(Control::LoginResponse {
            session: r.string()?,
            reset: r.u32()?,
        }),
        tag::CTRL_LOGOUT => Ok(Control::Logout {
            reason: decode_enum::<LogoutReason>(r, "logout reason")?,
        }),
        tag::CTRL_PING => Ok(Control::Ping),
        tag::CTRL_PONG => Ok(Control::Pong),
        other => Err(WireError::UnknownKind { tag: other }),
    }
}

fn decode_enum<T: FromPrimitive>(r: &mut Reader<'_>, field: &'static str) -> Result<T, WireError> {
    let value = r.u8()?;
    T::from_u8(value).ok_or(WireError::InvalidValue {
        field,
        reason: format!("unknown value {value}"),
    })
}

fn decode_quotes(r: &mut Reader<'_>) -> Result<Vec<Quote>, WireError> {
    let count = r.u16()?;
    let mut quotes = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        quotes.push(Quote {
            price: r.u32()?,
            quantity: r.u32()?,
        });
    }
    Ok(quotes)
}

fn decode_events(r: &mut Reader<'_>) -> Result<Vec<EventInfo>, WireError> {
    let count = r.u16()?;
    let mut events = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let id = r.uuid()?;
        let name = r.string()?;
        let market_count = r.u16()?;
        let mut markets = Vec::with_capacity(usize::from(market_count));
        for _ in 0..market_count {
            markets.push(r.uuid()?);
        }
        events.push(EventInfo { id, name, markets });
    }
    Ok(events)
}

fn decode_opt_date(r: &mut Reader<'_>) -> Result<Option<NaiveDate>, WireError> {
    if r.u8()? == 0 {
        return Ok(None);
    }
    let packed = r.u32()?;
    let (year, month, day) = (packed / 10_000, packed / 100 % 100, packed % 100);
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .map(Some)
        .ok_or(WireError::InvalidValue {
            field: "date",
            reason: format!("not a calendar date: {packed}"),
        })
}

/// Bounds-checked cursor over a payload buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let available = self.buf.len() - self.pos;
        if available < n {
            return Err(WireError::Truncated {
                needed: n,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, WireError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, WireError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn uuid(&mut self) -> Result<Uuid128, WireError> {
        Ok(Uuid128::new(self.u64()?, self.u64()?))
    }

    fn opt_u64(&mut self) -> Result<Option<u64>, WireError> {
        if self.u8()? == 0 {
            Ok(None)
        } else {
            Ok(Some(self.u64()?))
        }
    }

    fn string(&mut self) -> Result<String, WireError> {
        let len = usize::from(self.u16()?);
        let bytes = self.take(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    fn opt_string(&mut self) -> Result<Option<String>, WireError> {
        if self.u8()? == 0 {
            Ok(None)
        } else {
            Ok(Some(self.string()?))
        }
    }

    fn finish(&self) -> Result<(), WireError> {
        let count = self.buf.len() - self.pos;
        if count > 0 {
            return Err(WireError::TrailingBytes { count });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use bytes::BytesMut;
    use tradelink_core::orders::OrderCreate;

    fn round_trip(payload: &Payload) -> Payload {
        let mut dst = BytesMut::new();
        encode(payload, &mut dst).unwrap();
        decode(&dst).unwrap()
    }

    #[test]
    fn test_login_round_trip() {
        let payload = Payload::with_body(
            SeqNum::new(1),
            Body::Session(Control::Login {
                username: "trader@venue.example".to_string(),
                password: "hunter2".to_string(),
                session: Some("previous-token".to_string()),
            }),
        );
        assert_eq!(round_trip(&payload), payload);
    }

    #[test]
    fn test_login_response_round_trip() {
        let payload = Payload::with_body(
            SeqNum::new(1),
            Body::Session(Control::LoginResponse {
                session: "session".to_string(),
                reset: 2,
            }),
        );
        assert_eq!(round_trip(&payload), payload);
    }

    #[test]
    fn test_order_create_round_trips_field_values() {
        let market = Uuid128::from_hex("1c024").unwrap();
        let contract = Uuid128::from_hex("1cccc").unwrap();
        let order = OrderCreate::new(10_000, 2_500, Side::Buy, market, contract)
            .with_time_in_force(TimeInForce::GoodTilCancelled)
            .with_reference(77);

        let mut payload = Payload::new();
        use crate::payload::ApplyTo;
        order.apply_to(&mut payload);
        payload.seq = SeqNum::new(5);

        match round_trip(&payload).body {
            Body::OrderCreate {
                market: m,
                contract: c,
                side,
                quantity,
                price,
                time_in_force,
                reference,
            } => {
                assert_eq!(m, market);
                assert_eq!(c, contract);
                assert_eq!(side, Side::Buy);
                assert_eq!(quantity, 10_000);
                assert_eq!(price, 2_500);
                assert_eq!(time_in_force, TimeInForce::GoodTilCancelled);
                assert_eq!(reference, Some(77));
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn test_market_quotes_round_trip() {
        let payload = Payload::with_body(
            SeqNum::new(9),
            Body::MarketQuotes {
                market: Uuid128::from_hex("1c024").unwrap(),
                bids: vec![
                    Quote {
                        price: 4_900,
                        quantity: 20_000,
                    },
                    Quote {
                        price: 4_800,
                        quantity: 50_000,
                    },
                ],
                offers: vec![Quote {
                    price: 5_100,
                    quantity: 10_000,
                }],
            },
        );
        assert_eq!(round_trip(&payload), payload);
    }

    #[test]
    fn test_events_round_trip() {
        let payload = Payload::with_body(
            SeqNum::new(2),
            Body::Events {
                events: vec![EventInfo {
                    id: Uuid128::from_hex("ee001").unwrap(),
                    name: "General Election".to_string(),
                    markets: vec![
                        Uuid128::from_hex("1c024").unwrap(),
                        Uuid128::from_hex("1c025").unwrap(),
                    ],
                }],
            },
        );
        assert_eq!(round_trip(&payload), payload);
    }

    #[test]
    fn test_http_found_round_trip() {
        let payload = Payload::with_body(
            SeqNum::new(4),
            Body::HttpFound {
                url: "http://domain.invalid/url".to_string(),
                seq: 2,
            },
        );
        assert_eq!(round_trip(&payload), payload);
    }

    #[test]
    fn test_logout_round_trip() {
        let payload = Payload::with_body(
            SeqNum::new(6),
            Body::Session(Control::Logout {
                reason: LogoutReason::HeartbeatTimeout,
            }),
        );
        assert_eq!(round_trip(&payload), payload);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = decode(&[0xFF, 1, 0, 0, 0]).unwrap_err();
        assert_eq!(err, WireError::UnknownKind { tag: 0xFF });
    }

    #[test]
    fn test_truncated_rejected() {
        let mut dst = BytesMut::new();
        let payload = Payload::with_body(
            SeqNum::new(1),
            Body::OrderCancel {
                order: Uuid128::new(1, 2),
            },
        );
        encode(&payload, &mut dst).unwrap();

        let err = decode(&dst[..dst.len() - 3]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut dst = BytesMut::new();
        let payload = Payload::with_body(SeqNum::new(1), Body::Session(Control::Pong));
        encode(&payload, &mut dst).unwrap();
        dst.extend_from_slice(&[0, 0]);

        let err = decode(&dst).unwrap_err();
        assert_eq!(err, WireError::TrailingBytes { count: 2 });
    }

    #[test]
    fn test_invalid_side_rejected() {
        let market = Uuid128::new(0, 1);
        let order = Payload::with_body(
            SeqNum::new(1),
            Body::OrderCreate {
                market,
                contract: market,
                side: Side::Buy,
                quantity: 10_000,
                price: 2_500,
                time_in_force: TimeInForce::ImmediateOrCancel,
                reference: None,
            },
        );
        let mut dst = BytesMut::new();
        encode(&order, &mut dst).unwrap();

        // Side byte sits right after tag, seq, and the two ids.
        let side_offset = 1 + 4 + 16 + 16;
        dst[side_offset] = 9;

        let err = decode(&dst).unwrap_err();
        assert!(matches!(err, WireError::InvalidValue { field: "side", .. }));
    }
}
