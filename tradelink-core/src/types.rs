/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for venue protocol operations.
//!
//! This module provides fundamental types used throughout the tradelink client:
//! - [`SeqNum`]: Per-direction message sequence number
//! - [`Uuid128`]: 128-bit venue identifier for markets, contracts, and orders
//! - [`Side`]: Order side enumeration
//! - [`TimeInForce`]: Order lifetime enumeration

use crate::error::ValidationError;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum accepted order price, in venue ticks.
pub const MIN_PRICE: u32 = 1;

/// Maximum accepted order price, in venue ticks.
pub const MAX_PRICE: u32 = 9_999;

/// Minimum accepted order quantity.
pub const MIN_QUANTITY: u32 = 1_000;

/// Maximum accepted order quantity (2^31 - 1).
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// Message sequence number.
///
/// Each direction of a session carries its own monotonically increasing
/// counter, starting at 1. Sequence numbers enforce strict ordering and
/// enable gap detection across reconnections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u32);

impl SeqNum {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the next sequence number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u32> for SeqNum {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<SeqNum> for u32 {
    fn from(seq: SeqNum) -> Self {
        seq.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 128-bit venue identifier.
///
/// Markets, contracts, orders, and events are all identified by opaque
/// 128-bit values assigned by the venue. The textual form is lowercase hex
/// with leading zeros elided.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Uuid128 {
    /// High 64 bits.
    pub high: u64,
    /// Low 64 bits.
    pub low: u64,
}

impl Uuid128 {
    /// Creates an identifier from its two 64-bit halves.
    #[inline]
    #[must_use]
    pub const fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Parses an identifier from lowercase hex, leading zeros optional.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidId`] if the string is empty, longer
    /// than 32 hex digits, or contains non-hex characters.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() || s.len() > 32 {
            return Err(ValidationError::InvalidId {
                reason: format!("expected 1-32 hex digits, got {} characters", s.len()),
            });
        }
        let value = u128::from_str_radix(s, 16).map_err(|_| ValidationError::InvalidId {
            reason: format!("not a hex string: {s:?}"),
        })?;
        Ok(Self {
            high: (value >> 64) as u64,
            low: value as u64,
        })
    }

    /// Returns the identifier as lowercase hex with leading zeros elided.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:x}", ((self.high as u128) << 64) | self.low as u128)
    }
}

impl fmt::Display for Uuid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Order side.
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
pub enum Side {
    /// Buy side.
    Buy = 1,
    /// Sell side.
    Sell = 2,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order time in force.
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
pub enum TimeInForce {
    /// Unfilled remainder is cancelled immediately.
    ImmediateOrCancel = 1,
    /// Order rests until cancelled.
    GoodTilCancelled = 2,
}
