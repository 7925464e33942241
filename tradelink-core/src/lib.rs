/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Tradelink Core
//!
//! Core types, traits, and error definitions for the tradelink venue client.
//!
//! This crate provides:
//! - **Types**: Sequence numbers, venue identifiers, order enumerations
//! - **Errors**: Typed error hierarchy for validation, transport, session,
//!   and wire failures
//! - **Orders**: Validated order instruction value objects
//! - **Events**: Event listing query objects

pub mod error;
pub mod events;
pub mod orders;
pub mod types;

pub use error::{
    ClientError, Result, SessionError, TransportError, ValidationError, WireError,
};
pub use events::EventQuery;
pub use orders::{OrderCancel, OrderCreate, OrdersForMarket, references_match};
pub use types::{SeqNum, Side, TimeInForce, Uuid128};
