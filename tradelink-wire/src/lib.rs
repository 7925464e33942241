/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Tradelink Wire
//!
//! Schema-typed payload model and binary codec for the tradelink venue
//! protocol.
//!
//! This crate provides:
//! - **Payload model**: Discriminated payload union with the session-control
//!   envelope
//! - **Event names**: Stable textual dispatch keys derived from payload kinds
//! - **Codec**: Little-endian binary encoding and decoding over `bytes`

pub mod decode;
pub mod encode;
pub mod payload;

pub use decode::decode;
pub use encode::encode;
pub use payload::{ApplyTo, Body, Control, EventInfo, LogoutReason, Payload, Quote};
