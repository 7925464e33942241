/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Tradelink Transport
//!
//! Network transport layer for the tradelink venue protocol.
//!
//! This crate provides:
//! - **Codec**: Tokio codec for length-delimited frame boundaries
//! - **Connection**: TCP connect with timeout, split into single-owner
//!   reader and writer halves

pub mod codec;
pub mod conn;

pub use codec::{CodecError, FrameCodec};
pub use conn::{FrameReader, FrameTransport, FrameWriter, TransportOptions};
