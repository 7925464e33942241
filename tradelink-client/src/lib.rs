/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Tradelink Client
//!
//! High-level facade for the tradelink venue client.
//!
//! This crate provides:
//! - **Dispatcher**: Multicast callback registry keyed by event name
//! - **Client**: Named operations over the session (login, orders,
//!   subscriptions, event queries) with inbound dispatch
//! - **Fetch**: Out-of-band HTTP fallback for oversized message bodies
//! - **Harness**: Outbound worker and inbound loop sharing one session

pub mod client;
pub mod dispatcher;
pub mod fetch;
pub mod harness;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::Client;
pub use dispatcher::{BoxError, CallbackRegistry, Handler};
pub use fetch::{ContentFetcher, HttpFetcher};
pub use harness::{ReceiveLoop, SendWorker, WorkItem};
