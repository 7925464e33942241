/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Tradelink Session
//!
//! Session layer for the tradelink venue client.
//!
//! This crate provides:
//! - **Sequencer**: Strict per-direction sequence number discipline
//! - **State machine**: Connection and authentication lifecycle
//! - **Session**: Connect/login/logout/send/read over the frame transport
//! - **Configuration**: Session options and credentials

pub mod config;
pub mod sequence;
pub mod session;
pub mod state;

pub use config::SessionConfig;
pub use sequence::Sequencer;
pub use session::Session;
pub use state::SessionState;
