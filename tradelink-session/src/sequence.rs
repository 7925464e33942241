/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Sequence number management.
//!
//! Each session direction carries a monotonic counter starting at 1.
//! Outgoing numbers are allocated one per written frame; incoming numbers
//! are checked strictly: any mismatch is a fatal protocol violation. The
//! only permitted resynchronization is the server-directed reset delivered
//! in a login response.

use std::sync::atomic::{AtomicU32, Ordering};
use tradelink_core::error::SessionError;
use tradelink_core::types::SeqNum;

/// Manages the per-direction sequence numbers of one session.
///
/// Uses atomic operations for cheap cross-task reads; mutation happens only
/// on the task performing the corresponding I/O.
#[derive(Debug)]
pub struct Sequencer {
    /// Next outgoing sequence number.
    out_seq: AtomicU32,
    /// Next expected incoming sequence number.
    in_seq: AtomicU32,
}

impl Sequencer {
    /// Creates a new sequencer with both counters at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            out_seq: AtomicU32::new(1),
            in_seq: AtomicU32::new(1),
        }
    }

    /// Allocates and returns the next outgoing sequence number.
    ///
    /// The counter increments by exactly one per call.
    #[inline]
    pub fn next_out_seq(&self) -> SeqNum {
        SeqNum::new(self.out_seq.fetch_add(1, Ordering::SeqCst))
    }

    /// Validates and accepts an incoming sequence number.
    ///
    /// # Errors
    /// Returns [`SessionError::SequenceGap`] when `received` does not match
    /// the expected value. The gap is fatal: the caller must tear the
    /// session down rather than continue reading.
    pub fn accept_in_seq(&self, received: SeqNum) -> Result<(), SessionError> {
        let expected = self.in_seq.load(Ordering::SeqCst);
        if received.value() != expected {
            return Err(SessionError::SequenceGap {
                expected,
                received: received.value(),
            });
        }
        self.in_seq.store(expected + 1, Ordering::SeqCst);
        Ok(())
    }

    /// Overwrites both counters unconditionally.
    ///
    /// Called only while processing a login response, whose reset value is
    /// authoritative over any prior client-side state.
    #[inline]
    pub fn reset(&self, value: u32) {
        self.out_seq.store(value, Ordering::SeqCst);
        self.in_seq.store(value, Ordering::SeqCst);
    }

    /// Returns the next outgoing sequence number without allocating it.
    #[inline]
    #[must_use]
    pub fn peek_out(&self) -> SeqNum {
        SeqNum::new(self.out_seq.load(Ordering::SeqCst))
    }

    /// Returns the next expected incoming sequence number.
    #[inline]
    #[must_use]
    pub fn peek_in(&self) -> SeqNum {
        SeqNum::new(self.in_seq.load(Ordering::SeqCst))
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_starts_at_one() {
        let seq = Sequencer::new();
        assert_eq!(seq.peek_out().value(), 1);
        assert_eq!(seq.peek_in().value(), 1);
    }

    #[test]
    fn test_next_out_seq_increments_by_one() {
        let seq = Sequencer::new();

        let n = 5;
        for expected in 1..=n {
            assert_eq!(seq.next_out_seq().value(), expected);
        }
        assert_eq!(seq.peek_out().value(), 1 + n);
    }

    #[test]
    fn test_accept_in_seq_strict_order() {
        let seq = Sequencer::new();

        assert!(seq.accept_in_seq(SeqNum::new(1)).is_ok());
        assert!(seq.accept_in_seq(SeqNum::new(2)).is_ok());
        assert_eq!(seq.peek_in().value(), 3);
    }

    #[test]
    fn test_accept_in_seq_gap_is_fatal() {
        let seq = Sequencer::new();

        let err = seq.accept_in_seq(SeqNum::new(3)).unwrap_err();
        assert_eq!(
            err,
            SessionError::SequenceGap {
                expected: 1,
                received: 3
            }
        );
        // A rejected frame must not advance the counter.
        assert_eq!(seq.peek_in().value(), 1);
    }

    #[test]
    fn test_accept_in_seq_duplicate_is_fatal() {
        let seq = Sequencer::new();
        seq.accept_in_seq(SeqNum::new(1)).unwrap();

        let err = seq.accept_in_seq(SeqNum::new(1)).unwrap_err();
        assert_eq!(
            err,
            SessionError::SequenceGap {
                expected: 2,
                received: 1
            }
        );
    }

    #[test]
    fn test_reset_overwrites_both_counters() {
        let seq = Sequencer::new();
        seq.next_out_seq();
        seq.accept_in_seq(SeqNum::new(1)).unwrap();

        seq.reset(42);
        assert_eq!(seq.next_out_seq().value(), 42);
        assert_eq!(seq.peek_in().value(), 42);
        assert!(seq.accept_in_seq(SeqNum::new(42)).is_ok());
    }
}
