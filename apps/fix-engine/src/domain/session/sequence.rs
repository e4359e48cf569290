//! Message sequence tracking and gap recovery.
//!
//! FIX sessions number every message in each direction starting at 1. The
//! tracker classifies each inbound sequence number against the expected
//! value; the gap buffer parks out-of-order messages until a resend fills
//! the hole.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Maximum number of messages parked while a sequence gap is open.
pub const DEFAULT_GAP_BUFFER_CAPACITY: usize = 512;

/// Classification of an inbound sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// The number matched; the expectation has advanced.
    Expected,
    /// Lower than expected; the message is a duplicate and must be dropped.
    Duplicate,
    /// Higher than expected; messages `expected..received` are missing.
    Gap {
        /// The sequence number that was expected.
        expected: u64,
        /// The sequence number that arrived.
        received: u64,
    },
}

/// Tracks outbound and inbound sequence numbers for one session.
///
/// Both counters start at 1. Reconnecting means a fresh session, so the
/// tracker is reset rather than persisted across connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTracker {
    next_outbound: u64,
    expected_inbound: u64,
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceTracker {
    /// Create a tracker with both counters at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_outbound: 1,
            expected_inbound: 1,
        }
    }

    /// Take the next outbound sequence number, advancing the counter.
    pub fn next_outbound(&mut self) -> u64 {
        let seq = self.next_outbound;
        self.next_outbound += 1;
        seq
    }

    /// The outbound sequence number the next message will carry.
    #[must_use]
    pub const fn peek_outbound(&self) -> u64 {
        self.next_outbound
    }

    /// The inbound sequence number expected next.
    #[must_use]
    pub const fn expected_inbound(&self) -> u64 {
        self.expected_inbound
    }

    /// Classify an inbound sequence number.
    ///
    /// Advances the expectation only when the number matches exactly.
    /// Duplicates and gaps leave the expectation unchanged so the caller
    /// can drop or buffer the message.
    pub fn check_inbound(&mut self, received: u64) -> SequenceCheck {
        match received.cmp(&self.expected_inbound) {
            Ordering::Equal => {
                self.expected_inbound += 1;
                SequenceCheck::Expected
            }
            Ordering::Less => SequenceCheck::Duplicate,
            Ordering::Greater => SequenceCheck::Gap {
                expected: self.expected_inbound,
                received,
            },
        }
    }

    /// Jump the inbound expectation forward, per a SequenceReset message.
    pub fn set_expected_inbound(&mut self, seq: u64) {
        self.expected_inbound = seq;
    }

    /// Reset both counters to 1 for a fresh session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Bounded buffer for messages received ahead of a sequence gap.
///
/// Keyed by sequence number so drained messages come out in order.
#[derive(Debug)]
pub struct GapBuffer<T> {
    messages: BTreeMap<u64, T>,
    capacity: usize,
}

impl<T> Default for GapBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GapBuffer<T> {
    /// Create a buffer with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_GAP_BUFFER_CAPACITY)
    }

    /// Create a buffer bounded at `capacity` messages.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: BTreeMap::new(),
            capacity,
        }
    }

    /// Park a message under its sequence number.
    ///
    /// Returns false if the buffer is full and the message was dropped.
    /// Re-buffering an already-parked sequence number keeps the first copy.
    pub fn insert(&mut self, seq: u64, message: T) -> bool {
        if self.messages.contains_key(&seq) {
            return true;
        }
        if self.messages.len() >= self.capacity {
            return false;
        }
        self.messages.insert(seq, message);
        true
    }

    /// Remove and return the message parked under `seq`, if any.
    pub fn pop_next(&mut self, seq: u64) -> Option<T> {
        self.messages.remove(&seq)
    }

    /// The lowest sequence number currently parked.
    #[must_use]
    pub fn lowest_buffered(&self) -> Option<u64> {
        self.messages.keys().next().copied()
    }

    /// Number of parked messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing is parked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all parked messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
