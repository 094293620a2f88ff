//! Bounded in-memory byte queue.

use heapless::Deque;

use super::sink::{PulseSink, SinkError};

/// Fixed-capacity FIFO standing in for the consumer's receive buffer.
///
/// The producer side is [`PulseSink`]; the consumer side pops bytes with
/// [`dequeue`](Self::dequeue).
#[derive(Debug, Clone)]
pub struct ByteQueue<const N: usize> {
    bytes: Deque<u8, N>,
}

impl<const N: usize> ByteQueue<N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            bytes: Deque::new(),
        }
    }

    /// Maximum number of queued bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of queued bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the oldest byte.
    #[inline]
    pub fn dequeue(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    /// Iterate queued bytes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.bytes.iter()
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PulseSink for ByteQueue<N> {
    fn enqueue(&mut self, byte: u8) -> Result<(), SinkError> {
        self.bytes.push_back(byte).map_err(|_| SinkError::Full)
    }

    fn pending(&self) -> usize {
        self.bytes.len()
    }
}
