//! Byte sink abstraction.

use crate::error::StreamError;

/// Why a sink refused a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// No room right now; retry after the consumer drains.
    Full,
    /// The transport is gone.
    Closed,
}

/// Destination of the encoded pulse stream.
///
/// Implementations report how many bytes the consumer still has queued so
/// the producer can apply high/low water flow control.
pub trait PulseSink {
    /// Hand one byte to the consumer.
    fn enqueue(&mut self, byte: u8) -> Result<(), SinkError>;

    /// Bytes accepted but not yet consumed.
    fn pending(&self) -> usize;

    /// Called once per backpressure poll.
    ///
    /// Sinks that learn their queue depth by polling the transport update it
    /// here. The default does nothing.
    fn service(&mut self) {}

    /// Push buffered bytes to the transport.
    fn flush(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

impl<S: PulseSink + ?Sized> PulseSink for &mut S {
    fn enqueue(&mut self, byte: u8) -> Result<(), SinkError> {
        (**self).enqueue(byte)
    }

    fn pending(&self) -> usize {
        (**self).pending()
    }

    fn service(&mut self) {
        (**self).service()
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        (**self).flush()
    }
}

#[cfg(feature = "std")]
impl PulseSink for std::vec::Vec<u8> {
    fn enqueue(&mut self, byte: u8) -> Result<(), SinkError> {
        self.push(byte);
        Ok(())
    }

    fn pending(&self) -> usize {
        0
    }
}
