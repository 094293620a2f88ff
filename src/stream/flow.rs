//! High/low water mark flow control.

use embedded_hal::delay::DelayNs;

use crate::config::FlowConfig;
use crate::error::StreamError;

use super::sink::{PulseSink, SinkError};

/// Paces bytes into a [`PulseSink`] so the consumer queue never overflows.
///
/// Emission pauses once `high_water` bytes are pending and resumes at
/// `low_water`. While paused the sink is polled every `poll_interval_us`;
/// after `max_stall_polls` polls in a row without the queue shrinking the
/// consumer is declared stalled. Bytes are never reordered or dropped.
pub struct FlowControl<D: DelayNs> {
    config: FlowConfig,
    delay: D,
    paused: bool,
    pauses: u32,
    sent: u64,
}

impl<D: DelayNs> FlowControl<D> {
    /// Create flow control with the given thresholds and delay provider.
    pub fn new(config: FlowConfig, delay: D) -> Self {
        Self {
            config,
            delay,
            paused: false,
            pauses: 0,
            sent: 0,
        }
    }

    /// Thresholds in use.
    #[inline]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Check if emission is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of times emission paused at the high water mark.
    #[inline]
    pub fn pauses(&self) -> u32 {
        self.pauses
    }

    /// Bytes delivered so far.
    #[inline]
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Release the delay provider.
    pub fn release(self) -> D {
        self.delay
    }

    /// Deliver one byte, blocking while the consumer queue is above the
    /// high water mark.
    ///
    /// # Errors
    ///
    /// `Stalled` if the consumer stops draining, `Closed` if the sink
    /// refuses the byte for good.
    pub fn send<S: PulseSink + ?Sized>(&mut self, sink: &mut S, byte: u8) -> Result<(), StreamError> {
        if self.paused || sink.pending() >= self.config.high_water {
            self.wait_for_low_water(sink)?;
        }

        let mut stalled = 0u32;
        loop {
            match sink.enqueue(byte) {
                Ok(()) => {
                    self.sent += 1;
                    return Ok(());
                }
                Err(SinkError::Closed) => return Err(StreamError::Closed),
                Err(SinkError::Full) => {
                    stalled += 1;
                    if stalled > self.config.max_stall_polls {
                        return Err(StreamError::Stalled {
                            pending: sink.pending(),
                        });
                    }
                    self.poll(sink);
                }
            }
        }
    }

    /// Deliver every byte of an iterator; returns how many were sent.
    pub fn send_all<S, I>(&mut self, sink: &mut S, bytes: I) -> Result<usize, StreamError>
    where
        S: PulseSink + ?Sized,
        I: IntoIterator<Item = u8>,
    {
        let mut count = 0;
        for byte in bytes {
            self.send(sink, byte)?;
            count += 1;
        }
        Ok(count)
    }

    /// Block until the consumer has drained its queue completely.
    pub fn drain<S: PulseSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), StreamError> {
        sink.flush()?;
        self.wait_until(sink, 0)
    }

    fn wait_for_low_water<S: PulseSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), StreamError> {
        if !self.paused {
            self.paused = true;
            self.pauses += 1;
            debug!("pausing at {} pending bytes", sink.pending());
        }
        self.wait_until(sink, self.config.low_water)?;
        self.paused = false;
        Ok(())
    }

    /// Poll until at most `level` bytes are pending.
    fn wait_until<S: PulseSink + ?Sized>(&mut self, sink: &mut S, level: usize) -> Result<(), StreamError> {
        let mut last = sink.pending();
        let mut stalled = 0u32;

        while sink.pending() > level {
            self.poll(sink);
            let now = sink.pending();
            if now < last {
                last = now;
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.config.max_stall_polls {
                    warn!("consumer stalled with {} bytes pending", now);
                    return Err(StreamError::Stalled { pending: now });
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn poll<S: PulseSink + ?Sized>(&mut self, sink: &mut S) {
        self.delay.delay_us(self.config.poll_interval_us);
        sink.service();
    }
}
