//! Event to byte encoding.

use super::event::{Event, MAX_SPIN_DUTY};

/// DIR opcode (`1000 wzyx`).
pub const OP_DIR: u8 = 0x80;
/// STEP opcode (`1001 wzyx`).
pub const OP_STEP: u8 = 0x90;
/// MODE opcode (`1010 0mmm`).
pub const OP_MODE: u8 = 0xA0;
/// STAT opcode (`1010 1res`).
pub const OP_STAT: u8 = 0xA8;
/// SPIN opcode (`11nn nnnn`).
pub const OP_SPIN: u8 = 0xC0;

/// Ticks represented by one full delay byte (`0x7F`).
pub const MAX_DELAY_PER_BYTE: u32 = 128;

/// Default clamp for one delay event.
pub const DEFAULT_MAX_DELAY_TICKS: u32 = 5000;

/// Stateful event encoder.
///
/// Holds the delay clamp and counts how often it fired.
#[derive(Debug, Clone)]
pub struct Encoder {
    max_delay_ticks: u32,
    clamped: u32,
}

impl Encoder {
    /// Create an encoder clamping delays to `max_delay_ticks`.
    pub fn new(max_delay_ticks: u32) -> Self {
        Self {
            max_delay_ticks: max_delay_ticks.max(1),
            clamped: 0,
        }
    }

    /// Number of delays that exceeded the clamp.
    #[inline]
    pub fn clamped_delays(&self) -> u32 {
        self.clamped
    }

    /// Encode one event into its byte sequence.
    ///
    /// `Delay(n)` becomes `0x7F` bytes of 128 ticks each while more than
    /// 128 ticks remain, then one byte `n - 1`. `Delay(0)` encodes to
    /// nothing.
    pub fn encode(&mut self, event: Event) -> EncodedBytes {
        match event {
            Event::Delay(ticks) => {
                let ticks = if ticks > self.max_delay_ticks {
                    warn!(
                        "delay of {} ticks clamped to {}",
                        ticks,
                        self.max_delay_ticks
                    );
                    self.clamped += 1;
                    self.max_delay_ticks
                } else {
                    ticks
                };
                EncodedBytes::delay(ticks)
            }
            Event::Dir(mask) => EncodedBytes::single(OP_DIR | mask.bits()),
            Event::Step(mask) => EncodedBytes::single(OP_STEP | mask.bits()),
            Event::Mode(code) => EncodedBytes::single(OP_MODE | (code & 0x07)),
            Event::Stat(flags) => EncodedBytes::single(OP_STAT | flags.bits()),
            Event::Spin(duty) => EncodedBytes::single(OP_SPIN | duty.min(MAX_SPIN_DUTY)),
            Event::Unknown(byte) => EncodedBytes::single(byte),
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELAY_TICKS)
    }
}

/// Bytes of one encoded event.
#[derive(Debug, Clone)]
pub struct EncodedBytes {
    /// Delay ticks still to emit, for delay events.
    remaining: u32,
    /// Command byte, for non-delay events.
    command: Option<u8>,
}

impl EncodedBytes {
    fn delay(ticks: u32) -> Self {
        Self {
            remaining: ticks,
            command: None,
        }
    }

    fn single(byte: u8) -> Self {
        Self {
            remaining: 0,
            command: Some(byte),
        }
    }
}

impl Iterator for EncodedBytes {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if let Some(byte) = self.command.take() {
            return Some(byte);
        }
        match self.remaining {
            0 => None,
            n if n > MAX_DELAY_PER_BYTE => {
                self.remaining -= MAX_DELAY_PER_BYTE;
                Some((MAX_DELAY_PER_BYTE - 1) as u8)
            }
            n => {
                self.remaining = 0;
                Some((n - 1) as u8)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.command.is_some() {
            1
        } else {
            (u64::from(self.remaining) + u64::from(MAX_DELAY_PER_BYTE) - 1) as usize / MAX_DELAY_PER_BYTE as usize
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for EncodedBytes {}
