//! Byte to event decoding, as the pulse consumer interprets the stream.

use core::iter::Peekable;

use super::encoder::{OP_DIR, OP_MODE, OP_STAT, OP_STEP};
use super::event::{AxisMask, Event, StatFlags};

/// Decode a single byte.
///
/// Delay bytes decode to `Delay(n + 1)`; the undefined `1011 ----` group
/// decodes to `Unknown`.
pub fn decode(byte: u8) -> Event {
    if byte & 0x80 == 0 {
        return Event::Delay(u32::from(byte) + 1);
    }
    if byte & 0xC0 == 0xC0 {
        return Event::Spin(byte & 0x3F);
    }
    match byte & 0xF0 {
        OP_DIR => Event::Dir(AxisMask::from_bits(byte)),
        OP_STEP => Event::Step(AxisMask::from_bits(byte)),
        OP_MODE if byte & OP_STAT == OP_STAT => Event::Stat(StatFlags::from_bits(byte)),
        OP_MODE => Event::Mode(byte & 0x07),
        _ => Event::Unknown(byte),
    }
}

/// Streaming decoder over a byte iterator.
///
/// Consecutive delay bytes are merged into one `Delay` event, so the output
/// of `Encoder::encode` decodes back to the event it came from.
#[derive(Debug, Clone)]
pub struct Decoder<I: Iterator<Item = u8>> {
    bytes: Peekable<I>,
}

impl<I: Iterator<Item = u8>> Decoder<I> {
    /// Wrap a byte source.
    pub fn new<T>(bytes: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            bytes: bytes.into_iter().peekable(),
        }
    }
}

impl<I: Iterator<Item = u8>> Iterator for Decoder<I> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let event = decode(self.bytes.next()?);
        let Event::Delay(mut ticks) = event else {
            return Some(event);
        };

        while let Some(&byte) = self.bytes.peek() {
            match decode(byte) {
                Event::Delay(more) => {
                    ticks = ticks.saturating_add(more);
                    self.bytes.next();
                }
                _ => break,
            }
        }
        Some(Event::Delay(ticks))
    }
}
