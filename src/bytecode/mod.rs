//! Byte-coded pulse stream.
//!
//! One byte per command, axis bits 0..3 = X, Y, Z, W:
//!
//! | Pattern      | Meaning                              |
//! |--------------|--------------------------------------|
//! | `0nnn nnnn`  | DELAY: wait `n + 1` ticks            |
//! | `1000 wzyx`  | DIR: bit set = increasing            |
//! | `1001 wzyx`  | STEP: pulse the axes set             |
//! | `1010 0mmm`  | MODE: microstep code                 |
//! | `1010 1res`  | STAT: reset, enable, sleep lines     |
//! | `11nn nnnn`  | SPIN: spindle duty `n/64`            |

mod decoder;
mod encoder;
mod event;
mod tracker;

pub use decoder::{decode, Decoder};
pub use encoder::{
    EncodedBytes, Encoder, DEFAULT_MAX_DELAY_TICKS, MAX_DELAY_PER_BYTE, OP_DIR, OP_MODE,
    OP_SPIN, OP_STAT, OP_STEP,
};
pub use event::{AxisMask, Event, StatFlags, MAX_SPIN_DUTY};
pub use tracker::PositionTracker;
