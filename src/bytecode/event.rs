//! Output events of the pulse stream.

use core::fmt;

use crate::motion::{Axis, AXES};

/// Set of axes, one bit per axis (X = bit 0 .. W = bit 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMask(u8);

impl AxisMask {
    /// No axis.
    pub const EMPTY: Self = Self(0);

    /// All four axes.
    pub const ALL: Self = Self(0x0F);

    /// Create a mask from raw bits; bits above bit 3 are dropped.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Raw mask bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Mask holding a single axis.
    #[inline]
    pub const fn of(axis: Axis) -> Self {
        Self(axis.bit())
    }

    /// Add an axis.
    #[inline]
    pub fn insert(&mut self, axis: Axis) {
        self.0 |= axis.bit();
    }

    /// Copy of this mask with an axis added.
    #[inline]
    pub const fn with(self, axis: Axis) -> Self {
        Self(self.0 | axis.bit())
    }

    /// Check membership.
    #[inline]
    pub const fn contains(self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    /// Check if no axis is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of axes set.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the axes in the mask, X first.
    pub fn axes(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

impl fmt::Display for AxisMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [char; AXES] = ['x', 'y', 'z', 'w'];
        for axis in Axis::ALL.iter().rev() {
            if self.contains(*axis) {
                write!(f, "{}", NAMES[axis.index()])?;
            } else {
                f.write_str("-")?;
            }
        }
        Ok(())
    }
}

/// Driver control flags carried by a STAT byte (`1010 1res`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatFlags(u8);

impl StatFlags {
    /// Sleep line.
    pub const SLEEP: Self = Self(0x01);
    /// Enable line.
    pub const ENABLE: Self = Self(0x02);
    /// Reset line.
    pub const RESET: Self = Self(0x04);

    /// Create from raw bits; only the low three bits are kept.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if all flags of `other` are set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Maximum spindle duty value (`n/64`).
pub const MAX_SPIN_DUTY: u8 = 0x3F;

/// One element of the pulse stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Wait this many consumer ticks before the next event.
    Delay(u32),
    /// Latch direction bits (set bit = increasing).
    Dir(AxisMask),
    /// Pulse these axes once.
    Step(AxisMask),
    /// Microstep mode code (MS3/MS2/MS1).
    Mode(u8),
    /// Driver reset/enable/sleep lines.
    Stat(StatFlags),
    /// Spindle PWM duty, `n/64`.
    Spin(u8),
    /// Byte from the undefined `1011 ----` group.
    Unknown(u8),
}

impl Event {
    /// Check if this event moves an axis.
    #[inline]
    pub fn is_step(&self) -> bool {
        matches!(self, Event::Step(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_ops() {
        let mut mask = AxisMask::EMPTY;
        assert!(mask.is_empty());
        mask.insert(Axis::X);
        mask.insert(Axis::Z);
        assert_eq!(mask.bits(), 0x05);
        assert!(mask.contains(Axis::Z));
        assert!(!mask.contains(Axis::Y));
        assert_eq!(mask.count(), 2);

        let axes: heapless::Vec<Axis, 4> = mask.axes().collect();
        assert_eq!(axes.as_slice(), &[Axis::X, Axis::Z]);
    }

    #[test]
    fn test_mask_from_bits_drops_high_bits() {
        assert_eq!(AxisMask::from_bits(0xF3), AxisMask::from_bits(0x03));
    }

    #[test]
    fn test_mask_display() {
        let mask = AxisMask::of(Axis::X).with(Axis::W);
        assert_eq!(format!("{}", mask), "w--x");
    }

    #[test]
    fn test_stat_flags() {
        let flags = StatFlags::ENABLE.union(StatFlags::RESET);
        assert_eq!(flags.bits(), 0x06);
        assert!(flags.contains(StatFlags::ENABLE));
        assert!(!flags.contains(StatFlags::SLEEP));
    }
}
