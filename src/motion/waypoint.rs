//! Waypoints and input record parsing.

use core::str::FromStr;

use libm::{round, sqrt};

use crate::config::units::Steps;
use crate::error::InputError;

/// Number of axes carried by a waypoint and by the byte protocol.
pub const AXES: usize = 4;

/// Machine axis, in protocol bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Bit 0.
    X,
    /// Bit 1.
    Y,
    /// Bit 2.
    Z,
    /// Bit 3.
    W,
}

impl Axis {
    /// All axes in bit order.
    pub const ALL: [Axis; AXES] = [Axis::X, Axis::Y, Axis::Z, Axis::W];

    /// Array index (and protocol bit number) of this axis.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask of this axis.
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A target position in up to four axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Waypoint {
    coords: [f64; AXES],
}

impl Waypoint {
    /// Create a waypoint from all four coordinates.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self {
            coords: [x, y, z, w],
        }
    }

    /// Create a planar waypoint (z = w = 0).
    #[inline]
    pub const fn xy(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    /// Create a waypoint from a coordinate array.
    #[inline]
    pub const fn from_coords(coords: [f64; AXES]) -> Self {
        Self { coords }
    }

    /// Coordinate along one axis.
    #[inline]
    pub fn coord(&self, axis: Axis) -> f64 {
        self.coords[axis.index()]
    }

    /// All coordinates.
    #[inline]
    pub fn coords(&self) -> [f64; AXES] {
        self.coords
    }

    /// Per-axis difference `other - self`.
    pub fn delta_to(&self, other: &Waypoint) -> [f64; AXES] {
        let mut delta = [0.0; AXES];
        for (d, (a, b)) in delta.iter_mut().zip(self.coords.iter().zip(other.coords.iter())) {
            *d = b - a;
        }
        delta
    }

    /// Euclidean distance to another waypoint over all axes.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        norm(&self.delta_to(other))
    }

    /// Point at `distance` along the unit `direction` from this waypoint.
    pub fn offset(&self, direction: &[f64; AXES], distance: f64) -> Waypoint {
        let mut coords = self.coords;
        for (c, d) in coords.iter_mut().zip(direction.iter()) {
            *c += d * distance;
        }
        Waypoint { coords }
    }

    /// Nearest absolute step position at the given resolution.
    pub fn to_steps(&self, resolution: f64) -> [Steps; AXES] {
        self.coords.map(|c| Steps(round(c / resolution) as i64))
    }
}

/// Euclidean length of a vector.
pub(crate) fn norm(v: &[f64; AXES]) -> f64 {
    sqrt(v.iter().map(|c| c * c).sum())
}

/// Dot product of two vectors.
pub(crate) fn dot(a: &[f64; AXES], b: &[f64; AXES]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

impl FromStr for Waypoint {
    type Err = InputError;

    /// Parse a record of 2 to 4 whitespace-separated numbers.
    ///
    /// Leading fields map to X, Y, Z, W; missing trailing axes are 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut coords = [0.0; AXES];
        let mut count = 0;

        for field in s.split_whitespace() {
            if count == AXES {
                return Err(InputError::MalformedRecord { line: 0 });
            }
            let value = f64::from_str(field).map_err(|_| InputError::MalformedRecord { line: 0 })?;
            if !value.is_finite() {
                return Err(InputError::MalformedRecord { line: 0 });
            }
            coords[count] = value;
            count += 1;
        }

        if count < 2 {
            return Err(InputError::MalformedRecord { line: 0 });
        }

        Ok(Waypoint { coords })
    }
}

/// Parse one input line.
///
/// Returns `Ok(None)` for blank lines and `#` comments, `Err` carrying the
/// 1-based `line` number for anything that is not a valid record.
pub fn parse_record(text: &str, line: usize) -> Result<Option<Waypoint>, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    trimmed
        .parse::<Waypoint>()
        .map(Some)
        .map_err(|_| InputError::MalformedRecord { line })
}
