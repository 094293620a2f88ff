//! Corner speed limits.
//!
//! A corner is modelled as an instantaneous change of the unit direction
//! vector. Its chord `|u_in - u_out| = sqrt(2 - 2·cos θ)` is the velocity
//! jump per unit speed; spreading that jump over one step of length `res`
//! at `amax` gives the admissible corner speed `amax·res / chord`.

use libm::sqrt;

use crate::config::PlanningConstraints;
use crate::motion::{dot, norm, Waypoint};

/// Cosine of the turn at `at` between the moves `prev → at` and `at → next`.
///
/// A zero-length move on either side counts as straight (cosine 1).
pub fn corner_cosine(prev: &Waypoint, at: &Waypoint, next: &Waypoint) -> f64 {
    let incoming = prev.delta_to(at);
    let outgoing = at.delta_to(next);
    let n_in = norm(&incoming);
    let n_out = norm(&outgoing);
    if !(n_in > 0.0) || !(n_out > 0.0) {
        return 1.0;
    }
    (dot(&incoming, &outgoing) / (n_in * n_out)).clamp(-1.0, 1.0)
}

/// Length of the unit-vector difference for a turn with cosine `cos`.
#[inline]
pub fn chord(cos: f64) -> f64 {
    sqrt((2.0 - 2.0 * cos).max(0.0))
}

/// Highest speed at which the corner can be taken.
pub fn corner_velocity(cos: f64, constraints: &PlanningConstraints) -> f64 {
    let chord = chord(cos);
    if chord < constraints.straight_threshold {
        constraints.max_velocity
    } else {
        constraints.max_acceleration * constraints.resolution / chord
    }
}
