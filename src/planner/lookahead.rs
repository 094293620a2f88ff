//! Lookahead planner.

use libm::sqrt;

use crate::config::{PlanningConstraints, MAX_LOOKAHEAD, MIN_LOOKAHEAD};
use crate::error::PlannerError;
use crate::motion::{Segment, Waypoint};

use super::cornering::{corner_cosine, corner_velocity};
use super::window::{Node, Window};

/// Plans junction speeds over a sliding window of waypoints.
///
/// Each call to [`plan`](Self::plan) commits the oldest move of the window
/// with speeds that guarantee the machine can still stop at the newest
/// buffered waypoint.
///
/// # Example
///
/// ```rust
/// use stepcode::config::PlanningConstraints;
/// use stepcode::motion::Waypoint;
/// use stepcode::planner::LookaheadPlanner;
///
/// let mut planner = LookaheadPlanner::new(PlanningConstraints::default(), 3)?;
/// for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
///     planner.push(Waypoint::xy(x, y))?;
/// }
/// let first = planner.plan().expect("window is full");
/// assert_eq!(first.start_velocity, 0.0);
///
/// planner.finish();
/// let last = planner.plan().expect("one move left");
/// assert_eq!(last.end_velocity, 0.0);
/// assert!(planner.plan().is_none());
/// # Ok::<(), stepcode::error::PlannerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LookaheadPlanner {
    constraints: PlanningConstraints,
    depth: usize,
    window: Window,
    finished: bool,
    planned: u64,
}

impl LookaheadPlanner {
    /// Create a planner with a window of `depth` waypoints.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidDepth` unless
    /// `MIN_LOOKAHEAD <= depth <= MAX_LOOKAHEAD`.
    pub fn new(constraints: PlanningConstraints, depth: usize) -> Result<Self, PlannerError> {
        if !(MIN_LOOKAHEAD..=MAX_LOOKAHEAD).contains(&depth) {
            return Err(PlannerError::InvalidDepth(depth));
        }
        Ok(Self {
            constraints,
            depth,
            window: Window::new(),
            finished: false,
            planned: 0,
        })
    }

    /// Window depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Waypoints currently buffered, including the committed start.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.window.len()
    }

    /// Segments produced so far.
    #[inline]
    pub fn planned(&self) -> u64 {
        self.planned
    }

    /// Check if end of input was signalled.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append a waypoint to the window.
    ///
    /// # Errors
    ///
    /// `WindowFull` if more than `MAX_LOOKAHEAD` waypoints are pushed
    /// without calling [`plan`](Self::plan), `Finished` after
    /// [`finish`](Self::finish).
    pub fn push(&mut self, point: Waypoint) -> Result<(), PlannerError> {
        if self.finished {
            return Err(PlannerError::Finished);
        }
        if self.window.is_full() {
            return Err(PlannerError::WindowFull {
                capacity: MAX_LOOKAHEAD,
            });
        }
        if let Some(last) = self.window.back_mut() {
            last.l = last.point.distance_to(&point);
        }
        self.window.push_back(Node::new(point))
    }

    /// Signal end of input.
    ///
    /// Subsequent calls to [`plan`](Self::plan) drain the window and bring
    /// the machine to rest at the last waypoint.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Commit the next segment, or `None` if more input is needed (or, after
    /// [`finish`](Self::finish), the last waypoint has been reached).
    pub fn plan(&mut self) -> Option<Segment> {
        if self.finished {
            let has_move = self.window.get(1).map_or(false, |n| !n.eof);
            if !has_move {
                self.window.clear();
                return None;
            }
            self.pad();
        } else if self.window.len() < self.depth {
            return None;
        }

        self.corner_pass();
        self.backward_pass();
        self.forward_pass();

        let start = self.window.pop_front()?;
        let end = self.window.get(0)?;
        let segment = Segment {
            start: start.point,
            end: end.point,
            length: start.l,
            start_velocity: start.vs,
            end_velocity: end.vs,
        };

        self.planned += 1;
        trace!(
            "segment {}: l={} vs={} ve={}",
            self.planned,
            segment.length,
            segment.start_velocity,
            segment.end_velocity
        );
        Some(segment)
    }

    /// Fill the window up to `depth` with end-of-input sentinels.
    fn pad(&mut self) {
        while self.window.len() < self.depth {
            let Some(last) = self.window.back_mut() else {
                return;
            };
            last.l = 0.0;
            let sentinel = Node::sentinel(last.point);
            if self.window.push_back(sentinel).is_err() {
                return;
            }
        }
    }

    /// Cap every interior node at its corner speed.
    fn corner_pass(&mut self) {
        for i in 1..self.depth - 1 {
            let (Some(prev), Some(at), Some(next)) =
                (self.window.get(i - 1), self.window.get(i), self.window.get(i + 1))
            else {
                return;
            };

            let vs = if at.eof || next.eof {
                0.0
            } else {
                let cos = corner_cosine(&prev.point, &at.point, &next.point);
                corner_velocity(cos, &self.constraints)
            };

            if let Some(node) = self.window.get_mut(i) {
                node.vs = vs;
            }
        }
    }

    /// Limit each node so the machine can still stop at the newest one.
    fn backward_pass(&mut self) {
        let a = self.constraints.max_acceleration;
        let vmax = self.constraints.max_velocity;

        if let Some(newest) = self.window.get_mut(self.depth - 1) {
            newest.vs = 0.0;
        }

        for i in (1..self.depth - 1).rev() {
            let Some(next_vs) = self.window.get(i + 1).map(|n| n.vs) else {
                continue;
            };
            if let Some(node) = self.window.get_mut(i) {
                let reachable = sqrt(next_vs * next_vs + 2.0 * a * node.l);
                node.vs = node.vs.min(reachable).min(vmax);
            }
        }
    }

    /// Limit the first junction by what the committed start can reach.
    fn forward_pass(&mut self) {
        let a = self.constraints.max_acceleration;
        let Some(start) = self.window.get(0).copied() else {
            return;
        };
        if let Some(node) = self.window.get_mut(1) {
            let reachable = sqrt(start.vs * start.vs + 2.0 * a * start.l);
            node.vs = node.vs.min(reachable);
        }
    }
}
