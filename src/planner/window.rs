//! Fixed-capacity ring of lookahead nodes.

use crate::config::MAX_LOOKAHEAD;
use crate::error::PlannerError;
use crate::motion::Waypoint;

/// One buffered waypoint with its planning state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Node {
    /// Target position.
    pub point: Waypoint,
    /// Planned speed on arrival at `point`.
    pub vs: f64,
    /// Distance to the next node; 0 until the successor is known.
    pub l: f64,
    /// End-of-input sentinel.
    pub eof: bool,
}

impl Node {
    pub fn new(point: Waypoint) -> Self {
        Self {
            point,
            ..Self::default()
        }
    }

    pub fn sentinel(point: Waypoint) -> Self {
        Self {
            point,
            eof: true,
            ..Self::default()
        }
    }
}

/// Array-backed ring indexed from the oldest node.
#[derive(Debug, Clone)]
pub(crate) struct Window {
    nodes: [Node; MAX_LOOKAHEAD],
    head: usize,
    len: usize,
}

impl Window {
    pub fn new() -> Self {
        Self {
            nodes: [Node::default(); MAX_LOOKAHEAD],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == MAX_LOOKAHEAD
    }

    #[inline]
    fn slot(&self, index: usize) -> usize {
        (self.head + index) % MAX_LOOKAHEAD
    }

    /// Node `index` positions after the oldest.
    pub fn get(&self, index: usize) -> Option<&Node> {
        (index < self.len).then(|| &self.nodes[self.slot(index)])
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        if index < self.len {
            let slot = self.slot(index);
            Some(&mut self.nodes[slot])
        } else {
            None
        }
    }

    pub fn back_mut(&mut self) -> Option<&mut Node> {
        self.len.checked_sub(1).and_then(|i| self.get_mut(i))
    }

    pub fn push_back(&mut self, node: Node) -> Result<(), PlannerError> {
        if self.is_full() {
            return Err(PlannerError::WindowFull {
                capacity: MAX_LOOKAHEAD,
            });
        }
        let slot = self.slot(self.len);
        self.nodes[slot] = node;
        self.len += 1;
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<Node> {
        if self.len == 0 {
            return None;
        }
        let node = self.nodes[self.head];
        self.head = (self.head + 1) % MAX_LOOKAHEAD;
        self.len -= 1;
        Some(node)
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
