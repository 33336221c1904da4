//! Host clock domain synchronizer
//!
//! Values produced in one clock domain become visible to the host clock
//! domain only after passing through a chain of registers. The chain depth is
//! the settle latency, counted in host rising edges.

use crate::runtime::Edge;

/// Register chain clocked on host rising edges
#[derive(Debug, Clone)]
pub struct Synchronizer<T> {
    input: T,
    stages: Vec<T>,
}

impl<T: Copy + Default> Synchronizer<T> {
    /// Create a chain of `depth` registers. Depth 0 passes the input straight
    /// through.
    pub fn new(depth: usize) -> Self {
        Self {
            input: T::default(),
            stages: vec![T::default(); depth],
        }
    }

    /// Number of register stages
    pub fn depth(&self) -> usize {
        self.stages.len()
    }

    /// Drive the input side
    pub fn set_input(&mut self, value: T) {
        self.input = value;
    }

    /// Clock the chain
    pub fn step(&mut self, edge: Edge) {
        if edge != Edge::Rising || self.stages.is_empty() {
            return;
        }
        self.stages.rotate_right(1);
        self.stages[0] = self.input;
    }

    /// Value visible on the host side
    pub fn output(&self) -> T {
        self.stages.last().copied().unwrap_or(self.input)
    }
}
