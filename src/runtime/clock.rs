//! Clock edges and free-running clock sources
//!
//! Every model in this crate is advanced by [`Edge`] events. A [`ClockLine`]
//! turns a sequence of line levels into edges, and a [`ClockSource`]
//! produces a periodic edge stream with nanosecond timestamps.

use super::errors::ConfigError;
use std::fmt;

/// Direction of a clock transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl Edge {
    /// Line level right after this edge
    pub fn level(self) -> bool {
        matches!(self, Edge::Rising)
    }

    /// Edge that drives a line to the given level
    pub fn towards(level: bool) -> Self {
        if level { Edge::Rising } else { Edge::Falling }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Edge::Rising => write!(f, "rising"),
            Edge::Falling => write!(f, "falling"),
        }
    }
}

/// Edge detector over an observed line.
///
/// Tracks the previous level so edges can be found across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockLine {
    prev: bool,
}

impl ClockLine {
    /// Create a detector with the given idle level
    pub fn new(initial: bool) -> Self {
        Self { prev: initial }
    }

    /// Feed the current level; returns the edge if the level changed.
    pub fn update(&mut self, level: bool) -> Option<Edge> {
        let edge = match (self.prev, level) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.prev = level;
        edge
    }
}

/// Free-running clock with a fixed period.
///
/// Starts low at t=0; the first edge is rising, half a period later.
#[derive(Debug, Clone)]
pub struct ClockSource {
    period_ns: u64,
    level: bool,
    next_edge_ns: u64,
}

impl ClockSource {
    /// Create a clock with the given period in nanoseconds
    pub fn new(period_ns: u64) -> Result<Self, ConfigError> {
        if period_ns < 2 || period_ns % 2 != 0 {
            return Err(ConfigError::InvalidPeriod(period_ns));
        }
        Ok(Self {
            period_ns,
            level: false,
            next_edge_ns: period_ns / 2,
        })
    }

    /// Timestamp of the edge `tick()` will return next
    pub fn next_edge_ns(&self) -> u64 {
        self.next_edge_ns
    }

    /// Advance to the next edge, returning it with its timestamp
    pub fn tick(&mut self) -> (Edge, u64) {
        let time = self.next_edge_ns;
        self.level = !self.level;
        self.next_edge_ns += self.period_ns / 2;
        (Edge::towards(self.level), time)
    }
}
