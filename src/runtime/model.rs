//! Trait shared by the clock-driven models
//!
//! A model is a synchronous state machine. The driver calls `step()` once per
//! clock edge of the model's own clock domain; outputs are read back through
//! accessors between steps.

use super::clock::Edge;

/// A clock-driven state machine
pub trait ClockedModel {
    /// Get a debug name for this model
    fn name(&self) -> &str;

    /// Process one edge of the model's clock to completion
    fn step(&mut self, edge: Edge);

    /// Return to the idle state, abandoning any in-flight operation
    fn reset(&mut self);

    /// Drive `n` full clock cycles (rising then falling edge each)
    fn cycle(&mut self, n: usize) {
        for _ in 0..n {
            self.step(Edge::Rising);
            self.step(Edge::Falling);
        }
    }
}
