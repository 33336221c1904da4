//! Runtime support for clock-driven models

pub mod clock;
pub mod errors;
pub mod model;
pub mod sample;

pub use clock::{ClockLine, ClockSource, Edge};
pub use errors::{BenchError, BenchResult, ConfigError};
pub use model::ClockedModel;
pub use sample::{Probe, Sample, Trace};
