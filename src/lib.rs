//! Clock-driven functional models of serial link logic
//!
//! This library models two pieces of synchronous digital logic bit-exactly,
//! one clock edge at a time:
//!
//! # Architecture
//!
//! - **SpiController**: SPI master shifting a 32-bit word out on MOSI while
//!   capturing 32 bits from MISO, framed by chip select
//! - **AdcFrameReader**: waits for a one-cycle data-ready strobe, shifts in a
//!   64-bit frame and splits it into two 24-bit channel readings
//! - **Runtime**: clock edges, the [`ClockedModel`] trait, line probes
//! - **Bench**: free-running clocks and stimulus that drive the models the way
//!   the hardware testbenches do
//!
//! # Example
//!
//! ```
//! use serial_fsm::{ClockedModel, Edge, SpiController};
//!
//! let mut spi = SpiController::new();
//! spi.start(0xAAAA_AAAA);
//! spi.step(Edge::Rising);
//! assert!(spi.cs_active());
//! ```

use thiserror::Error;

pub mod bench;
pub mod models;
pub mod runtime;

// Re-export model data types
pub use models::{AdcFrame, AdcState, CsPolarity, SpiState, SpiTransfer};

// Re-export models
pub use models::{AdcFrameReader, SpiConfig, SpiController, Synchronizer};

// Re-export runtime components
pub use runtime::{
    BenchError, ClockLine, ClockSource, ClockedModel, ConfigError, Edge, Probe, Sample, Trace,
};

// Re-export testbenches
pub use bench::{AdcBench, DualClock, SpiBench, SpiLine};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Testbench error: {0}")]
    Bench(#[from] BenchError),
}

pub type Result<T> = std::result::Result<T, SimError>;
