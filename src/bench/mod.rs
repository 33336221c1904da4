//! Testbenches
//!
//! Drive the models with the same stimulus sequences used to verify the
//! hardware, on free-running clocks:
//! - **SpiBench**: host clock only; a mode-0 peripheral answers on MISO
//! - **AdcBench**: host and ADC clocks running independently

pub mod adc_bench;
pub mod scheduler;
pub mod spi_bench;

pub use adc_bench::AdcBench;
pub use scheduler::{ADC_PERIOD_NS, ClockEvent, Domain, DualClock, HOST_PERIOD_NS};
pub use spi_bench::{SpiBench, SpiLine, SpiPeripheral};
