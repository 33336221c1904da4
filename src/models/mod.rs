//! Clock-driven protocol models
//!
//! - **SpiController**: 32-bit full-duplex SPI master, host clock domain
//! - **AdcFrameReader**: 64-bit serial ADC frame decoder, ADC clock domain
//!
//! Both implement [`ClockedModel`](crate::runtime::ClockedModel): the driver
//! calls `step()` once per edge and reads outputs through accessors.

pub mod adc_reader;
pub mod spi_controller;
pub mod sync;
pub mod types;

// Re-export common types
pub use types::{
    ADC_FRAME_BITS, AdcFrame, AdcState, CH1_MASK, CH2_MASK, CsPolarity, SPI_WORD_BITS, SpiState,
    SpiTransfer,
};

// Re-export models
pub use adc_reader::AdcFrameReader;
pub use spi_controller::{SpiConfig, SpiController};
pub use sync::Synchronizer;
