//! ADC serial frame reader
//!
//! Decodes the serial output of an ADC clocked by its own data clock (DCLK).
//! Everything happens on DCLK rising edges:
//!   1. Idle: wait for DRDY to go high after being low
//!   2. StrobeSeen: DRDY must be low again on the next edge; that edge also
//!      samples the first data bit. A DRDY held high is not a strobe.
//!   3. Receiving: one bit per edge, MSB first, until 64 bits are in
//!   4. Done: CH1/CH2 are split out of the frame and published
//!
//! Published frames cross into the host clock domain through a
//! [`Synchronizer`], clocked by [`AdcFrameReader::step_host`].

use super::sync::Synchronizer;
use super::types::{ADC_FRAME_BITS, AdcFrame, AdcState};
use crate::runtime::{ClockedModel, Edge};
use tracing::{debug, trace};

/// Default settle latency in host rising edges
pub const DEFAULT_SETTLE_EDGES: usize = 2;

/// ADC frame reader model
///
/// Inputs: DRDY, DIN (ADC domain)
/// Outputs: CH1, CH2 (ADC domain and host domain)
pub struct AdcFrameReader {
    name: String,
    state: AdcState,

    data_ready: bool,
    data_bit: bool,
    /// DRDY level at the previous DCLK rising edge.
    prev_data_ready: bool,

    shift_reg: u64,
    bit_count: u8,

    frame: AdcFrame,
    frames: u64,
    host: Synchronizer<AdcFrame>,
}

impl AdcFrameReader {
    /// Create a reader with the default settle latency
    pub fn new() -> Self {
        Self {
            name: "adc_frame_reader".to_string(),
            state: AdcState::Idle,
            data_ready: false,
            data_bit: false,
            prev_data_ready: false,
            shift_reg: 0,
            bit_count: 0,
            frame: AdcFrame::default(),
            frames: 0,
            host: Synchronizer::new(DEFAULT_SETTLE_EDGES),
        }
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With a different host-domain settle latency
    pub fn with_settle_edges(mut self, edges: usize) -> Self {
        self.host = Synchronizer::new(edges);
        self.host.set_input(self.frame);
        self
    }

    /// Drive the DRDY input
    pub fn set_data_ready(&mut self, level: bool) {
        self.data_ready = level;
    }

    /// Drive the DIN input
    pub fn set_data_bit(&mut self, level: bool) {
        self.data_bit = level;
    }

    pub fn state(&self) -> AdcState {
        self.state
    }

    /// Bits sampled so far in the current frame
    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    /// Channel 1 of the last completed frame (0 before the first)
    pub fn ch1(&self) -> u32 {
        self.frame.ch1
    }

    /// Channel 2 of the last completed frame (0 before the first)
    pub fn ch2(&self) -> u32 {
        self.frame.ch2
    }

    /// Last completed frame, ADC domain
    pub fn frame(&self) -> AdcFrame {
        self.frame
    }

    /// Last completed frame as seen by the host domain
    pub fn host_frame(&self) -> AdcFrame {
        self.host.output()
    }

    /// Settle latency in host rising edges
    pub fn settle_edges(&self) -> usize {
        self.host.depth()
    }

    /// Number of completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the host-domain side by one host clock edge
    pub fn step_host(&mut self, edge: Edge) {
        self.host.step(edge);
    }

    fn sample(&mut self) {
        if self.data_bit {
            self.shift_reg |= 1u64 << (ADC_FRAME_BITS - 1 - self.bit_count);
        }
        trace!("[{}] bit {}: DIN={}", self.name, self.bit_count, self.data_bit);
        self.bit_count += 1;

        if self.bit_count == ADC_FRAME_BITS {
            self.publish();
        }
    }

    fn publish(&mut self) {
        self.frame = AdcFrame::decode(self.shift_reg);
        self.frames += 1;
        self.host.set_input(self.frame);
        self.state = AdcState::Done;
        self.bit_count = 0;
        debug!(
            "[{}] frame #{}: raw=0x{:016X} CH1=0x{:06X} CH2=0x{:06X}",
            self.name, self.frames, self.shift_reg, self.frame.ch1, self.frame.ch2
        );
    }
}

impl Default for AdcFrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockedModel for AdcFrameReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, edge: Edge) {
        if edge != Edge::Rising {
            return;
        }

        let data_ready = self.data_ready;
        match self.state {
            AdcState::Idle | AdcState::Done => {
                self.state = if data_ready && !self.prev_data_ready {
                    AdcState::StrobeSeen
                } else {
                    AdcState::Idle
                };
            }
            AdcState::StrobeSeen => {
                if data_ready {
                    debug!("[{}] DRDY held high, not arming", self.name);
                    self.state = AdcState::Idle;
                } else {
                    self.state = AdcState::Receiving;
                    self.shift_reg = 0;
                    self.bit_count = 0;
                    self.sample();
                }
            }
            AdcState::Receiving => self.sample(),
        }
        self.prev_data_ready = data_ready;
    }

    fn reset(&mut self) {
        if self.state == AdcState::Receiving {
            debug!(
                "[{}] reset mid-frame, {} bits discarded",
                self.name, self.bit_count
            );
        }
        self.state = AdcState::Idle;
        self.shift_reg = 0;
        self.bit_count = 0;
        self.prev_data_ready = false;
    }
}
