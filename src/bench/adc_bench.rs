//! ADC testbench
//!
//! Plays the ADC side of the link against an [`AdcFrameReader`]: DRDY low for
//! one DCLK rising edge, high for one, then low while the 64 frame bits are
//! presented MSB first, one per DCLK rising edge. The host clock keeps running
//! in between so the reader's host-domain output can settle.

use super::scheduler::{ADC_PERIOD_NS, ClockEvent, Domain, DualClock, HOST_PERIOD_NS};
use crate::models::{ADC_FRAME_BITS, AdcFrame, AdcFrameReader, AdcState};
use crate::runtime::{BenchError, BenchResult, ClockedModel, ConfigError, Edge};
use tracing::{debug, trace};

/// Testbench around one ADC frame reader
pub struct AdcBench {
    reader: AdcFrameReader,
    clocks: DualClock,
    now_ns: u64,
}

impl AdcBench {
    /// Create a bench with the default 50 MHz host and ~8 MHz ADC clocks
    pub fn new(reader: AdcFrameReader) -> Result<Self, ConfigError> {
        Self::with_periods(reader, HOST_PERIOD_NS, ADC_PERIOD_NS)
    }

    /// Create a bench with explicit clock periods in nanoseconds
    pub fn with_periods(
        reader: AdcFrameReader,
        host_period_ns: u64,
        adc_period_ns: u64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            reader,
            clocks: DualClock::new(host_period_ns, adc_period_ns)?,
            now_ns: 0,
        })
    }

    pub fn reader(&self) -> &AdcFrameReader {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut AdcFrameReader {
        &mut self.reader
    }

    /// Simulated time of the last processed edge
    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    /// Send a complete frame and return it as seen by the host domain
    pub fn read_frame(&mut self, raw: u64) -> BenchResult<AdcFrame> {
        let frames = self.reader.frames();
        self.send_bits(raw, u32::from(ADC_FRAME_BITS))?;

        if self.reader.frames() == frames {
            return Err(BenchError::FrameNotPublished { frames });
        }

        self.wait_host_rising(self.reader.settle_edges());
        let frame = self.reader.host_frame();
        debug!(
            "frame 0x{:016X} read at {} ns: CH1=0x{:06X} CH2=0x{:06X}",
            raw, self.now_ns, frame.ch1, frame.ch2
        );
        Ok(frame)
    }

    /// Strobe DRDY and present the first `bits` bits of `raw`.
    ///
    /// With fewer than 64 bits the reader is left mid-frame, and further
    /// stimulus fails with [`BenchError::Busy`] until [`reset`](Self::reset).
    pub fn send_bits(&mut self, raw: u64, bits: u32) -> BenchResult {
        match self.reader.state() {
            AdcState::StrobeSeen | AdcState::Receiving => {
                return Err(BenchError::Busy {
                    model: self.reader.name().to_string(),
                    state: format!("{:?}", self.reader.state()),
                });
            }
            AdcState::Idle | AdcState::Done => {}
        }

        self.reader.set_data_bit(false);
        self.reader.set_data_ready(false);
        self.next_adc_rising();
        self.reader.set_data_ready(true);
        self.next_adc_rising();
        self.reader.set_data_ready(false);

        for i in 0..bits.min(u32::from(ADC_FRAME_BITS)) {
            self.reader.set_data_bit((raw >> (63 - i)) & 1 == 1);
            self.next_adc_rising();
        }
        Ok(())
    }

    /// Run the clocks until `n` host rising edges have passed
    pub fn wait_host_rising(&mut self, n: usize) {
        let mut seen = 0;
        while seen < n {
            let event = self.advance();
            if event.domain == Domain::Host && event.edge == Edge::Rising {
                seen += 1;
            }
        }
    }

    /// Reset the reader
    pub fn reset(&mut self) {
        self.reader.reset();
    }

    fn next_adc_rising(&mut self) {
        loop {
            let event = self.advance();
            if event.domain == Domain::Adc && event.edge == Edge::Rising {
                break;
            }
        }
    }

    fn advance(&mut self) -> ClockEvent {
        let event = self.clocks.next_event();
        self.now_ns = event.time_ns;
        match event.domain {
            Domain::Host => self.reader.step_host(event.edge),
            Domain::Adc => {
                trace!("DCLK {} at {} ns", event.edge, event.time_ns);
                self.reader.step(event.edge);
            }
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRC: u8 = 0b1010_1010;

    fn bench() -> AdcBench {
        AdcBench::new(AdcFrameReader::new()).unwrap()
    }

    #[test]
    fn test_read_frame() {
        let mut bench = bench();
        let frame = AdcFrame::new(0xBEEF01, 0x00CAFE);
        assert_eq!(bench.read_frame(frame.encode(CRC, CRC)).unwrap(), frame);
    }

    #[test]
    fn test_ten_frames() {
        let values = [
            (0x82A6F1, 0x3D51C0),
            (0x0C6BB3, 0xE2190D),
            (0xF1D2C3, 0x0B4A59),
            (0x6E2F11, 0x9A00B7),
            (0x00FF00, 0xFF00FF),
            (0x4D3C2B, 0x1A2B3C),
            (0xB0B0B0, 0x0D0D0D),
            (0x000000, 0x000000),
            (0xFFFFFF, 0xFFFFFF),
            (0x713F09, 0xC4E2A8),
        ];
        let mut bench = bench();
        for &(ch1, ch2) in &values {
            let frame = AdcFrame::new(ch1, ch2);
            let read = bench.read_frame(frame.encode(CRC, CRC)).unwrap();
            assert_eq!(read, frame);
        }
        assert_eq!(bench.reader().frames(), values.len() as u64);
    }

    #[test]
    fn test_other_crc_patterns() {
        let mut bench = bench();
        let frame = AdcFrame::new(0x0055AA, 0xAA5500);
        for crc in [0x00, 0xFF, 0x81, 0x7E] {
            assert_eq!(bench.read_frame(frame.encode(crc, !crc)).unwrap(), frame);
        }
    }

    #[test]
    fn test_partial_frame_reset_keeps_outputs() {
        let mut bench = bench();
        let first = AdcFrame::new(0x123456, 0x654321);
        bench.read_frame(first.encode(CRC, CRC)).unwrap();

        bench.send_bits(AdcFrame::new(0xFFFFFF, 0xFFFFFF).encode(0xFF, 0xFF), 63)
            .unwrap();
        assert_eq!(bench.reader().state(), AdcState::Receiving);
        bench.reset();
        bench.wait_host_rising(4);

        assert_eq!(bench.reader().frame(), first);
        assert_eq!(bench.reader().host_frame(), first);
        assert_eq!(bench.reader().frames(), 1);
    }

    #[test]
    fn test_read_refused_mid_frame() {
        let mut bench = bench();
        let truncated = AdcFrame::new(0xFFFFFF, 0xFFFFFF).encode(0xFF, 0xFF);
        bench.send_bits(truncated, 40).unwrap();
        assert_eq!(bench.reader().bit_count(), 40);

        let frame = AdcFrame::new(0x123456, 0x654321);
        let err = bench.read_frame(frame.encode(CRC, CRC)).unwrap_err();
        assert!(matches!(err, BenchError::Busy { ref state, .. } if state == "Receiving"));
        assert!(bench.send_bits(truncated, 8).is_err());
        assert_eq!(bench.reader().bit_count(), 40);
        assert_eq!(bench.reader().frames(), 0);

        bench.reset();
        assert_eq!(bench.read_frame(frame.encode(CRC, CRC)).unwrap(), frame);
        assert_eq!(bench.reader().frames(), 1);
    }

    #[test]
    fn test_settle_latency_matters() {
        let mut bench = bench();
        let frame = AdcFrame::new(0xABCDEF, 0x012345);
        bench.send_bits(frame.encode(CRC, CRC), 64).unwrap();
        assert_eq!(bench.reader().frame(), frame);
        assert_eq!(bench.reader().host_frame(), AdcFrame::default());

        bench.wait_host_rising(2);
        assert_eq!(bench.reader().host_frame(), frame);
    }

    #[test]
    fn test_longer_settle_and_other_clocks() {
        let reader = AdcFrameReader::new().with_settle_edges(4);
        let mut bench = AdcBench::with_periods(reader, 10, 100).unwrap();
        let frame = AdcFrame::new(0x7FFFFF, 0x800000);
        assert_eq!(bench.read_frame(frame.encode(CRC, CRC)).unwrap(), frame);
    }

    #[test]
    fn test_invalid_periods() {
        assert!(AdcBench::with_periods(AdcFrameReader::new(), 20, 0).is_err());
    }
}
