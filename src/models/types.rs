//! Common model types and enums

/// Chip select polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsPolarity {
    /// CS is active-low (standard SPI): LOW = active, HIGH = inactive
    #[default]
    ActiveLow,
    /// CS is active-high: HIGH = active, LOW = inactive
    ActiveHigh,
}

impl CsPolarity {
    /// Line level for the given asserted state
    pub fn line_level(self, active: bool) -> bool {
        match self {
            CsPolarity::ActiveLow => !active,
            CsPolarity::ActiveHigh => active,
        }
    }
}

/// SPI controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiState {
    #[default]
    Idle,
    Transfer,
}

/// ADC frame reader state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdcState {
    /// Waiting for data-ready to rise
    #[default]
    Idle,
    /// Data-ready seen high for one ADC clock
    StrobeSeen,
    /// Shifting in the 64-bit frame
    Receiving,
    /// Frame complete and published
    Done,
}

/// One completed SPI exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiTransfer {
    /// Word seen on MOSI
    pub mosi: u32,
    /// Word received from MISO
    pub miso: u32,
}

/// Bits per SPI word
pub const SPI_WORD_BITS: u8 = 32;

/// Bits per ADC frame
pub const ADC_FRAME_BITS: u8 = 64;

/// Channel 1 sample, frame bits [55:32]
pub const CH1_MASK: u64 = 0x00FF_FFFF_0000_0000;

/// Channel 2 sample, frame bits [23:0]
pub const CH2_MASK: u64 = 0x0000_0000_00FF_FFFF;

const CHANNEL_MASK: u32 = 0x00FF_FFFF;

/// Decoded ADC frame: two 24-bit channel readings
///
/// Frame layout, MSB first:
///
/// ```text
/// [63:56] CRC1  [55:32] CH1  [31:24] CRC2  [23:0] CH2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdcFrame {
    pub ch1: u32,
    pub ch2: u32,
}

impl AdcFrame {
    /// Create a frame, masking both channels to 24 bits
    pub fn new(ch1: u32, ch2: u32) -> Self {
        Self {
            ch1: ch1 & CHANNEL_MASK,
            ch2: ch2 & CHANNEL_MASK,
        }
    }

    /// Split a raw 64-bit frame. CRC bits are dropped.
    pub fn decode(raw: u64) -> Self {
        Self {
            ch1: ((raw & CH1_MASK) >> 32) as u32,
            ch2: (raw & CH2_MASK) as u32,
        }
    }

    /// Build the raw frame an ADC would shift out for these readings
    pub fn encode(&self, crc1: u8, crc2: u8) -> u64 {
        (u64::from(crc1) << 56)
            | (u64::from(self.ch1 & CHANNEL_MASK) << 32)
            | (u64::from(crc2) << 24)
            | u64::from(self.ch2 & CHANNEL_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cs_polarity_levels() {
        assert!(!CsPolarity::ActiveLow.line_level(true));
        assert!(CsPolarity::ActiveLow.line_level(false));
        assert!(CsPolarity::ActiveHigh.line_level(true));
        assert!(!CsPolarity::ActiveHigh.line_level(false));
    }

    #[test]
    fn test_frame_layout() {
        let raw = AdcFrame::new(0x123456, 0xABCDEF).encode(0xAA, 0xAA);
        assert_eq!(raw, 0xAA12_3456_AAAB_CDEF);
        assert_eq!(AdcFrame::decode(raw), AdcFrame::new(0x123456, 0xABCDEF));
    }

    #[test]
    fn test_decode_ignores_crc() {
        let frame = AdcFrame::new(0x00F00F, 0xFFFFFF);
        for (crc1, crc2) in [(0x00, 0x00), (0xAA, 0xAA), (0xFF, 0x00), (0x5C, 0xE3)] {
            assert_eq!(AdcFrame::decode(frame.encode(crc1, crc2)), frame);
        }
    }

    #[test]
    fn test_channels_masked_to_24_bits() {
        let frame = AdcFrame::new(0xFF00_0001, 0x0100_0002);
        assert_eq!(frame.ch1, 1);
        assert_eq!(frame.ch2, 2);
    }
}
