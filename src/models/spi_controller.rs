//! SPI controller model, edge by edge
//!
//! Functional model of a SPI master clocked by the host clock. A start pulse
//! accepted while idle asserts chip select and launches a 32-bit full-duplex
//! transfer:
//!   1. MOSI presents bit 31 of the outbound word as CS asserts
//!   2. SCLK rising edge (sampling): MISO is captured, MSB first
//!   3. SCLK falling edge (driving): the bit index advances and MOSI
//!      presents the next bit
//!   4. After 32 bits CS releases and the received word is published
//!
//! SCLK idles low and toggles once every `clock_divider` host rising edges,
//! only while CS is asserted.

use super::types::{CsPolarity, SPI_WORD_BITS, SpiState};
use crate::runtime::{ClockedModel, ConfigError, Edge};
use tracing::{debug, trace};

/// Controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    /// Host rising edges per SCLK half period
    pub clock_divider: u32,
    /// Chip select line polarity
    pub cs_polarity: CsPolarity,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            clock_divider: 2,
            cs_polarity: CsPolarity::ActiveLow,
        }
    }
}

impl SpiConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_divider == 0 {
            return Err(ConfigError::InvalidDivider(self.clock_divider));
        }
        Ok(())
    }
}

/// SPI master model
///
/// Inputs: start pulse + outbound word, MISO
/// Outputs: CS, SCLK, MOSI, received word
pub struct SpiController {
    name: String,
    config: SpiConfig,
    state: SpiState,

    /// Start request waiting for the next host rising edge.
    pending_start: Option<u32>,

    tx_word: u32,
    /// Accumulates MISO bits during a transfer.
    rx_shift: u32,
    /// Last completed received word.
    rx_word: u32,
    bit_index: u8,
    divider_count: u32,

    cs_active: bool,
    sclk: bool,
    mosi: bool,
    miso: bool,

    transfers: u64,
}

impl SpiController {
    /// Create a controller with the default configuration
    pub fn new() -> Self {
        Self {
            name: "spi_controller".to_string(),
            config: SpiConfig::default(),
            state: SpiState::Idle,
            pending_start: None,
            tx_word: 0,
            rx_shift: 0,
            rx_word: 0,
            bit_index: 0,
            divider_count: 0,
            cs_active: false,
            sclk: false,
            mosi: false,
            miso: false,
            transfers: 0,
        }
    }

    /// Create a controller from a validated configuration
    pub fn with_config(config: SpiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With configurable CS polarity
    pub fn with_cs_polarity(mut self, cs_polarity: CsPolarity) -> Self {
        self.config.cs_polarity = cs_polarity;
        self
    }

    /// With a different SCLK divider
    pub fn with_clock_divider(mut self, clock_divider: u32) -> Result<Self, ConfigError> {
        let config = SpiConfig {
            clock_divider,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Active configuration
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Request a transfer of `tx_word`.
    ///
    /// The request is sampled on the next host rising edge. While a transfer
    /// is in flight the request is dropped.
    pub fn start(&mut self, tx_word: u32) {
        if self.state != SpiState::Idle {
            debug!(
                "[{}] start(0x{:08X}) ignored, transfer in progress (bit {})",
                self.name, tx_word, self.bit_index
            );
            return;
        }
        self.pending_start = Some(tx_word);
    }

    /// Drive the MISO input
    pub fn set_miso(&mut self, level: bool) {
        self.miso = level;
    }

    pub fn state(&self) -> SpiState {
        self.state
    }

    /// True while a transfer is running or about to start
    pub fn is_busy(&self) -> bool {
        self.state == SpiState::Transfer || self.pending_start.is_some()
    }

    /// Chip select asserted
    pub fn cs_active(&self) -> bool {
        self.cs_active
    }

    /// Chip select line level after polarity
    pub fn cs_line(&self) -> bool {
        self.config.cs_polarity.line_level(self.cs_active)
    }

    /// SCLK line level
    pub fn serial_clock(&self) -> bool {
        self.sclk
    }

    /// MOSI line level
    pub fn mosi(&self) -> bool {
        self.mosi
    }

    /// Word received by the last completed transfer (0 before the first)
    pub fn rx_word(&self) -> u32 {
        self.rx_word
    }

    /// Outbound word latched at the start of the current or last transfer
    pub fn tx_word(&self) -> u32 {
        self.tx_word
    }

    /// Bits shifted so far in the current transfer
    pub fn bit_index(&self) -> u8 {
        self.bit_index
    }

    /// Number of completed transfers
    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    fn tx_bit(&self, index: u8) -> bool {
        (self.tx_word >> (SPI_WORD_BITS - 1 - index)) & 1 == 1
    }

    fn begin_transfer(&mut self, tx_word: u32) {
        self.state = SpiState::Transfer;
        self.cs_active = true;
        self.tx_word = tx_word;
        self.rx_shift = 0;
        self.bit_index = 0;
        self.divider_count = 0;
        self.sclk = false;
        self.mosi = self.tx_bit(0);
        debug!("[{}] CS asserted, TX=0x{:08X}", self.name, tx_word);
    }

    /// SCLK rising edge: capture MISO.
    fn sample(&mut self) {
        if self.miso {
            self.rx_shift |= 1u32 << (SPI_WORD_BITS - 1 - self.bit_index);
        }
        trace!(
            "[{}] bit {}: MOSI={} MISO={}",
            self.name, self.bit_index, self.mosi, self.miso
        );
    }

    /// SCLK falling edge: advance and present the next MOSI bit.
    fn shift(&mut self) {
        self.bit_index += 1;
        if self.bit_index < SPI_WORD_BITS {
            self.mosi = self.tx_bit(self.bit_index);
        } else {
            self.finish_transfer();
        }
    }

    fn finish_transfer(&mut self) {
        self.state = SpiState::Idle;
        self.cs_active = false;
        self.mosi = false;
        self.rx_word = self.rx_shift;
        self.transfers += 1;
        debug!(
            "[{}] #{}: TX=0x{:08X} RX=0x{:08X}, CS released",
            self.name, self.transfers, self.tx_word, self.rx_word
        );
    }
}

impl Default for SpiController {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockedModel for SpiController {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, edge: Edge) {
        if edge != Edge::Rising {
            return;
        }

        match self.state {
            SpiState::Idle => {
                if let Some(tx_word) = self.pending_start.take() {
                    self.begin_transfer(tx_word);
                }
            }
            SpiState::Transfer => {
                self.divider_count += 1;
                if self.divider_count < self.config.clock_divider {
                    return;
                }
                self.divider_count = 0;

                self.sclk = !self.sclk;
                if self.sclk {
                    self.sample();
                } else {
                    self.shift();
                }
            }
        }
    }

    fn reset(&mut self) {
        if self.state == SpiState::Transfer {
            debug!(
                "[{}] reset during transfer, abandoned at bit {}",
                self.name, self.bit_index
            );
        }
        self.state = SpiState::Idle;
        self.pending_start = None;
        self.rx_shift = 0;
        self.bit_index = 0;
        self.divider_count = 0;
        self.cs_active = false;
        self.sclk = false;
        self.mosi = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run one transfer with a mode-0 peripheral driving `rx` on MISO.
    /// Returns the MOSI word seen at SCLK rising edges.
    fn run_transfer(spi: &mut SpiController, tx: u32, rx: u32) -> u32 {
        spi.start(tx);
        spi.step(Edge::Rising);
        assert!(spi.cs_active());

        let mut seen = 0u32;
        let mut bit = 0;
        spi.set_miso((rx >> 31) & 1 == 1);
        while spi.cs_active() {
            let prev_sclk = spi.serial_clock();
            spi.cycle(1);
            match (prev_sclk, spi.serial_clock()) {
                (false, true) => {
                    if spi.mosi() {
                        seen |= 1u32 << (31 - bit);
                    }
                }
                (true, false) => {
                    bit += 1;
                    if bit < 32 {
                        spi.set_miso((rx >> (31 - bit)) & 1 == 1);
                    }
                }
                _ => {}
            }
        }
        spi.set_miso(false);
        seen
    }

    #[test]
    fn test_controller_creation() {
        let spi = SpiController::new();
        assert_eq!(spi.state(), SpiState::Idle);
        assert_eq!(spi.config().clock_divider, 2);
        assert!(!spi.cs_active());
        assert!(spi.cs_line());
        assert_eq!(spi.rx_word(), 0);
    }

    #[test]
    fn test_invalid_divider() {
        assert!(matches!(
            SpiController::new().with_clock_divider(0),
            Err(ConfigError::InvalidDivider(0))
        ));
        let config = SpiConfig {
            clock_divider: 0,
            ..SpiConfig::default()
        };
        assert!(SpiController::with_config(config).is_err());
    }

    #[test]
    fn test_alternating_pattern() {
        let mut spi = SpiController::new();
        let sent = run_transfer(&mut spi, 0xAAAA_AAAA, 0x5555_5555);
        assert_eq!(sent, 0xAAAA_AAAA);
        assert_eq!(spi.rx_word(), 0x5555_5555);
        assert_eq!(spi.transfers(), 1);
        assert_eq!(spi.state(), SpiState::Idle);
    }

    #[test]
    fn test_boundary_values() {
        let mut spi = SpiController::new();
        assert_eq!(run_transfer(&mut spi, 0, u32::MAX), 0);
        assert_eq!(spi.rx_word(), u32::MAX);

        assert_eq!(run_transfer(&mut spi, u32::MAX, 0), u32::MAX);
        assert_eq!(spi.rx_word(), 0);
    }

    #[test]
    fn test_mixed_words_all_dividers() {
        let words = [
            (0x1234_5678, 0x9ABC_DEF0),
            (0x8000_0001, 0x7FFF_FFFE),
            (0xDEAD_BEEF, 0x0BAD_F00D),
            (0x0000_0001, 0x8000_0000),
        ];
        for divider in 1..=4 {
            let mut spi = SpiController::new().with_clock_divider(divider).unwrap();
            for &(tx, rx) in &words {
                assert_eq!(run_transfer(&mut spi, tx, rx), tx);
                assert_eq!(spi.rx_word(), rx);
            }
            assert_eq!(spi.transfers(), words.len() as u64);
        }
    }

    #[test]
    fn test_transfer_length_in_host_cycles() {
        let mut spi = SpiController::new().with_clock_divider(3).unwrap();
        spi.start(0);
        spi.step(Edge::Rising);

        let mut cycles = 0;
        while spi.cs_active() {
            spi.cycle(1);
            cycles += 1;
        }
        // 32 bits, two SCLK half periods each
        assert_eq!(cycles, 32 * 2 * 3);
    }

    #[test]
    fn test_start_ignored_during_transfer() {
        let mut spi = SpiController::new().with_clock_divider(1).unwrap();
        spi.start(0xF0F0_F0F0);
        spi.step(Edge::Rising);
        spi.set_miso(true);
        spi.cycle(10);

        let bit_index = spi.bit_index();
        let rx_shift = spi.rx_shift;
        spi.start(0x0000_0000);
        assert_eq!(spi.bit_index(), bit_index);
        assert_eq!(spi.tx_word(), 0xF0F0_F0F0);
        assert_eq!(spi.rx_shift, rx_shift);

        while spi.cs_active() {
            spi.cycle(1);
        }
        assert_eq!(spi.rx_word(), u32::MAX);

        // The dropped request must not launch a second transfer
        spi.cycle(4);
        assert!(!spi.cs_active());
        assert_eq!(spi.transfers(), 1);
    }

    #[test]
    fn test_start_sampled_on_rising_edge_only() {
        let mut spi = SpiController::new();
        spi.start(1);
        spi.step(Edge::Falling);
        assert!(!spi.cs_active());
        assert!(spi.is_busy());
        spi.step(Edge::Rising);
        assert!(spi.cs_active());
        assert!(!spi.mosi());
    }

    #[test]
    fn test_sclk_idle_without_transfer() {
        let mut spi = SpiController::new();
        for _ in 0..20 {
            spi.cycle(1);
            assert!(!spi.serial_clock());
            assert!(!spi.mosi());
        }
    }

    #[test]
    fn test_reset_abandons_transfer() {
        let mut spi = SpiController::new();
        run_transfer(&mut spi, 0, 0x1357_9BDF);

        spi.start(0xFFFF_FFFF);
        spi.step(Edge::Rising);
        spi.set_miso(true);
        spi.cycle(20);
        assert!(spi.cs_active());

        spi.reset();
        assert_eq!(spi.state(), SpiState::Idle);
        assert!(!spi.cs_active());
        assert!(!spi.serial_clock());
        assert_eq!(spi.bit_index(), 0);
        assert_eq!(spi.rx_word(), 0x1357_9BDF);
        assert_eq!(spi.transfers(), 1);
    }

    #[test]
    fn test_cs_polarity() {
        let mut spi = SpiController::new().with_cs_polarity(CsPolarity::ActiveHigh);
        assert!(!spi.cs_line());
        spi.start(0);
        spi.step(Edge::Rising);
        assert!(spi.cs_line());
    }
}
