//! SPI testbench
//!
//! Clocks a [`SpiController`] from a host [`ClockSource`] against a mode-0
//! [`SpiPeripheral`] and records what appears on the bus, the same way a
//! logic analyzer would: MOSI is read at every SCLK rising edge while CS is
//! asserted.

use super::scheduler::HOST_PERIOD_NS;
use crate::models::{SPI_WORD_BITS, SpiController, SpiTransfer};
use crate::runtime::{
    BenchError, BenchResult, ClockLine, ClockSource, ClockedModel, ConfigError, Edge, Probe, Trace,
};
use tracing::debug;

/// Default settle edges after CS release before the received word is read
pub const DEFAULT_SETTLE_EDGES: usize = 2;

/// Default host edge budget per exchange
pub const DEFAULT_MAX_EDGES: u64 = 100_000;

/// Controller output lines that can be probed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiLine {
    Cs,
    Sclk,
    Mosi,
}

/// Mode-0 SPI peripheral that shifts a word out on MISO, MSB first
#[derive(Debug, Clone, Default)]
pub struct SpiPeripheral {
    word: u32,
    bit: u8,
}

impl SpiPeripheral {
    /// Load the word to send on the next selection
    pub fn load(&mut self, word: u32) {
        self.word = word;
        self.bit = 0;
    }

    /// CS asserted: present the first bit
    pub fn select(&mut self) -> bool {
        self.bit = 0;
        self.current()
    }

    /// SCLK falling edge: present the next bit
    pub fn shift(&mut self) -> bool {
        self.bit = self.bit.saturating_add(1);
        self.current()
    }

    fn current(&self) -> bool {
        self.bit < SPI_WORD_BITS && (self.word >> (SPI_WORD_BITS - 1 - self.bit)) & 1 == 1
    }
}

/// Testbench around one SPI controller
pub struct SpiBench {
    spi: SpiController,
    clock: ClockSource,
    peripheral: SpiPeripheral,
    cs_watch: ClockLine,
    sclk_watch: ClockLine,
    probes: Vec<(SpiLine, Probe)>,
    now_ns: u64,
    settle_edges: usize,
    max_edges: u64,
}

impl SpiBench {
    /// Create a bench on the default 50 MHz host clock
    pub fn new(spi: SpiController) -> Result<Self, ConfigError> {
        Ok(Self {
            spi,
            clock: ClockSource::new(HOST_PERIOD_NS)?,
            peripheral: SpiPeripheral::default(),
            cs_watch: ClockLine::new(false),
            sclk_watch: ClockLine::new(false),
            probes: Vec::new(),
            now_ns: 0,
            settle_edges: DEFAULT_SETTLE_EDGES,
            max_edges: DEFAULT_MAX_EDGES,
        })
    }

    /// With a different host clock period
    pub fn with_host_period(mut self, period_ns: u64) -> Result<Self, ConfigError> {
        self.clock = ClockSource::new(period_ns)?;
        Ok(self)
    }

    /// With a different number of host rising edges to wait after CS release
    pub fn with_settle_edges(mut self, edges: usize) -> Self {
        self.settle_edges = edges;
        self
    }

    /// With a different host edge budget per exchange
    pub fn with_max_edges(mut self, edges: u64) -> Self {
        self.max_edges = edges;
        self
    }

    pub fn spi(&self) -> &SpiController {
        &self.spi
    }

    /// Simulated time of the last processed edge
    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    /// Attach a monitor to one of the controller's output lines
    pub fn probe(&mut self, line: SpiLine) -> Trace {
        let (mut probe, trace) = Probe::pair();
        probe.observe(self.line_level(line), self.now_ns);
        self.probes.push((line, probe));
        trace
    }

    /// Run one full-duplex exchange: send `tx`, while the peripheral answers
    /// with `rx`.
    ///
    /// Returns the word observed on MOSI and the word the controller
    /// published, read `settle_edges` host rising edges after CS release.
    /// Fails with [`BenchError::Busy`] while an earlier transfer is still in
    /// flight.
    pub fn exchange(&mut self, tx: u32, rx: u32) -> BenchResult<SpiTransfer> {
        if self.spi.is_busy() {
            return Err(BenchError::Busy {
                model: self.spi.name().to_string(),
                state: format!("{:?}", self.spi.state()),
            });
        }

        self.peripheral.load(rx);
        self.spi.start(tx);

        let mut mosi_word = 0u32;
        let mut sampled = 0u8;
        let mut selected = false;
        let mut edges = 0u64;

        loop {
            if edges >= self.max_edges {
                return Err(BenchError::Timeout {
                    edges,
                    waiting_for: if selected {
                        "chip select release"
                    } else {
                        "chip select assert"
                    },
                });
            }
            self.tick();
            edges += 1;

            // SCLK first: its last falling edge coincides with CS release
            match self.sclk_watch.update(self.spi.serial_clock()) {
                Some(Edge::Rising) if sampled < SPI_WORD_BITS => {
                    if self.spi.mosi() {
                        mosi_word |= 1u32 << (SPI_WORD_BITS - 1 - sampled);
                    }
                    sampled += 1;
                }
                Some(Edge::Falling) => {
                    let bit = self.peripheral.shift();
                    self.spi.set_miso(bit);
                }
                _ => {}
            }

            match self.cs_watch.update(self.spi.cs_active()) {
                Some(Edge::Rising) => {
                    selected = true;
                    let bit = self.peripheral.select();
                    self.spi.set_miso(bit);
                }
                Some(Edge::Falling) => {
                    self.spi.set_miso(false);
                    break;
                }
                None => {}
            }
        }

        let mut settled = 0;
        while settled < self.settle_edges {
            if self.tick() == Edge::Rising {
                settled += 1;
            }
        }

        let transfer = SpiTransfer {
            mosi: mosi_word,
            miso: self.spi.rx_word(),
        };
        debug!(
            "exchange done after {} host edges: MOSI=0x{:08X} MISO=0x{:08X}",
            edges, transfer.mosi, transfer.miso
        );
        Ok(transfer)
    }

    /// Reset the controller and the bus watchers
    pub fn reset(&mut self) {
        self.spi.reset();
        self.spi.set_miso(false);
        self.cs_watch = ClockLine::new(false);
        self.sclk_watch = ClockLine::new(false);
        self.observe();
    }

    fn tick(&mut self) -> Edge {
        let (edge, time_ns) = self.clock.tick();
        self.now_ns = time_ns;
        self.spi.step(edge);
        self.observe();
        edge
    }

    fn line_level(&self, line: SpiLine) -> bool {
        match line {
            SpiLine::Cs => self.spi.cs_line(),
            SpiLine::Sclk => self.spi.serial_clock(),
            SpiLine::Mosi => self.spi.mosi(),
        }
    }

    fn observe(&mut self) {
        let levels: Vec<bool> = self
            .probes
            .iter()
            .map(|(line, _)| self.line_level(*line))
            .collect();
        for ((_, probe), level) in self.probes.iter_mut().zip(levels) {
            probe.observe(level, self.now_ns);
        }
    }
}
