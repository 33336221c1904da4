//! Example: SPI full-duplex exchange
//!
//! Runs the SPI controller model against a peripheral that answers with a
//! fixed word, and prints what went over the bus.
//!
//! Usage:
//!   cargo run --example spi_loopback -- \
//!       --tx AAAAAAAA --rx 55555555 \
//!       --divider 4 -n 3

use clap::Parser;
use serial_fsm::bench::SpiBench;
use serial_fsm::{CsPolarity, SpiController};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Word sent on MOSI (hex)
    #[arg(long, value_parser = parse_hex)]
    tx: u32,

    /// Word the peripheral answers with on MISO (hex)
    #[arg(long, value_parser = parse_hex)]
    rx: u32,

    /// Host clock edges per SCLK half period
    #[arg(long, default_value = "2")]
    divider: u32,

    /// Use an active-high chip select
    #[arg(long)]
    active_high: bool,

    /// Host clock period in nanoseconds
    #[arg(long, default_value = "20")]
    host_period: u64,

    /// Number of exchanges to run
    #[arg(short, long, default_value = "1")]
    n: usize,
}

fn parse_hex(s: &str) -> Result<u32, std::num::ParseIntError> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(s, 16)
}

fn main() -> serial_fsm::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let cs_polarity = if args.active_high {
        CsPolarity::ActiveHigh
    } else {
        CsPolarity::ActiveLow
    };
    let spi = SpiController::new()
        .with_name("spi0")
        .with_cs_polarity(cs_polarity)
        .with_clock_divider(args.divider)?;
    let mut bench = SpiBench::new(spi)?.with_host_period(args.host_period)?;

    info!("=== SPI Loopback Example ===");
    info!(
        "TX=0x{:08X} RX=0x{:08X}, divider={}, CS {:?}",
        args.tx, args.rx, args.divider, cs_polarity
    );

    let mut mismatches = 0;
    for i in 0..args.n {
        let transfer = bench.exchange(args.tx, args.rx)?;
        info!(
            "Transfer #{}: MOSI=0x{:08X} MISO=0x{:08X} at t={} ns",
            i + 1,
            transfer.mosi,
            transfer.miso,
            bench.now_ns()
        );
        if transfer.mosi != args.tx || transfer.miso != args.rx {
            warn!("Transfer #{} does not match the requested words", i + 1);
            mismatches += 1;
        }
    }

    info!(
        "Completed {} transfers, {} mismatches",
        bench.spi().transfers(),
        mismatches
    );
    Ok(())
}
