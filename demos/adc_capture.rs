//! Example: ADC frame capture
//!
//! Sends one or more frames through the ADC frame reader model on two
//! independent clocks and prints the decoded channels.
//!
//! Usage:
//!   cargo run --example adc_capture -- \
//!       --ch1 123456 --ch2 ABCDEF --crc AA \
//!       --settle-edges 2 --adc-period 126
//!
//! Frame layout (MSB first): CRC1[63:56] CH1[55:32] CRC2[31:24] CH2[23:0]

use clap::Parser;
use serial_fsm::bench::AdcBench;
use serial_fsm::{AdcFrame, AdcFrameReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Channel 1 reading, 24 bits (hex)
    #[arg(long, value_parser = parse_hex)]
    ch1: u32,

    /// Channel 2 reading, 24 bits (hex)
    #[arg(long, value_parser = parse_hex)]
    ch2: u32,

    /// Filler for both CRC fields, one byte (hex)
    #[arg(long, value_parser = parse_hex_byte, default_value = "AA")]
    crc: u8,

    /// Host clock edges before the outputs are read
    #[arg(long, default_value = "2")]
    settle_edges: usize,

    /// Host clock period in nanoseconds
    #[arg(long, default_value = "20")]
    host_period: u64,

    /// ADC clock period in nanoseconds
    #[arg(long, default_value = "126")]
    adc_period: u64,

    /// Number of frames to send
    #[arg(short, long, default_value = "1")]
    n: usize,
}

fn parse_hex(s: &str) -> Result<u32, std::num::ParseIntError> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(s, 16)
}

fn parse_hex_byte(s: &str) -> Result<u8, std::num::ParseIntError> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(s, 16)
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

    if args.ch1 > 0xFF_FFFF || args.ch2 > 0xFF_FFFF {
        warn!("Channel values are truncated to 24 bits");
    }
    let frame = AdcFrame::new(args.ch1, args.ch2);
    let raw = frame.encode(args.crc, args.crc);

    let reader = AdcFrameReader::new()
        .with_name("adc0")
        .with_settle_edges(args.settle_edges);
    let mut bench = AdcBench::with_periods(reader, args.host_period, args.adc_period)?;

    info!("=== ADC Capture Example ===");
    info!(
        "Host clock {} ns, ADC clock {} ns, settle {} edges",
        args.host_period, args.adc_period, args.settle_edges
    );
    info!("Raw frame: 0x{:016X}", raw);

    for i in 0..args.n {
        let read = bench.read_frame(raw)?;
        info!(
            "Frame #{}: CH1=0x{:06X} CH2=0x{:06X} at t={:.3} us",
            i + 1,
            read.ch1,
            read.ch2,
            bench.now_ns() as f64 / 1_000.0
        );
        if read != frame {
            warn!("Frame #{} decoded differently from what was sent", i + 1);
        }
    }

    Ok(())
}
