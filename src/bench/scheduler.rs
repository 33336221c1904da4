//! Two-domain clock scheduler
//!
//! Merges a host clock and an ADC clock into one stream of edges ordered by
//! simulated time. The two clocks never assume a fixed ratio.

use crate::runtime::{ClockSource, ConfigError, Edge};

/// Default host clock period: 50 MHz
pub const HOST_PERIOD_NS: u64 = 20;

/// Default ADC clock period: about 8 MHz
pub const ADC_PERIOD_NS: u64 = 126;

/// Clock domain an edge belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Host,
    Adc,
}

/// One edge on one clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEvent {
    pub domain: Domain,
    pub edge: Edge,
    pub time_ns: u64,
}

/// Time-ordered merge of two free-running clocks
pub struct DualClock {
    host: ClockSource,
    adc: ClockSource,
}

impl DualClock {
    /// Create with explicit periods in nanoseconds
    pub fn new(host_period_ns: u64, adc_period_ns: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            host: ClockSource::new(host_period_ns)?,
            adc: ClockSource::new(adc_period_ns)?,
        })
    }

    /// Produce the next edge. On equal timestamps the host edge goes first.
    pub fn next_event(&mut self) -> ClockEvent {
        let (domain, source) = if self.host.next_edge_ns() <= self.adc.next_edge_ns() {
            (Domain::Host, &mut self.host)
        } else {
            (Domain::Adc, &mut self.adc)
        };
        let (edge, time_ns) = source.tick();
        ClockEvent {
            domain,
            edge,
            time_ns,
        }
    }
}

impl Iterator for DualClock {
    type Item = ClockEvent;

    fn next(&mut self) -> Option<ClockEvent> {
        Some(self.next_event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_time_ordered() {
        let clocks = DualClock::new(HOST_PERIOD_NS, ADC_PERIOD_NS).unwrap();
        let events: Vec<_> = clocks.take(500).collect();
        assert!(events.windows(2).all(|w| w[0].time_ns <= w[1].time_ns));

        let adc_edges = events.iter().filter(|e| e.domain == Domain::Adc).count();
        let host_edges = events.len() - adc_edges;
        // 126 ns vs 20 ns
        assert!(host_edges > 5 * adc_edges);
    }

    #[test]
    fn test_tie_goes_to_host() {
        let mut clocks = DualClock::new(20, 20).unwrap();
        let first = clocks.next_event();
        let second = clocks.next_event();
        assert_eq!(first.domain, Domain::Host);
        assert_eq!(second.domain, Domain::Adc);
        assert_eq!(first.time_ns, second.time_ns);
        assert_eq!(first.edge, Edge::Rising);
    }

    #[test]
    fn test_invalid_period() {
        assert!(DualClock::new(20, 125).is_err());
    }
}
