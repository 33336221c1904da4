//! Error types for model configuration and the testbench

/// Error type for invalid model or clock configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Serial clock divider must be at least 1, got {0}")]
    InvalidDivider(u32),

    #[error("Clock period must be an even number of nanoseconds >= 2, got {0}")]
    InvalidPeriod(u64),
}

/// Error type for testbench runs
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("Timed out after {edges} host clock edges waiting for {waiting_for}")]
    Timeout {
        edges: u64,
        waiting_for: &'static str,
    },

    #[error("Frame was not published (reader frame count still {frames})")]
    FrameNotPublished { frames: u64 },

    #[error("{model} is busy in state {state}, reset it before new stimulus")]
    Busy { model: String, state: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for testbench runs
pub type BenchResult<T = ()> = Result<T, BenchError>;
