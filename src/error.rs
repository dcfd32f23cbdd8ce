//! Caller contract violations
//!
//! Malformed field data never ends up here: the payload decoder reports those as
//! "not decoded" and the caller skips the channel. These variants cover
//! arguments a caller should never pass.

use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AnalysisError {
    /// Equalizer metrics need the fixed ATDMA tap count
    #[snafu(display("expected exactly {expected} taps, got {actual}"))]
    InvalidTapCount { expected: usize, actual: usize },

    /// Main tap index does not address a tap
    #[snafu(display("main tap index {index} is out of range for {num_taps} taps"))]
    MainTapOutOfRange { index: usize, num_taps: usize },

    /// Full-scale amplitude must be positive and small enough to square
    #[snafu(display("nominal amplitude must be in 1..={max}, got {value}"))]
    InvalidNominalAmplitude { value: i64, max: i64 },

    /// Transform requested with no samples
    #[snafu(display("tap list is empty"))]
    EmptyTaps,

    /// Zero padding may grow the transform but never truncate it
    #[snafu(display("fft size {fft_size} is smaller than the tap count {num_taps}"))]
    FftSizeTooSmall { fft_size: usize, num_taps: usize },

    #[snafu(display("channel width must be positive and finite, got {value} Hz"))]
    InvalidChannelWidth { value: f64 },

    #[snafu(display("taps per symbol must be positive"))]
    InvalidTapsPerSymbol,

    #[snafu(display("rolloff must be finite and non-negative, got {value}"))]
    InvalidRolloff { value: f64 },

    #[snafu(display("at least 2 channels are required, got {count}"))]
    TooFewChannels { count: usize },

    #[snafu(display("channel {channel_id} has a non-finite transmit power {value}"))]
    InvalidTxPower { channel_id: u32, value: f64 },

    #[snafu(display("warning threshold {warning_db} dB exceeds violation threshold {violation_db} dB"))]
    InvalidThresholds { warning_db: f64, violation_db: f64 },
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
