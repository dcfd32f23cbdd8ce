//! Frequency-domain analysis of decoded equalizer taps
//!
//! The taps are treated as the impulse response of a complex FIR filter.
//!
//! **Module Organization**:
//! - `dft` - transform, phase unwrapping and numerical gradient helpers
//! - `frequency_response` - magnitude/phase/power per bin
//! - `metrics` - energy ratios around the main tap
//! - `group_delay` - delay vs. frequency in samples and microseconds

mod dft;
pub mod frequency_response;
pub mod group_delay;
pub mod metrics;

pub use dft::{gradient, unwrap_phase};
pub use frequency_response::{FrequencyResponseAnalyzer, FrequencyResponseResult};
pub use group_delay::{GroupDelayAnalyzer, GroupDelayResult};
pub use metrics::{EqualizerMetrics, EqualizerMetricsResult, MetricsConfig};
