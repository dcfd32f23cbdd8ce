//! Upstream pre-equalization analysis for DOCSIS cable modems
//!
//! Decodes the pre-equalizer tap payload a modem reports over SNMP and derives
//! the proactive network maintenance views built on it: energy ratios around
//! the main tap, frequency response, and group delay.

pub mod analysis;
pub mod config;
pub mod dwr;
pub mod equalizer;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod tracing_init;

pub use analysis::{
    EqualizerMetrics, EqualizerMetricsResult, FrequencyResponseAnalyzer, FrequencyResponseResult,
    GroupDelayAnalyzer, GroupDelayResult, MetricsConfig,
};
pub use config::AnalysisConfig;
pub use dwr::{ChannelPower, DwrEvaluation, DynamicWindowRangeChecker};
pub use equalizer::{EqualizerPayload, TapCoefficient, TapPayloadDecoder};
pub use error::AnalysisError;
pub use pipeline::{analyze_channel, analyze_channels, evaluate_dwr, ChannelInput, PayloadSource};
pub use report::{to_json, ChannelReport};
