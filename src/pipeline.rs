//! Per-channel analysis of a pre-equalization walk
//!
//! Each upstream channel index is decoded and analyzed independently. A channel
//! that fails to decode is dropped from the result; a metrics or group delay
//! failure only removes that section of the channel's report.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::analysis::{EqualizerMetrics, GroupDelayAnalyzer, MetricsConfig};
use crate::config::{AnalysisConfig, ATDMA_TAP_COUNT};
use crate::dwr::{ChannelPower, DwrEvaluation, DynamicWindowRangeChecker};
use crate::equalizer::{DecoderOptions, TapPayloadDecoder};
use crate::error::Result;
use crate::report::ChannelReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Bytes(Vec<u8>),
    Hex(String),
}

/// One row of the pre-equalization walk, joined with the channel's width
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInput {
    pub index: u32,
    pub payload: PayloadSource,
    /// From the channel configuration table, when known
    pub channel_width_hz: Option<f64>,
}

impl ChannelInput {
    pub fn from_bytes(index: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            payload: PayloadSource::Bytes(bytes.into()),
            channel_width_hz: None,
        }
    }

    pub fn from_hex(index: u32, text: impl Into<String>) -> Self {
        Self {
            index,
            payload: PayloadSource::Hex(text.into()),
            channel_width_hz: None,
        }
    }

    pub fn with_channel_width(mut self, channel_width_hz: f64) -> Self {
        self.channel_width_hz = Some(channel_width_hz);
        self
    }
}

/// Decode and analyze a single channel
///
/// Returns `None` when the payload cannot be decoded.
#[instrument(level = "debug", skip_all, fields(index = input.index))]
pub fn analyze_channel(input: &ChannelInput, config: &AnalysisConfig) -> Option<ChannelReport> {
    let mut decoder = TapPayloadDecoder::new(DecoderOptions::from(config));
    let decoded = match &input.payload {
        PayloadSource::Bytes(bytes) => decoder.decode_bytes(input.index, bytes),
        PayloadSource::Hex(text) => decoder.decode_hex(input.index, text),
    };
    if !decoded {
        warn!(index = input.index, "skipping channel with undecodable payload");
        return None;
    }

    let payload = decoder.into_channels().remove(&input.index)?;
    let taps = payload.coefficients();

    let metrics = if taps.len() == ATDMA_TAP_COUNT {
        match EqualizerMetrics::new(&taps, MetricsConfig::from(config)).and_then(|m| m.compute()) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(index = input.index, error = %e, "equalizer metrics unavailable");
                None
            }
        }
    } else {
        debug!(index = input.index, num_taps = taps.len(), "not an ATDMA tap set, no metrics");
        None
    };

    let group_delay = match input.channel_width_hz {
        Some(width) if payload.taps_per_symbol > 0 => {
            match GroupDelayAnalyzer::new(width, u32::from(payload.taps_per_symbol), config.rolloff)
                .and_then(|analyzer| analyzer.compute(&taps))
            {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(index = input.index, error = %e, "group delay unavailable");
                    None
                }
            }
        }
        _ => None,
    };

    Some(ChannelReport {
        payload,
        metrics,
        group_delay,
    })
}

/// Analyze every channel of a walk in parallel
///
/// Channels are independent; the result is keyed by channel index.
pub fn analyze_channels(inputs: &[ChannelInput], config: &AnalysisConfig) -> BTreeMap<u32, ChannelReport> {
    let reports: BTreeMap<u32, ChannelReport> = inputs
        .par_iter()
        .filter_map(|input| analyze_channel(input, config).map(|report| (input.index, report)))
        .collect();

    info!(requested = inputs.len(), decoded = reports.len(), "pre-equalization analysis complete");
    reports
}

/// Dynamic window range check with the configured thresholds
pub fn evaluate_dwr(channels: &[ChannelPower], config: &AnalysisConfig) -> Result<DwrEvaluation> {
    DynamicWindowRangeChecker::from_config(config)?.evaluate(channels)
}
