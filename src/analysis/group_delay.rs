//! Group delay of the equalizer taps
//!
//! **Algorithm**:
//! 1. symbol rate = channel width / (1 + roll-off)
//! 2. sample period = symbol time / taps per symbol
//! 3. N-point DFT of the taps (no padding)
//! 4. unwrap the phase, ω[k] = 2πk/N
//! 5. delay = -dφ/dω in samples, scaled by the sample period to µs
//!
//! The main tap is not assumed to be centered; the delay is whatever the taps
//! imply.

use core::f64::consts::PI;

use serde::Serialize;
use snafu::ensure;

use super::dft::{gradient, tap_spectrum, unwrap_phase};
use crate::config::DOCSIS_ROLLOFF;
use crate::equalizer::TapCoefficient;
use crate::error::{EmptyTapsSnafu, InvalidChannelWidthSnafu, InvalidRolloffSnafu, InvalidTapsPerSymbolSnafu, Result};
use crate::report::serialize_reported_seq;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDelayResult {
    pub channel_width_hz: f64,
    pub rolloff: f64,
    pub taps_per_symbol: u32,
    pub symbol_rate: f64,
    pub symbol_time_us: f64,
    pub sample_period_us: f64,
    pub fft_size: usize,
    #[serde(serialize_with = "serialize_reported_seq")]
    pub delay_samples: Vec<f64>,
    #[serde(serialize_with = "serialize_reported_seq")]
    pub delay_us: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupDelayAnalyzer {
    channel_width_hz: f64,
    taps_per_symbol: u32,
    rolloff: f64,
}

impl GroupDelayAnalyzer {
    pub fn new(channel_width_hz: f64, taps_per_symbol: u32, rolloff: f64) -> Result<Self> {
        ensure!(
            channel_width_hz.is_finite() && channel_width_hz > 0.0,
            InvalidChannelWidthSnafu { value: channel_width_hz }
        );
        ensure!(taps_per_symbol > 0, InvalidTapsPerSymbolSnafu);
        ensure!(rolloff.is_finite() && rolloff >= 0.0, InvalidRolloffSnafu { value: rolloff });

        Ok(Self {
            channel_width_hz,
            taps_per_symbol,
            rolloff,
        })
    }

    pub fn with_docsis_rolloff(channel_width_hz: f64, taps_per_symbol: u32) -> Result<Self> {
        Self::new(channel_width_hz, taps_per_symbol, DOCSIS_ROLLOFF)
    }

    /// Symbols per second
    pub fn symbol_rate(&self) -> f64 {
        self.channel_width_hz / (1.0 + self.rolloff)
    }

    pub fn symbol_time_us(&self) -> f64 {
        1e6 / self.symbol_rate()
    }

    pub fn sample_period_us(&self) -> f64 {
        self.symbol_time_us() / f64::from(self.taps_per_symbol)
    }

    pub fn compute(&self, taps: &[TapCoefficient]) -> Result<GroupDelayResult> {
        let n = taps.len();
        ensure!(n > 0, EmptyTapsSnafu);

        let phase: Vec<f64> = tap_spectrum(taps, n).iter().map(|h| h.arg()).collect();
        let phase = unwrap_phase(&phase);
        let omega: Vec<f64> = (0..n).map(|k| 2.0 * PI * k as f64 / n as f64).collect();

        let delay_samples: Vec<f64> = gradient(&phase, &omega).into_iter().map(|d| -d).collect();
        let sample_period_us = self.sample_period_us();
        let delay_us = delay_samples.iter().map(|d| d * sample_period_us).collect();

        Ok(GroupDelayResult {
            channel_width_hz: self.channel_width_hz,
            rolloff: self.rolloff,
            taps_per_symbol: self.taps_per_symbol,
            symbol_rate: self.symbol_rate(),
            symbol_time_us: self.symbol_time_us(),
            sample_period_us,
            fft_size: n,
            delay_samples,
            delay_us,
        })
    }
}
