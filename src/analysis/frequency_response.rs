//! Frequency response of the equalizer taps
//!
//! `H[k] = Σ h[n]·e^{-j2πkn/size}` with no scaling. Power in dB is absent for
//! empty bins rather than `-inf`, and the normalized view is referenced to DC.

use serde::Serialize;
use snafu::ensure;

use super::dft::tap_spectrum;
use crate::equalizer::TapCoefficient;
use crate::error::{EmptyTapsSnafu, FftSizeTooSmallSnafu, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyResponseResult {
    pub fft_size: usize,
    /// Normalized frequency `k / fft_size`, covering `[0, 1)`
    pub frequency_bins: Vec<f64>,
    pub magnitude: Vec<f64>,
    #[serde(rename = "magnitude_power_dB")]
    pub magnitude_power_db: Vec<Option<f64>>,
    #[serde(rename = "magnitude_power_dB_normalized")]
    pub magnitude_power_db_normalized: Vec<Option<f64>>,
    /// Principal value, not unwrapped
    pub phase_radians: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FrequencyResponseAnalyzer<'a> {
    taps: &'a [TapCoefficient],
}

impl<'a> FrequencyResponseAnalyzer<'a> {
    pub fn new(taps: &'a [TapCoefficient]) -> Self {
        Self { taps }
    }

    /// Transform at `fft_size` points (default: tap count)
    pub fn compute(&self, fft_size: Option<usize>) -> Result<FrequencyResponseResult> {
        let num_taps = self.taps.len();
        ensure!(num_taps > 0, EmptyTapsSnafu);

        let size = fft_size.unwrap_or(num_taps);
        ensure!(size >= num_taps, FftSizeTooSmallSnafu { fft_size: size, num_taps });

        let spectrum = tap_spectrum(self.taps, size);

        let magnitude: Vec<f64> = spectrum.iter().map(|h| h.norm()).collect();
        let magnitude_power_db: Vec<Option<f64>> = magnitude
            .iter()
            .map(|&m| (m > 0.0).then(|| 10.0 * (m * m).log10()))
            .collect();

        let dc = magnitude_power_db[0];
        let magnitude_power_db_normalized = magnitude_power_db
            .iter()
            .map(|bin| Some((*bin)? - dc?))
            .collect();

        Ok(FrequencyResponseResult {
            fft_size: size,
            frequency_bins: (0..size).map(|k| k as f64 / size as f64).collect(),
            magnitude,
            magnitude_power_db,
            magnitude_power_db_normalized,
            phase_radians: spectrum.iter().map(|h| h.arg()).collect(),
        })
    }
}
