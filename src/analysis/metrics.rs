//! Energy metrics around the main tap
//!
//! All ratios are in dB. Zero denominators and missing neighbours are normal
//! on unprovisioned or dead channels, so they come back as `±inf` / `NaN`
//! instead of errors.

use serde::Serialize;
use snafu::ensure;

use super::frequency_response::{FrequencyResponseAnalyzer, FrequencyResponseResult};
use crate::config::{AnalysisConfig, ATDMA_TAP_COUNT, DEFAULT_MAIN_TAP_INDEX, DEFAULT_NOMINAL_AMPLITUDE};
use crate::equalizer::TapCoefficient;
use crate::error::{InvalidNominalAmplitudeSnafu, InvalidTapCountSnafu, MainTapOutOfRangeSnafu, Result};
use crate::report::serialize_reported;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Zero-based index of the reference tap
    pub main_tap_index: usize,
    /// Full-scale component amplitude
    pub nominal_amplitude: i64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            main_tap_index: DEFAULT_MAIN_TAP_INDEX,
            nominal_amplitude: DEFAULT_NOMINAL_AMPLITUDE,
        }
    }
}

impl From<&AnalysisConfig> for MetricsConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            main_tap_index: config.main_tap_index,
            nominal_amplitude: config.nominal_amplitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqualizerMetricsResult {
    pub main_tap_index: usize,
    pub main_tap_energy: i64,
    pub main_tap_nominal_energy: i64,
    pub pre_main_tap_energy: i64,
    pub post_main_tap_energy: i64,
    pub total_tap_energy: i64,
    #[serde(serialize_with = "serialize_reported")]
    pub main_tap_compression: f64,
    #[serde(serialize_with = "serialize_reported")]
    pub main_tap_ratio: f64,
    #[serde(serialize_with = "serialize_reported")]
    pub non_main_tap_energy_ratio: f64,
    #[serde(serialize_with = "serialize_reported")]
    pub pre_main_tap_total_energy_ratio: f64,
    #[serde(serialize_with = "serialize_reported")]
    pub post_main_tap_total_energy_ratio: f64,
    #[serde(serialize_with = "serialize_reported")]
    pub pre_post_energy_symmetry_ratio: f64,
    #[serde(serialize_with = "serialize_reported")]
    pub pre_post_tap_symmetry_ratio: f64,
    pub frequency_response: FrequencyResponseResult,
}

/// Largest amplitude whose `A²·2` still fits in an `i64`
const MAX_NOMINAL_AMPLITUDE: i64 = i32::MAX as i64;

fn db(ratio: f64) -> f64 {
    10.0 * ratio.log10()
}

/// `10·log10(num/den)`, or `fallback` when `den` is zero
fn db_ratio(num: i64, den: i64, fallback: f64) -> f64 {
    if den == 0 {
        fallback
    } else {
        db(num as f64 / den as f64)
    }
}

/// Metrics over a fixed 24-tap ATDMA equalizer
#[derive(Debug, Clone)]
pub struct EqualizerMetrics {
    taps: Vec<TapCoefficient>,
    config: MetricsConfig,
}

impl EqualizerMetrics {
    pub fn new(taps: &[TapCoefficient], config: MetricsConfig) -> Result<Self> {
        ensure!(
            taps.len() == ATDMA_TAP_COUNT,
            InvalidTapCountSnafu { expected: ATDMA_TAP_COUNT, actual: taps.len() }
        );
        ensure!(
            config.main_tap_index < taps.len(),
            MainTapOutOfRangeSnafu { index: config.main_tap_index, num_taps: taps.len() }
        );
        ensure!(
            (1..=MAX_NOMINAL_AMPLITUDE).contains(&config.nominal_amplitude),
            InvalidNominalAmplitudeSnafu { value: config.nominal_amplitude, max: MAX_NOMINAL_AMPLITUDE }
        );

        Ok(Self {
            taps: taps.to_vec(),
            config,
        })
    }

    pub fn with_defaults(taps: &[TapCoefficient]) -> Result<Self> {
        Self::new(taps, MetricsConfig::default())
    }

    fn main_index(&self) -> usize {
        self.config.main_tap_index
    }

    pub fn main_tap_energy(&self) -> i64 {
        self.taps[self.main_index()].energy()
    }

    pub fn main_tap_nominal_energy(&self) -> i64 {
        self.config.nominal_amplitude * self.config.nominal_amplitude * 2
    }

    pub fn pre_main_tap_energy(&self) -> i64 {
        self.taps[..self.main_index()].iter().map(TapCoefficient::energy).sum()
    }

    pub fn post_main_tap_energy(&self) -> i64 {
        self.taps[self.main_index() + 1..].iter().map(TapCoefficient::energy).sum()
    }

    pub fn total_tap_energy(&self) -> i64 {
        self.taps.iter().map(TapCoefficient::energy).sum()
    }

    /// MTC: total over main tap energy
    pub fn main_tap_compression(&self) -> f64 {
        db_ratio(self.total_tap_energy(), self.main_tap_energy(), f64::INFINITY)
    }

    /// MTR: main tap over everything else
    pub fn main_tap_ratio(&self) -> f64 {
        let mte = self.main_tap_energy();
        db_ratio(mte, self.total_tap_energy() - mte, f64::INFINITY)
    }

    /// NMTER
    pub fn non_main_tap_energy_ratio(&self) -> f64 {
        let non_main = self.pre_main_tap_energy() + self.post_main_tap_energy();
        db_ratio(non_main, self.total_tap_energy(), f64::NEG_INFINITY)
    }

    /// PreMTTER
    pub fn pre_main_tap_total_energy_ratio(&self) -> f64 {
        db_ratio(self.pre_main_tap_energy(), self.total_tap_energy(), f64::NEG_INFINITY)
    }

    /// PostMTTER
    pub fn post_main_tap_total_energy_ratio(&self) -> f64 {
        db_ratio(self.post_main_tap_energy(), self.total_tap_energy(), f64::NEG_INFINITY)
    }

    /// PPESR: post-main over pre-main energy
    pub fn pre_post_energy_symmetry_ratio(&self) -> f64 {
        db_ratio(self.post_main_tap_energy(), self.pre_main_tap_energy(), f64::INFINITY)
    }

    /// PPTSR: the taps either side of the main tap only
    pub fn pre_post_tap_symmetry_ratio(&self) -> f64 {
        let main = self.main_index();
        if main == 0 || main + 1 >= self.taps.len() {
            return f64::NAN;
        }
        db_ratio(self.taps[main - 1].energy(), self.taps[main + 1].energy(), f64::INFINITY)
    }

    pub fn frequency_response(&self) -> Result<FrequencyResponseResult> {
        FrequencyResponseAnalyzer::new(&self.taps).compute(None)
    }

    pub fn compute(&self) -> Result<EqualizerMetricsResult> {
        Ok(EqualizerMetricsResult {
            main_tap_index: self.main_index(),
            main_tap_energy: self.main_tap_energy(),
            main_tap_nominal_energy: self.main_tap_nominal_energy(),
            pre_main_tap_energy: self.pre_main_tap_energy(),
            post_main_tap_energy: self.post_main_tap_energy(),
            total_tap_energy: self.total_tap_energy(),
            main_tap_compression: self.main_tap_compression(),
            main_tap_ratio: self.main_tap_ratio(),
            non_main_tap_energy_ratio: self.non_main_tap_energy_ratio(),
            pre_main_tap_total_energy_ratio: self.pre_main_tap_total_energy_ratio(),
            post_main_tap_total_energy_ratio: self.post_main_tap_total_energy_ratio(),
            pre_post_energy_symmetry_ratio: self.pre_post_energy_symmetry_ratio(),
            pre_post_tap_symmetry_ratio: self.pre_post_tap_symmetry_ratio(),
            frequency_response: self.frequency_response()?,
        })
    }
}
