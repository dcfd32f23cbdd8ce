//! Analysis defaults
//!
//! Every constant the analysis depends on is exposed here so deployments can
//! override it. `AnalysisConfig` can be loaded from JSON; missing fields keep
//! their defaults.

use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};

use crate::equalizer::{BitWidth, ByteOrder, Detect};

/// Full-scale reference amplitude of a tap component
pub const DEFAULT_NOMINAL_AMPLITUDE: i64 = 2047;

/// Zero-based main tap index ("F8")
pub const DEFAULT_MAIN_TAP_INDEX: usize = 7;

/// Root-raised-cosine roll-off used by DOCSIS upstream channels
pub const DOCSIS_ROLLOFF: f64 = 0.25;

/// Dynamic window range warning threshold (dB)
pub const DEFAULT_WARNING_DB: f64 = 6.0;

/// Dynamic window range violation threshold (dB)
pub const DEFAULT_VIOLATION_DB: f64 = 12.0;

/// Taps shown in the payload preview
pub const DEFAULT_PREVIEW_TAPS: usize = 8;

/// ATDMA equalizers always report 24 taps
pub const ATDMA_TAP_COUNT: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub nominal_amplitude: i64,
    pub main_tap_index: usize,
    pub rolloff: f64,
    pub warning_db: f64,
    pub violation_db: f64,
    pub byte_order: Detect<ByteOrder>,
    pub bit_width: Detect<BitWidth>,
    pub preview_taps: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            nominal_amplitude: DEFAULT_NOMINAL_AMPLITUDE,
            main_tap_index: DEFAULT_MAIN_TAP_INDEX,
            rolloff: DOCSIS_ROLLOFF,
            warning_db: DEFAULT_WARNING_DB,
            violation_db: DEFAULT_VIOLATION_DB,
            byte_order: Detect::Auto,
            bit_width: Detect::Auto,
            preview_taps: DEFAULT_PREVIEW_TAPS,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("unable to read config file {}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("config is not valid JSON"))]
    ParseJson { source: serde_json::Error },
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).context(ParseJsonSnafu)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
        Self::from_json_str(&text)
    }
}
