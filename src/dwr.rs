//! Dynamic window range check
//!
//! Compares the spread of upstream transmit power across a modem's channels
//! against warning and violation thresholds.

use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::config::{AnalysisConfig, DEFAULT_VIOLATION_DB, DEFAULT_WARNING_DB};
use crate::error::{InvalidThresholdsSnafu, InvalidTxPowerSnafu, Result, TooFewChannelsSnafu};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelPower {
    pub channel_id: u32,
    pub tx_power_dbmv: f64,
}

impl ChannelPower {
    pub fn new(channel_id: u32, tx_power_dbmv: f64) -> Self {
        Self {
            channel_id,
            tx_power_dbmv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DwrEvaluation {
    pub min_power_dbmv: f64,
    pub max_power_dbmv: f64,
    pub spread_db: f64,
    pub warning_db: f64,
    pub violation_db: f64,
    pub is_warning: bool,
    pub is_violation: bool,
    /// Channels at the minimum level, then channels at the maximum level
    pub extreme_channel_ids: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicWindowRangeChecker {
    warning_db: f64,
    violation_db: f64,
}

impl Default for DynamicWindowRangeChecker {
    fn default() -> Self {
        Self {
            warning_db: DEFAULT_WARNING_DB,
            violation_db: DEFAULT_VIOLATION_DB,
        }
    }
}

impl DynamicWindowRangeChecker {
    pub fn new(warning_db: f64, violation_db: f64) -> Result<Self> {
        ensure!(warning_db <= violation_db, InvalidThresholdsSnafu { warning_db, violation_db });
        Ok(Self {
            warning_db,
            violation_db,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::new(config.warning_db, config.violation_db)
    }

    pub fn evaluate(&self, channels: &[ChannelPower]) -> Result<DwrEvaluation> {
        ensure!(channels.len() >= 2, TooFewChannelsSnafu { count: channels.len() });
        if let Some(bad) = channels.iter().find(|c| !c.tx_power_dbmv.is_finite()) {
            return InvalidTxPowerSnafu { channel_id: bad.channel_id, value: bad.tx_power_dbmv }.fail();
        }

        let powers = channels.iter().map(|c| c.tx_power_dbmv);
        let min = powers.clone().fold(f64::INFINITY, f64::min);
        let max = powers.fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;

        let is_violation = spread > self.violation_db;
        let is_warning = spread > self.warning_db && !is_violation;

        let mut extreme_channel_ids = Vec::new();
        for level in [min, max] {
            for channel in channels.iter().filter(|c| c.tx_power_dbmv == level) {
                if !extreme_channel_ids.contains(&channel.channel_id) {
                    extreme_channel_ids.push(channel.channel_id);
                }
            }
        }

        Ok(DwrEvaluation {
            min_power_dbmv: min,
            max_power_dbmv: max,
            spread_db: spread,
            warning_db: self.warning_db,
            violation_db: self.violation_db,
            is_warning,
            is_violation,
            extreme_channel_ids,
        })
    }
}
