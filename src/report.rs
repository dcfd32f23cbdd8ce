//! Outbound result shape
//!
//! Strict JSON has no `Infinity` or `NaN`, so ratio fields and delay arrays are
//! written through [`ReportedValue`]: finite values stay numbers, special values
//! become `"positive_infinity"`, `"negative_infinity"` or `"not_a_number"`.

use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::analysis::{EqualizerMetricsResult, GroupDelayResult};
use crate::equalizer::EqualizerPayload;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialValue {
    PositiveInfinity,
    NegativeInfinity,
    NotANumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportedValue {
    Finite(f64),
    Special(SpecialValue),
}

impl From<f64> for ReportedValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            ReportedValue::Finite(value)
        } else if value.is_nan() {
            ReportedValue::Special(SpecialValue::NotANumber)
        } else if value > 0.0 {
            ReportedValue::Special(SpecialValue::PositiveInfinity)
        } else {
            ReportedValue::Special(SpecialValue::NegativeInfinity)
        }
    }
}

impl From<ReportedValue> for f64 {
    fn from(value: ReportedValue) -> Self {
        match value {
            ReportedValue::Finite(v) => v,
            ReportedValue::Special(SpecialValue::PositiveInfinity) => f64::INFINITY,
            ReportedValue::Special(SpecialValue::NegativeInfinity) => f64::NEG_INFINITY,
            ReportedValue::Special(SpecialValue::NotANumber) => f64::NAN,
        }
    }
}

pub fn serialize_reported<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    ReportedValue::from(*value).serialize(serializer)
}

pub fn serialize_reported_seq<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for v in values {
        seq.serialize_element(&ReportedValue::from(*v))?;
    }
    seq.end()
}

/// Everything reported for one upstream channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelReport {
    #[serde(flatten)]
    pub payload: EqualizerPayload,
    /// Only for 24-tap payloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EqualizerMetricsResult>,
    /// Only when the channel width is known and taps per symbol is non-zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_delay: Option<GroupDelayResult>,
}

/// Serialize the per-channel map; keys become decimal strings
pub fn to_json(reports: &BTreeMap<u32, ChannelReport>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
