//! Shared payload builders for integration tests

#![allow(dead_code)]

use rustypnm::equalizer::{BitWidth, ByteOrder};
use rustypnm::{EqualizerPayload, TapCoefficient};

pub const ATDMA_TAPS: usize = 24;

/// 24 zero taps with a unit main tap at index 7
pub fn main_tap_impulse() -> Vec<TapCoefficient> {
    let mut taps = vec![TapCoefficient::default(); ATDMA_TAPS];
    taps[7] = TapCoefficient::new(1, 0);
    taps
}

/// Raw little-endian 16-bit payload with header `[8, taps_per_symbol, n, 0]`
pub fn payload_le16(taps: &[TapCoefficient], taps_per_symbol: u8) -> Vec<u8> {
    EqualizerPayload::encode_taps(taps, [8, taps_per_symbol, 0], ByteOrder::Little, BitWidth::FourNibble)
}

/// Same payload as SNMP tooling prints it
pub fn snmp_hex(bytes: &[u8]) -> String {
    format!("Hex-STRING: {}", rustypnm::equalizer::format_hex_bytes(bytes))
}
