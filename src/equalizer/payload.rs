use serde::{Deserialize, Serialize};

use super::{HEADER_LEN, TAP_LEN};

/// One equalizer coefficient as signed integer components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TapCoefficient {
    pub real: i32,
    pub imag: i32,
}

impl TapCoefficient {
    pub const fn new(real: i32, imag: i32) -> Self {
        Self { real, imag }
    }

    /// `real² + imag²`
    pub fn energy(&self) -> i64 {
        let re = i64::from(self.real);
        let im = i64::from(self.imag);
        re * re + im * im
    }

    pub fn magnitude(&self) -> f64 {
        f64::from(self.real).hypot(f64::from(self.imag))
    }
}

impl From<(i32, i32)> for TapCoefficient {
    fn from((real, imag): (i32, i32)) -> Self {
        Self { real, imag }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    pub fn write_u16(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

/// Coefficient encoding width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitWidth {
    /// 12-bit two's complement in the low three nibbles
    ThreeNibble,
    /// Full 16-bit two's complement
    FourNibble,
}

impl BitWidth {
    pub fn mask(self) -> u16 {
        match self {
            BitWidth::ThreeNibble => 0x0FFF,
            BitWidth::FourNibble => 0xFFFF,
        }
    }

    pub fn sign_bit(self) -> u16 {
        match self {
            BitWidth::ThreeNibble => 0x0800,
            BitWidth::FourNibble => 0x8000,
        }
    }

    /// Inclusive range of representable component values
    pub fn range(self) -> (i32, i32) {
        let sign = i32::from(self.sign_bit());
        (-sign, sign - 1)
    }
}

/// Format selection: fixed by the caller or detected from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detect<T> {
    Auto,
    Explicit(T),
}

impl<T> Default for Detect<T> {
    fn default() -> Self {
        Detect::Auto
    }
}

/// A decoded tap plus its display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedTap {
    #[serde(flatten)]
    pub coefficient: TapCoefficient,
    /// `hypot(real, imag)` rounded to 2 decimals
    pub magnitude: f64,
    /// `10·log10(|h|²)` rounded to 2 decimals, absent for a zero tap
    #[serde(rename = "magnitude_power_dB")]
    pub magnitude_power_db: Option<f64>,
    /// Raw bytes of the real component in payload order
    pub real_hex: String,
    pub imag_hex: String,
}

/// Decoded pre-equalization record for one upstream channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqualizerPayload {
    pub main_tap_location: u8,
    pub taps_per_symbol: u8,
    pub num_taps: u8,
    pub reserved: u8,
    #[serde(skip)]
    pub byte_order: ByteOrder,
    #[serde(skip)]
    pub bit_width: BitWidth,
    pub header_hex: String,
    pub payload_hex: String,
    pub payload_preview_hex: String,
    pub taps: Vec<DecodedTap>,
}

impl EqualizerPayload {
    pub fn coefficients(&self) -> Vec<TapCoefficient> {
        self.taps.iter().map(|t| t.coefficient).collect()
    }

    /// Build a raw payload from a header and coefficients
    ///
    /// `header` is `[main_tap_location, taps_per_symbol, reserved]`; the tap count
    /// byte comes from `taps.len()`, which must fit in a byte. Components are
    /// truncated to the width's mask.
    pub fn encode_taps(
        taps: &[TapCoefficient],
        header: [u8; 3],
        order: ByteOrder,
        width: BitWidth,
    ) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + taps.len() * TAP_LEN);
        bytes.extend_from_slice(&[header[0], header[1], taps.len() as u8, header[2]]);
        for tap in taps {
            for component in [tap.real, tap.imag] {
                let raw = (component as u16) & width.mask();
                bytes.extend_from_slice(&order.write_u16(raw));
            }
        }
        bytes
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
