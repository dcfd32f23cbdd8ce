//! Tap payload decoding with format detection
//!
//! **Byte order**: deployed tap magnitudes are usually small, so the
//! sign-extension byte of each component is `0x00` or `0xFF`. Over the first
//! [`ENDIANNESS_SAMPLE_TAPS`] taps, little-endian scores when a component's
//! second byte is a sign byte, big-endian when its first byte is. Big-endian has
//! to win outright.
//!
//! **Bit width**: any component with a set top nibble (over all taps) means
//! 16-bit coefficients; otherwise they are 12-bit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::hex::{format_hex_bytes, parse_hex_string};
use super::payload::{round2, BitWidth, ByteOrder, DecodedTap, Detect, EqualizerPayload, TapCoefficient};
use super::{HEADER_LEN, MAX_TAPS, TAP_LEN};
use crate::config::{AnalysisConfig, DEFAULT_PREVIEW_TAPS};

/// Taps sampled by the byte-order heuristic
pub const ENDIANNESS_SAMPLE_TAPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderOptions {
    pub byte_order: Detect<ByteOrder>,
    pub bit_width: Detect<BitWidth>,
    /// Number of taps included in `payload_preview_hex`
    pub preview_taps: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            byte_order: Detect::Auto,
            bit_width: Detect::Auto,
            preview_taps: DEFAULT_PREVIEW_TAPS,
        }
    }
}

impl From<&AnalysisConfig> for DecoderOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            byte_order: config.byte_order,
            bit_width: config.bit_width,
            preview_taps: config.preview_taps,
        }
    }
}

/// The two component words of tap `i`, as raw byte pairs
fn tap_words(bytes: &[u8], i: usize) -> [[u8; 2]; 2] {
    let off = HEADER_LEN + i * TAP_LEN;
    [[bytes[off], bytes[off + 1]], [bytes[off + 2], bytes[off + 3]]]
}

fn is_sign_byte(b: u8) -> bool {
    b == 0x00 || b == 0xFF
}

/// Guess the byte order from the first taps
///
/// `bytes` must already hold `num_taps` complete taps.
pub fn detect_byte_order(bytes: &[u8], num_taps: usize) -> ByteOrder {
    let mut little = 0usize;
    let mut big = 0usize;

    for i in 0..num_taps.min(ENDIANNESS_SAMPLE_TAPS) {
        for word in tap_words(bytes, i) {
            if is_sign_byte(word[1]) {
                little += 1;
            }
            if is_sign_byte(word[0]) {
                big += 1;
            }
        }
    }

    trace!(little, big, "byte order scores");
    if big > little {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    }
}

/// Guess the coefficient width from every tap
pub fn detect_bit_width(bytes: &[u8], num_taps: usize, order: ByteOrder) -> BitWidth {
    let wide = (0..num_taps)
        .flat_map(|i| tap_words(bytes, i))
        .any(|word| order.read_u16(word) & 0xF000 != 0);

    if wide {
        BitWidth::FourNibble
    } else {
        BitWidth::ThreeNibble
    }
}

/// Sign-extend a raw component word
pub fn decode_word(raw: u16, width: BitWidth) -> i32 {
    let value = raw & width.mask();
    let signed = i32::from(value);
    if value & width.sign_bit() != 0 {
        signed - (i32::from(width.mask()) + 1)
    } else {
        signed
    }
}

/// Parse one raw payload
///
/// Returns `None` for anything the field can send that does not form a
/// complete record: short header, zero or more than 64 taps, truncated taps.
pub fn parse_payload(bytes: &[u8], options: &DecoderOptions) -> Option<EqualizerPayload> {
    if bytes.len() < HEADER_LEN {
        debug!(len = bytes.len(), "payload shorter than header");
        return None;
    }

    let [main_tap_location, taps_per_symbol, num_taps, reserved] =
        [bytes[0], bytes[1], bytes[2], bytes[3]];
    let n = usize::from(num_taps);

    if n == 0 || n > MAX_TAPS {
        debug!(num_taps, "tap count out of range");
        return None;
    }
    if bytes.len() < HEADER_LEN + n * TAP_LEN {
        debug!(len = bytes.len(), num_taps, "payload truncated");
        return None;
    }

    let byte_order = match options.byte_order {
        Detect::Explicit(order) => order,
        Detect::Auto => detect_byte_order(bytes, n),
    };
    let bit_width = match options.bit_width {
        Detect::Explicit(width) => width,
        Detect::Auto => detect_bit_width(bytes, n, byte_order),
    };
    debug!(?byte_order, ?bit_width, num_taps, "resolved payload format");

    let taps = (0..n)
        .map(|i| {
            let [re, im] = tap_words(bytes, i);
            let coefficient = TapCoefficient::new(
                decode_word(byte_order.read_u16(re), bit_width),
                decode_word(byte_order.read_u16(im), bit_width),
            );
            // dB follows the displayed (rounded) magnitude
            let magnitude = round2(coefficient.magnitude());
            let magnitude_power_db = if magnitude == 0.0 {
                None
            } else {
                Some(round2(10.0 * (magnitude * magnitude).log10()))
            };

            DecodedTap {
                coefficient,
                magnitude,
                magnitude_power_db,
                real_hex: hex::encode_upper(re),
                imag_hex: hex::encode_upper(im),
            }
        })
        .collect();

    let preview_taps = options.preview_taps.min(n);

    Some(EqualizerPayload {
        main_tap_location,
        taps_per_symbol,
        num_taps,
        reserved,
        byte_order,
        bit_width,
        header_hex: format_hex_bytes(&bytes[..HEADER_LEN]),
        payload_hex: format_hex_bytes(bytes),
        payload_preview_hex: format_hex_bytes(&bytes[..HEADER_LEN + preview_taps * TAP_LEN]),
        taps,
    })
}

/// Decoder accumulating results per upstream channel index
///
/// Not shared between threads; give each worker its own instance.
#[derive(Debug, Default)]
pub struct TapPayloadDecoder {
    options: DecoderOptions,
    channels: BTreeMap<u32, EqualizerPayload>,
}

impl TapPayloadDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            channels: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode and store a raw payload. Returns `false` if it was rejected.
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    pub fn decode_bytes(&mut self, index: u32, bytes: &[u8]) -> bool {
        match parse_payload(bytes, &self.options) {
            Some(payload) => {
                self.channels.insert(index, payload);
                true
            }
            None => false,
        }
    }

    /// Decode and store a hex payload. Returns `false` on bad hex or a rejected payload.
    pub fn decode_hex(&mut self, index: u32, text: &str) -> bool {
        match parse_hex_string(text) {
            Some(bytes) => self.decode_bytes(index, &bytes),
            None => {
                debug!(index, "payload is not a hex string");
                false
            }
        }
    }

    /// At least one channel decoded
    pub fn is_decoded(&self) -> bool {
        !self.channels.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&EqualizerPayload> {
        self.channels.get(&index)
    }

    pub fn channels(&self) -> &BTreeMap<u32, EqualizerPayload> {
        &self.channels
    }

    pub fn into_channels(self) -> BTreeMap<u32, EqualizerPayload> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(taps: &[(i32, i32)], order: ByteOrder, width: BitWidth) -> Vec<u8> {
        let taps: Vec<TapCoefficient> = taps.iter().copied().map(TapCoefficient::from).collect();
        EqualizerPayload::encode_taps(&taps, [8, 1, 0], order, width)
    }

    mod decode_word {
        use super::*;

        #[test]
        fn sixteen_bit_extremes() {
            assert_eq!(decode_word(0x7FFF, BitWidth::FourNibble), 32767);
            assert_eq!(decode_word(0x8000, BitWidth::FourNibble), -32768);
            assert_eq!(decode_word(0xFFFF, BitWidth::FourNibble), -1);
        }

        #[test]
        fn twelve_bit_masks_top_nibble() {
            assert_eq!(decode_word(0x07FF, BitWidth::ThreeNibble), 2047);
            assert_eq!(decode_word(0x0800, BitWidth::ThreeNibble), -2048);
            assert_eq!(decode_word(0xFFFF, BitWidth::ThreeNibble), -1);
            assert_eq!(decode_word(0xA001, BitWidth::ThreeNibble), 1);
        }
    }

    mod detect_byte_order {
        use super::*;

        #[test]
        fn small_big_endian_taps() {
            let bytes = encode(&[(0x12, -0x34), (0x56, 0x07), (-0x10, 0x20)], ByteOrder::Big, BitWidth::FourNibble);
            assert_eq!(detect_byte_order(&bytes, 3), ByteOrder::Big);
        }

        #[test]
        fn small_little_endian_taps() {
            let bytes = encode(&[(0x12, -0x34), (0x56, 0x07), (-0x10, 0x20)], ByteOrder::Little, BitWidth::FourNibble);
            assert_eq!(detect_byte_order(&bytes, 3), ByteOrder::Little);
        }

        #[test]
        fn tie_defaults_to_little() {
            // 0x0000 scores for both hypotheses
            let bytes = encode(&[(0, 0), (0, 0)], ByteOrder::Big, BitWidth::FourNibble);
            assert_eq!(detect_byte_order(&bytes, 2), ByteOrder::Little);
        }

        #[test]
        fn only_first_sixteen_taps_vote() {
            let mut taps = vec![(0x1234, 0x1234); ENDIANNESS_SAMPLE_TAPS];
            taps.extend(vec![(0x12, 0x34); 20]);
            let bytes = encode(&taps, ByteOrder::Big, BitWidth::FourNibble);
            assert_eq!(detect_byte_order(&bytes, taps.len()), ByteOrder::Little);
        }
    }

    mod detect_bit_width {
        use super::*;

        #[test]
        fn three_nibble_when_top_nibble_clear() {
            let bytes = encode(&[(2047, -2048), (5, -5)], ByteOrder::Little, BitWidth::ThreeNibble);
            assert_eq!(detect_bit_width(&bytes, 2, ByteOrder::Little), BitWidth::ThreeNibble);
        }

        #[test]
        fn four_nibble_when_any_top_nibble_set() {
            let bytes = encode(&[(5, 5), (5, -1)], ByteOrder::Little, BitWidth::FourNibble);
            assert_eq!(detect_bit_width(&bytes, 2, ByteOrder::Little), BitWidth::FourNibble);
        }

        #[test]
        fn scans_past_the_sampled_taps() {
            let mut taps = vec![(1, 1); 30];
            taps[29] = (0x1000, 0);
            let bytes = encode(&taps, ByteOrder::Little, BitWidth::FourNibble);
            assert_eq!(detect_bit_width(&bytes, 30, ByteOrder::Little), BitWidth::FourNibble);
        }
    }

    mod parse_payload {
        use super::*;

        #[test]
        fn rejects_short_header() {
            assert!(parse_payload(&[8, 1, 1], &DecoderOptions::default()).is_none());
        }

        #[test]
        fn rejects_zero_taps() {
            assert!(parse_payload(&[8, 1, 0, 0], &DecoderOptions::default()).is_none());
        }

        #[test]
        fn rejects_more_than_64_taps() {
            let mut bytes = vec![8, 1, 65, 0];
            bytes.extend(vec![0u8; 65 * 4]);
            assert!(parse_payload(&bytes, &DecoderOptions::default()).is_none());
        }

        #[test]
        fn accepts_64_taps() {
            let bytes = encode(&vec![(1, 0); 64], ByteOrder::Little, BitWidth::ThreeNibble);
            let payload = parse_payload(&bytes, &DecoderOptions::default()).unwrap();
            assert_eq!(payload.taps.len(), 64);
        }

        #[test]
        fn rejects_truncated_taps() {
            let mut bytes = encode(&[(1, 0), (2, 0)], ByteOrder::Little, BitWidth::ThreeNibble);
            bytes.pop();
            assert!(parse_payload(&bytes, &DecoderOptions::default()).is_none());
        }

        #[test]
        fn header_fields() {
            let bytes = EqualizerPayload::encode_taps(
                &[TapCoefficient::new(1, 0)],
                [8, 2, 0xAB],
                ByteOrder::Little,
                BitWidth::ThreeNibble,
            );
            let payload = parse_payload(&bytes, &DecoderOptions::default()).unwrap();
            assert_eq!(payload.main_tap_location, 8);
            assert_eq!(payload.taps_per_symbol, 2);
            assert_eq!(payload.num_taps, 1);
            assert_eq!(payload.reserved, 0xAB);
            assert_eq!(payload.header_hex, "08 02 01 AB");
        }

        #[test]
        fn tap_display_fields() {
            let bytes = encode(&[(3, -4), (0, 0)], ByteOrder::Little, BitWidth::FourNibble);
            let options = DecoderOptions {
                byte_order: Detect::Explicit(ByteOrder::Little),
                bit_width: Detect::Explicit(BitWidth::FourNibble),
                ..DecoderOptions::default()
            };
            let payload = parse_payload(&bytes, &options).unwrap();

            let tap = &payload.taps[0];
            assert_eq!(tap.coefficient, TapCoefficient::new(3, -4));
            assert_eq!(tap.magnitude, 5.0);
            assert_eq!(tap.magnitude_power_db, Some(13.98));
            assert_eq!(tap.real_hex, "0300");
            assert_eq!(tap.imag_hex, "FCFF");

            assert_eq!(payload.taps[1].magnitude, 0.0);
            assert_eq!(payload.taps[1].magnitude_power_db, None);
        }

        #[test]
        fn power_db_uses_rounded_magnitude() {
            let bytes = encode(&[(1, 1), (-7, 7)], ByteOrder::Little, BitWidth::FourNibble);
            let payload = parse_payload(&bytes, &DecoderOptions::default()).unwrap();

            assert_eq!(payload.taps[0].magnitude, 1.41);
            assert_eq!(payload.taps[0].magnitude_power_db, Some(2.98));
            assert_eq!(payload.taps[1].magnitude, 9.9);
            assert_eq!(payload.taps[1].magnitude_power_db, Some(19.91));
        }

        #[test]
        fn explicit_order_overrides_heuristic() {
            let bytes = encode(&[(0x12, 0x34)], ByteOrder::Big, BitWidth::FourNibble);
            let options = DecoderOptions {
                byte_order: Detect::Explicit(ByteOrder::Little),
                bit_width: Detect::Explicit(BitWidth::FourNibble),
                ..DecoderOptions::default()
            };
            let payload = parse_payload(&bytes, &options).unwrap();
            assert_eq!(payload.byte_order, ByteOrder::Little);
            assert_eq!(payload.taps[0].coefficient, TapCoefficient::new(0x1200, 0x3400));
        }

        #[test]
        fn preview_is_clamped() {
            let bytes = encode(&[(1, 0), (2, 0)], ByteOrder::Little, BitWidth::ThreeNibble);
            let options = DecoderOptions {
                preview_taps: 1,
                ..DecoderOptions::default()
            };
            let payload = parse_payload(&bytes, &options).unwrap();
            assert_eq!(payload.payload_preview_hex, "08 01 02 00 01 00 00 00");

            let options = DecoderOptions {
                preview_taps: 100,
                ..DecoderOptions::default()
            };
            let payload = parse_payload(&bytes, &options).unwrap();
            assert_eq!(payload.payload_preview_hex, payload.payload_hex);

            let options = DecoderOptions {
                preview_taps: 0,
                ..DecoderOptions::default()
            };
            let payload = parse_payload(&bytes, &options).unwrap();
            assert_eq!(payload.payload_preview_hex, payload.header_hex);
        }

        #[test]
        fn trailing_bytes_are_kept_in_payload_hex() {
            let mut bytes = encode(&[(1, 0)], ByteOrder::Little, BitWidth::ThreeNibble);
            bytes.push(0xEE);
            let payload = parse_payload(&bytes, &DecoderOptions::default()).unwrap();
            assert_eq!(payload.taps.len(), 1);
            assert!(payload.payload_hex.ends_with("EE"));
        }
    }

    mod tap_payload_decoder {
        use super::*;

        #[test]
        fn accumulates_channels() {
            let mut decoder = TapPayloadDecoder::default();
            assert!(!decoder.is_decoded());

            let bytes = encode(&[(1, 0)], ByteOrder::Little, BitWidth::ThreeNibble);
            assert!(decoder.decode_bytes(3, &bytes));
            assert!(!decoder.decode_bytes(4, &[1, 2]));
            assert!(decoder.decode_hex(5, "Hex-STRING: 08 01 01 00 02 00 00 00"));

            assert!(decoder.is_decoded());
            assert_eq!(decoder.channels().len(), 2);
            assert!(decoder.get(4).is_none());
            assert_eq!(decoder.get(5).unwrap().taps[0].coefficient, TapCoefficient::new(2, 0));
        }

        #[test]
        fn bad_hex_returns_false() {
            let mut decoder = TapPayloadDecoder::default();
            assert!(!decoder.decode_hex(1, "08 01 01 00 02 00 00 0\u{2603}"));
            assert!(!decoder.is_decoded());
        }

        #[test]
        fn failed_decode_keeps_previous_result() {
            let mut decoder = TapPayloadDecoder::default();
            let bytes = encode(&[(1, 0)], ByteOrder::Little, BitWidth::ThreeNibble);
            assert!(decoder.decode_bytes(3, &bytes));
            assert!(!decoder.decode_bytes(3, &[]));
            assert!(decoder.get(3).is_some());
        }
    }
}
