//! Upstream pre-equalization payload decoding
//!
//! A cable modem reports its pre-equalizer as an opaque octet string:
//!
//! ```text
//! byte 0   main tap location
//! byte 1   taps per symbol
//! byte 2   number of taps (1..=64)
//! byte 3   reserved
//! then     num_taps * [real: 2 bytes][imag: 2 bytes]
//! ```
//!
//! Deployments disagree on byte order and on whether coefficients are 12-bit
//! ("three nibble") or 16-bit ("four nibble") two's complement. Both can be
//! pinned explicitly or left to the heuristics in [`decoder`].
//!
//! **Module Organization**:
//! - `hex` - hex string parsing and display formatting
//! - `payload` - decoded record types and the raw encoder
//! - `decoder` - format detection and the per-channel decoder

pub mod decoder;
pub mod hex;
mod payload;

pub use decoder::{parse_payload, DecoderOptions, TapPayloadDecoder};
pub use self::hex::{format_hex_bytes, parse_hex_string};
pub use payload::{BitWidth, ByteOrder, DecodedTap, Detect, EqualizerPayload, TapCoefficient};

/// Header length in bytes
pub const HEADER_LEN: usize = 4;

/// Bytes per tap (2 real + 2 imaginary)
pub const TAP_LEN: usize = 4;

/// Largest tap count accepted from the field
pub const MAX_TAPS: usize = 64;
