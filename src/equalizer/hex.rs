//! Hex string handling
//!
//! SNMP tooling hands payloads over in several textual shapes
//! (`Hex-STRING: 08 01 18 00 ...`, `0x08011800...`, bare digits). Parsing fails
//! closed: anything other than hex digits and whitespace after the known
//! prefixes is rejected.

const SNMP_HEX_PREFIX: &str = "Hex-STRING:";

/// Parse a textual hex payload into raw bytes
///
/// Returns `None` for stray characters or an odd number of digits.
pub fn parse_hex_string(text: &str) -> Option<Vec<u8>> {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix(SNMP_HEX_PREFIX) {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        s = rest;
    }

    let mut digits = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_hexdigit() {
            digits.push(c);
        } else if !c.is_whitespace() {
            return None;
        }
    }

    hex::decode(digits).ok()
}

/// Render bytes as space-separated uppercase pairs (`"08 01 18 00"`)
pub fn format_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}
