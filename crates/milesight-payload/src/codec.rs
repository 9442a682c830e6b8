//! Primitive field codecs shared by every channel transform.
//!
//! Multi-byte readers take a slice and check its length before touching it, so a
//! short slice comes back as [`PayloadError::InsufficientData`] instead of a panic.
//! Extra trailing bytes are ignored.

use crate::{PayloadError, Result};

fn take<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(PayloadError::InsufficientData {
            expected: N,
            actual: data.len(),
        })
}

pub fn read_u16_le(data: &[u8]) -> Result<u16> {
    take::<2>(data).map(u16::from_le_bytes)
}

/// Same bits as [`read_u16_le`], reinterpreted as two's complement.
pub fn read_i16_le(data: &[u8]) -> Result<i16> {
    take::<2>(data).map(i16::from_le_bytes)
}

pub fn read_u16_be(data: &[u8]) -> Result<u16> {
    take::<2>(data).map(u16::from_be_bytes)
}

/// Decode one packed BCD byte (`0x42` -> 42).
///
/// Malformed BCD decodes as 0: a low nibble above 9 or a high nibble of
/// 0xA or more is not a decimal digit pair.
pub fn bcd2_to_decimal(value: u8) -> u8 {
    let low = value & 0x0F;
    if low > 9 || value >= 0xA0 {
        return 0;
    }
    low + 10 * (value >> 4)
}

/// Major version in the high byte, two fractional digits in the low byte,
/// both BCD. `0x0123` -> `1.23`.
pub fn bcd22_to_version(value: u16) -> f64 {
    let [major, minor] = value.to_be_bytes();
    f64::from(bcd2_to_decimal(major)) + f64::from(bcd2_to_decimal(minor)) / 100.0
}

pub fn read_version(data: &[u8]) -> Result<f64> {
    read_u16_be(data).map(bcd22_to_version)
}

pub fn encode_hex(byte: u8) -> String {
    format!("{:02x}", byte)
}

/// Hyphen-joined lowercase hex, as used for serial numbers: `6b-81-...`.
pub fn read_hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|byte| encode_hex(*byte))
        .collect::<Vec<_>>()
        .join("-")
}
