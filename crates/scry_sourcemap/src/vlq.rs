//! Base64 variable-length quantities.
//!
//! Every base64 digit carries 5 data bits plus a continuation bit (the 6th
//! bit). Digits are written least significant group first, and the sign of
//! the value is folded into the lowest bit of the first group:
//!
//! | value | folded | digits |
//! |-------|--------|--------|
//! | 0     | 0      | `A`    |
//! | 1     | 2      | `C`    |
//! | -1    | 3      | `D`    |
//! | 16    | 32     | `gB`   |

use thiserror::Error;

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A digit holds 5 bits of payload, so VLQ is base-32.
const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE: u64 = 1 << VLQ_BASE_SHIFT;
const VLQ_BASE_MASK: u64 = VLQ_BASE - 1;
const VLQ_CONTINUATION_BIT: u64 = VLQ_BASE;

/// Largest shift that still leaves room for a full digit in a `u64`.
const MAX_SHIFT: u32 = 60;

/// Reverse lookup for `BASE64_ALPHABET`; `-1` marks bytes outside it.
const DECODE_TABLE: [i8; 128] = build_decode_table();

const fn build_decode_table() -> [i8; 128] {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < BASE64_ALPHABET.len() {
        table[BASE64_ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
}

/// Error decoding a VLQ value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VlqError {
    /// Byte outside the base64 alphabet.
    #[error("invalid base64 digit {0:?}")]
    InvalidDigit(char),
    /// Input ended while the continuation bit was still set.
    #[error("input ended in the middle of a value")]
    UnexpectedEnd,
    /// Value does not fit in 64 bits.
    #[error("value overflows 64 bits")]
    Overflow,
}

/// Append the VLQ encoding of `value` to `out`.
pub fn encode(out: &mut String, value: i64) {
    let magnitude = value.unsigned_abs() << 1;
    let mut folded = if value < 0 { magnitude | 1 } else { magnitude };
    loop {
        let mut digit = folded & VLQ_BASE_MASK;
        folded >>= VLQ_BASE_SHIFT;
        if folded > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(char::from(BASE64_ALPHABET[digit as usize]));
        if folded == 0 {
            break;
        }
    }
}

/// Decode one value from `input`, starting at `*pos`.
///
/// On success `*pos` points just past the last digit consumed.
pub fn decode(input: &[u8], pos: &mut usize) -> Result<i64, VlqError> {
    let mut folded: u64 = 0;
    let mut shift = 0;
    loop {
        let Some(&byte) = input.get(*pos) else {
            return Err(VlqError::UnexpectedEnd);
        };
        let digit = DECODE_TABLE
            .get(usize::from(byte))
            .copied()
            .filter(|d| *d >= 0)
            .ok_or(VlqError::InvalidDigit(char::from(byte)))?;
        *pos += 1;

        let digit = u64::from(digit.unsigned_abs());
        if shift > MAX_SHIFT {
            return Err(VlqError::Overflow);
        }
        folded |= (digit & VLQ_BASE_MASK) << shift;
        shift += VLQ_BASE_SHIFT;
        if digit & VLQ_CONTINUATION_BIT == 0 {
            break;
        }
    }

    let magnitude = i64::try_from(folded >> 1).map_err(|_| VlqError::Overflow)?;
    Ok(if folded & 1 == 1 { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests;
