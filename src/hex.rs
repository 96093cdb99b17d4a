// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! Stateless nibble/character conversion used by hex import and export.

use std::fmt::{self, Display, Formatter, Write};

use crate::error::{BufferError, Result};

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Render the low four bits of `nibble` as an uppercase hex digit.
#[inline]
pub fn nibble_to_char(nibble: u8) -> char {
    HEX_CHARS[(nibble & 0x0f) as usize] as char
}

/// Value of a single ASCII hex digit, either case.
#[inline]
pub const fn char_to_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode a token made of exactly two hex digits.
///
/// ```
/// use oicq_wire::hex::decode_pair;
/// assert_eq!(decode_pair("7f"), Some(0x7f));
/// assert_eq!(decode_pair("7"), None);
/// ```
pub fn decode_pair(token: &str) -> Option<u8> {
    match token.as_bytes() {
        [hi, lo] => Some((char_to_nibble(*hi)? << 4) | char_to_nibble(*lo)?),
        _ => None,
    }
}

/// Parse a whitespace-separated expression of two-digit hex tokens.
///
/// The whole expression is validated before anything is returned,
/// so callers can append the result without risking a partial write.
pub fn parse_hex_pairs(expr: &str) -> Result<Vec<u8>> {
    expr.split_whitespace()
        .map(|token| {
            decode_pair(token).ok_or_else(|| BufferError::MalformedHexInput {
                token: token.to_string(),
                expr: expr.to_string(),
            })
        })
        .collect()
}

/// Lazily formatted hex dump: uppercase pairs, each followed by a space.
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a>(pub &'a [u8]);

impl Display for HexDump<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            f.write_char(nibble_to_char(byte >> 4))?;
            f.write_char(nibble_to_char(*byte))?;
            f.write_char(' ')?;
        }
        Ok(())
    }
}
