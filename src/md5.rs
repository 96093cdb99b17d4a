// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! MD5 digest (RFC 1321), used to hash credentials before they go on the wire.
//!
//! The engine keeps the whole input, pads it once per change of input and then
//! compresses it block by block. Computing a digest resets the accumulators to
//! their initial values, so asking again without new input gives the same answer.
//!
//! ```
//! use oicq_wire::{md5::Md5, ByteBuffer};
//! let mut engine = Md5::new("abc");
//! let mut out = ByteBuffer::new();
//! engine.digest(&mut out)?;
//! assert_eq!(out.to_hex_string(), "90 01 50 98 3C D2 4F B0 D6 96 3F 7D 28 E1 7F 72 ");
//! # Ok::<(), oicq_wire::BufferError>(())
//! ```

use bytes::{Buf, BufMut};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

use crate::{
    byte_buffer::ByteBuffer,
    constants::{MD5_BLOCK_LEN, MD5_DIGEST_LEN, MD5_INITIAL_STATE},
    error::Result,
};

/// Where the 64-bit length goes inside the final block.
const LENGTH_OFFSET: usize = MD5_BLOCK_LEN - 8;

/// Per-step left rotation amounts.
const SHIFTS: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// `floor(abs(sin(i + 1)) * 2^32)`
const SINE_TABLE: [u32; 64] = [
    0xd76a_a478, 0xe8c7_b756, 0x2420_70db, 0xc1bd_ceee, //
    0xf57c_0faf, 0x4787_c62a, 0xa830_4613, 0xfd46_9501, //
    0x6980_98d8, 0x8b44_f7af, 0xffff_5bb1, 0x895c_d7be, //
    0x6b90_1122, 0xfd98_7193, 0xa679_438e, 0x49b4_0821, //
    0xf61e_2562, 0xc040_b340, 0x265e_5a51, 0xe9b6_c7aa, //
    0xd62f_105d, 0x0244_1453, 0xd8a1_e681, 0xe7d3_fbc8, //
    0x21e1_cde6, 0xc337_07d6, 0xf4d5_0d87, 0x455a_14ed, //
    0xa9e3_e905, 0xfcef_a3f8, 0x676f_02d9, 0x8d2a_4c8a, //
    0xfffa_3942, 0x8771_f681, 0x6d9d_6122, 0xfde5_380c, //
    0xa4be_ea44, 0x4bde_cfa9, 0xf6bb_4b60, 0xbebf_bc70, //
    0x289b_7ec6, 0xeaa1_27fa, 0xd4ef_3085, 0x0488_1d05, //
    0xd9d4_d039, 0xe6db_99e5, 0x1fa2_7cf8, 0xc4ac_5665, //
    0xf429_2244, 0x432a_ff97, 0xab94_23a7, 0xfc93_a039, //
    0x655b_59c3, 0x8f0c_cc92, 0xffef_f47d, 0x8584_5dd1, //
    0x6fa8_7e4f, 0xfe2c_e6e0, 0xa301_4314, 0x4e08_11a1, //
    0xf753_7e82, 0xbd3a_f235, 0x2ad7_d2bb, 0xeb86_d391,
];

#[inline]
fn mix_f(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | (!x & z)
}

#[inline]
fn mix_g(x: u32, y: u32, z: u32) -> u32 {
    (x & z) | (y & !z)
}

#[inline]
fn mix_h(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline]
fn mix_i(x: u32, y: u32, z: u32) -> u32 {
    y ^ (x | !z)
}

/// Append `0x80`, zeros up to 56 mod 64, then the bit length little-endian.
fn pad(input: &[u8]) -> Vec<u8> {
    let bit_len = (input.len() as u64).wrapping_mul(8);
    let mut padded = Vec::with_capacity(input.len() + 2 * MD5_BLOCK_LEN);
    padded.extend_from_slice(input);
    padded.put_u8(0x80);
    while padded.len() % MD5_BLOCK_LEN != LENGTH_OFFSET {
        padded.put_u8(0);
    }
    padded.put_u64_le(bit_len);
    debug_assert_eq!(padded.len() % MD5_BLOCK_LEN, 0);
    padded
}

/// Compress one 64-byte block into `state`.
fn transform(state: &mut [u32; 4], mut block: &[u8]) {
    debug_assert_eq!(block.len(), MD5_BLOCK_LEN);
    let mut words = [0u32; 16];
    for word in words.iter_mut() {
        *word = block.get_u32_le();
    }

    let [mut a, mut b, mut c, mut d] = *state;
    for step in 0..64 {
        let (mixed, index) = match step / 16 {
            0 => (mix_f(b, c, d), step),
            1 => (mix_g(b, c, d), (5 * step + 1) % 16),
            2 => (mix_h(b, c, d), (3 * step + 5) % 16),
            _ => (mix_i(b, c, d), (7 * step) % 16),
        };
        let rotated = a
            .wrapping_add(mixed)
            .wrapping_add(words[index])
            .wrapping_add(SINE_TABLE[step])
            .rotate_left(SHIFTS[step]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(rotated);
    }

    // feed-forward
    for (acc, v) in state.iter_mut().zip([a, b, c, d].iter()) {
        *acc = acc.wrapping_add(*v);
    }
}

/// A finished 128-bit digest, in RFC 1321 byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Digest([u8; MD5_DIGEST_LEN]);

impl Md5Digest {
    pub fn as_bytes(&self) -> &[u8; MD5_DIGEST_LEN] {
        &self.0
    }

    fn from_state(state: [u32; 4]) -> Md5Digest {
        let mut bytes = [0u8; MD5_DIGEST_LEN];
        let mut out = &mut bytes[..];
        for word in state.iter() {
            out.put_u32_le(*word);
        }
        Md5Digest(bytes)
    }
}

impl From<[u8; MD5_DIGEST_LEN]> for Md5Digest {
    fn from(bytes: [u8; MD5_DIGEST_LEN]) -> Md5Digest {
        Md5Digest(bytes)
    }
}

impl AsRef<[u8]> for Md5Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::LowerHex for Md5Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

impl fmt::UpperHex for Md5Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02X}", b))
    }
}

impl Display for Md5Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

/// MD5 engine holding its input and the padded copy of it.
#[derive(Debug, Clone)]
pub struct Md5 {
    input: Vec<u8>,
    padded: Vec<u8>,
    state: [u32; 4],
}

impl Md5 {
    pub fn new(input: impl AsRef<[u8]>) -> Md5 {
        let input = input.as_ref().to_vec();
        let padded = pad(&input);
        Md5 {
            input,
            padded,
            state: MD5_INITIAL_STATE,
        }
    }

    /// Append more input. The next digest covers everything given so far.
    pub fn update(&mut self, more: impl AsRef<[u8]>) {
        self.input.extend_from_slice(more.as_ref());
        self.padded = pad(&self.input);
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Length of the padded message, always a multiple of 64.
    pub fn padded_len(&self) -> usize {
        self.padded.len()
    }

    /// Run every block, return the accumulators and reset them.
    fn run(&mut self) -> [u32; 4] {
        for block in self.padded.chunks_exact(MD5_BLOCK_LEN) {
            transform(&mut self.state, block);
        }
        let state = self.state;
        self.state = MD5_INITIAL_STATE;
        debug!(
            input_len = self.input.len(),
            blocks = self.padded.len() / MD5_BLOCK_LEN,
            "computed md5"
        );
        state
    }

    /// Compute the digest. The accumulators are reset afterwards.
    pub fn compute(&mut self) -> Md5Digest {
        Md5Digest::from_state(self.run())
    }

    /// Compute the digest and append its 16 bytes to `out`.
    ///
    /// Each accumulator word is written least-significant byte first, giving
    /// the standard digest byte order. The accumulators are reset afterwards.
    /// Only fails if `out` is a read-only view, in which case nothing is written.
    pub fn digest(&mut self, out: &mut ByteBuffer<'_>) -> Result<()> {
        for word in self.run().iter() {
            out.write_u32_le(*word)?;
        }
        Ok(())
    }
}

impl From<&str> for Md5 {
    fn from(input: &str) -> Md5 {
        Md5::new(input)
    }
}

impl From<&[u8]> for Md5 {
    fn from(input: &[u8]) -> Md5 {
        Md5::new(input)
    }
}

/// One-shot digest of `data`.
pub fn md5(data: impl AsRef<[u8]>) -> Md5Digest {
    Md5::new(data).compute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferError;

    fn hex_digest(input: &str) -> String {
        md5(input).to_string()
    }

    #[test]
    fn rfc1321_suite() {
        assert_eq!(hex_digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hex_digest("a"), "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(hex_digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            hex_digest("message digest"),
            "f96b697d7cb7938d525a2f31aaf161d0"
        );
        assert_eq!(
            hex_digest("abcdefghijklmnopqrstuvwxyz"),
            "c3fcd3d76192e4007dfb496cca67e13b"
        );
        assert_eq!(
            hex_digest("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"),
            "d174ab98d277d9f5a5611c2c9f419d9f"
        );
        assert_eq!(
            hex_digest(
                "12345678901234567890123456789012345678901234567890123456789012345678901234567890"
            ),
            "57edf4a22be3c955ac49da2e2107b67a"
        );
        assert_eq!(
            hex_digest("The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn sine_table_matches_definition() {
        for (i, k) in SINE_TABLE.iter().enumerate() {
            let expected = ((i as f64 + 1.0).sin().abs() * 4_294_967_296.0) as u32;
            assert_eq!(*k, expected, "constant {}", i);
        }
    }

    #[test]
    fn padding_lengths() {
        for (len, padded) in &[(0, 64), (1, 64), (55, 64), (56, 128), (63, 128), (64, 128), (119, 128), (120, 192)] {
            assert_eq!(Md5::new(vec![0x61u8; *len]).padded_len(), *padded, "input length {}", len);
        }
    }

    #[test]
    fn padding_layout() {
        let padded = pad(b"abc");
        assert_eq!(&padded[..4], hex!("61 62 63 80"));
        assert!(padded[4..LENGTH_OFFSET].iter().all(|b| *b == 0));
        assert_eq!(&padded[LENGTH_OFFSET..], hex!("18 00 00 00 00 00 00 00"));
    }

    #[test]
    fn digest_into_buffer() {
        let mut out = ByteBuffer::new();
        out.write_u8(0xff).unwrap();
        Md5::new("").digest(&mut out).unwrap();
        assert_eq!(
            out.as_bytes(),
            hex!("ff d4 1d 8c d9 8f 00 b2 04 e9 80 09 98 ec f8 42 7e")
        );
    }

    #[test]
    fn repeated_digest_is_identical() {
        let mut engine = Md5::new("abc");
        let mut first = ByteBuffer::new();
        let mut second = ByteBuffer::new();
        engine.digest(&mut first).unwrap();
        engine.digest(&mut second).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(engine.compute(), engine.compute());
        assert_eq!(engine.compute().as_bytes(), first.as_bytes());
    }

    #[test]
    fn update_accumulates() {
        let mut engine = Md5::new("message ");
        engine.update("digest");
        assert_eq!(engine.input(), b"message digest");
        assert_eq!(engine.compute(), md5("message digest"));
    }

    #[test]
    fn multi_block_input() {
        let data = vec![0x5au8; 1000];
        let mut engine = Md5::from(&data[..]);
        assert_eq!(engine.padded_len(), 1024);
        let digest = engine.compute();
        assert_eq!(digest, md5(&data));
        assert_ne!(digest, md5(&data[..999]));
    }

    #[test]
    fn digest_into_view_writes_nothing() {
        let parent = ByteBuffer::from(&hex!("00 01")[..]);
        let mut view = parent.slice(2).unwrap();
        assert_eq!(
            Md5::from("abc").digest(&mut view).unwrap_err(),
            BufferError::ImmutableBufferWrite
        );
        assert_eq!(view.as_bytes(), hex!("00 01"));
    }

    #[test]
    fn formatting() {
        let digest = md5("abc");
        assert_eq!(format!("{:x}", digest), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(format!("{:X}", digest), "900150983CD24FB0D6963F7D28E17F72");
        assert_eq!(digest.as_ref().len(), MD5_DIGEST_LEN);
    }
}
