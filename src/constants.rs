// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! Constants shared by the buffer, the field encoders and the digest engine.
//!
//! The MD5 constants must remain unchanged so that digests match RFC 1321.

/// Capacity of a freshly created owning buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// Size of one MD5 compression block in bytes.
pub const MD5_BLOCK_LEN: usize = 64;

/// Size of an MD5 digest in bytes.
pub const MD5_DIGEST_LEN: usize = 16;

/// Initial accumulator words A, B, C, D.
pub const MD5_INITIAL_STATE: [u32; 4] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476];

/// Tag plus length prefix of a TLV field.
pub const TLV_HEADER_LEN: usize = 4;
