// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! Wire-format substrate for an OICQ-style instant messaging client:
//! a big-endian [`ByteBuffer`] with read-only views, pluggable packet-field
//! encoders ([`BufferVisitor`]) and the MD5 digest used on credentials.

#[cfg(test)]
#[macro_use]
extern crate hex_literal;
#[cfg(test)]
#[macro_use]
extern crate proptest;
#[cfg(test)]
#[macro_use]
extern crate static_assertions;

pub mod byte_buffer;
pub mod constants;
pub mod error;
pub mod hex;
pub mod md5;
pub mod tlv;
pub mod visitor;

pub use crate::{
    byte_buffer::{ByteBuffer, WirePrimitive},
    error::{BufferError, Result},
    hex::HexDump,
    md5::{md5, Md5, Md5Digest},
    tlv::Tlv,
    visitor::{visitor_fn, BufferVisitor, FnVisitor},
};
