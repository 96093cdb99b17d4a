// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! Generic type-length-value field.
//!
//! Wire layout: `tag: u16`, `length: u16`, then `length` value bytes, all
//! big-endian. Which tags exist and what their values mean is up to the
//! protocol layer built on top.

use bytes::Bytes;

use crate::{
    byte_buffer::ByteBuffer,
    constants::TLV_HEADER_LEN,
    error::{BufferError, Result},
    visitor::BufferVisitor,
};

/// Largest value a TLV length field can describe.
pub const MAX_TLV_VALUE_LEN: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tlv {
    pub tag: u16,
    pub value: Bytes,
}

impl Tlv {
    pub fn new(tag: u16, value: impl Into<Bytes>) -> Tlv {
        Tlv {
            tag,
            value: value.into(),
        }
    }

    /// Build a TLV whose value is whatever `visitor` encodes, e.g. nested fields.
    pub fn from_visitor<V>(tag: u16, visitor: &V) -> Result<Tlv>
    where
        V: BufferVisitor + ?Sized,
    {
        let mut scratch = ByteBuffer::new();
        scratch.do_visit(visitor)?;
        Ok(Tlv::new(tag, scratch.into_bytes()))
    }

    /// Total encoded size, header included.
    pub fn encoded_len(&self) -> usize {
        TLV_HEADER_LEN + self.value.len()
    }

    /// Decode one TLV. On failure the read cursor is left where it was.
    pub fn read_from(buf: &mut ByteBuffer<'_>) -> Result<Tlv> {
        buf.read_with(|buf| {
            let tag = buf.read_u16()?;
            let len = buf.read_u16()? as usize;
            let value = buf.read_bytes(len)?;
            Ok(Tlv { tag, value })
        })
    }

    /// Decode TLVs until the buffer has no unread bytes left.
    pub fn read_all(buf: &mut ByteBuffer<'_>) -> Result<Vec<Tlv>> {
        buf.read_with(|buf| {
            let mut fields = Vec::new();
            while buf.remaining() > 0 {
                fields.push(Tlv::read_from(buf)?);
            }
            Ok(fields)
        })
    }
}

impl BufferVisitor for Tlv {
    fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()> {
        let len = self.value.len();
        if len > MAX_TLV_VALUE_LEN {
            return Err(BufferError::FieldTooLong {
                len,
                max: MAX_TLV_VALUE_LEN,
            });
        }
        buf.write_u16(self.tag)?
            .write_u16(len as u16)?
            .write_bytes(&self.value)?;
        Ok(())
    }
}
