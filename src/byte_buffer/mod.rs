// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! Growable byte buffer with independent read and write cursors.
//!
//! Integers are written and read big-endian. A buffer either owns its storage,
//! in which case it grows by doubling whenever a write would overflow, or is a
//! read-only view borrowed from another buffer by [`ByteBuffer::slice`].
//! The borrow checker ties every view to the buffer it was sliced from.
//!
//! ```
//! use oicq_wire::ByteBuffer;
//! let mut buf = ByteBuffer::new();
//! buf.write_u16(0x0102)?.write_u8(0x03)?;
//! assert_eq!(buf.to_hex_string(), "01 02 03 ");
//! assert_eq!(buf.read_u16()?, 0x0102);
//! # Ok::<(), oicq_wire::BufferError>(())
//! ```

mod primitives;

pub use self::primitives::WirePrimitive;

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::{debug, trace};

use crate::{
    constants::DEFAULT_BUFFER_SIZE,
    error::{BufferError, Result},
    hex::{parse_hex_pairs, HexDump},
    visitor::BufferVisitor,
};

#[derive(Clone)]
enum Storage<'a> {
    /// `capacity` is the logical capacity: it only ever doubles.
    Owned { data: BytesMut, capacity: usize },
    View(&'a [u8]),
}

/// Byte buffer with a read cursor and a write cursor.
///
/// Invariant: `read_cursor <= write_cursor <= capacity`.
#[derive(Clone)]
pub struct ByteBuffer<'a> {
    storage: Storage<'a>,
    read_cursor: usize,
}

impl ByteBuffer<'static> {
    /// Create an empty owning buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create an empty owning buffer with room for `capacity` bytes before it first grows.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ByteBuffer {
            storage: Storage::Owned {
                data: BytesMut::with_capacity(capacity),
                capacity,
            },
            read_cursor: 0,
        }
    }
}

impl Default for ByteBuffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[u8]> for ByteBuffer<'static> {
    fn from(bytes: &[u8]) -> Self {
        let capacity = bytes.len().max(DEFAULT_BUFFER_SIZE);
        let mut data = BytesMut::with_capacity(capacity);
        data.extend_from_slice(bytes);
        ByteBuffer {
            storage: Storage::Owned { data, capacity },
            read_cursor: 0,
        }
    }
}

impl From<Vec<u8>> for ByteBuffer<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(&bytes[..])
    }
}

impl<'a> ByteBuffer<'a> {
    /// The written region, `[0, write_cursor)`.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned { data, .. } => &data[..],
            Storage::View(view) => *view,
        }
    }

    /// The bytes not yet consumed by reads, `[read_cursor, write_cursor)`.
    pub fn unread(&self) -> &[u8] {
        &self.as_bytes()[self.read_cursor..]
    }

    pub fn read_cursor(&self) -> usize {
        self.read_cursor
    }

    pub fn write_cursor(&self) -> usize {
        self.as_bytes().len()
    }

    /// Number of bytes that can still be read.
    pub fn remaining(&self) -> usize {
        self.write_cursor() - self.read_cursor
    }

    /// Logical capacity. For a view this is the length of the aliased region.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Owned { capacity, .. } => *capacity,
            Storage::View(view) => view.len(),
        }
    }

    /// Whether this buffer is a read-only view into another buffer.
    pub fn is_view(&self) -> bool {
        matches!(self.storage, Storage::View(_))
    }

    /// Make room for `additional` more bytes, doubling the capacity as many
    /// times as needed. Fails without side effects on a view.
    fn reserve(&mut self, additional: usize) -> Result<&mut BytesMut> {
        match &mut self.storage {
            Storage::View(_) => Err(BufferError::ImmutableBufferWrite),
            Storage::Owned { data, capacity } => {
                let required = data
                    .len()
                    .checked_add(additional)
                    .ok_or_else(|| BufferError::out_of_bounds(additional, usize::MAX - data.len()))?;
                if required > *capacity {
                    let mut grown = *capacity;
                    while grown < required {
                        grown = grown.saturating_mul(2);
                    }
                    data.reserve(grown - data.len());
                    trace!(from = *capacity, to = grown, "growing byte buffer");
                    *capacity = grown;
                }
                Ok(data)
            }
        }
    }

    /// Append a primitive most-significant byte first.
    pub fn write<T: WirePrimitive>(&mut self, v: T) -> Result<&mut Self> {
        v.put_be(self.reserve(T::WIDTH)?);
        Ok(self)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<&mut Self> {
        self.write(v)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<&mut Self> {
        self.write(v)
    }

    pub fn write_u32(&mut self, v: u32) -> Result<&mut Self> {
        self.write(v)
    }

    pub fn write_u64(&mut self, v: u64) -> Result<&mut Self> {
        self.write(v)
    }

    /// Append `v` least-significant byte first, for the few fields
    /// (such as digest words) that are defined that way.
    pub fn write_u16_le(&mut self, v: u16) -> Result<&mut Self> {
        self.reserve(2)?.put_u16_le(v);
        Ok(self)
    }

    pub fn write_u32_le(&mut self, v: u32) -> Result<&mut Self> {
        self.reserve(4)?.put_u32_le(v);
        Ok(self)
    }

    pub fn write_u64_le(&mut self, v: u64) -> Result<&mut Self> {
        self.reserve(8)?.put_u64_le(v);
        Ok(self)
    }

    /// Append raw bytes verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.reserve(bytes.len())?.extend_from_slice(bytes);
        Ok(self)
    }

    /// Append the bytes spelled by a whitespace-separated list of two-digit hex tokens,
    /// such as `"1A 2B 34 55"`.
    ///
    /// The expression is validated in full first: on error nothing is appended.
    pub fn write_hex_string(&mut self, expr: &str) -> Result<&mut Self> {
        let bytes = parse_hex_pairs(expr).map_err(|e| {
            debug!(error = %e, "rejected hex expression");
            e
        })?;
        self.write_bytes(&bytes)
    }

    /// Unread bytes, provided at least `len` of them remain.
    fn unread_checked(&self, len: usize) -> Result<&[u8]> {
        let unread = self.unread();
        if unread.len() < len {
            Err(BufferError::out_of_bounds(len, unread.len()))
        } else {
            Ok(unread)
        }
    }

    /// Consume a big-endian primitive. Leaves the read cursor alone on failure.
    pub fn read<T: WirePrimitive>(&mut self) -> Result<T> {
        let mut unread = self.unread_checked(T::WIDTH)?;
        let v = T::get_be(&mut unread);
        self.read_cursor += T::WIDTH;
        Ok(v)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    /// Consume `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        let bytes = Bytes::copy_from_slice(&self.unread_checked(len)?[..len]);
        self.read_cursor += len;
        Ok(bytes)
    }

    /// Run a composite read, restoring the read cursor if any part of it fails.
    pub fn read_with<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let start = self.read_cursor;
        let result = f(self);
        if result.is_err() {
            self.read_cursor = start;
        }
        result
    }

    /// Move the read cursor back to the start of the buffer.
    pub fn rewind(&mut self) {
        self.read_cursor = 0;
    }

    /// Discard all written bytes, keeping the capacity.
    pub fn clear(&mut self) -> Result<()> {
        match &mut self.storage {
            Storage::View(_) => Err(BufferError::ImmutableBufferWrite),
            Storage::Owned { data, .. } => {
                data.clear();
                self.read_cursor = 0;
                Ok(())
            }
        }
    }

    fn truncate(&mut self, len: usize) {
        if let Storage::Owned { data, .. } = &mut self.storage {
            data.truncate(len);
        }
        self.read_cursor = self.read_cursor.min(len);
    }

    /// Read-only view of the first `length` written bytes.
    pub fn slice(&self, length: usize) -> Result<ByteBuffer<'_>> {
        self.slice_at(0, length)
    }

    /// Read-only view of `length` written bytes starting at `offset`.
    ///
    /// The view has its own cursors: its read cursor starts at zero and its
    /// write cursor is `length`. Fails if `length` is zero or the range goes
    /// past the written region.
    pub fn slice_at(&self, offset: usize, length: usize) -> Result<ByteBuffer<'_>> {
        let written = self.as_bytes();
        match offset.checked_add(length) {
            Some(end) if length > 0 && end <= written.len() => Ok(ByteBuffer {
                storage: Storage::View(&written[offset..end]),
                read_cursor: 0,
            }),
            _ => Err(BufferError::out_of_bounds(
                length,
                written.len().saturating_sub(offset),
            )),
        }
    }

    /// Apply a field encoder to this buffer, returning the buffer for chaining.
    ///
    /// If the visitor fails, anything it had already appended is discarded.
    pub fn do_visit<V>(&mut self, visitor: &V) -> Result<&mut Self>
    where
        V: BufferVisitor + ?Sized,
    {
        let start = self.write_cursor();
        if let Err(e) = visitor.visit(self) {
            self.truncate(start);
            return Err(e);
        }
        Ok(self)
    }

    /// Lazily formatted hex dump of the written region, for logging.
    pub fn hex(&self) -> HexDump<'_> {
        HexDump(self.as_bytes())
    }

    /// Uppercase hex pairs of the written region, each followed by a space.
    pub fn to_hex_string(&self) -> String {
        self.hex().to_string()
    }

    /// Convert into immutable `Bytes`, copying only if this is a view.
    pub fn into_bytes(self) -> Bytes {
        match self.storage {
            Storage::Owned { data, .. } => data.freeze(),
            Storage::View(view) => Bytes::copy_from_slice(view),
        }
    }
}

impl fmt::Debug for ByteBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("view", &self.is_view())
            .field("capacity", &self.capacity())
            .field("read_cursor", &self.read_cursor)
            .field("write_cursor", &self.write_cursor())
            .field("bytes", &self.to_hex_string())
            .finish()
    }
}
