// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! Pluggable packet-field encoders.
//!
//! The buffer knows nothing about field layouts: a field is anything that can
//! append its own encoding, and [`ByteBuffer::do_visit`] chains them.
//!
//! ```
//! use oicq_wire::{visitor_fn, ByteBuffer, Tlv};
//! let version = visitor_fn(|buf: &mut ByteBuffer<'_>| buf.write_u16(0x0001).map(|_| ()));
//! let mut packet = ByteBuffer::new();
//! packet
//!     .do_visit(&version)?
//!     .do_visit(&Tlv::new(0x0018, &b"\x00\x01"[..]))?;
//! assert_eq!(packet.to_hex_string(), "00 01 00 18 00 02 00 01 ");
//! # Ok::<(), oicq_wire::BufferError>(())
//! ```

use crate::{byte_buffer::ByteBuffer, error::Result};

/// Something that appends one structured field to a buffer.
pub trait BufferVisitor {
    /// Append this field's encoding to `buf`.
    fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()>;
}

/// Adapter turning a closure into a [`BufferVisitor`].
#[derive(Debug, Clone, Copy)]
pub struct FnVisitor<F>(F);

/// Wrap a closure as a field encoder.
pub fn visitor_fn<F>(f: F) -> FnVisitor<F>
where
    F: Fn(&mut ByteBuffer<'_>) -> Result<()>,
{
    FnVisitor(f)
}

impl<F> BufferVisitor for FnVisitor<F>
where
    F: Fn(&mut ByteBuffer<'_>) -> Result<()>,
{
    fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()> {
        (self.0)(buf)
    }
}

impl<V: BufferVisitor + ?Sized> BufferVisitor for Box<V> {
    fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()> {
        (**self).visit(buf)
    }
}

/// A sequence of fields is itself a field: each is applied in order.
impl<V: BufferVisitor> BufferVisitor for [V] {
    fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()> {
        self.iter().try_for_each(|field| field.visit(buf))
    }
}

impl<V: BufferVisitor> BufferVisitor for Vec<V> {
    fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()> {
        self[..].visit(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferError;

    struct Marker(u8);

    impl BufferVisitor for Marker {
        fn visit(&self, buf: &mut ByteBuffer<'_>) -> Result<()> {
            buf.write_u8(self.0)?;
            Ok(())
        }
    }

    #[test]
    fn chaining() {
        let mut buf = ByteBuffer::new();
        buf.do_visit(&Marker(1))
            .unwrap()
            .do_visit(&Marker(2))
            .unwrap()
            .do_visit(&Marker(3))
            .unwrap();
        assert_eq!(buf.as_bytes(), hex!("01 02 03"));
    }

    #[test]
    fn not_idempotent_by_itself() {
        let mut buf = ByteBuffer::new();
        let field = Marker(7);
        buf.do_visit(&field).unwrap();
        buf.do_visit(&field).unwrap();
        assert_eq!(buf.as_bytes(), hex!("07 07"));
    }

    #[test]
    fn sequences_and_trait_objects() {
        let fields: Vec<Box<dyn BufferVisitor>> = vec![
            Box::new(Marker(0xaa)),
            Box::new(visitor_fn(|buf: &mut ByteBuffer<'_>| {
                buf.write_u16(0xbbcc).map(|_| ())
            })),
        ];
        let mut buf = ByteBuffer::new();
        buf.do_visit(&fields).unwrap();
        assert_eq!(buf.as_bytes(), hex!("aa bb cc"));
    }

    #[test]
    fn visiting_a_view_fails() {
        let buf = ByteBuffer::from(&hex!("01 02")[..]);
        let mut view = buf.slice(1).unwrap();
        assert_eq!(
            view.do_visit(&Marker(0)).unwrap_err(),
            BufferError::ImmutableBufferWrite
        );
        assert_eq!(view.as_bytes(), hex!("01"));
    }
}
