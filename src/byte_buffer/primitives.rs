// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

//! The single byte-order conversion point for integer fields.

use bytes::{Buf, BufMut};

/// Integer types that go over the wire most-significant byte first.
///
/// Every typed read and write in [`ByteBuffer`](super::ByteBuffer) goes
/// through this trait, so the byte order is decided in exactly one place
/// and does not depend on the host.
pub trait WirePrimitive: Copy {
    /// Number of bytes occupied on the wire.
    const WIDTH: usize;

    /// Append `self` big-endian. The caller has already made room.
    fn put_be<B: BufMut>(self, buf: &mut B);

    /// Decode a big-endian value. The caller has already checked `WIDTH` bytes remain.
    fn get_be<B: Buf>(buf: &mut B) -> Self;
}

macro_rules! wire_primitive {
    ($t:ty, $put:ident, $get:ident) => {
        impl WirePrimitive for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();

            #[inline]
            fn put_be<B: BufMut>(self, buf: &mut B) {
                buf.$put(self);
            }

            #[inline]
            fn get_be<B: Buf>(buf: &mut B) -> Self {
                buf.$get()
            }
        }
    };
}

wire_primitive!(u8, put_u8, get_u8);
wire_primitive!(i8, put_i8, get_i8);
wire_primitive!(u16, put_u16, get_u16);
wire_primitive!(i16, put_i16, get_i16);
wire_primitive!(u32, put_u32, get_u32);
wire_primitive!(i32, put_i32, get_i32);
wire_primitive!(u64, put_u64, get_u64);
wire_primitive!(i64, put_i64, get_i64);

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: WirePrimitive>(v: T) -> Vec<u8> {
        let mut buf = Vec::new();
        v.put_be(&mut buf);
        buf
    }

    #[test]
    fn most_significant_first() {
        assert_eq!(encode(0xabu8), hex!("ab"));
        assert_eq!(encode(0x1234u16), hex!("12 34"));
        assert_eq!(encode(0x1234_5678u32), hex!("12 34 56 78"));
        assert_eq!(
            encode(0x0102_0304_0506_0708u64),
            hex!("01 02 03 04 05 06 07 08")
        );
        assert_eq!(encode(-2i16), hex!("ff fe"));
    }

    #[test]
    fn widths() {
        assert_eq!(<u8 as WirePrimitive>::WIDTH, 1);
        assert_eq!(<u16 as WirePrimitive>::WIDTH, 2);
        assert_eq!(<i32 as WirePrimitive>::WIDTH, 4);
        assert_eq!(<u64 as WirePrimitive>::WIDTH, 8);
    }

    #[test]
    fn decode() {
        let mut data = &hex!("de ad be ef")[..];
        assert_eq!(u32::get_be(&mut data), 0xdead_beef);
        assert!(data.is_empty());
    }
}
