use std::io::{self, Write};

use bytes::{Bytes, BytesMut};
use ethnum::U256;
use num_bigint::BigUint;

use crate::buffer::{get_buffer, put_buffer, EncodeBuffer, EncodeReader};
use crate::{Kind, RawValue};

/// A type that can be encoded via RLP.
///
/// Implementations write their encoding through the buffer's typed
/// operations; the buffer takes care of list framing and canonical form.
/// Custom implementations compose: a nested value is encoded by calling its
/// `encode` with the same buffer.
pub trait Encodable {
    /// Writes the RLP encoding of `self` into `out`.
    fn encode(&self, out: &mut EncodeBuffer);

    /// The RLP kind that stands in for an absent value of this type when a
    /// struct field carries a `nil` tag. Integers, booleans and byte-shaped
    /// types use the empty string; everything else the empty list.
    #[doc(hidden)]
    const NIL_KIND: Kind = Kind::List;

    /// Whether sequences of this element are byte strings on the wire.
    /// Only `u8` sets this.
    #[doc(hidden)]
    const IS_BYTE: bool = false;

    /// Writes a homogeneous sequence of this type. Sequences are
    /// classified by element shape: byte elements form an RLP string,
    /// anything else a list.
    #[doc(hidden)]
    fn encode_slice(values: &[Self], out: &mut EncodeBuffer)
    where
        Self: Sized,
    {
        encode_list(values, out)
    }
}

/// Encodes `value` and writes the output to `w`.
///
/// The encoding is buffered and flushed in one pass, so `w` does not see
/// many small writes.
pub fn encode<W: Write>(mut w: W, value: &(impl Encodable + ?Sized)) -> io::Result<()> {
    let mut buf = get_buffer();
    value.encode(&mut buf);
    let res = buf.flush_to(&mut w);
    put_buffer(buf);
    res
}

/// Returns the RLP encoding of `value`.
pub fn encode_to_bytes(value: &(impl Encodable + ?Sized)) -> Vec<u8> {
    let mut buf = get_buffer();
    value.encode(&mut buf);
    let out = buf.to_bytes();
    put_buffer(buf);
    out
}

/// Returns the total encoded size of `value` together with a lazy reader
/// over the encoding.
///
/// The backing buffer travels with the reader and is recycled once the
/// reader is exhausted or dropped.
pub fn encode_to_reader(value: &(impl Encodable + ?Sized)) -> (usize, EncodeReader) {
    let mut buf = get_buffer();
    value.encode(&mut buf);
    (buf.size(), EncodeReader::new(buf))
}

/// Encodes a slice of items as an RLP list.
pub fn encode_list<T: Encodable>(values: &[T], out: &mut EncodeBuffer) {
    if values.is_empty() {
        out.write_empty_list();
        return;
    }
    let idx = out.open_list();
    for value in values {
        value.encode(out);
    }
    out.close_list(idx);
}

/// Encodes all items from an iterator as an RLP list.
///
/// The deferred-header buffer sizes the list after the fact, so the
/// iterator is consumed exactly once.
pub fn encode_iter<T: Encodable>(values: impl Iterator<Item = T>, out: &mut EncodeBuffer) {
    let idx = out.open_list();
    for value in values {
        value.encode(out);
    }
    out.close_list(idx);
}

macro_rules! uint_impl {
    ($($t:ty),+ $(,)?) => {$(
        impl Encodable for $t {
            #[inline]
            fn encode(&self, out: &mut EncodeBuffer) {
                out.write_uint64(*self as u64);
            }

            const NIL_KIND: Kind = Kind::String;
        }
    )+};
}

uint_impl!(u16, u32, u64, usize);

impl Encodable for u8 {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_uint64(*self as u64);
    }

    const NIL_KIND: Kind = Kind::String;

    const IS_BYTE: bool = true;

    #[inline]
    fn encode_slice(values: &[Self], out: &mut EncodeBuffer) {
        out.write_bytes(values);
    }
}

impl Encodable for u128 {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_uint128(*self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Encodable for bool {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_bool(*self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Encodable for [u8] {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_bytes(self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl<const N: usize> Encodable for [u8; N] {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_bytes(self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Encodable for str {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_str(self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Encodable for BigUint {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_biguint(self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Encodable for U256 {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_u256(self);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Encodable for RawValue {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        out.write_raw(&self.0);
    }

    const NIL_KIND: Kind = Kind::String;
}

impl<T: Encodable> Encodable for Vec<T> {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        T::encode_slice(self, out)
    }

    const NIL_KIND: Kind = if T::IS_BYTE { Kind::String } else { Kind::List };
}

macro_rules! deref_impl {
    ($([$($gen:tt)*] $t:ty),+ $(,)?) => {$(
        impl<$($gen)*> Encodable for $t {
            #[inline]
            fn encode(&self, out: &mut EncodeBuffer) {
                (**self).encode(out)
            }

            const NIL_KIND: Kind = <<$t as core::ops::Deref>::Target as Encodable>::NIL_KIND;
        }
    )+};
}

deref_impl! {
    [] String,
    [] Bytes,
    [] BytesMut,
    [T: ?Sized + Encodable] &T,
    [T: ?Sized + Encodable] &mut T,
    [T: ?Sized + Encodable] Box<T>,
    [T: ?Sized + Encodable] std::rc::Rc<T>,
    [T: ?Sized + Encodable] std::sync::Arc<T>,
}

impl<T: ?Sized + ToOwned + Encodable> Encodable for std::borrow::Cow<'_, T> {
    #[inline]
    fn encode(&self, out: &mut EncodeBuffer) {
        (**self).encode(out)
    }

    const NIL_KIND: Kind = T::NIL_KIND;
}
