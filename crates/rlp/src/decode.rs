use core::any;
use std::io::BufRead;

use bytes::{Bytes, BytesMut};
use ethnum::U256;
use num_bigint::BigUint;

use crate::{DecodeError, Error, Kind, RawValue, Result, Stream};

/// A type that can be decoded from an RLP stream.
///
/// `decode` must consume exactly one value from the stream.
pub trait Decodable: Sized {
    /// Decodes one value from the stream.
    fn decode(s: &mut Stream<'_>) -> Result<Self>;

    /// The RLP kind accepted as the absent marker for this type when a
    /// struct field carries a `nil` tag. Mirrors
    /// [`Encodable::NIL_KIND`](crate::Encodable::NIL_KIND).
    #[doc(hidden)]
    const NIL_KIND: Kind = Kind::List;

    /// Whether sequences of this element are byte strings on the wire.
    /// Only `u8` sets this. Mirrors
    /// [`Encodable::IS_BYTE`](crate::Encodable::IS_BYTE).
    #[doc(hidden)]
    const IS_BYTE: bool = false;

    /// Decodes a homogeneous sequence of this type. Sequences are
    /// classified by element shape: byte elements read an RLP string,
    /// anything else a list.
    #[doc(hidden)]
    fn decode_vec(s: &mut Stream<'_>) -> Result<Vec<Self>> {
        decode_list(s)
    }
}

/// Decodes one value from `reader`.
///
/// With `limit` set, a value declaring a size beyond the remaining
/// allowance is rejected with [`Error::ValueTooLarge`] before its payload
/// is read. Without a limit the decoder is vulnerable to huge size
/// declarations; prefer a limit for untrusted input.
pub fn decode<T: Decodable, R: BufRead>(reader: &mut R, limit: Option<u64>) -> Result<T> {
    let mut s = Stream::new(reader, limit);
    decorate(T::decode(&mut s))
}

/// Decodes exactly one value from `data`.
///
/// Trailing bytes after the value fail with [`Error::MoreThanOneValue`].
pub fn decode_from_bytes<T: Decodable>(data: &[u8]) -> Result<T> {
    let mut s = Stream::from_slice(data);
    let value = decorate(T::decode(&mut s))?;
    if s.input_remaining() > 0 {
        return Err(Error::MoreThanOneValue);
    }
    Ok(value)
}

/// Appends the decode target's type name to structured errors so the
/// breadcrumb trail reads from the outermost type inward.
fn decorate<T>(res: Result<T>) -> Result<T> {
    res.map_err(|err| err.context(format!("({})", any::type_name::<T>())))
}

macro_rules! uint_impl {
    ($($t:ty),+ $(,)?) => {$(
        impl Decodable for $t {
            #[inline]
            fn decode(s: &mut Stream<'_>) -> Result<Self> {
                let bits = (core::mem::size_of::<$t>() * 8) as u32;
                match s.uint(bits) {
                    Ok(v) => Ok(v as $t),
                    Err(err) => Err(err.for_type(any::type_name::<$t>())),
                }
            }

            const NIL_KIND: Kind = Kind::String;
        }
    )+};
}

uint_impl!(u16, u32, u64, usize);

impl Decodable for u8 {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        match s.uint(8) {
            Ok(v) => Ok(v as u8),
            Err(err) => Err(err.for_type("u8")),
        }
    }

    const NIL_KIND: Kind = Kind::String;

    const IS_BYTE: bool = true;

    #[inline]
    fn decode_vec(s: &mut Stream<'_>) -> Result<Vec<Self>> {
        s.bytes().map_err(|e| e.for_type(any::type_name::<Vec<u8>>()))
    }
}

impl Decodable for u128 {
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        let typ = any::type_name::<u128>();
        let (kind, size) = s.kind().map_err(|e| e.for_type(typ))?;
        match kind {
            Kind::List => Err(Error::ExpectedString.for_type(typ)),
            Kind::Byte => {
                if s.byte_value() == 0 {
                    return Err(Error::NonCanonicalInteger.for_type(typ));
                }
                s.rearm();
                Ok(s.byte_value() as u128)
            }
            Kind::String if size == 0 => {
                s.rearm();
                Ok(0)
            }
            Kind::String if size > 16 => Err(Error::UintOverflow.for_type(typ)),
            Kind::String => {
                let n = size as usize;
                let mut buf = [0u8; 16];
                s.read_full(&mut buf[16 - n..]).map_err(|e| e.for_type(typ))?;
                if n == 1 && buf[15] < 0x80 {
                    return Err(Error::NonCanonicalSize.for_type(typ));
                }
                if buf[16 - n] == 0 {
                    return Err(Error::NonCanonicalInteger.for_type(typ));
                }
                Ok(u128::from_be_bytes(buf))
            }
        }
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for bool {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        s.bool().map_err(|e| e.for_type("bool"))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for String {
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        let b = s.bytes().map_err(|e| e.for_type("String"))?;
        String::from_utf8(b).map_err(|_| Error::Custom("invalid utf8 string"))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for Bytes {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        s.bytes().map(Into::into).map_err(|e| e.for_type("Bytes"))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for BytesMut {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        s.bytes().map(|b| Self::from(&b[..])).map_err(|e| e.for_type("BytesMut"))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl<const N: usize> Decodable for [u8; N] {
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        let typ = any::type_name::<Self>();
        let (kind, size) = s.kind().map_err(|e| e.for_type(typ))?;
        let mut arr = [0u8; N];
        match kind {
            Kind::Byte => {
                if N == 0 {
                    return Err(DecodeError::new("input string too long", typ).into());
                }
                if N > 1 {
                    return Err(DecodeError::new("input string too short", typ).into());
                }
                arr[0] = s.byte_value();
                s.rearm();
            }
            Kind::String => {
                if (N as u64) < size {
                    return Err(DecodeError::new("input string too long", typ).into());
                }
                if (N as u64) > size {
                    return Err(DecodeError::new("input string too short", typ).into());
                }
                s.read_full(&mut arr).map_err(|e| e.for_type(typ))?;
                if size == 1 && arr[0] < 0x80 {
                    return Err(Error::NonCanonicalSize.for_type(typ));
                }
            }
            Kind::List => return Err(Error::ExpectedString.for_type(typ)),
        }
        Ok(arr)
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for RawValue {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        s.raw().map(|v| Self(v.into()))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for BigUint {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        s.big_int().map_err(|e| e.for_type("BigUint"))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl Decodable for U256 {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        s.u256().map_err(|e| e.for_type("U256"))
    }

    const NIL_KIND: Kind = Kind::String;
}

impl<T: Decodable> Decodable for Vec<T> {
    #[inline]
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        T::decode_vec(s)
    }

    const NIL_KIND: Kind = if T::IS_BYTE { Kind::String } else { Kind::List };
}

/// The list path of sequence decoding: one element per list entry, with
/// `[index]` breadcrumbs on element errors.
fn decode_list<T: Decodable>(s: &mut Stream<'_>) -> Result<Vec<T>> {
    let typ = any::type_name::<Vec<T>>();
    s.list().map_err(|e| e.for_type(typ))?;
    let mut vec = Vec::new();
    let mut index = 0usize;
    loop {
        match T::decode(s) {
            Ok(value) => vec.push(value),
            Err(Error::EndOfList) => break,
            Err(err) => return Err(err.context(format!("[{index}]"))),
        }
        index += 1;
    }
    s.end_list().map_err(|e| e.for_type(typ))?;
    Ok(vec)
}

macro_rules! wrap_impl {
    ($([$($gen:tt)*] <$t:ty>::$new:ident($t2:ty)),+ $(,)?) => {$(
        impl<$($gen)*> Decodable for $t {
            #[inline]
            fn decode(s: &mut Stream<'_>) -> Result<Self> {
                <$t2 as Decodable>::decode(s).map(<$t>::$new)
            }

            const NIL_KIND: Kind = <$t2 as Decodable>::NIL_KIND;
        }
    )+};
}

wrap_impl! {
    [T: Decodable] <Box<T>>::new(T),
    [T: Decodable] <std::rc::Rc<T>>::new(T),
    [T: Decodable] <std::sync::Arc<T>>::new(T),
}
