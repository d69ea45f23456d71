//! Stateless helpers operating on already-encoded RLP data.

use bytes::Bytes;

use crate::header::{self, read_kind, EMPTY_STRING_CODE};
use crate::{Error, Kind, Result};

/// An already-encoded RLP value.
///
/// `RawValue` defers decoding, or carries a pre-computed encoding into an
/// outer value. The contents are not validated when encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawValue(pub(crate) Bytes);

impl RawValue {
    /// Wraps encoded bytes without validating them.
    #[inline]
    pub fn new(data: Bytes) -> Self {
        Self(data)
    }

    /// The encoded bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Unwraps the encoded bytes.
    #[inline]
    pub fn into_inner(self) -> Bytes {
        self.0
    }
}

impl From<Vec<u8>> for RawValue {
    #[inline]
    fn from(data: Vec<u8>) -> Self {
        Self(data.into())
    }
}

impl AsRef<[u8]> for RawValue {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Splits `b` into the kind and content of its first value plus all bytes
/// after that value.
pub fn split(b: &[u8]) -> Result<(Kind, &[u8], &[u8])> {
    let (kind, tag_size, content_size) = read_kind(b)?;
    Ok((kind, &b[tag_size..tag_size + content_size], &b[tag_size + content_size..]))
}

/// Splits `b` into the content of its first string value and the rest.
///
/// Fails with [`Error::ExpectedString`] if the first value is a list.
pub fn split_string(b: &[u8]) -> Result<(&[u8], &[u8])> {
    let (kind, content, rest) = split(b)?;
    if kind == Kind::List {
        return Err(Error::ExpectedString);
    }
    Ok((content, rest))
}

/// Splits `b` into the payload of its first list value and the rest.
///
/// Fails with [`Error::ExpectedList`] if the first value is not a list.
pub fn split_list(b: &[u8]) -> Result<(&[u8], &[u8])> {
    match split(b)? {
        (Kind::List, content, rest) => Ok((content, rest)),
        _ => Err(Error::ExpectedList),
    }
}

/// Decodes the integer at the start of `b`, returning it and the rest.
///
/// The canonical-integer rules apply: no leading zero bytes, and zero is the
/// empty string.
pub fn split_uint64(b: &[u8]) -> Result<(u64, &[u8])> {
    let (content, rest) = split_string(b)?;
    match content.len() {
        0 => Ok((0, rest)),
        1 if content[0] == 0 => Err(Error::NonCanonicalInteger),
        1 => Ok((content[0] as u64, rest)),
        n if n > 8 => Err(Error::UintOverflow),
        _ => match header::read_size(content, content.len() as u8) {
            Ok(x) => Ok((x, rest)),
            Err(_) => Err(Error::NonCanonicalInteger),
        },
    }
}

/// Counts the encoded values in `b`.
pub fn count_values(mut b: &[u8]) -> Result<usize> {
    let mut count = 0;
    while !b.is_empty() {
        let (_, tag_size, content_size) = read_kind(b)?;
        b = &b[tag_size + content_size..];
        count += 1;
    }
    Ok(count)
}

/// Appends the canonical encoding of `i` to `out`.
pub fn append_uint64(out: &mut Vec<u8>, i: u64) {
    if i == 0 {
        out.push(EMPTY_STRING_CODE);
    } else if i < 0x80 {
        out.push(i as u8);
    } else {
        let mut buf = [0u8; 8];
        let n = header::put_int(&mut buf, i);
        out.push(EMPTY_STRING_CODE + n as u8);
        out.extend_from_slice(&buf[..n]);
    }
}

/// Encoded size of `b` as an RLP string.
pub fn bytes_size(b: &[u8]) -> u64 {
    match b {
        [] => 1,
        [x] if *x <= 0x7F => 1,
        [_] => 2,
        _ => (header::head_size(b.len() as u64) + b.len()) as u64,
    }
}

/// Encoded size of `s` as an RLP string.
pub fn string_size(s: &str) -> u64 {
    bytes_size(s.as_bytes())
}

/// Encoded size of an RLP list whose payload is `content_size` bytes.
pub fn list_size(content_size: u64) -> u64 {
    header::head_size(content_size) as u64 + content_size
}

/// Encoded size of the integer `x`.
pub fn int_size(x: u64) -> usize {
    if x < 0x80 {
        1
    } else {
        1 + header::int_size(x)
    }
}

/// Iterates over the encoded elements of an encoded list.
///
/// Each item is the complete encoding of one element (header plus payload).
#[derive(Debug)]
pub struct ListIterator<'a> {
    data: &'a [u8],
}

impl<'a> ListIterator<'a> {
    /// Creates an iterator over the elements of the list at the start of
    /// `list`.
    pub fn new(list: &'a [u8]) -> Result<Self> {
        let (content, _) = split_list(list)?;
        Ok(Self { data: content })
    }
}

impl<'a> Iterator for ListIterator<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        match read_kind(self.data) {
            Ok((_, tag_size, content_size)) => {
                let (value, rest) = self.data.split_at(tag_size + content_size);
                self.data = rest;
                Some(Ok(value))
            }
            Err(err) => {
                self.data = &[];
                Some(Err(err))
            }
        }
    }
}
