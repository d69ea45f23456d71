//! Pull-parser for fragmentary decoding of RLP input streams.

use core::any;
use core::mem;
use std::io::BufRead;

use ethnum::U256;
use num_bigint::BigUint;

use crate::header::{head_size, put_head};
use crate::pool::Pool;
use crate::{Decodable, DecodeError, Error, Kind, Result};

static STACK_POOL: Pool<Vec<u64>> = Pool::new();

enum Source<'r> {
    Bytes { data: &'r [u8], pos: usize },
    Reader(&'r mut dyn BufRead),
}

impl Source<'_> {
    fn read_byte(&mut self) -> Result<u8> {
        match self {
            Self::Bytes { data, pos } => {
                let Some(&b) = data.get(*pos) else {
                    return Err(Error::UnexpectedEof);
                };
                *pos += 1;
                Ok(b)
            }
            Self::Reader(r) => {
                let mut b = [0u8; 1];
                r.read_exact(&mut b)?;
                Ok(b[0])
            }
        }
    }

    fn read_full(&mut self, out: &mut [u8]) -> Result<()> {
        match self {
            Self::Bytes { data, pos } => {
                let Some(src) = data.get(*pos..*pos + out.len()) else {
                    *pos = data.len();
                    return Err(Error::UnexpectedEof);
                };
                out.copy_from_slice(src);
                *pos += out.len();
                Ok(())
            }
            Self::Reader(r) => {
                r.read_exact(out)?;
                Ok(())
            }
        }
    }
}

impl core::fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bytes { data, pos } => {
                f.debug_struct("Bytes").field("len", &data.len()).field("pos", pos).finish()
            }
            Self::Reader(_) => f.debug_struct("Reader").finish_non_exhaustive(),
        }
    }
}

/// A pull-parser over an RLP input stream.
///
/// `Stream` decodes one value at a time: [`kind`](Self::kind) peeks the next
/// value's classification without consuming its payload, and the typed read
/// operations consume exactly one value. After a value is consumed the input
/// is positioned just before the type information of the next value.
///
/// While decoding a list, reaching the list's declared end makes all
/// operations return [`Error::EndOfList`] until [`end_list`](Self::end_list)
/// is called.
///
/// An input limit can be set; any value whose declared size exceeds the
/// remaining input fails with [`Error::ValueTooLarge`] before its payload is
/// read, protecting decoders from allocating for oversized length
/// declarations. Streams over byte slices are limited to the slice length by
/// default.
///
/// A `Stream` is not safe for concurrent use.
#[derive(Debug)]
pub struct Stream<'r> {
    source: Source<'r>,
    /// Bytes of input left when `limited`.
    remaining: u64,
    limited: bool,
    /// Encoded bytes remaining in each open list, innermost last.
    stack: Vec<u64>,
    /// Classification of the current value, held until a consuming
    /// operation clears it. Errors are cached as well.
    kind_cache: Option<Result<(Kind, u64)>>,
    /// Payload of a Byte-kind value, captured from the type tag.
    byte_val: u8,
    /// Scratch for integer decoding.
    uint_buf: [u8; 32],
}

impl<'r> Stream<'r> {
    /// Creates a stream decoding from `reader`.
    ///
    /// With `limit` set, the total size of all top-level values is bounded;
    /// a value larger than the remaining allowance fails with
    /// [`Error::ValueTooLarge`].
    pub fn new(reader: &'r mut dyn BufRead, limit: Option<u64>) -> Self {
        let mut s = Self::empty(Source::Reader(reader));
        if let Some(limit) = limit {
            s.remaining = limit;
            s.limited = true;
        }
        s
    }

    /// Creates a stream decoding from an in-memory slice.
    ///
    /// The input limit is the slice length.
    pub fn from_slice(data: &'r [u8]) -> Self {
        let mut s = Self::empty(Source::Bytes { data, pos: 0 });
        s.remaining = data.len() as u64;
        s.limited = true;
        s
    }

    /// Creates a stream positioned as if inside an encoded list of the given
    /// payload length. Calling [`list`](Self::list) first enters it.
    pub fn new_list(reader: &'r mut dyn BufRead, len: u64) -> Self {
        let mut s = Self::empty(Source::Reader(reader));
        s.remaining = len;
        s.limited = true;
        s.kind_cache = Some(Ok((Kind::List, len)));
        s
    }

    fn empty(source: Source<'r>) -> Self {
        let mut stack = STACK_POOL.get().unwrap_or_default();
        stack.clear();
        Self {
            source,
            remaining: 0,
            limited: false,
            stack,
            kind_cache: None,
            byte_val: 0,
            uint_buf: [0; 32],
        }
    }

    /// Discards all decoding context and continues from `data`.
    pub fn reset_slice(&mut self, data: &'r [u8]) {
        self.source = Source::Bytes { data, pos: 0 };
        self.remaining = data.len() as u64;
        self.limited = true;
        self.clear_context();
    }

    /// Discards all decoding context and continues from `reader`.
    pub fn reset_reader(&mut self, reader: &'r mut dyn BufRead, limit: Option<u64>) {
        self.source = Source::Reader(reader);
        self.remaining = limit.unwrap_or(0);
        self.limited = limit.is_some();
        self.clear_context();
    }

    fn clear_context(&mut self) {
        self.stack.clear();
        self.kind_cache = None;
        self.byte_val = 0;
        self.uint_buf = [0; 32];
    }

    /// Returns the kind and size of the next value without consuming its
    /// payload.
    ///
    /// For `Kind::Byte` the size is 0: the value lives in the type tag. The
    /// first call reads the value's header from the input; repeated calls
    /// return the cached classification.
    pub fn kind(&mut self) -> Result<(Kind, u64)> {
        if let Some(cached) = &self.kind_cache {
            return cached.clone();
        }

        // The end-of-list check cannot live in read_kind: reading the tag
        // would debit the list accounting and misreport the error.
        let list_limit = self.stack.last().copied();
        if list_limit == Some(0) {
            return Err(Error::EndOfList);
        }

        let mut result = self.read_kind();
        if let Ok((_, size)) = result {
            // Check the value size against the limits up front: decoders
            // allocate buffers matching the size, and this rejects absurd
            // declarations before any allocation happens.
            if let Some(limit) = list_limit {
                if size > limit {
                    result = Err(Error::ElementTooLarge);
                }
            }
            if result.is_ok() && self.limited && size > self.remaining {
                result = Err(Error::ValueTooLarge);
            }
        }
        self.kind_cache = Some(result.clone());
        result
    }

    fn read_kind(&mut self) -> Result<(Kind, u64)> {
        let b = match self.read_byte() {
            Ok(b) => b,
            Err(err) => {
                // At the top level, running out of input before a value
                // starts is normal termination, not corruption.
                let adjusted = if self.stack.is_empty() {
                    match err {
                        Error::UnexpectedEof | Error::ValueTooLarge => Error::Eof,
                        other => other,
                    }
                } else {
                    err
                };
                return Err(adjusted);
            }
        };
        self.byte_val = 0;
        match b {
            0x00..=0x7F => {
                self.byte_val = b;
                Ok((Kind::Byte, 0))
            }
            0x80..=0xB7 => Ok((Kind::String, (b - 0x80) as u64)),
            0xB8..=0xBF => {
                let size = self.read_uint(b - 0xB7)?;
                if size < 56 {
                    return Err(Error::NonCanonicalSize);
                }
                Ok((Kind::String, size))
            }
            0xC0..=0xF7 => Ok((Kind::List, (b - 0xC0) as u64)),
            0xF8..=0xFF => {
                let size = self.read_uint(b - 0xF7)?;
                if size < 56 {
                    return Err(Error::NonCanonicalSize);
                }
                Ok((Kind::List, size))
            }
        }
    }

    /// Reads an RLP string and returns its contents.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::Byte => {
                self.kind_cache = None;
                Ok(vec![self.byte_val])
            }
            Kind::String => {
                let mut b = vec![0u8; size as usize];
                self.read_full(&mut b)?;
                if size == 1 && b[0] < 0x80 {
                    return Err(Error::NonCanonicalSize);
                }
                Ok(b)
            }
            Kind::List => Err(Error::ExpectedString),
        }
    }

    /// Reads an RLP string whose size must match `b` exactly.
    pub fn read_bytes(&mut self, b: &mut [u8]) -> Result<()> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::Byte => {
                if b.len() != 1 {
                    return Err(Error::UnexpectedLength);
                }
                b[0] = self.byte_val;
                self.kind_cache = None;
                Ok(())
            }
            Kind::String => {
                if size != b.len() as u64 {
                    return Err(Error::UnexpectedLength);
                }
                self.read_full(b)?;
                if size == 1 && b[0] < 0x80 {
                    return Err(Error::NonCanonicalSize);
                }
                Ok(())
            }
            Kind::List => Err(Error::ExpectedString),
        }
    }

    /// Consumes one value and returns its canonical encoding, header
    /// included.
    pub fn raw(&mut self) -> Result<Vec<u8>> {
        let (kind, size) = self.kind()?;
        if kind == Kind::Byte {
            self.kind_cache = None;
            return Ok(vec![self.byte_val]);
        }
        // The original header has already been consumed; read the payload
        // and put a fresh header in front of it.
        let start = head_size(size);
        let mut buf = vec![0u8; start + size as usize];
        self.read_full(&mut buf[start..])?;
        if kind == Kind::String {
            put_head(&mut buf, 0x80, 0xB7, size);
        } else {
            put_head(&mut buf, 0xC0, 0xF7, size);
        }
        Ok(buf)
    }

    /// Reads an integer of at most 8 bits.
    pub fn uint8(&mut self) -> Result<u8> {
        self.uint(8).map(|i| i as u8)
    }

    /// Reads an integer of at most 16 bits.
    pub fn uint16(&mut self) -> Result<u16> {
        self.uint(16).map(|i| i as u16)
    }

    /// Reads an integer of at most 32 bits.
    pub fn uint32(&mut self) -> Result<u32> {
        self.uint(32).map(|i| i as u32)
    }

    /// Reads an integer of at most 64 bits.
    pub fn uint64(&mut self) -> Result<u64> {
        self.uint(64)
    }

    pub(crate) fn uint(&mut self, max_bits: u32) -> Result<u64> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::Byte => {
                if self.byte_val == 0 {
                    return Err(Error::NonCanonicalInteger);
                }
                self.kind_cache = None;
                Ok(self.byte_val as u64)
            }
            Kind::String => {
                if size > (max_bits / 8) as u64 {
                    return Err(Error::UintOverflow);
                }
                match self.read_uint(size as u8) {
                    // read_uint reports size-field rules; we are reading an
                    // integer payload here.
                    Err(Error::NonCanonicalSize) => Err(Error::NonCanonicalInteger),
                    Err(err) => Err(err),
                    Ok(v) if size > 0 && v < 0x80 => Err(Error::NonCanonicalSize),
                    Ok(v) => Ok(v),
                }
            }
            Kind::List => Err(Error::ExpectedString),
        }
    }

    /// Reads a boolean encoded as the integer 0 or 1.
    pub fn bool(&mut self) -> Result<bool> {
        match self.uint(8)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::Custom("invalid boolean value, must be 0 or 1")),
        }
    }

    /// Reads an arbitrary-precision integer.
    pub fn big_int(&mut self) -> Result<BigUint> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::List => Err(Error::ExpectedString),
            Kind::Byte => {
                self.kind_cache = None;
                if self.byte_val == 0 {
                    return Err(Error::NonCanonicalInteger);
                }
                Ok(BigUint::from(self.byte_val))
            }
            Kind::String if size == 0 => {
                self.kind_cache = None;
                Ok(BigUint::default())
            }
            Kind::String if size as usize <= self.uint_buf.len() => {
                let n = size as usize;
                self.will_read(size)?;
                self.source.read_full(&mut self.uint_buf[..n])?;
                if n == 1 && self.uint_buf[0] < 0x80 {
                    return Err(Error::NonCanonicalSize);
                }
                if self.uint_buf[0] == 0 {
                    return Err(Error::NonCanonicalInteger);
                }
                Ok(BigUint::from_bytes_be(&self.uint_buf[..n]))
            }
            Kind::String => {
                // Larger integers need a temporary buffer.
                let mut buffer = vec![0u8; size as usize];
                self.read_full(&mut buffer)?;
                if buffer[0] == 0 {
                    return Err(Error::NonCanonicalInteger);
                }
                Ok(BigUint::from_bytes_be(&buffer))
            }
        }
    }

    /// Reads a 256-bit integer into `dst`.
    pub fn read_u256(&mut self, dst: &mut U256) -> Result<()> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::List => Err(Error::ExpectedString),
            Kind::Byte => {
                self.kind_cache = None;
                if self.byte_val == 0 {
                    return Err(Error::NonCanonicalInteger);
                }
                *dst = U256::from(self.byte_val);
                Ok(())
            }
            Kind::String if size == 0 => {
                self.kind_cache = None;
                *dst = U256::ZERO;
                Ok(())
            }
            Kind::String if size > 32 => Err(Error::Uint256Overflow),
            Kind::String => {
                let n = size as usize;
                self.will_read(size)?;
                self.source.read_full(&mut self.uint_buf[..n])?;
                if n == 1 && self.uint_buf[0] < 0x80 {
                    return Err(Error::NonCanonicalSize);
                }
                if self.uint_buf[0] == 0 {
                    return Err(Error::NonCanonicalInteger);
                }
                let mut be = [0u8; 32];
                be[32 - n..].copy_from_slice(&self.uint_buf[..n]);
                *dst = U256::from_be_bytes(be);
                Ok(())
            }
        }
    }

    /// Reads a 256-bit integer.
    pub fn u256(&mut self) -> Result<U256> {
        let mut z = U256::ZERO;
        self.read_u256(&mut z)?;
        Ok(z)
    }

    /// Begins decoding an RLP list, returning its payload size.
    ///
    /// Until [`end_list`](Self::end_list) is called, operations at the
    /// list's end return [`Error::EndOfList`].
    pub fn list(&mut self) -> Result<u64> {
        let (kind, size) = self.kind()?;
        if kind != Kind::List {
            return Err(Error::ExpectedList);
        }
        // Move the inner list's size out of the enclosing list's slot before
        // pushing, so the outer accounting stays correct across end_list.
        if let Some(limit) = self.stack.last_mut() {
            if size > *limit {
                return Err(Error::ElementTooLarge);
            }
            *limit -= size;
        }
        self.stack.push(size);
        self.kind_cache = None;
        Ok(size)
    }

    /// Returns to the enclosing list.
    ///
    /// The input must be positioned at the end of the current list.
    pub fn end_list(&mut self) -> Result<()> {
        match self.stack.last() {
            None => Err(Error::NotInList),
            Some(&0) => {
                self.stack.pop();
                self.kind_cache = None;
                Ok(())
            }
            Some(_) => Err(Error::ListNotAtEol),
        }
    }

    /// Reports whether the current list context has more data to read.
    pub fn more_in_list(&self) -> bool {
        matches!(self.stack.last(), Some(&rem) if rem > 0)
    }

    /// Encoded bytes remaining in the innermost list, or `None` outside of
    /// any list.
    pub fn list_remaining(&self) -> Option<u64> {
        self.stack.last().copied()
    }

    /// Decodes a value that may be absent.
    ///
    /// An empty value of kind `nil_kind` (an empty string or empty list)
    /// yields `None`; an empty value of the other kind is an error; anything
    /// else decodes as `T`.
    pub fn decode_optional<T: Decodable>(&mut self, nil_kind: Kind) -> Result<Option<T>> {
        let (kind, size) = self.kind()?;
        if kind != Kind::Byte && size == 0 {
            if kind != nil_kind {
                return Err(DecodeError::new(
                    format!("wrong kind of empty value (got {kind}, want {nil_kind})"),
                    any::type_name::<T>(),
                )
                .into());
            }
            // Rearm the classification: the empty value has no payload but
            // the input position must move on to the next value.
            self.kind_cache = None;
            return Ok(None);
        }
        T::decode(self).map(Some)
    }

    /// Called before any read of `n` bytes from the source: debits the
    /// enclosing list and the input limit, rejecting reads that overrun
    /// either.
    fn will_read(&mut self, n: u64) -> Result<()> {
        self.kind_cache = None;
        if let Some(limit) = self.stack.last_mut() {
            if n > *limit {
                return Err(Error::ElementTooLarge);
            }
            *limit -= n;
        }
        if self.limited {
            if n > self.remaining {
                return Err(Error::ValueTooLarge);
            }
            self.remaining -= n;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.will_read(1)?;
        self.source.read_byte()
    }

    pub(crate) fn read_full(&mut self, out: &mut [u8]) -> Result<()> {
        self.will_read(out.len() as u64)?;
        self.source.read_full(out)
    }

    /// Reads a big-endian integer of `size` bytes, rejecting leading zeros.
    fn read_uint(&mut self, size: u8) -> Result<u64> {
        match size {
            0 => {
                self.kind_cache = None;
                Ok(0)
            }
            1 => Ok(self.read_byte()? as u64),
            _ => {
                let start = (8 - size) as usize;
                self.will_read(size as u64)?;
                self.uint_buf[..8].fill(0);
                self.source.read_full(&mut self.uint_buf[start..8])?;
                if self.uint_buf[start] == 0 {
                    return Err(Error::NonCanonicalSize);
                }
                let mut be = [0u8; 8];
                be.copy_from_slice(&self.uint_buf[..8]);
                Ok(u64::from_be_bytes(be))
            }
        }
    }

    pub(crate) fn byte_value(&self) -> u8 {
        self.byte_val
    }

    /// Bytes of the input allowance left, for trailing-data detection.
    pub(crate) fn input_remaining(&self) -> u64 {
        self.remaining
    }

    pub(crate) fn rearm(&mut self) {
        self.kind_cache = None;
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        STACK_POOL.put(mem::take(&mut self.stack));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn kind_is_cached() {
        let data = hex!("83646F67");
        let mut s = Stream::from_slice(&data);
        assert_eq!(s.kind(), Ok((Kind::String, 3)));
        assert_eq!(s.kind(), Ok((Kind::String, 3)));
        assert_eq!(s.bytes(), Ok(b"dog".to_vec()));
        assert_eq!(s.kind(), Err(Error::Eof));
    }

    #[test]
    fn byte_values() {
        let data = hex!("0480");
        let mut s = Stream::from_slice(&data);
        assert_eq!(s.kind(), Ok((Kind::Byte, 0)));
        assert_eq!(s.uint64(), Ok(4));
        assert_eq!(s.uint64(), Ok(0));
    }

    #[test]
    fn nested_list_accounting() {
        // ["cat", ["puppy", "cow"], "horse", [[]], "pig", [""], "sheep"]
        let data = hex!("E3 83636174 CA85707570707983636F77 85686F727365 C1C0 83706967 C180 857368656570");
        let mut s = Stream::from_slice(&data);
        assert_eq!(s.list(), Ok(35));
        assert_eq!(s.bytes(), Ok(b"cat".to_vec()));
        assert_eq!(s.list(), Ok(10));
        assert_eq!(s.bytes(), Ok(b"puppy".to_vec()));
        assert_eq!(s.bytes(), Ok(b"cow".to_vec()));
        assert_eq!(s.end_list(), Ok(()));
        assert_eq!(s.bytes(), Ok(b"horse".to_vec()));
        assert_eq!(s.list(), Ok(1));
        assert_eq!(s.list(), Ok(0));
        assert_eq!(s.end_list(), Ok(()));
        assert_eq!(s.end_list(), Ok(()));
        assert_eq!(s.bytes(), Ok(b"pig".to_vec()));
        assert_eq!(s.list(), Ok(1));
        assert_eq!(s.bytes(), Ok(Vec::new()));
        assert_eq!(s.end_list(), Ok(()));
        assert_eq!(s.bytes(), Ok(b"sheep".to_vec()));
        assert_eq!(s.end_list(), Ok(()));
    }

    #[test]
    fn end_of_list_sentinel() {
        let data = hex!("C3010203");
        let mut s = Stream::from_slice(&data);
        assert_eq!(s.list_remaining(), None);
        s.list().unwrap();
        assert_eq!(s.list_remaining(), Some(3));
        assert_eq!(s.uint64(), Ok(1));
        assert_eq!(s.uint64(), Ok(2));
        assert_eq!(s.list_remaining(), Some(1));
        assert_eq!(s.uint64(), Ok(3));
        assert_eq!(s.list_remaining(), Some(0));
        assert!(!s.more_in_list());
        assert_eq!(s.kind(), Err(Error::EndOfList));
        assert_eq!(s.uint64(), Err(Error::EndOfList));
        assert_eq!(s.end_list(), Ok(()));
    }

    #[test]
    fn end_list_misuse() {
        let data = hex!("C3010203");
        let mut s = Stream::from_slice(&data);
        assert_eq!(s.end_list(), Err(Error::NotInList));
        s.list().unwrap();
        assert_eq!(s.end_list(), Err(Error::ListNotAtEol));
    }

    #[test]
    fn element_larger_than_list() {
        // List claims 2 payload bytes, element claims 5.
        let data = hex!("C28563617403");
        let mut s = Stream::from_slice(&data);
        s.list().unwrap();
        assert_eq!(s.bytes(), Err(Error::ElementTooLarge));
    }

    #[test]
    fn input_limit_enforced() {
        let data = hex!("89000000000000000000");
        let mut rd = &data[..2];
        let mut s = Stream::new(&mut rd, Some(2));
        assert_eq!(s.bytes(), Err(Error::ValueTooLarge));

        // An unlimited reader stream only fails when the source runs dry.
        let mut rd = &data[..2];
        let mut s = Stream::new(&mut rd, None);
        assert_eq!(s.bytes(), Err(Error::UnexpectedEof));
    }

    #[test]
    fn uint_canonical_rules() {
        assert_eq!(Stream::from_slice(&hex!("00")).uint64(), Err(Error::NonCanonicalInteger));
        assert_eq!(Stream::from_slice(&hex!("8105")).uint64(), Err(Error::NonCanonicalSize));
        assert_eq!(Stream::from_slice(&hex!("8200F4")).uint64(), Err(Error::NonCanonicalInteger));
        assert_eq!(Stream::from_slice(&hex!("C0")).uint64(), Err(Error::ExpectedString));
        assert_eq!(
            Stream::from_slice(&hex!("8AFFFFFFFFFFFFFFFFFF7C")).uint64(),
            Err(Error::UintOverflow)
        );
        assert_eq!(Stream::from_slice(&hex!("820505")).uint64(), Ok(0x0505));
    }

    #[test]
    fn uint_width_checks() {
        assert_eq!(Stream::from_slice(&hex!("820505")).uint8(), Err(Error::UintOverflow));
        assert_eq!(Stream::from_slice(&hex!("820505")).uint16(), Ok(0x0505));
        assert_eq!(Stream::from_slice(&hex!("83050505")).uint16(), Err(Error::UintOverflow));
        assert_eq!(Stream::from_slice(&hex!("83050505")).uint32(), Ok(0x050505));
    }

    #[test]
    fn bool_values() {
        assert_eq!(Stream::from_slice(&hex!("01")).bool(), Ok(true));
        assert_eq!(Stream::from_slice(&hex!("80")).bool(), Ok(false));
        assert!(Stream::from_slice(&hex!("02")).bool().is_err());
    }

    #[test]
    fn raw_reencodes_header() {
        let data = hex!("C58363617401");
        let mut s = Stream::from_slice(&data);
        s.list().unwrap();
        assert_eq!(s.raw(), Ok(hex!("83636174").to_vec()));
        assert_eq!(s.raw(), Ok(hex!("01").to_vec()));
        s.end_list().unwrap();
    }

    #[test]
    fn big_int_values() {
        let data = hex!("89FFFFFFFFFFFFFFFFFF");
        let mut s = Stream::from_slice(&data);
        let want = BigUint::parse_bytes(b"FFFFFFFFFFFFFFFFFF", 16).unwrap();
        assert_eq!(s.big_int(), Ok(want));

        assert_eq!(Stream::from_slice(&hex!("80")).big_int(), Ok(BigUint::default()));
        assert_eq!(
            Stream::from_slice(&hex!("820001")).big_int(),
            Err(Error::NonCanonicalInteger)
        );
        assert_eq!(Stream::from_slice(&hex!("8105")).big_int(), Err(Error::NonCanonicalSize));
    }

    #[test]
    fn u256_values() {
        assert_eq!(Stream::from_slice(&hex!("80")).u256(), Ok(U256::ZERO));
        assert_eq!(Stream::from_slice(&hex!("820400")).u256(), Ok(U256::from(1024u32)));
        let mut data = vec![0x80 + 33];
        data.extend_from_slice(&[0xFF; 33]);
        assert_eq!(Stream::from_slice(&data).u256(), Err(Error::Uint256Overflow));
    }

    #[test]
    fn read_bytes_exact() {
        let data = hex!("83646F67");
        let mut s = Stream::from_slice(&data);
        let mut out = [0u8; 3];
        s.read_bytes(&mut out).unwrap();
        assert_eq!(&out, b"dog");

        let mut s = Stream::from_slice(&data);
        let mut out = [0u8; 4];
        assert_eq!(s.read_bytes(&mut out), Err(Error::UnexpectedLength));
    }

    #[test]
    fn new_list_stream() {
        let payload = hex!("0102");
        let mut rd = &payload[..];
        let mut s = Stream::new_list(&mut rd, 2);
        assert_eq!(s.list(), Ok(2));
        assert_eq!(s.uint64(), Ok(1));
        assert_eq!(s.uint64(), Ok(2));
        assert_eq!(s.end_list(), Ok(()));
    }

    #[test]
    fn truncated_single_byte_string_reports_eof() {
        // The canonical single-byte check needs the payload byte; on a
        // truncated input the read fails first.
        let mut rd = &hex!("81")[..];
        let mut s = Stream::new(&mut rd, None);
        assert_eq!(s.bytes(), Err(Error::UnexpectedEof));
    }

    #[test]
    fn decode_optional_empty_kinds() {
        let data = hex!("80C001");
        let mut s = Stream::from_slice(&data);
        assert_eq!(s.decode_optional::<u64>(Kind::String), Ok(None));
        assert_eq!(s.decode_optional::<Vec<u64>>(Kind::List), Ok(None));
        assert_eq!(s.decode_optional::<u64>(Kind::String), Ok(Some(1)));

        let data = hex!("C0");
        let mut s = Stream::from_slice(&data);
        assert!(matches!(
            s.decode_optional::<u64>(Kind::String),
            Err(Error::Decode(_))
        ));
    }
}
