//! Incremental encoding buffer with deferred list headers.

use std::io::{self, Read, Write};

use ethnum::U256;
use num_bigint::BigUint;

use crate::header::{head_size, put_head, put_int, EMPTY_LIST_CODE, EMPTY_STRING_CODE};
use crate::pool::Pool;
use crate::{Encodable, Kind};

static BUFFER_POOL: Pool<EncodeBuffer> = Pool::new();

/// Fetches a cleared buffer from the pool.
pub(crate) fn get_buffer() -> EncodeBuffer {
    let mut buf = BUFFER_POOL.get().unwrap_or_default();
    buf.reset();
    buf
}

/// Returns a buffer to the pool.
pub(crate) fn put_buffer(buf: EncodeBuffer) {
    BUFFER_POOL.put(buf);
}

/// A pending list header.
///
/// While the list is open, `size` holds the number of header bytes
/// accumulated before this one; `close_list` rewrites it to the list's
/// payload size.
#[derive(Clone, Copy, Debug)]
struct ListHead {
    /// Offset of this header's position in the payload vector.
    offset: usize,
    /// See type docs: bookkeeping while open, payload size once closed.
    size: usize,
}

/// An RLP encoding buffer.
///
/// String data goes straight into a payload vector; list headers are
/// recorded separately and materialized when the buffer is flushed. This
/// makes opening and closing a list O(1): the total encoded length of a
/// list is unknown until its children are encoded, and deferring the header
/// avoids shifting the payload or double-buffering children.
///
/// A list is emitted by calling [`open_list`](Self::open_list), encoding the
/// elements, then passing the returned index to
/// [`close_list`](Self::close_list). Headers are finalized in the order the
/// lists were opened, which matches the order of their payload regions, so a
/// single in-order walk produces the output.
#[derive(Debug, Default)]
pub struct EncodeBuffer {
    /// String data; everything except list headers.
    payload: Vec<u8>,
    /// All deferred list headers.
    heads: Vec<ListHead>,
    /// Sum of the encoded sizes of all closed list headers.
    head_bytes: usize,
}

impl EncodeBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the buffer for reuse, keeping its allocations.
    pub fn reset(&mut self) {
        self.payload.clear();
        self.heads.clear();
        self.head_bytes = 0;
    }

    /// Length of the eventual output.
    pub fn size(&self) -> usize {
        self.payload.len() + self.head_bytes
    }

    /// Opens a new list. Encode the contents, then pass the returned index
    /// to [`close_list`](Self::close_list).
    pub fn open_list(&mut self) -> usize {
        self.heads.push(ListHead { offset: self.payload.len(), size: self.head_bytes });
        self.heads.len() - 1
    }

    /// Finalizes the list opened at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by an earlier
    /// [`open_list`](Self::open_list) on this buffer.
    pub fn close_list(&mut self, index: usize) {
        let total = self.size();
        let head = &mut self.heads[index];
        head.size = total - head.offset - head.size;
        self.head_bytes += head_size(head.size as u64);
    }

    /// Writes an unsigned integer in canonical form.
    pub fn write_uint64(&mut self, i: u64) {
        if i == 0 {
            self.payload.push(EMPTY_STRING_CODE);
        } else if i < 0x80 {
            self.payload.push(i as u8);
        } else {
            let mut buf = [0u8; 9];
            let n = put_int(&mut buf[1..], i);
            buf[0] = EMPTY_STRING_CODE + n as u8;
            self.payload.extend_from_slice(&buf[..n + 1]);
        }
    }

    /// Writes a 128-bit unsigned integer in canonical form.
    pub fn write_uint128(&mut self, i: u128) {
        if let Ok(small) = u64::try_from(i) {
            return self.write_uint64(small);
        }
        let be = i.to_be_bytes();
        let skip = (i.leading_zeros() / 8) as usize;
        self.payload.push(EMPTY_STRING_CODE + (16 - skip) as u8);
        self.payload.extend_from_slice(&be[skip..]);
    }

    /// Writes `b` as the integer 0 (false) or 1 (true).
    pub fn write_bool(&mut self, b: bool) {
        self.payload.push(if b { 0x01 } else { EMPTY_STRING_CODE });
    }

    /// Writes `b` as an RLP string.
    pub fn write_bytes(&mut self, b: &[u8]) {
        if b.len() == 1 && b[0] <= 0x7F {
            // Single bytes below 0x80 are their own encoding.
            self.payload.push(b[0]);
        } else {
            self.write_string_header(b.len());
            self.payload.extend_from_slice(b);
        }
    }

    /// Writes `s` as an RLP string.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Writes an arbitrary-precision integer as a canonical integer string.
    pub fn write_biguint(&mut self, i: &BigUint) {
        let bits = i.bits();
        if bits <= 64 {
            return self.write_uint64(i.iter_u64_digits().next().unwrap_or(0));
        }
        let length = ((bits + 7) / 8) as usize;
        self.write_string_header(length);
        let start = self.payload.len();
        self.payload.resize(start + length, 0);
        let out = &mut self.payload[start..];
        // iter_u64_digits yields little-endian words; fill from the back.
        let mut index = length;
        for mut digit in i.iter_u64_digits() {
            let mut taken = 0;
            while taken < 8 && index > 0 {
                index -= 1;
                out[index] = digit as u8;
                digit >>= 8;
                taken += 1;
            }
        }
    }

    /// Writes a 256-bit integer as a canonical integer string.
    pub fn write_u256(&mut self, z: &U256) {
        let bits = 256 - z.leading_zeros();
        if bits <= 64 {
            return self.write_uint64(z.as_u64());
        }
        let n_bytes = ((bits + 7) / 8) as usize;
        let mut b = [0u8; 33];
        b[1..].copy_from_slice(&z.to_be_bytes());
        b[32 - n_bytes] = EMPTY_STRING_CODE + n_bytes as u8;
        self.payload.extend_from_slice(&b[32 - n_bytes..]);
    }

    /// Writes the encoding of the empty string, `0x80`.
    pub fn write_empty_string(&mut self) {
        self.payload.push(EMPTY_STRING_CODE);
    }

    /// Writes the encoding of the empty list, `0xC0`.
    pub fn write_empty_list(&mut self) {
        self.payload.push(EMPTY_LIST_CODE);
    }

    /// Writes the empty value of the given kind. Used for absent values of
    /// nil-tagged fields.
    pub fn write_empty(&mut self, kind: Kind) {
        match kind {
            Kind::List => self.write_empty_list(),
            _ => self.write_empty_string(),
        }
    }

    /// Appends pre-encoded RLP data verbatim.
    pub fn write_raw(&mut self, b: &[u8]) {
        self.payload.extend_from_slice(b);
    }

    /// Encodes a value into this buffer.
    ///
    /// Custom [`Encodable`] implementations receive the buffer they are
    /// already writing into, so nested encodes compose without any
    /// intermediate buffering.
    pub fn write_value<E: Encodable + ?Sized>(&mut self, value: &E) {
        value.encode(self);
    }

    fn write_string_header(&mut self, size: usize) {
        if size < 56 {
            self.payload.push(EMPTY_STRING_CODE + size as u8);
        } else {
            let mut buf = [0u8; 9];
            let n = put_int(&mut buf[1..], size as u64);
            buf[0] = 0xB7 + n as u8;
            self.payload.extend_from_slice(&buf[..n + 1]);
        }
    }

    /// Produces the encoder output as a fresh vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.size()];
        self.copy_to(&mut out);
        out
    }

    /// Appends the encoder output to `dst`.
    pub fn append_to(&self, dst: &mut Vec<u8>) {
        let start = dst.len();
        dst.resize(start + self.size(), 0);
        self.copy_to(&mut dst[start..]);
    }

    /// Writes the encoder output to `w` in one ordered walk over the
    /// deferred headers.
    pub fn flush_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let mut scratch = [0u8; 9];
        let mut str_pos = 0;
        for head in &self.heads {
            if head.offset > str_pos {
                w.write_all(&self.payload[str_pos..head.offset])?;
                str_pos = head.offset;
            }
            let n = put_head(&mut scratch, EMPTY_LIST_CODE, 0xF7, head.size as u64);
            w.write_all(&scratch[..n])?;
        }
        if str_pos < self.payload.len() {
            w.write_all(&self.payload[str_pos..])?;
        }
        Ok(())
    }

    fn copy_to(&self, dst: &mut [u8]) {
        let mut str_pos = 0;
        let mut pos = 0;
        for head in &self.heads {
            let n = head.offset - str_pos;
            dst[pos..pos + n].copy_from_slice(&self.payload[str_pos..head.offset]);
            pos += n;
            str_pos = head.offset;
            // Headers are always followed by their payload, so writing into
            // the tail of dst never runs past it.
            pos += put_head(&mut dst[pos..], EMPTY_LIST_CODE, 0xF7, head.size as u64);
        }
        dst[pos..].copy_from_slice(&self.payload[str_pos..]);
    }
}

/// Appends directly to the encoder output.
///
/// This is the splice point for implementations that produce pre-encoded
/// data: a custom encoder holding raw RLP can write it through `io::Write`
/// without re-framing.
impl Write for EncodeBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.payload.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Lazy reader over an encode buffer's output.
///
/// Yields the alternating payload and header pieces of the buffer. The
/// buffer is released back to its pool when the reader reaches end of
/// stream or is dropped.
#[derive(Debug)]
pub struct EncodeReader {
    buf: Option<EncodeBuffer>,
    /// Index of the next unread list header.
    head_pos: usize,
    /// Read position in the payload vector.
    str_pos: usize,
    /// Encoded header bytes not yet handed out.
    pending: [u8; 9],
    pending_len: u8,
    pending_off: u8,
}

impl EncodeReader {
    pub(crate) fn new(buf: EncodeBuffer) -> Self {
        Self { buf: Some(buf), head_pos: 0, str_pos: 0, pending: [0; 9], pending_len: 0, pending_off: 0 }
    }
}

impl Read for EncodeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < out.len() {
            if self.pending_off < self.pending_len {
                let piece = &self.pending[self.pending_off as usize..self.pending_len as usize];
                let m = piece.len().min(out.len() - n);
                out[n..n + m].copy_from_slice(&piece[..m]);
                self.pending_off += m as u8;
                n += m;
                continue;
            }
            let Some(buf) = &self.buf else { break };
            if self.head_pos < buf.heads.len() {
                let head = buf.heads[self.head_pos];
                if self.str_pos < head.offset {
                    let m = (head.offset - self.str_pos).min(out.len() - n);
                    out[n..n + m].copy_from_slice(&buf.payload[self.str_pos..self.str_pos + m]);
                    self.str_pos += m;
                    n += m;
                } else {
                    let len = put_head(&mut self.pending, EMPTY_LIST_CODE, 0xF7, head.size as u64);
                    self.pending_len = len as u8;
                    self.pending_off = 0;
                    self.head_pos += 1;
                }
                continue;
            }
            if self.str_pos < buf.payload.len() {
                let m = (buf.payload.len() - self.str_pos).min(out.len() - n);
                out[n..n + m].copy_from_slice(&buf.payload[self.str_pos..self.str_pos + m]);
                self.str_pos += m;
                n += m;
                continue;
            }
            // Fully consumed: hand the buffer back to the pool. Later calls
            // keep reporting end of stream.
            if let Some(done) = self.buf.take() {
                put_buffer(done);
            }
            break;
        }
        Ok(n)
    }
}

impl Drop for EncodeReader {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            put_buffer(buf);
        }
    }
}
