//! Protocol-Buffers-compatible wire primitives.
//!
//! A wire message is a flat sequence of `(key, payload)` entries where
//! `key = tag << 3 | wire_type`, varint encoded. The payload shape depends
//! only on the wire type, which is what lets a decoder skip fields it does
//! not know about.

use crate::error::CodecError;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest field tag representable in a 32-bit key.
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// A 64-bit varint never needs more than 10 bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Nesting limit when skipping unknown groups.
const MAX_GROUP_DEPTH: usize = 100;

/// Binary payload shape of a field entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    StartGroup,
    EndGroup,
    Fixed32,
}

impl WireType {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::StartGroup => 3,
            WireType::EndGroup => 4,
            WireType::Fixed32 => 5,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length_delimited",
            WireType::StartGroup => "start_group",
            WireType::EndGroup => "end_group",
            WireType::Fixed32 => "fixed32",
        };
        write!(f, "{s}")
    }
}

/// Build the key for a field entry.
pub fn make_key(tag: u32, wire_type: WireType) -> u32 {
    (tag << 3) | wire_type.bits()
}

pub fn zigzag_encode32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

pub fn zigzag_encode64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

pub fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Number of bytes `v` occupies as a varint.
pub fn varint_len(v: u64) -> usize {
    let bits = 64 - (v | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

// ─── Writer ───────────────────────────────────────────────────────────────────

/// Append-only wire buffer.
///
/// Methods return `&mut Self` so entries chain the way they read on the
/// wire: `w.key(1, WireType::LengthDelimited).bytes(b"basecro")`.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn key(&mut self, tag: u32, wire_type: WireType) -> &mut Self {
        self.varint(u64::from(make_key(tag, wire_type)))
    }

    pub fn varint(&mut self, mut v: u64) -> &mut Self {
        while v >= 0x80 {
            self.buf.put_u8((v as u8) | 0x80);
            v >>= 7;
        }
        self.buf.put_u8(v as u8);
        self
    }

    pub fn fixed32(&mut self, v: u32) -> &mut Self {
        self.buf.put_u32_le(v);
        self
    }

    pub fn fixed64(&mut self, v: u64) -> &mut Self {
        self.buf.put_u64_le(v);
        self
    }

    /// Length-prefixed payload (strings, bytes, nested records, packed runs).
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.varint(data.len() as u64);
        self.buf.put_slice(data);
        self
    }

    /// Raw bytes with no length prefix.
    pub fn raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.put_slice(data);
        self
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

// ─── Reader ───────────────────────────────────────────────────────────────────

/// Cursor over an encoded buffer.
///
/// Sub-readers produced by [`WireReader::take`] remember their absolute
/// position so error offsets always refer to the original input.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            base: 0,
        }
    }

    /// Position relative to the start of this reader.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Position relative to the start of the original input.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let start = self.offset();
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(CodecError::malformed(start, "unterminated varint"));
            };
            self.pos += 1;
            if i == MAX_VARINT_LEN - 1 && byte & 0x80 == 0 && byte > 0x01 {
                return Err(CodecError::overflow("", "varint wider than 64 bits", "u64"));
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::malformed(start, "varint longer than 10 bytes"))
    }

    /// Read a field key and split it into `(tag, wire_type)`.
    pub fn read_key(&mut self) -> Result<(u32, WireType), CodecError> {
        let start = self.offset();
        let key = self.read_varint().map_err(|e| {
            if e.is_overflow() {
                CodecError::malformed(start, "field key wider than 64 bits")
            } else {
                e
            }
        })?;
        let key = u32::try_from(key)
            .map_err(|_| CodecError::malformed(start, "field key exceeds 32 bits"))?;
        let wire_type = WireType::from_bits(key & 7).ok_or_else(|| {
            CodecError::malformed(start, format!("invalid wire type {}", key & 7))
        })?;
        let tag = key >> 3;
        if tag == 0 {
            return Err(CodecError::malformed(start, "field tag 0 is reserved"));
        }
        Ok((tag, wire_type))
    }

    pub fn read_fixed32(&mut self) -> Result<u32, CodecError> {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(self.read_exact(4)?);
        Ok(u32::from_le_bytes(arr))
    }

    pub fn read_fixed64(&mut self) -> Result<u64, CodecError> {
        let mut arr = [0u8; 8];
        arr.copy_from_slice(self.read_exact(8)?);
        Ok(u64::from_le_bytes(arr))
    }

    /// Read a varint length prefix followed by that many bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], CodecError> {
        let start = self.offset();
        let len = self.read_length(start)?;
        self.read_exact(len)
    }

    /// Split off the next `len` bytes as a bounded sub-reader.
    pub fn take(&mut self, len: usize) -> Result<WireReader<'a>, CodecError> {
        let base = self.offset();
        let buf = self.read_exact(len)?;
        Ok(WireReader { buf, pos: 0, base })
    }

    /// Read a length prefix and split off the payload as a sub-reader.
    pub fn take_length_delimited(&mut self) -> Result<WireReader<'a>, CodecError> {
        let start = self.offset();
        let len = self.read_length(start)?;
        self.take(len)
    }

    /// Skip the payload of an entry whose key has just been read.
    pub fn skip(&mut self, wire_type: WireType, tag: u32) -> Result<(), CodecError> {
        self.skip_nested(wire_type, tag, 0)
    }

    fn skip_nested(&mut self, wire_type: WireType, tag: u32, depth: usize) -> Result<(), CodecError> {
        match wire_type {
            WireType::Varint => {
                let start = self.offset();
                self.read_varint().map_err(|e| {
                    if e.is_overflow() {
                        CodecError::malformed(start, "unknown varint wider than 64 bits")
                    } else {
                        e
                    }
                })?;
            }
            WireType::Fixed64 => {
                self.read_exact(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.read_exact(4)?;
            }
            WireType::StartGroup => {
                if depth >= MAX_GROUP_DEPTH {
                    return Err(CodecError::malformed(self.offset(), "groups nested too deeply"));
                }
                loop {
                    if self.is_eof() {
                        return Err(CodecError::malformed(
                            self.offset(),
                            format!("unterminated group for tag {tag}"),
                        ));
                    }
                    let start = self.offset();
                    let (inner_tag, inner_type) = self.read_key()?;
                    if inner_type == WireType::EndGroup {
                        if inner_tag == tag {
                            return Ok(());
                        }
                        return Err(CodecError::malformed(
                            start,
                            format!("end group {inner_tag} does not match start group {tag}"),
                        ));
                    }
                    self.skip_nested(inner_type, inner_tag, depth + 1)?;
                }
            }
            WireType::EndGroup => {
                return Err(CodecError::malformed(
                    self.offset(),
                    format!("unexpected end group for tag {tag}"),
                ));
            }
        }
        Ok(())
    }

    fn read_length(&mut self, start: usize) -> Result<usize, CodecError> {
        let len = self.read_varint().map_err(|e| {
            if e.is_overflow() {
                CodecError::malformed(start, "length prefix wider than 64 bits")
            } else {
                e
            }
        })?;
        let remaining = self.remaining();
        match usize::try_from(len) {
            Ok(len) if len <= remaining => Ok(len),
            _ => Err(CodecError::malformed(
                start,
                format!("length prefix {len} exceeds remaining {remaining} bytes"),
            )),
        }
    }

    fn read_exact(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CodecError::malformed(
                self.offset(),
                format!("needed {n} bytes, {remaining} remaining"),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}
