//! Big-endian cursor helpers shared by every message variant's `decode`/`encode`.
//!
//! Grounded on `other_examples/5dab05bc_Numi2-Numi-orderbook__src-decoder_itch.rs.rs`'s
//! manual `read_u16`/`read_u32`/`read_u64`/`read_fixed::<N>` cursor idiom —
//! chosen over the teacher's `zerocopy`-derived "wire" feature because ITCH's
//! 48-bit timestamps and fixed ASCII arrays don't fit zerocopy struct derives
//! cleanly.

use crate::error::DecodeError;

/// A read cursor over a decoded payload slice (post framing, pre opcode-dispatch).
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    opcode: char,
}

impl<'a> Cursor<'a> {
    /// Wrap `buf` (the payload bytes following the 1-byte opcode) for `opcode`.
    pub fn new(buf: &'a [u8], opcode: char) -> Cursor<'a> {
        Cursor { buf, pos: 0, opcode }
    }

    fn need(&self, n: usize) -> Result<(), DecodeError> {
        if self.pos + n > self.buf.len() {
            return Err(DecodeError::ShortPayload {
                opcode: self.opcode,
                expected: self.pos + n,
                actual: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        self.need(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read a big-endian `u16`.
    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        self.need(2)?;
        let v = u16::from_be_bytes(self.buf[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        Ok(v)
    }

    /// Read a big-endian `u32`.
    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        self.need(4)?;
        let v = u32::from_be_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    /// Read a big-endian `u64`.
    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        self.need(8)?;
        let v = u64::from_be_bytes(self.buf[self.pos..self.pos + 8].try_into().unwrap());
        self.pos += 8;
        Ok(v)
    }

    /// Read a big-endian 48-bit (6-byte) unsigned value, widened to `u64`
    /// (the ITCH 5.0 nanosecond timestamp field width).
    pub fn u48(&mut self) -> Result<u64, DecodeError> {
        self.need(6)?;
        let mut bytes = [0u8; 8];
        bytes[2..8].copy_from_slice(&self.buf[self.pos..self.pos + 6]);
        self.pos += 6;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read `N` raw bytes.
    pub fn fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.need(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read a buy/sell indicator byte (`B`/`S`) into a [`crate::types::Side`].
    pub fn side(&mut self) -> Result<crate::types::Side, DecodeError> {
        match self.u8()? {
            b'B' => Ok(crate::types::Side::Bid),
            b'S' => Ok(crate::types::Side::Ask),
            other => Err(DecodeError::InvalidSide(other)),
        }
    }

    /// Bytes remaining in the payload.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

/// Append a big-endian `u16`.
pub fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Append a big-endian `u32`.
pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Append a big-endian `u64`.
pub fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Append the low 48 bits of `v`, big-endian.
pub fn put_u48(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_be_bytes()[2..8]);
}

/// Append a buy/sell indicator byte for `side`.
pub fn put_side(out: &mut Vec<u8>, side: crate::types::Side) {
    out.push(match side {
        crate::types::Side::Bid => b'B',
        crate::types::Side::Ask => b'S',
    });
}
