//! Little-endian field readers over record buffers.
//!
//! Readers never fail: bytes past the end of the slice read as zero. The dispatcher
//! checks record sizes before trusting a value; the zero fill only matters when a
//! too-small record's fields are echoed in a diagnostic.

use byteorder::{ByteOrder, LittleEndian};

fn fill<const N: usize>(data: &[u8], off: usize) -> [u8; N] {
    let mut buf = [0u8; N];
    if let Some(avail) = data.get(off..) {
        let n = avail.len().min(N);
        buf[..n].copy_from_slice(&avail[..n]);
    }
    buf
}

/// 16-bit little-endian value at `off`.
pub fn get_u16(data: &[u8], off: usize) -> u16 {
    LittleEndian::read_u16(&fill::<2>(data, off))
}

/// 32-bit little-endian value at `off`.
pub fn get_u32(data: &[u8], off: usize) -> u32 {
    LittleEndian::read_u32(&fill::<4>(data, off))
}

pub fn get_i32(data: &[u8], off: usize) -> i32 {
    LittleEndian::read_i32(&fill::<4>(data, off))
}

pub fn get_u8(data: &[u8], off: usize) -> u8 {
    data.get(off).copied().unwrap_or(0)
}
