//! Hex + ASCII rows for raw record data.
//!
//! A row is `AAAAAAAA -> ` followed by `width` hex columns and the same bytes as
//! ASCII between bars:
//!
//! ```text
//! 00001000 -> 48 65 6C 6C 6F 2C 20 77  6F 72 6C 64 21 0A 00 01 |Hello, world!...|
//! ```
//!
//! Every eighth column gets an extra leading space. Short rows are padded with blanks
//! so the ASCII column of every row lines up.

use std::fmt::Write;

/// Width of `AAAAAAAA -> `.
pub const ADDRESS_WIDTH: usize = 8 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexAsciiDump {
    width: usize,
}

impl HexAsciiDump {
    /// `width` bytes per row; must be non-zero.
    pub fn new(width: usize) -> Self {
        debug_assert!(width > 0);
        HexAsciiDump { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Columns used by the hex part of a row, trailing space included.
    pub fn hex_columns(&self) -> usize {
        3 * self.width + (self.width - 1) / 8
    }

    /// Total columns of one rendered row.
    pub fn row_width(&self) -> usize {
        ADDRESS_WIDTH + self.hex_columns() + 1 + self.width + 1
    }

    /// Render `data` as rows, row `k` addressed `base + k * width`.
    pub fn rows(&self, base: u32, data: &[u8]) -> Vec<String> {
        data.chunks(self.width)
            .enumerate()
            .map(|(k, chunk)| {
                let addr = base.wrapping_add((k * self.width) as u32);
                self.row(addr, chunk)
            })
            .collect()
    }

    fn row(&self, addr: u32, chunk: &[u8]) -> String {
        let mut out = String::with_capacity(self.row_width());
        let _ = write!(out, "{:08X} -> ", addr);
        for i in 0..self.width {
            if i > 0 && i % 8 == 0 {
                out.push(' ');
            }
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02X} ", b);
                }
                None => out.push_str("   "),
            }
        }
        out.push('|');
        for i in 0..self.width {
            out.push(match chunk.get(i) {
                Some(&b) => ascii_char(b),
                None => ' ',
            });
        }
        out.push('|');
        out
    }
}

fn ascii_char(b: u8) -> char {
    if (0x20..=0x7e).contains(&b) {
        char::from(b)
    } else {
        '.'
    }
}
