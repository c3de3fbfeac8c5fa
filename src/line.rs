//! Capacity-bounded text line used to render one record.
//!
//! Appends never grow the line past its capacity: text that does not fit is cut off,
//! and byte lists degrade to a single ` +N more` marker near the end of the line.

use std::fmt::{self, Write};

/// Columns kept free at the end of a line while listing bytes, enough for ` +NNNNN more`.
pub const BYTES_MARGIN: usize = 13 + 3;

#[derive(Debug, Clone)]
pub struct LineBuffer {
    text: String,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        LineBuffer { text: String::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.text.len()
    }

    /// True while more than `margin` columns are still free.
    pub fn has_room(&self, margin: usize) -> bool {
        self.len() + margin < self.capacity
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Append formatted text, truncated to the remaining capacity. Returns bytes written.
    pub fn push(&mut self, args: fmt::Arguments<'_>) -> usize {
        let before = self.text.len();
        let mut sink = Truncating { line: self, cut: false };
        // Truncating never reports an error; the cut is silent.
        let _ = sink.write_fmt(args);
        self.text.len() - before
    }

    pub fn push_str(&mut self, s: &str) -> usize {
        self.push(format_args!("{}", s))
    }

    /// Append ` XX` per byte. Once fewer than [`BYTES_MARGIN`] columns remain, the rest
    /// is summarized as ` +N more`.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        let before = self.len();
        for (i, b) in bytes.iter().enumerate() {
            if !self.has_room(BYTES_MARGIN) {
                self.push(format_args!(" +{} more", bytes.len() - i));
                break;
            }
            self.push(format_args!(" {:02X}", b));
        }
        self.len() - before
    }
}

impl fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

struct Truncating<'a> {
    line: &'a mut LineBuffer,
    cut: bool,
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.cut {
            return Ok(());
        }
        let room = self.line.remaining();
        if s.len() <= room {
            self.line.text.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.line.text.push_str(&s[..cut]);
        self.cut = true;
        Ok(())
    }
}
