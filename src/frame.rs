//! Record framing and the stream driver.
//!
//! A record on disk is `[count:u16 LE][type:u8][payload: count-1 bytes]`, plus one pad
//! byte when `count` is odd. `count` alone decides how far the cursor moves; what the
//! decoder thinks of the contents never changes the advance, so one malformed record
//! cannot shift the framing of the records after it.
//!
//! [`RecordStream`] walks an in-memory image and yields one [`StreamEvent`] per record.
//! It stops at the end of the buffer or at the first framing problem it cannot get
//! past: an implausible count (desynchronization), a record running past the end of
//! the buffer, or a tail too short to hold a count and a type byte.

use crate::bytes::{get_u16, get_u8};
use crate::decode::Decoder;
use crate::registry;
use std::fmt;
use std::io::{self, Write};
use std::iter::FusedIterator;

/// Counts at or above this are taken as a sign the cursor lost the record boundaries.
pub const DESYNC_THRESHOLD: u16 = 16384;

/// Width of `NNN: 0xCCCC* `.
pub const RECORD_PREFIX_WIDTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub byte_count: u16,
    /// Raw byte after the count. Not part of the record when the count is zero.
    pub type_code: u8,
}

impl RecordHeader {
    /// Read the header at the start of `data`; needs the two count bytes.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }
        Some(RecordHeader { byte_count: get_u16(data, 0), type_code: get_u8(data, 2) })
    }

    pub fn is_padded(&self) -> bool {
        self.byte_count & 1 == 1
    }

    pub fn is_desync(&self) -> bool {
        self.byte_count >= DESYNC_THRESHOLD
    }

    /// Bytes from this record's count to the next record's count.
    pub fn advance(&self) -> usize {
        let n = self.byte_count as usize;
        n + 2 + (n & 1)
    }
}

/// One framed record: the `byte_count` bytes starting at the type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub header: RecordHeader,
    bytes: &'a [u8],
}

impl<'a> Record<'a> {
    /// `bytes` starts at the type byte; its length is the header's count.
    pub fn new(header: RecordHeader, bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), header.byte_count as usize);
        Record { header, bytes }
    }

    /// Build a record from its type byte and payload, as if framed from disk.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        let header = RecordHeader {
            byte_count: bytes.len() as u16,
            type_code: get_u8(bytes, 0),
        };
        Record { header, bytes }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn byte_count(&self) -> u16 {
        self.header.byte_count
    }

    /// Bytes after the type byte.
    pub fn payload(&self) -> &'a [u8] {
        self.bytes.get(1..).unwrap_or(&[])
    }
}

/// `NNN: 0xCCCC` plus `*` for a padded record or a blank, then a space.
pub fn record_prefix(index: usize, byte_count: u16) -> String {
    let pad = if byte_count & 1 == 1 { '*' } else { ' ' };
    format!("{:3}: 0x{:04X}{} ", index, byte_count, pad)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecord {
    pub index: usize,
    /// Offset of the record's count in the image.
    pub offset: usize,
    pub header: RecordHeader,
    /// Rendered body lines, without the prefix.
    pub lines: Vec<String>,
}

impl fmt::Display for RenderedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = record_prefix(self.index, self.header.byte_count);
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}{}", prefix, line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Record(RenderedRecord),
    /// Count at or above [`DESYNC_THRESHOLD`]; nothing after it is decoded.
    Desync {
        index: usize,
        offset: usize,
        header: RecordHeader,
    },
    /// The record's count runs past the end of the image.
    Truncated {
        index: usize,
        offset: usize,
        header: RecordHeader,
        available: usize,
    },
    /// Fewer than the three bytes of a count and a type byte left at the end.
    ShortHeader {
        index: usize,
        offset: usize,
        remaining: usize,
    },
}

impl StreamEvent {
    /// True for the events after which the stream yields nothing more.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Record(_))
    }

    pub fn index(&self) -> usize {
        match self {
            StreamEvent::Record(r) => r.index,
            StreamEvent::Desync { index, .. }
            | StreamEvent::Truncated { index, .. }
            | StreamEvent::ShortHeader { index, .. } => *index,
        }
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEvent::Record(r) => fmt::Display::fmt(r, f),
            StreamEvent::Desync { index, header, .. } => write!(
                f,
                "{}{:02X}({}) Record count >= {}. Probably out of sync",
                record_prefix(*index, header.byte_count),
                header.type_code,
                registry::name_of(header.type_code),
                DESYNC_THRESHOLD
            ),
            StreamEvent::Truncated { index, header, available, .. } => write!(
                f,
                "{}{:02X}({}) *** Record runs past end of file. needs {} bytes, {} available **",
                record_prefix(*index, header.byte_count),
                header.type_code,
                registry::name_of(header.type_code),
                header.byte_count,
                available
            ),
            StreamEvent::ShortHeader { index, remaining, .. } => write!(
                f,
                "{:3}: *** Short header: {} trailing byte(s), too short for a record **",
                index, remaining
            ),
        }
    }
}

/// Lazy walk over an image, one [`StreamEvent`] per record.
#[derive(Debug, Clone)]
pub struct RecordStream<'a> {
    data: &'a [u8],
    decoder: &'a Decoder,
    pos: usize,
    index: usize,
    done: bool,
}

impl<'a> RecordStream<'a> {
    pub fn new(data: &'a [u8], decoder: &'a Decoder) -> Self {
        RecordStream { data, decoder, pos: 0, index: 0, done: false }
    }

    /// Offset of the next record's count.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of records yielded so far.
    pub fn records(&self) -> usize {
        self.index
    }

    fn stop(&mut self, event: StreamEvent) -> Option<StreamEvent> {
        self.done = true;
        log::debug!("stream stopped at offset {:#x}: {:?}", self.pos, event);
        Some(event)
    }
}

impl Iterator for RecordStream<'_> {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        if self.done || self.pos >= self.data.len() {
            return None;
        }
        let offset = self.pos;
        let index = self.index;
        let rest = &self.data[offset..];
        // A zero count has no type byte, so two bytes are a whole record.
        let header = match RecordHeader::parse(rest) {
            Some(h) if h.byte_count == 0 || rest.len() > 2 => h,
            _ => {
                let remaining = rest.len();
                log::warn!("record {}: {} stray byte(s) at offset {:#x}", index, remaining, offset);
                return self.stop(StreamEvent::ShortHeader { index, offset, remaining });
            }
        };
        if header.is_desync() {
            log::warn!(
                "record {}: count 0x{:04X} at offset {:#x}, stream out of sync",
                index,
                header.byte_count,
                offset
            );
            return self.stop(StreamEvent::Desync { index, offset, header });
        }
        let body = &rest[2..];
        let count = header.byte_count as usize;
        if body.len() < count {
            log::warn!(
                "record {}: count {} at offset {:#x} exceeds the {} bytes left",
                index,
                count,
                offset,
                body.len()
            );
            let available = body.len();
            return self.stop(StreamEvent::Truncated { index, offset, header, available });
        }
        let record = Record::new(header, &body[..count]);
        let lines = self.decoder.render(&record);
        log::debug!(
            "record {} at {:#x}: type {} count {} advance {}",
            index,
            offset,
            header.type_code,
            count,
            header.advance()
        );
        self.pos += header.advance();
        self.index += 1;
        Some(StreamEvent::Record(RenderedRecord { index, offset, header, lines }))
    }
}

impl FusedIterator for RecordStream<'_> {}

/// How a written stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub records: usize,
    /// The terminal event, if the stream stopped before the end of the image.
    pub stopped: Option<StreamEvent>,
}

/// Print every event of `data` to `w`, one line per record line.
pub fn write_stream<W: Write>(
    w: &mut W,
    data: &[u8],
    decoder: &Decoder,
) -> io::Result<StreamSummary> {
    let mut stream = RecordStream::new(data, decoder);
    let mut stopped = None;
    for event in stream.by_ref() {
        writeln!(w, "{}", event)?;
        if event.is_terminal() {
            stopped = Some(event);
        }
    }
    Ok(StreamSummary { records: stream.records(), stopped })
}
