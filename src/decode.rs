//! Per-record-type rendering.
//!
//! [`Decoder::render`] turns one record into text. Fixed-shape records are checked
//! against their minimum size before any field is trusted; a record that fails a
//! check is still rendered, as an inline `*** ... **` diagnostic that echoes the
//! fields as read. Nothing here decides how far the stream advances.
//!
//! Name and expression offsets stored in records are untrusted and only resolved
//! through [`resolve_name`] and explicit range checks.

use crate::bytes::{get_i32, get_u16, get_u32};
use crate::dump::HexAsciiDump;
use crate::expr::render_expression;
use crate::frame::Record;
use crate::layout::{self, abs, gsd, id, seg, slen, sym};
use crate::line::LineBuffer;
use crate::options::Options;
use crate::registry::RecordType;
use std::fmt;

/// A name referenced by offset from the start of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRef<'a> {
    /// Offset 0: no name stored.
    Absent,
    Name(&'a [u8]),
    /// Offset at or past the end of the record.
    OutOfRange(u16),
    /// No NUL terminator before the end of the record.
    Unterminated(u16),
}

impl fmt::Display for NameRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRef::Absent => f.write_str("<none>"),
            NameRef::Name(b) => write!(f, "{}", b.escape_ascii()),
            NameRef::OutOfRange(off) => write!(f, "<bad offset {}>", off),
            NameRef::Unterminated(off) => write!(f, "<unterminated @{}>", off),
        }
    }
}

/// Resolve the NUL-terminated name at `offset` within `record`.
pub fn resolve_name(record: &[u8], offset: u16) -> NameRef<'_> {
    if offset == 0 {
        return NameRef::Absent;
    }
    let start = offset as usize;
    let Some(tail) = record.get(start..).filter(|t| !t.is_empty()) else {
        return NameRef::OutOfRange(offset);
    };
    match tail.iter().position(|&b| b == 0) {
        Some(n) => NameRef::Name(&tail[..n]),
        None => NameRef::Unterminated(offset),
    }
}

#[derive(Debug, Clone)]
pub struct Decoder {
    capacity: usize,
    dump: Option<HexAsciiDump>,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(&Options::default())
    }
}

impl Decoder {
    pub fn new(options: &Options) -> Self {
        Decoder { capacity: options.body_capacity(), dump: options.dump() }
    }

    /// Body capacity of one rendered line.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Render one record: a single line, or one line per row when raw data is dumped.
    pub fn render(&self, record: &Record<'_>) -> Vec<String> {
        let rcd = record.bytes();
        let Some(&code) = rcd.first() else {
            return vec!["*** Empty record **".to_string()];
        };
        let rt = RecordType::from_code(code);
        let mut line = LineBuffer::new(self.capacity);
        line.push(format_args!("{}", rt.label()));
        if let Some(min) = rt.info().and_then(|i| i.min_size).filter(|&m| rcd.len() < m) {
            render_too_small(rt, rcd, min, &mut line);
            return vec![line.into_string()];
        }
        match rt {
            RecordType::Abs | RecordType::Txt | RecordType::Xfer => {
                let addr = get_u32(rcd, abs::ADDR);
                let data = &rcd[abs::SIZE..];
                if let Some(dump) = &self.dump {
                    return dump_lines(&rt.label(), dump.rows(addr, data), addr);
                }
                line.push(format_args!(" {:08X} ->", addr));
                line.push_bytes(data);
            }
            RecordType::Id => render_id(rcd, &mut line),
            RecordType::Gsd => {
                if get_u16(rcd, gsd::FLAGS) & gsd::FLAG_SYMBOL != 0 {
                    render_symbol(rcd, &mut line);
                } else {
                    render_segment(rcd, &mut line);
                }
            }
            RecordType::Org | RecordType::Tpr | RecordType::DbgFile | RecordType::DbgSeg => {
                let data = record.payload();
                match &self.dump {
                    Some(dump) if !data.is_empty() => {
                        return dump_lines(&rt.label(), dump.rows(0, data), 0);
                    }
                    _ => {
                        line.push_bytes(data);
                    }
                }
            }
            RecordType::Expr => render_expression(record.payload(), &mut line),
            RecordType::Slen => render_slen(rcd, &mut line),
            // Not interpretable without the rest of the image.
            RecordType::Test | RecordType::Boff | RecordType::Oor | RecordType::Other(_) => {}
        }
        vec![line.into_string()]
    }
}

/// First row follows the label; later rows are indented to the same column.
fn dump_lines(label: &str, rows: Vec<String>, base: u32) -> Vec<String> {
    if rows.is_empty() {
        return vec![format!("{} {:08X} ->", label, base)];
    }
    let indent = " ".repeat(label.len());
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            if i == 0 {
                format!("{} {}", label, row)
            } else {
                format!("{} {}", indent, row)
            }
        })
        .collect()
}

/// Diagnostic for a record shorter than its type's registered minimum size.
fn render_too_small(rt: RecordType, rcd: &[u8], min: usize, line: &mut LineBuffer) {
    match rt {
        RecordType::Abs | RecordType::Txt | RecordType::Xfer => {
            line.push(format_args!(
                " *** Size is too small. is {}, s/b > {} (addr={:08X}) **",
                rcd.len(),
                min,
                get_u32(rcd, abs::ADDR)
            ));
        }
        RecordType::Id => id_too_small(rcd, min, line),
        RecordType::Slen => {
            line.push(format_args!(
                " *** Size is too small. is {}, s/b > {} (ident={}, length={}) **",
                rcd.len(),
                min,
                get_i32(rcd, slen::IDENT),
                get_u32(rcd, slen::LENGTH)
            ));
        }
        _ => {
            line.push(format_args!(
                " *** Size is too small. is {}, s/b > {} **",
                rcd.len(),
                min
            ));
        }
    }
}

fn id_too_small(rcd: &[u8], expected: usize, line: &mut LineBuffer) {
    line.push(format_args!(
        " *** Size is too small. is {}, s/b > {} (siz={}({}), maj={}, min={}, symsiz={}({}), segsiz={}({}), img={}, targ={}, time={}, err={}, warn={}) **",
        rcd.len(),
        expected,
        get_u16(rcd, id::STRUCT_SIZE),
        id::SIZE,
        get_u16(rcd, id::MAJOR),
        get_u16(rcd, id::MINOR),
        get_u16(rcd, id::SYM_SIZE),
        sym::SIZE,
        get_u16(rcd, id::SEG_SIZE),
        seg::SIZE,
        get_u16(rcd, id::IMAGE),
        get_u16(rcd, id::TARGET),
        get_u16(rcd, id::TIME),
        get_u16(rcd, id::ERRORS),
        get_u16(rcd, id::WARNINGS)
    ));
}

/// Called once the record holds the full fixed header.
fn render_id(rcd: &[u8], line: &mut LineBuffer) {
    let cnt = rcd.len();
    let siz = get_u16(rcd, id::STRUCT_SIZE);
    let maj = get_u16(rcd, id::MAJOR);
    let min = get_u16(rcd, id::MINOR);
    let symsiz = get_u16(rcd, id::SYM_SIZE);
    let segsiz = get_u16(rcd, id::SEG_SIZE);
    let image = get_u16(rcd, id::IMAGE);
    let target = get_u16(rcd, id::TARGET);
    let time = get_u16(rcd, id::TIME);
    let errors = get_u16(rcd, id::ERRORS);
    let warns = get_u16(rcd, id::WARNINGS);

    if cnt < time as usize + 1 {
        id_too_small(rcd, time as usize + 1, line);
    } else if siz as usize != id::SIZE {
        line.push(format_args!(
            " *** VLDA_id struct size is {}. s/b {} **",
            siz,
            id::SIZE
        ));
    } else if maj != layout::VLDA_MAJOR || min != layout::VLDA_MINOR {
        line.push(format_args!(
            " *** Version is {}.{}. s/b {}.{} **",
            maj,
            min,
            layout::VLDA_MAJOR,
            layout::VLDA_MINOR
        ));
    } else if symsiz as usize != sym::SIZE || segsiz as usize != seg::SIZE {
        line.push(format_args!(
            " *** VLDA_sym struct size is {}. s/b {} and VLDA_seg struct size is {}. s/b {} **",
            symsiz,
            sym::SIZE,
            segsiz,
            seg::SIZE
        ));
    } else {
        line.push(format_args!(
            " err={}, warn={}, img={}, target={}, {}",
            errors,
            warns,
            resolve_name(rcd, image),
            resolve_name(rcd, target),
            resolve_name(rcd, time)
        ));
    }
}

fn render_symbol(rcd: &[u8], line: &mut LineBuffer) {
    let cnt = rcd.len();
    let flags = get_u16(rcd, gsd::FLAGS);
    let ident = get_i32(rcd, sym::IDENT);
    let value = get_i32(rcd, sym::VALUE);
    let noff = get_u16(rcd, sym::NAME);
    let eoff = get_u16(rcd, sym::EXPR);

    let expected = if cnt < sym::SIZE {
        Some(sym::SIZE)
    } else if noff != 0 && cnt < noff as usize + 1 {
        Some(noff as usize + 1)
    } else if eoff != 0 && cnt < eoff as usize {
        Some(eoff as usize)
    } else {
        None
    };
    if let Some(expected) = expected {
        line.push(format_args!(
            " *** SYM: Size is too small. is {}, s/b > {} (flags=0x{:04X}, symb={}, ident={}, value={}, eoff={}) **",
            cnt,
            expected,
            flags,
            resolve_name(rcd, noff),
            ident,
            value,
            eoff
        ));
        return;
    }

    line.push(format_args!(
        " SYM: flags=0x{:04X}, symb={}, ident={}, value={}:",
        flags,
        resolve_name(rcd, noff),
        ident,
        value
    ));
    if eoff == 0 {
        line.push_str(" <no expression>");
        return;
    }
    // The expression runs up to the name when the name is stored after it.
    let start = eoff as usize;
    let end = if noff > eoff { noff as usize } else { cnt };
    render_expression(&rcd[start..end], line);
}

fn render_segment(rcd: &[u8], line: &mut LineBuffer) {
    let cnt = rcd.len();
    let flags = get_u16(rcd, gsd::FLAGS);
    let ident = get_i32(rcd, seg::IDENT);
    let salign = get_u16(rcd, seg::SYM_ALIGN);
    let dalign = get_u16(rcd, seg::DATA_ALIGN);
    let base = get_u32(rcd, seg::BASE);
    let maxlen = get_u32(rcd, seg::MAX_LEN);
    let offset = get_u32(rcd, seg::OFFSET);
    let noff = get_u16(rcd, seg::NAME);

    if cnt < seg::SIZE || (noff != 0 && cnt < noff as usize + 1) {
        let expected = if cnt < seg::SIZE { seg::SIZE } else { noff as usize + 1 };
        line.push(format_args!(
            " *** SEG: Size is too small. is {}, s/b > {} (flags=0x{:04X}, segm={}, ident={}, salign={}, dalign={}, base=0x{:X}, max=0x{:X}, offset=0x{:X}) **",
            cnt,
            expected,
            flags,
            resolve_name(rcd, noff),
            ident,
            salign,
            dalign,
            base,
            maxlen,
            offset
        ));
    } else {
        line.push(format_args!(
            " SEG: flags=0x{:04X}, segm={}, ident={}, salign={}, dalign={}, base=0x{:X}, max=0x{:X}, offset=0x{:X}",
            flags,
            resolve_name(rcd, noff),
            ident,
            salign,
            dalign,
            base,
            maxlen,
            offset
        ));
    }
}

/// Called once the record holds the full fixed layout.
fn render_slen(rcd: &[u8], line: &mut LineBuffer) {
    line.push(format_args!(
        " ident={}, length={}",
        get_i32(rcd, slen::IDENT),
        get_u32(rcd, slen::LENGTH)
    ));
}
