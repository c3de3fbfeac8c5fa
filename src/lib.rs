//! # vldadump: VLDA object stream decoder
//!
//! Renders the records of a VLDA linker/assembler object file as text, one line per
//! record, for inspecting what a tool actually wrote. Malformed records are reported
//! inline and never stop the walk; only a lost record framing does.
//!
//! ## Stream layout
//!
//! A VLDA file is a sequence of records:
//!
//! ```text
//! [count: u16 LE][type: u8][payload: count-1 bytes][pad byte if count is odd]
//! ```
//!
//! - **Text** (`ABS`, `TXT`, `XFER`): load address and data bytes
//! - **GSD**: a symbol definition (with an optional expression) or a segment definition
//! - **ID**: format version, structure sizes and image/target names
//! - **EXPR**: standalone expression bytecode
//! - **Raw** (`ORG`, `TPR`, `DBGFILE`, `DBGSEG`): shown as bytes
//!
//! ## Output
//!
//! ```text
//!   0: 0x0031* 4(ID) err=0, warn=0, img=demo, target=6502, Mon Oct 19 10:00:00 2026
//!   1: 0x0010  0(ABS) 00001000 -> A9 00 8D 00 02 60 EA EA
//! ```
//!
//! With a hex/ASCII row width set in [`Options`], raw data records print as rows.
//!
//! ## Usage
//!
//! ```no_run
//! use vldadump::{write_stream, Decoder, Options};
//!
//! let image = std::fs::read("a.vlda")?;
//! let decoder = Decoder::new(&Options::default());
//! write_stream(&mut std::io::stdout(), &image, &decoder)?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod bytes;
pub mod decode;
pub mod dump;
pub mod expr;
pub mod frame;
pub mod image;
pub mod layout;
pub mod line;
pub mod options;
pub mod registry;

pub use decode::{resolve_name, Decoder, NameRef};
pub use dump::HexAsciiDump;
pub use expr::{decode_expression, render_expression, ExprFault, ExprTerm, Expression, Terms};
pub use frame::{
    write_stream, Record, RecordHeader, RecordStream, RenderedRecord, StreamEvent, StreamSummary,
};
pub use image::{load, read_image, Image, LoadError};
pub use line::LineBuffer;
pub use options::{ConfigError, Options};
pub use registry::{RecordType, RecordTypeInfo};
