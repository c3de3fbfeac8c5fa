//! Rendering options: output line width and optional hex/ASCII dump mode.

use crate::dump::HexAsciiDump;
use crate::frame::RECORD_PREFIX_WIDTH;

pub const DEFAULT_LINE_WIDTH: usize = 200;
/// Narrowest line that still leaves room for an expression term after the prefix.
pub const MIN_LINE_WIDTH: usize = 48;
pub const DEFAULT_ASCII_WIDTH: usize = 16;
pub const MAX_ASCII_WIDTH: usize = 64;
/// Widest type label among the dumped record types, `10(DBGFILE)`.
pub const MAX_DUMP_LABEL_WIDTH: usize = 11;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("line width {width} is too small (minimum {min})")]
    LineWidthTooSmall { width: usize, min: usize },
    #[error("ascii width {width} is out of range (1..={max})")]
    AsciiWidthOutOfRange { width: usize, max: usize },
    #[error("line width {line_width} cannot hold a {ascii_width} byte hex/ascii row ({required} columns needed)")]
    RowDoesNotFit {
        line_width: usize,
        ascii_width: usize,
        required: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    line_width: usize,
    dump: Option<HexAsciiDump>,
}

impl Default for Options {
    fn default() -> Self {
        Options { line_width: DEFAULT_LINE_WIDTH, dump: None }
    }
}

impl Options {
    /// Validate a line width and an optional dump row width.
    pub fn new(line_width: usize, ascii_width: Option<usize>) -> Result<Self, ConfigError> {
        if line_width < MIN_LINE_WIDTH {
            return Err(ConfigError::LineWidthTooSmall { width: line_width, min: MIN_LINE_WIDTH });
        }
        let dump = match ascii_width {
            None => None,
            Some(width) => {
                if width == 0 || width > MAX_ASCII_WIDTH {
                    return Err(ConfigError::AsciiWidthOutOfRange { width, max: MAX_ASCII_WIDTH });
                }
                let dump = HexAsciiDump::new(width);
                let required = dump_line_width(&dump);
                if required > line_width {
                    return Err(ConfigError::RowDoesNotFit {
                        line_width,
                        ascii_width: width,
                        required,
                    });
                }
                Some(dump)
            }
        };
        Ok(Options { line_width, dump })
    }

    /// Options from command-line style flags: `-l`, `-a`, `-d`.
    pub fn from_flags(
        line_width: Option<usize>,
        ascii_width: Option<usize>,
        dump: bool,
    ) -> Result<Self, ConfigError> {
        let ascii_width = match (ascii_width, dump) {
            (Some(w), _) => Some(w),
            (None, true) => Some(DEFAULT_ASCII_WIDTH),
            (None, false) => None,
        };
        Options::new(line_width.unwrap_or(DEFAULT_LINE_WIDTH), ascii_width)
    }

    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Row layout when raw data is dumped as hex + ASCII.
    pub fn dump(&self) -> Option<HexAsciiDump> {
        self.dump
    }

    /// Columns available to a record's body after the line prefix.
    pub fn body_capacity(&self) -> usize {
        self.line_width.saturating_sub(RECORD_PREFIX_WIDTH)
    }
}

/// Full printed width of one dump row: prefix, type label, space, row.
pub fn dump_line_width(dump: &HexAsciiDump) -> usize {
    RECORD_PREFIX_WIDTH + MAX_DUMP_LABEL_WIDTH + 1 + dump.row_width()
}
