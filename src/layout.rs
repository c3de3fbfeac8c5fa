//! On-disk layouts of the fixed-shape VLDA structures.
//!
//! Offsets are relative to the record's type byte. Every structure begins with a
//! 16-bit type word whose low byte is the record type code.

/// Format version this decoder was built against.
pub const VLDA_MAJOR: u16 = 1;
pub const VLDA_MINOR: u16 = 0;

/// Text records (ABS, TXT, XFER): load address, then data bytes.
pub mod abs {
    pub const ADDR: usize = 4;
    pub const SIZE: usize = 8;
}

/// Image identification record.
pub mod id {
    pub const STRUCT_SIZE: usize = 2;
    pub const MAJOR: usize = 4;
    pub const MINOR: usize = 6;
    pub const SYM_SIZE: usize = 8;
    pub const SEG_SIZE: usize = 10;
    pub const IMAGE: usize = 12;
    pub const TARGET: usize = 14;
    pub const TIME: usize = 16;
    pub const ERRORS: usize = 18;
    pub const WARNINGS: usize = 20;
    pub const SIZE: usize = 22;
}

/// GSD flags word, shared by the symbol and segment forms.
pub mod gsd {
    pub const FLAGS: usize = 2;
    /// Set for a symbol definition, clear for a segment.
    pub const FLAG_SYMBOL: u16 = 0x0001;
}

/// GSD symbol definition.
pub mod sym {
    pub const IDENT: usize = 4;
    pub const VALUE: usize = 8;
    pub const NAME: usize = 12;
    pub const EXPR: usize = 14;
    pub const SIZE: usize = 16;
}

/// GSD segment definition.
pub mod seg {
    pub const IDENT: usize = 4;
    pub const SYM_ALIGN: usize = 8;
    pub const DATA_ALIGN: usize = 10;
    pub const BASE: usize = 12;
    pub const MAX_LEN: usize = 16;
    pub const OFFSET: usize = 20;
    pub const NAME: usize = 24;
    pub const SIZE: usize = 28;
}

/// Segment length record.
pub mod slen {
    pub const IDENT: usize = 4;
    pub const LENGTH: usize = 8;
    pub const SIZE: usize = 12;
}

/// TEST / BOFF / OOR records. Contents are not decoded.
pub mod test {
    pub const SIZE: usize = 6;
}

pub mod dbgfile {
    pub const SIZE: usize = 8;
}

pub mod dbgseg {
    pub const SIZE: usize = 8;
}
