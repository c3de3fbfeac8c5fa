//! Record type codes and their display names.

use crate::layout;

/// Record types of a VLDA stream. Codes outside the table map to [`RecordType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// Absolute text.
    Abs,
    /// Relocatable text.
    Txt,
    /// Symbol or segment definition.
    Gsd,
    /// Set the location counter (raw bytes).
    Org,
    /// Image identification header.
    Id,
    /// Standalone expression.
    Expr,
    /// Transparent record, raw data follows.
    Tpr,
    /// Segment length.
    Slen,
    /// Transfer address.
    Xfer,
    /// Test expression, print message if false.
    Test,
    /// Debug file specification.
    DbgFile,
    /// Debug segment descriptors.
    DbgSeg,
    /// Branch offset range test.
    Boff,
    /// Operand value range test.
    Oor,
    Other(u8),
}

/// Static description of one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordTypeInfo {
    pub code: u8,
    pub name: &'static str,
    /// Smallest valid `byteCount` for fixed-shape records.
    pub min_size: Option<usize>,
}

/// Display name of codes missing from [`RECORD_TYPES`].
pub const UNDEFINED_NAME: &str = "*Undefined*";

pub static RECORD_TYPES: [RecordTypeInfo; 14] = [
    RecordTypeInfo { code: 0, name: "ABS", min_size: Some(layout::abs::SIZE) },
    RecordTypeInfo { code: 1, name: "TXT", min_size: Some(layout::abs::SIZE) },
    RecordTypeInfo { code: 2, name: "GSD", min_size: None },
    RecordTypeInfo { code: 3, name: "ORG", min_size: None },
    RecordTypeInfo { code: 4, name: "ID", min_size: Some(layout::id::SIZE) },
    RecordTypeInfo { code: 5, name: "EXPR", min_size: None },
    RecordTypeInfo { code: 6, name: "TPR", min_size: None },
    RecordTypeInfo { code: 7, name: "SLEN", min_size: Some(layout::slen::SIZE) },
    RecordTypeInfo { code: 8, name: "XFER", min_size: Some(layout::abs::SIZE) },
    RecordTypeInfo { code: 9, name: "TEST", min_size: Some(layout::test::SIZE) },
    RecordTypeInfo { code: 10, name: "DBGFILE", min_size: Some(layout::dbgfile::SIZE) },
    RecordTypeInfo { code: 11, name: "DBGSEG", min_size: Some(layout::dbgseg::SIZE) },
    RecordTypeInfo { code: 12, name: "BOFF", min_size: Some(layout::test::SIZE) },
    RecordTypeInfo { code: 13, name: "OOR", min_size: Some(layout::test::SIZE) },
];

impl RecordType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RecordType::Abs,
            1 => RecordType::Txt,
            2 => RecordType::Gsd,
            3 => RecordType::Org,
            4 => RecordType::Id,
            5 => RecordType::Expr,
            6 => RecordType::Tpr,
            7 => RecordType::Slen,
            8 => RecordType::Xfer,
            9 => RecordType::Test,
            10 => RecordType::DbgFile,
            11 => RecordType::DbgSeg,
            12 => RecordType::Boff,
            13 => RecordType::Oor,
            other => RecordType::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            RecordType::Abs => 0,
            RecordType::Txt => 1,
            RecordType::Gsd => 2,
            RecordType::Org => 3,
            RecordType::Id => 4,
            RecordType::Expr => 5,
            RecordType::Tpr => 6,
            RecordType::Slen => 7,
            RecordType::Xfer => 8,
            RecordType::Test => 9,
            RecordType::DbgFile => 10,
            RecordType::DbgSeg => 11,
            RecordType::Boff => 12,
            RecordType::Oor => 13,
            RecordType::Other(code) => code,
        }
    }

    pub fn info(self) -> Option<&'static RecordTypeInfo> {
        lookup(self.code())
    }

    pub fn name(self) -> &'static str {
        self.info().map(|i| i.name).unwrap_or(UNDEFINED_NAME)
    }

    /// `<code>(<name>)`, the leading label of every rendered record.
    pub fn label(self) -> String {
        format!("{}({})", self.code(), self.name())
    }
}

pub fn lookup(code: u8) -> Option<&'static RecordTypeInfo> {
    RECORD_TYPES.iter().find(|info| info.code == code)
}

pub fn name_of(code: u8) -> &'static str {
    lookup(code).map(|i| i.name).unwrap_or(UNDEFINED_NAME)
}
