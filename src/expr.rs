//! Expression bytecode: a declared term count followed by opcode/operand terms.
//!
//! Expressions appear inside GSD symbol definitions and as standalone EXPR records.
//! Layout: `[count:u8] ([opcode:u8] [operands..])*`. Operand widths are fixed per
//! opcode, except the operator which takes one more byte after a `!` escape.
//!
//! Symbol references, values and operators count toward the declared total. Segment
//! length/base markers and tags annotate the surrounding terms and are not counted.
//!
//! Decoding is best effort: an unknown opcode or an operand running past the end of
//! the expression ends decoding of that expression only, reported as an [`ExprFault`].

use crate::bytes::{get_u16, get_u32, get_u8};
use crate::line::LineBuffer;
use std::fmt;

/// Opcode values.
pub mod opcode {
    pub const SYM: u8 = 1;
    pub const VALUE: u8 = 2;
    pub const OPER: u8 = 3;
    pub const L: u8 = 4;
    pub const B: u8 = 5;
    pub const TAG: u8 = 6;
    pub const CSYM: u8 = 7;
    pub const CVALUE: u8 = 8;
    pub const WVALUE: u8 = 9;
    pub const TAG1: u8 = 10;
    pub const CTAG: u8 = 11;
    pub const WTAG: u8 = 12;
    pub const ZERO: u8 = 13;
}

/// Operators are one character, or two when escaped with a leading `!`.
pub const OPER_ESCAPE: u8 = b'!';

/// Columns that must stay free on the line before another term is rendered.
pub const EXPR_MARGIN: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Single(u8),
    Escaped(u8),
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Single(c) => write!(f, "{}", char::from(*c)),
            Operator::Escaped(c) => write!(f, "!{}", char::from(*c)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprTerm {
    /// Symbol reference with a 16-bit index.
    Sym(u16),
    /// Symbol reference with an 8-bit index.
    CSym(u8),
    ZeroValue,
    CValue(u8),
    WValue(u16),
    Value(u32),
    Operator(Operator),
    /// Segment length of the preceding symbol.
    LengthRef,
    /// Segment base of the preceding symbol.
    BaseRef,
    Tag { tag: u8, count: u32 },
    /// Tag with an implied count of one.
    Tag1(u8),
    TagC { tag: u8, count: u8 },
    TagW { tag: u8, count: u16 },
}

impl ExprTerm {
    /// Whether the term counts toward the expression's declared term count.
    pub fn is_counted(&self) -> bool {
        !matches!(
            self,
            ExprTerm::LengthRef
                | ExprTerm::BaseRef
                | ExprTerm::Tag { .. }
                | ExprTerm::Tag1(_)
                | ExprTerm::TagC { .. }
                | ExprTerm::TagW { .. }
        )
    }
}

impl fmt::Display for ExprTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprTerm::Sym(n) => write!(f, "%{}", n),
            ExprTerm::CSym(n) => write!(f, "%{}", n),
            ExprTerm::ZeroValue => f.write_str("0"),
            ExprTerm::CValue(v) => write!(f, "{}", v),
            ExprTerm::WValue(v) => write!(f, "{}", v),
            // 32-bit values are signed in expressions.
            ExprTerm::Value(v) => write!(f, "{}", *v as i32),
            ExprTerm::Operator(op) => write!(f, "{}", op),
            ExprTerm::LengthRef => f.write_str("L"),
            ExprTerm::BaseRef => f.write_str("B"),
            ExprTerm::Tag { tag, count } => write!(f, ":{} {}", char::from(*tag), count),
            ExprTerm::Tag1(tag) => write!(f, ":{}", char::from(*tag)),
            ExprTerm::TagC { tag, count } => write!(f, ":{} {}", char::from(*tag), count),
            ExprTerm::TagW { tag, count } => write!(f, ":{} {}", char::from(*tag), count),
        }
    }
}

/// Why decoding of an expression stopped early. `remaining` counts the bytes after the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprFault {
    Undefined { opcode: u8, remaining: usize },
    Short { opcode: u8, remaining: usize },
}

impl fmt::Display for ExprFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprFault::Undefined { opcode, remaining } => {
                write!(f, "0x{:X}(UNDEF) (+{} more)", opcode, remaining)
            }
            ExprFault::Short { opcode, remaining } => {
                write!(f, "0x{:X}(SHORT) (+{} more)", opcode, remaining)
            }
        }
    }
}

/// Term-by-term decoder over one expression. Stops after the declared number of
/// counted terms, at the end of the bytes, or after yielding a fault.
#[derive(Debug, Clone)]
pub struct Terms<'a> {
    data: &'a [u8],
    pos: usize,
    declared: u8,
    pending: u8,
    failed: bool,
}

impl<'a> Terms<'a> {
    pub fn new(expr: &'a [u8]) -> Self {
        let declared = get_u8(expr, 0);
        Terms {
            data: expr,
            pos: expr.len().min(1),
            declared,
            pending: declared,
            failed: false,
        }
    }

    pub fn declared(&self) -> u8 {
        self.declared
    }

    /// Counted terms still expected.
    pub fn pending(&self) -> u8 {
        self.pending
    }

    /// Bytes consumed so far, including the count byte.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn decode_one(&mut self) -> Result<ExprTerm, ExprFault> {
        let opcode = self.data[self.pos];
        self.pos += 1;
        let rest = &self.data[self.pos..];
        let (term, width) = match opcode {
            opcode::SYM => (ExprTerm::Sym(get_u16(rest, 0)), 2),
            opcode::CSYM => (ExprTerm::CSym(get_u8(rest, 0)), 1),
            opcode::ZERO => (ExprTerm::ZeroValue, 0),
            opcode::CVALUE => (ExprTerm::CValue(get_u8(rest, 0)), 1),
            opcode::WVALUE => (ExprTerm::WValue(get_u16(rest, 0)), 2),
            opcode::VALUE => (ExprTerm::Value(get_u32(rest, 0)), 4),
            opcode::OPER => match get_u8(rest, 0) {
                OPER_ESCAPE => (ExprTerm::Operator(Operator::Escaped(get_u8(rest, 1))), 2),
                c => (ExprTerm::Operator(Operator::Single(c)), 1),
            },
            opcode::L => (ExprTerm::LengthRef, 0),
            opcode::B => (ExprTerm::BaseRef, 0),
            opcode::TAG => (
                ExprTerm::Tag { tag: get_u8(rest, 0), count: get_u32(rest, 1) },
                5,
            ),
            opcode::TAG1 => (ExprTerm::Tag1(get_u8(rest, 0)), 1),
            opcode::CTAG => (
                ExprTerm::TagC { tag: get_u8(rest, 0), count: get_u8(rest, 1) },
                2,
            ),
            opcode::WTAG => (
                ExprTerm::TagW { tag: get_u8(rest, 0), count: get_u16(rest, 1) },
                3,
            ),
            _ => {
                return Err(ExprFault::Undefined { opcode, remaining: rest.len() });
            }
        };
        if width > rest.len() {
            return Err(ExprFault::Short { opcode, remaining: rest.len() });
        }
        self.pos += width;
        if term.is_counted() {
            self.pending -= 1;
        }
        Ok(term)
    }
}

impl Iterator for Terms<'_> {
    type Item = Result<ExprTerm, ExprFault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pending == 0 || self.remaining() == 0 {
            return None;
        }
        let item = self.decode_one();
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

/// Fully decoded expression, independent of any line budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub declared: u8,
    pub terms: Vec<ExprTerm>,
    pub fault: Option<ExprFault>,
    /// Bytes not consumed after decoding stopped.
    pub trailing: usize,
    pub consumed: usize,
}

pub fn decode_expression(expr: &[u8]) -> Expression {
    let mut it = Terms::new(expr);
    let mut terms = Vec::new();
    let mut fault = None;
    for item in it.by_ref() {
        match item {
            Ok(t) => terms.push(t),
            Err(f) => fault = Some(f),
        }
    }
    Expression {
        declared: it.declared(),
        terms,
        fault,
        trailing: it.remaining(),
        consumed: it.consumed(),
    }
}

/// Render an expression onto `line`: ` Expr Terms=N`, then each term, a fault marker
/// if decoding failed, or ` (+N more bytes)` for anything left unread.
pub fn render_expression(expr: &[u8], line: &mut LineBuffer) {
    let mut terms = Terms::new(expr);
    line.push(format_args!(" Expr Terms={}", terms.declared()));
    while line.has_room(EXPR_MARGIN) {
        match terms.next() {
            Some(Ok(term)) => {
                line.push(format_args!(" {}", term));
            }
            Some(Err(fault)) => {
                line.push(format_args!(" {}", fault));
                return;
            }
            None => break,
        }
    }
    if terms.remaining() > 0 {
        line.push(format_args!(" (+{} more bytes)", terms.remaining()));
    }
}
