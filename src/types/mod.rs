//! Format-agnostic data types shared by the binary and text backends.
//!
//! Nothing in this module knows whether it was read from (or will be
//! written to) text or binary Ion; that split lives entirely in
//! `crate::binary` and `crate::text`.

mod decimal;
mod int;
mod timestamp;

pub use decimal::Decimal;
pub use int::{Int, IntSize};
pub use timestamp::{Precision as TimestampPrecision, Timestamp};

/// The closed set of Ion value types, plus `Null` for "the cursor is not
/// positioned on a value".
///
/// Discriminants match the binary type codes in the Ion 1.0 spec (0x0..0xD)
/// so that `IonType as u8` is always the wire type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IonType {
    Null = 0x0,
    Bool = 0x1,
    Int = 0x2,
    Float = 0x4,
    Decimal = 0x5,
    Timestamp = 0x6,
    Symbol = 0x7,
    String = 0x8,
    Clob = 0x9,
    Blob = 0xA,
    List = 0xB,
    SExp = 0xC,
    Struct = 0xD,
}

impl IonType {
    pub fn is_container(self) -> bool {
        matches!(self, IonType::List | IonType::SExp | IonType::Struct)
    }

    pub fn name(self) -> &'static str {
        match self {
            IonType::Null => "null",
            IonType::Bool => "bool",
            IonType::Int => "int",
            IonType::Float => "float",
            IonType::Decimal => "decimal",
            IonType::Timestamp => "timestamp",
            IonType::Symbol => "symbol",
            IonType::String => "string",
            IonType::Clob => "clob",
            IonType::Blob => "blob",
            IonType::List => "list",
            IonType::SExp => "sexp",
            IonType::Struct => "struct",
        }
    }
}

impl std::fmt::Display for IonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A symbol whose text may or may not be known. `Unknown` arises when a
/// shared symbol table import can't be resolved against the catalog and a
/// placeholder stands in for it (`spec.md` §4.4): the ID is still usable for
/// arithmetic and equality, but it renders as `$n` rather than a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolToken {
    Known(String),
    Unknown(u64),
}

impl SymbolToken {
    pub fn text(&self) -> Option<&str> {
        match self {
            SymbolToken::Known(s) => Some(s),
            SymbolToken::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for SymbolToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolToken::Known(s) => f.write_str(s),
            SymbolToken::Unknown(id) => write!(f, "${id}"),
        }
    }
}
