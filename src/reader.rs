//! The polymorphic reader contract (`spec.md` §4.7): one cursor interface,
//! two implementations (`crate::binary::BinaryReader`,
//! `crate::text::TextReader`).
//!
//! Grounded in the shape of `RawIonReader` from the retrieval pack's
//! `ion-rust` excerpts — a `next`/`current` cursor with typed accessors and
//! `step_in`/`step_out` — simplified to owned-value accessors (no borrowed
//! `&str` returns) to keep the binary and text implementations symmetric.

use num_bigint::BigInt;

use crate::error::IonResult;
use crate::symbols::LocalSymbolTable;
use crate::types::{Decimal, Int, IonType, SymbolToken, Timestamp};

/// What the cursor is positioned over after a call to `next()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamItem {
    /// Not positioned on a value: before the first value, after stepping
    /// into a container, after stepping out, or at the end of a container.
    Nothing,
    Value(IonType),
    Null(IonType),
}

impl StreamItem {
    pub fn ion_type(self) -> Option<IonType> {
        match self {
            StreamItem::Value(t) | StreamItem::Null(t) => Some(t),
            StreamItem::Nothing => None,
        }
    }

    pub fn is_null(self) -> bool {
        matches!(self, StreamItem::Null(_))
    }
}

pub trait IonReader {
    /// Advances to the next value at the current depth. Returns
    /// `StreamItem::Nothing` at the end of the current container or stream.
    fn next(&mut self) -> IonResult<StreamItem>;

    /// The item most recently returned by `next()`.
    fn current(&self) -> StreamItem;

    fn ion_type(&self) -> Option<IonType> {
        self.current().ion_type()
    }

    fn is_null(&self) -> bool {
        self.current().is_null()
    }

    /// The current value's field name, if positioned inside a struct.
    fn field_name(&self) -> Option<&SymbolToken>;

    /// The current value's annotations, in declaration order.
    fn annotations(&self) -> &[SymbolToken];

    /// Descends into the current container value.
    fn step_in(&mut self) -> IonResult<()>;

    /// Ascends out of the current container, skipping any unread children.
    fn step_out(&mut self) -> IonResult<()>;

    /// Nesting depth; 0 at the top level.
    fn depth(&self) -> usize;

    /// The local symbol table currently in effect. `None` for text readers,
    /// which have no binary symbol table concept.
    fn symbol_table(&self) -> Option<&LocalSymbolTable> {
        None
    }

    fn read_bool(&mut self) -> IonResult<bool>;
    fn read_i64(&mut self) -> IonResult<i64>;
    fn read_int(&mut self) -> IonResult<Int>;
    fn read_big_int(&mut self) -> IonResult<BigInt>;
    fn read_f64(&mut self) -> IonResult<f64>;
    fn read_decimal(&mut self) -> IonResult<Decimal>;
    fn read_timestamp(&mut self) -> IonResult<Timestamp>;
    fn read_symbol(&mut self) -> IonResult<SymbolToken>;
    fn read_string(&mut self) -> IonResult<String>;
    fn read_clob(&mut self) -> IonResult<Vec<u8>>;
    fn read_blob(&mut self) -> IonResult<Vec<u8>>;
}
