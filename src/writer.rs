//! The polymorphic writer contract (`spec.md` §4.9): one emitter interface,
//! two implementations (`crate::binary::BinaryWriter`,
//! `crate::text::TextWriter`).

use num_bigint::BigInt;

use crate::error::IonResult;
use crate::types::{Decimal, IonType, Timestamp};

pub trait IonWriter {
    /// Records the field name for the next value written; only valid while
    /// positioned inside a struct (`spec.md` §4.9 state machine).
    fn set_field_name(&mut self, name: &str) -> IonResult<()>;

    /// Appends an annotation to the pending list for the next value.
    fn add_annotation(&mut self, name: &str) -> IonResult<()>;

    fn write_null(&mut self, ion_type: IonType) -> IonResult<()>;
    fn write_bool(&mut self, value: bool) -> IonResult<()>;
    fn write_i64(&mut self, value: i64) -> IonResult<()>;
    fn write_big_int(&mut self, value: &BigInt) -> IonResult<()>;
    fn write_f64(&mut self, value: f64) -> IonResult<()>;
    fn write_decimal(&mut self, value: &Decimal) -> IonResult<()>;
    fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()>;
    fn write_symbol(&mut self, value: &str) -> IonResult<()>;
    fn write_string(&mut self, value: &str) -> IonResult<()>;
    fn write_clob(&mut self, value: &[u8]) -> IonResult<()>;
    fn write_blob(&mut self, value: &[u8]) -> IonResult<()>;

    fn begin_list(&mut self) -> IonResult<()>;
    fn end_list(&mut self) -> IonResult<()>;
    fn begin_sexp(&mut self) -> IonResult<()>;
    fn end_sexp(&mut self) -> IonResult<()>;
    fn begin_struct(&mut self) -> IonResult<()>;
    fn end_struct(&mut self) -> IonResult<()>;

    /// Flushes any buffered state (pending local symbol table, the
    /// top-level deferred container) to the sink. Mandatory before the
    /// writer is dropped (`spec.md` §3 "Lifecycles").
    fn finish(&mut self) -> IonResult<()>;
}
