//! The binary Ion backend: bit-level primitives, the deferred-length
//! serialization tree, the raw tag/length scanner, and the `IonReader`/
//! `IonWriter` implementations built on top of them (`spec.md` §4.1, §4.5,
//! §4.8).

mod deferred;
mod primitives;
mod raw_reader;
mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
