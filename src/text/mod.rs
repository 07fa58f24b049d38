//! The text Ion backend: tokenizer, `IonReader`/`IonWriter` implementations,
//! and the quoting/escaping rules they share (`spec.md` §4.6, §4.9, §6.2).

mod escaping;
mod reader;
mod tokenizer;
mod writer;

pub use reader::TextReader;
pub use writer::TextWriter;
