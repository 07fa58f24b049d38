//! # ion-rs
//!
//! A library for reading and writing the Amazon Ion data interchange format
//! in both its binary and text encodings.
//!
//! ## Features
//!
//! - One `IonReader`/`IonWriter` cursor API shared by the binary and text
//!   backends
//! - Binary local symbol table management, including `$ion_symbol_table`
//!   append/reset directives and shared-table imports resolved against a
//!   [`Catalog`](symbols::Catalog)
//! - Arbitrary-precision `Int`/`Decimal`, and a `Timestamp` that preserves
//!   its declared precision across round-trips
//! - Stream-format autodetection: [`read`] peeks the input for the binary
//!   version marker and dispatches to the matching reader
//!
//! ## Quick Start
//!
//! ```no_run
//! use ion_rs::{read, IonReader, StreamItem};
//!
//! let mut reader = read(std::io::stdin())?;
//! while reader.next()? != StreamItem::Nothing {
//!     println!("{:?}", reader.ion_type());
//! }
//! # Ok::<(), ion_rs::IonError>(())
//! ```
//!
//! For explicit control over which backend and encoding to use:
//!
//! ```no_run
//! use ion_rs::{BinaryWriter, IonWriter};
//!
//! let mut writer = BinaryWriter::new(Vec::new());
//! writer.write_i64(42)?;
//! writer.finish()?;
//! # Ok::<(), ion_rs::IonError>(())
//! ```

pub mod binary;
pub mod error;
pub mod io;
pub mod reader;
pub mod symbols;
pub mod text;
pub mod types;
pub mod writer;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::{IonError, IonResult};
pub use reader::{IonReader, StreamItem};
pub use text::{TextReader, TextWriter};
pub use types::{Decimal, Int, IntSize, IonType, SymbolToken, Timestamp, TimestampPrecision};
pub use writer::IonWriter;

use std::io::{Cursor, Read};

use num_bigint::BigInt;

use symbols::LocalSymbolTable;

/// The 4-byte binary version marker every binary Ion stream opens with
/// (`spec.md` §4.4, §6.3).
const BVM_PREFIX: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

/// Either backend's reader, chosen by [`read`]'s autodetection.
pub enum AnyReader {
    Binary(BinaryReader<Cursor<Vec<u8>>>),
    Text(TextReader<Cursor<Vec<u8>>>),
}

/// Buffers all of `source`, then returns the reader matching its encoding:
/// binary if it opens with the version marker, text otherwise (`spec.md`
/// §6.3).
pub fn read<R: Read>(mut source: R) -> IonResult<AnyReader> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    if bytes.starts_with(&BVM_PREFIX) {
        Ok(AnyReader::Binary(BinaryReader::new(Cursor::new(bytes))))
    } else {
        Ok(AnyReader::Text(TextReader::new(Cursor::new(bytes))?))
    }
}

impl IonReader for AnyReader {
    fn next(&mut self) -> IonResult<StreamItem> {
        match self {
            AnyReader::Binary(r) => r.next(),
            AnyReader::Text(r) => r.next(),
        }
    }

    fn current(&self) -> StreamItem {
        match self {
            AnyReader::Binary(r) => r.current(),
            AnyReader::Text(r) => r.current(),
        }
    }

    fn field_name(&self) -> Option<&SymbolToken> {
        match self {
            AnyReader::Binary(r) => r.field_name(),
            AnyReader::Text(r) => r.field_name(),
        }
    }

    fn annotations(&self) -> &[SymbolToken] {
        match self {
            AnyReader::Binary(r) => r.annotations(),
            AnyReader::Text(r) => r.annotations(),
        }
    }

    fn step_in(&mut self) -> IonResult<()> {
        match self {
            AnyReader::Binary(r) => r.step_in(),
            AnyReader::Text(r) => r.step_in(),
        }
    }

    fn step_out(&mut self) -> IonResult<()> {
        match self {
            AnyReader::Binary(r) => r.step_out(),
            AnyReader::Text(r) => r.step_out(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            AnyReader::Binary(r) => r.depth(),
            AnyReader::Text(r) => r.depth(),
        }
    }

    fn symbol_table(&self) -> Option<&LocalSymbolTable> {
        match self {
            AnyReader::Binary(r) => r.symbol_table(),
            AnyReader::Text(r) => r.symbol_table(),
        }
    }

    fn read_bool(&mut self) -> IonResult<bool> {
        match self {
            AnyReader::Binary(r) => r.read_bool(),
            AnyReader::Text(r) => r.read_bool(),
        }
    }

    fn read_i64(&mut self) -> IonResult<i64> {
        match self {
            AnyReader::Binary(r) => r.read_i64(),
            AnyReader::Text(r) => r.read_i64(),
        }
    }

    fn read_int(&mut self) -> IonResult<Int> {
        match self {
            AnyReader::Binary(r) => r.read_int(),
            AnyReader::Text(r) => r.read_int(),
        }
    }

    fn read_big_int(&mut self) -> IonResult<BigInt> {
        match self {
            AnyReader::Binary(r) => r.read_big_int(),
            AnyReader::Text(r) => r.read_big_int(),
        }
    }

    fn read_f64(&mut self) -> IonResult<f64> {
        match self {
            AnyReader::Binary(r) => r.read_f64(),
            AnyReader::Text(r) => r.read_f64(),
        }
    }

    fn read_decimal(&mut self) -> IonResult<Decimal> {
        match self {
            AnyReader::Binary(r) => r.read_decimal(),
            AnyReader::Text(r) => r.read_decimal(),
        }
    }

    fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        match self {
            AnyReader::Binary(r) => r.read_timestamp(),
            AnyReader::Text(r) => r.read_timestamp(),
        }
    }

    fn read_symbol(&mut self) -> IonResult<SymbolToken> {
        match self {
            AnyReader::Binary(r) => r.read_symbol(),
            AnyReader::Text(r) => r.read_symbol(),
        }
    }

    fn read_string(&mut self) -> IonResult<String> {
        match self {
            AnyReader::Binary(r) => r.read_string(),
            AnyReader::Text(r) => r.read_string(),
        }
    }

    fn read_clob(&mut self) -> IonResult<Vec<u8>> {
        match self {
            AnyReader::Binary(r) => r.read_clob(),
            AnyReader::Text(r) => r.read_clob(),
        }
    }

    fn read_blob(&mut self) -> IonResult<Vec<u8>> {
        match self {
            AnyReader::Binary(r) => r.read_blob(),
            AnyReader::Text(r) => r.read_blob(),
        }
    }
}
