//! The binary `IonReader` implementation: wraps `RawBinaryReader`, resolves
//! field names and annotations against the active local symbol table, and
//! installs new local symbol tables from `$ion_symbol_table`-annotated
//! top-level structs (`spec.md` §4.4).

use std::io::Read;

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::error::{IonError, IonResult};
use crate::io::ByteSource;
use crate::reader::{IonReader, StreamItem};
use crate::symbols::{Catalog, LocalSymbolTable, SharedSymbolTable};
use crate::types::{Decimal, Int, IonType, SymbolToken, Timestamp};

use super::primitives::{decode_int, decode_uint, decode_var_int, decode_var_uint};
use super::raw_reader::{RawBinaryReader, RawItem, RawValue};

const SYM_IMPORTS: u64 = 6;
const SYM_SYMBOLS: u64 = 7;
const SYM_NAME: u64 = 4;
const SYM_VERSION: u64 = 5;
const SYM_MAX_ID: u64 = 8;
const SYM_ION_SYMBOL_TABLE: u64 = 3;

fn type_code_to_ion_type(code: u8) -> IonResult<IonType> {
    Ok(match code {
        0x0 => IonType::Null,
        0x1 => IonType::Bool,
        0x2 | 0x3 => IonType::Int,
        0x4 => IonType::Float,
        0x5 => IonType::Decimal,
        0x6 => IonType::Timestamp,
        0x7 => IonType::Symbol,
        0x8 => IonType::String,
        0x9 => IonType::Clob,
        0xA => IonType::Blob,
        0xB => IonType::List,
        0xC => IonType::SExp,
        0xD => IonType::Struct,
        other => return Err(IonError::InvalidTagByte { byte: other << 4, offset: 0 }),
    })
}

pub struct BinaryReader<R> {
    raw: RawBinaryReader<R>,
    catalog: Catalog,
    symbol_table: LocalSymbolTable,
    current: StreamItem,
    field_name: Option<SymbolToken>,
    annotations: Vec<SymbolToken>,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(source: R) -> BinaryReader<R> {
        BinaryReader::with_catalog(source, Catalog::new())
    }

    pub fn with_catalog(source: R, catalog: Catalog) -> BinaryReader<R> {
        BinaryReader {
            raw: RawBinaryReader::new(ByteSource::new(source)),
            catalog,
            symbol_table: LocalSymbolTable::system(),
            current: StreamItem::Nothing,
            field_name: None,
            annotations: Vec::new(),
        }
    }

    fn resolve(&self, id: u64) -> SymbolToken {
        self.symbol_table
            .find_by_id(id)
            .unwrap_or(SymbolToken::Unknown(id))
    }

    fn current_raw(&self) -> IonResult<&RawValue> {
        self.raw
            .current()
            .ok_or_else(|| IonError::usage("no current value"))
    }

    fn expect_code(&self, codes: &[u8], type_name: &'static str) -> IonResult<&RawValue> {
        let raw = self.current_raw()?;
        if !codes.contains(&raw.code) {
            return Err(IonError::WrongType {
                expected: type_name,
                found: type_code_to_ion_type(raw.code).map(|t| t.name()).unwrap_or("unknown"),
            });
        }
        Ok(raw)
    }

    fn read_body_string(&mut self) -> IonResult<String> {
        let bytes = self.raw.read_body()?;
        String::from_utf8(bytes).map_err(|_| IonError::syntax(0, "string body is not valid UTF-8"))
    }

    /// Consumes a top-level `$ion_symbol_table`-annotated struct and
    /// installs the resulting local symbol table, without surfacing it as
    /// an ordinary value.
    fn install_symbol_table_directive(&mut self) -> IonResult<()> {
        self.raw.step_in()?;
        let mut declared_imports: Option<Vec<SharedSymbolTable>> = None;
        let mut declared_symbols: Option<Vec<String>> = None;

        loop {
            match self.raw.next()? {
                RawItem::Nothing => break,
                RawItem::VersionMarker(..) => {
                    return Err(IonError::syntax(0, "version marker inside a symbol table struct"))
                }
                RawItem::Value => {}
            }
            let raw = self.current_raw()?.clone();
            let field_id = raw
                .field_id
                .ok_or_else(|| IonError::syntax(0, "symbol table struct field without a field ID"))?;

            if field_id == SYM_SYMBOLS {
                let mut symbols = Vec::new();
                self.raw.step_in()?;
                loop {
                    match self.raw.next()? {
                        RawItem::Nothing => break,
                        RawItem::VersionMarker(..) => {
                            return Err(IonError::syntax(0, "unexpected version marker"))
                        }
                        RawItem::Value => {}
                    }
                    symbols.push(self.read_body_string()?);
                }
                self.raw.step_out()?;
                declared_symbols = Some(symbols);
            } else if field_id == SYM_IMPORTS {
                let mut imports = Vec::new();
                self.raw.step_in()?;
                loop {
                    match self.raw.next()? {
                        RawItem::Nothing => break,
                        RawItem::VersionMarker(..) => {
                            return Err(IonError::syntax(0, "unexpected version marker"))
                        }
                        RawItem::Value => {}
                    }
                    imports.push(self.read_import_struct()?);
                }
                self.raw.step_out()?;
                declared_imports = Some(imports);
            } else {
                self.raw.read_body().ok();
            }
        }
        self.raw.step_out()?;

        let imports = declared_imports.unwrap_or_else(|| self.symbol_table.imports().to_vec());
        let locals = declared_symbols.unwrap_or_default();
        self.symbol_table = LocalSymbolTable::new(imports, locals);
        Ok(())
    }

    fn read_import_struct(&mut self) -> IonResult<SharedSymbolTable> {
        let mut name = None;
        let mut version = 1u32;
        let mut max_id = None;
        self.raw.step_in()?;
        loop {
            match self.raw.next()? {
                RawItem::Nothing => break,
                RawItem::VersionMarker(..) => {
                    return Err(IonError::syntax(0, "unexpected version marker in import struct"))
                }
                RawItem::Value => {}
            }
            let field_id = self
                .current_raw()?
                .field_id
                .ok_or_else(|| IonError::syntax(0, "import struct field without a field ID"))?;
            if field_id == SYM_NAME {
                name = Some(self.read_body_string()?);
            } else if field_id == SYM_VERSION {
                let bytes = self.raw.read_body()?;
                version = decode_uint(&bytes).to_u32().unwrap_or(1);
            } else if field_id == SYM_MAX_ID {
                let bytes = self.raw.read_body()?;
                max_id = Some(decode_uint(&bytes).to_u64().unwrap_or(0));
            } else {
                self.raw.read_body().ok();
            }
        }
        self.raw.step_out()?;
        let name = name.ok_or_else(|| IonError::syntax(0, "import struct missing a name"))?;

        let resolved = self
            .catalog
            .find_exact(&name, version)
            .or_else(|| self.catalog.find_latest(&name))
            .cloned()
            .unwrap_or_else(|| SharedSymbolTable::new(name.clone(), version, Vec::new()));
        Ok(match max_id {
            Some(declared) if declared != resolved.max_id() => resolved.adjust(declared),
            _ => resolved,
        })
    }
}

impl<R: Read> IonReader for BinaryReader<R> {
    fn next(&mut self) -> IonResult<StreamItem> {
        loop {
            let item = self.raw.next()?;
            match item {
                RawItem::VersionMarker(1, 0) => {
                    self.symbol_table = LocalSymbolTable::system();
                    continue;
                }
                RawItem::VersionMarker(major, minor) => {
                    return Err(IonError::UnsupportedVersion { major, minor, offset: 0 });
                }
                RawItem::Nothing => {
                    self.current = StreamItem::Nothing;
                    self.field_name = None;
                    self.annotations.clear();
                    return Ok(self.current);
                }
                RawItem::Value => {}
            }

            let raw = self.current_raw()?.clone();
            let is_symbol_table_directive = self.raw.depth() == 0
                && raw.code == 0xD
                && raw.annotation_ids.first() == Some(&SYM_ION_SYMBOL_TABLE);
            if is_symbol_table_directive {
                self.install_symbol_table_directive()?;
                continue;
            }

            self.field_name = raw.field_id.map(|id| self.resolve(id));
            self.annotations = raw.annotation_ids.iter().map(|&id| self.resolve(id)).collect();
            let ion_type = type_code_to_ion_type(raw.code)?;
            self.current = if raw.is_null {
                StreamItem::Null(ion_type)
            } else {
                StreamItem::Value(ion_type)
            };
            return Ok(self.current);
        }
    }

    fn current(&self) -> StreamItem {
        self.current
    }

    fn field_name(&self) -> Option<&SymbolToken> {
        self.field_name.as_ref()
    }

    fn annotations(&self) -> &[SymbolToken] {
        &self.annotations
    }

    fn step_in(&mut self) -> IonResult<()> {
        self.raw.step_in()?;
        self.current = StreamItem::Nothing;
        self.field_name = None;
        self.annotations.clear();
        Ok(())
    }

    fn step_out(&mut self) -> IonResult<()> {
        self.raw.step_out()?;
        self.current = StreamItem::Nothing;
        self.field_name = None;
        self.annotations.clear();
        Ok(())
    }

    fn depth(&self) -> usize {
        self.raw.depth()
    }

    fn symbol_table(&self) -> Option<&LocalSymbolTable> {
        Some(&self.symbol_table)
    }

    fn read_bool(&mut self) -> IonResult<bool> {
        let raw = self.expect_code(&[0x1], "bool")?.clone();
        Ok(!raw.is_null && raw.bool_value())
    }

    fn read_i64(&mut self) -> IonResult<i64> {
        self.read_int()?.as_i64().ok_or(IonError::OutOfRange)
    }

    fn read_int(&mut self) -> IonResult<Int> {
        Ok(Int::normalize(self.read_big_int()?))
    }

    fn read_big_int(&mut self) -> IonResult<BigInt> {
        let raw = self.expect_code(&[0x2, 0x3], "int")?.clone();
        if raw.is_null {
            return Ok(BigInt::from(0));
        }
        let bytes = self.raw.read_body()?;
        let magnitude = decode_uint(&bytes);
        let sign = if magnitude.is_zero() {
            Sign::NoSign
        } else if raw.code == 0x3 {
            Sign::Minus
        } else {
            Sign::Plus
        };
        Ok(BigInt::from_biguint(sign, magnitude))
    }

    fn read_f64(&mut self) -> IonResult<f64> {
        let raw = self.expect_code(&[0x4], "float")?.clone();
        if raw.is_null {
            return Ok(0.0);
        }
        let bytes = self.raw.read_body()?;
        Ok(match bytes.len() {
            0 => 0.0,
            4 => f32::from_be_bytes(bytes.try_into().unwrap()) as f64,
            8 => f64::from_be_bytes(bytes.try_into().unwrap()),
            _ => return Err(IonError::syntax(0, "float body must be 0, 4, or 8 bytes")),
        })
    }

    fn read_decimal(&mut self) -> IonResult<Decimal> {
        let raw = self.expect_code(&[0x5], "decimal")?.clone();
        if raw.is_null {
            return Ok(Decimal::zero());
        }
        let bytes = self.raw.read_body()?;
        if bytes.is_empty() {
            return Ok(Decimal::zero());
        }
        let (exponent, exp_len) = decode_var_int(&bytes)?;
        let coefficient = decode_int(&bytes[exp_len..])?;
        let (sign, magnitude) = coefficient.into_parts();
        Ok(Decimal::new(sign == Sign::Minus, magnitude, exponent as i32))
    }

    fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        let raw = self.expect_code(&[0x6], "timestamp")?.clone();
        if raw.is_null {
            return Timestamp::year(1);
        }
        let bytes = self.raw.read_body()?;
        decode_timestamp_body(&bytes)
    }

    fn read_symbol(&mut self) -> IonResult<SymbolToken> {
        let raw = self.expect_code(&[0x7], "symbol")?.clone();
        if raw.is_null {
            return Ok(SymbolToken::Unknown(0));
        }
        let bytes = self.raw.read_body()?;
        let id = decode_uint(&bytes).to_u64().unwrap_or(0);
        Ok(self.resolve(id))
    }

    fn read_string(&mut self) -> IonResult<String> {
        let raw = self.expect_code(&[0x8], "string")?.clone();
        if raw.is_null {
            return Ok(String::new());
        }
        self.read_body_string()
    }

    fn read_clob(&mut self) -> IonResult<Vec<u8>> {
        let raw = self.expect_code(&[0x9], "clob")?.clone();
        if raw.is_null {
            return Ok(Vec::new());
        }
        self.raw.read_body()
    }

    fn read_blob(&mut self) -> IonResult<Vec<u8>> {
        let raw = self.expect_code(&[0xA], "blob")?.clone();
        if raw.is_null {
            return Ok(Vec::new());
        }
        self.raw.read_body()
    }
}

fn decode_timestamp_body(bytes: &[u8]) -> IonResult<Timestamp> {
    let mut i = 0;
    let (offset_raw, len) = decode_var_int(&bytes[i..])?;
    i += len;
    // `spec.md` §4.3: offset VarInt byte `0x00 0xC0` (negative-zero VarInt)
    // denotes "unknown local offset". `decode_var_int` can't itself produce
    // a signed zero, so detect the sentinel from its raw bytes.
    let offset_minutes = if bytes[..len] == [0xC0] {
        None
    } else {
        Some(offset_raw as i32)
    };

    let (year, n) = decode_var_uint(&bytes[i..])?;
    i += n;
    if i >= bytes.len() {
        return Timestamp::year(year as u16);
    }
    let (month, n) = decode_var_uint(&bytes[i..])?;
    i += n;
    if i >= bytes.len() {
        return Timestamp::month(year as u16, month as u8);
    }
    let (day, n) = decode_var_uint(&bytes[i..])?;
    i += n;
    if i >= bytes.len() {
        return Timestamp::day(year as u16, month as u8, day as u8);
    }
    let (hour, n) = decode_var_uint(&bytes[i..])?;
    i += n;
    let (minute, n) = decode_var_uint(&bytes[i..])?;
    i += n;
    if i >= bytes.len() {
        return Timestamp::minute(year as u16, month as u8, day as u8, hour as u8, minute as u8, offset_minutes);
    }
    let (second, n) = decode_var_uint(&bytes[i..])?;
    i += n;
    if i >= bytes.len() {
        return Timestamp::second(
            year as u16, month as u8, day as u8, hour as u8, minute as u8, second as u8, offset_minutes,
        );
    }
    let (fraction_exponent, n) = decode_var_int(&bytes[i..])?;
    i += n;
    let frac_coefficient = decode_int(&bytes[i..])?;
    let (_, frac_magnitude) = frac_coefficient.into_parts();
    let coefficient = frac_magnitude.to_u32().unwrap_or(0);
    // The fractional value is `coefficient * 10^fraction_exponent` seconds;
    // `fraction_exponent` is always <= 0 for a valid fractional timestamp.
    let digits = (-fraction_exponent) as u32;
    let mut ts = Timestamp::second(
        year as u16, month as u8, day as u8, hour as u8, minute as u8, second as u8, offset_minutes,
    )?;
    ts.precision = crate::types::TimestampPrecision::Fractional;
    ts.fractional_digits = digits;
    // A declared precision finer than nanoseconds is truncated to the first
    // 9 significant digits rather than clamped (`spec.md` §4.3).
    let scaled = if digits > 9 {
        coefficient as u64 / 10u64.pow(digits - 9)
    } else {
        coefficient as u64 * 10u64.pow(9 - digits)
    };
    ts.subsecond_nanos = scaled.min(999_999_999) as u32;
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::primitives::{encode_int, encode_var_int, encode_var_uint};

    #[test]
    fn timestamp_with_more_than_nine_fractional_digits_truncates_to_nanoseconds() {
        let mut bytes = Vec::new();
        bytes.extend(encode_var_int(0)); // unknown-local-offset sentinel not used: UTC
        bytes.extend(encode_var_uint(2021));
        bytes.extend(encode_var_uint(6));
        bytes.extend(encode_var_uint(15));
        bytes.extend(encode_var_uint(13));
        bytes.extend(encode_var_uint(45));
        bytes.extend(encode_var_uint(30));
        bytes.extend(encode_var_int(-12));
        bytes.extend(encode_int(&BigInt::from(123_456_789_012i64)));

        let ts = decode_timestamp_body(&bytes).unwrap();
        assert_eq!(ts.fractional_digits, 12);
        assert_eq!(ts.subsecond_nanos, 123_456_789);
    }

    #[test]
    fn reads_e1_single_zero_int() {
        let mut r = BinaryReader::new(&[0xE0, 0x01, 0x00, 0xEA, 0x20][..]);
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.read_i64().unwrap(), 0);
        assert_eq!(r.next().unwrap(), StreamItem::Nothing);
    }

    #[test]
    fn reads_e2_three_bools() {
        let mut r = BinaryReader::new(&[0xE0, 0x01, 0x00, 0xEA, 0x10, 0x11, 0x1F][..]);
        r.next().unwrap();
        assert!(!r.read_bool().unwrap());
        r.next().unwrap();
        assert!(r.read_bool().unwrap());
        assert_eq!(r.next().unwrap(), StreamItem::Null(IonType::Bool));
        assert!(!r.read_bool().unwrap());
    }

    #[test]
    fn reads_struct_with_duplicate_field_names() {
        // {foo:1, foo:2} where foo is local symbol 10 (after system's 9).
        let bytes = [
            0xE0, 0x01, 0x00, 0xEA, // BVM
            0xE9, 0x81, 0x83, 0xD6, 0x87, 0xB1, 0x83, b'f', b'o', b'o', // $ion_symbol_table::{symbols:["foo"]}
            0xD6, 0x8A, 0x21, 0x01, 0x8A, 0x21, 0x02,
        ];
        let mut r = BinaryReader::new(&bytes[..]);
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Struct));
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.field_name().unwrap().text(), Some("foo"));
        assert_eq!(r.read_i64().unwrap(), 1);
        r.next().unwrap();
        assert_eq!(r.field_name().unwrap().text(), Some("foo"));
        assert_eq!(r.read_i64().unwrap(), 2);
    }

    #[test]
    fn reads_nested_list_with_step_out_skipping_siblings() {
        // [[1, 2], 3]
        let bytes = [
            0xE0, 0x01, 0x00, 0xEA, 0xB5, 0xB2, 0x21, 0x01, 0x21, 0x02, 0x21, 0x03,
        ];
        let mut r = BinaryReader::new(&bytes[..]);
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_i64().unwrap(), 1);
        r.step_out().unwrap(); // skip the unread second child of the inner list
        r.next().unwrap();
        assert_eq!(r.read_i64().unwrap(), 3);
    }
}
