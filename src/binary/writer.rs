//! The binary `IonWriter` implementation: values are built as
//! `super::deferred::Node` trees so tag bytes are only emitted once a
//! value's (or container's) body length is known, and the whole datagram is
//! buffered until `finish` (`spec.md` §4.8, §4.9).
//!
//! Every written value, scalar or container, is represented the same way: a
//! `Node::Container` whose code is the value's type code and whose children
//! are either a single atom (the scalar body) or the nested value nodes —
//! so the short-form/long-form tag-length choice in `Node::emit_to` doesn't
//! need to be duplicated per value type.

use std::io::Write;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::error::{IonError, IonResult};
use crate::symbols::{LocalSymbolTable, SymbolTableBuilder};
use crate::types::{Decimal, IonType, Timestamp, TimestampPrecision};
use crate::writer::IonWriter;

use super::deferred::Node;
use super::primitives::{encode_int, encode_uint, encode_var_int, encode_var_uint};

const BVM: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];
const SYM_SYMBOLS: u64 = 7;
const SYM_ION_SYMBOL_TABLE: u64 = 3;

fn scalar_node(code: u8, body: Vec<u8>) -> Node {
    let mut node = Node::container(code);
    node.push(Node::Atom(body));
    node
}

fn annotate_with_id(id: u64, value: Node) -> Node {
    let id_bytes = encode_var_uint(id);
    let mut prelude = encode_var_uint(id_bytes.len() as u64);
    prelude.extend(id_bytes);
    let mut wrapper = Node::container(0xE);
    wrapper.push(Node::Atom(prelude));
    wrapper.push(value);
    wrapper
}

struct OpenContainer {
    code: u8,
    node: Node,
    is_struct: bool,
    field: Option<String>,
    annotations: Vec<String>,
}

/// Binary `IonWriter`. Bound either to a fixed local symbol table (symbols
/// outside it fail to write with a `Usage` error) or, via [`BinaryWriter::new`],
/// to an auto-interning builder that grows a fresh local symbol table and
/// flushes it ahead of the data on [`finish`](IonWriter::finish).
pub struct BinaryWriter<W> {
    sink: W,
    top_level: Vec<Node>,
    stack: Vec<OpenContainer>,
    pending_field: Option<String>,
    pending_annotations: Vec<String>,
    base_table: LocalSymbolTable,
    builder: Option<SymbolTableBuilder>,
    finished: bool,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(sink: W) -> BinaryWriter<W> {
        let base_table = LocalSymbolTable::system();
        let builder = Some(SymbolTableBuilder::new(base_table.max_id()));
        BinaryWriter {
            sink,
            top_level: Vec::new(),
            stack: Vec::new(),
            pending_field: None,
            pending_annotations: Vec::new(),
            base_table,
            builder,
            finished: false,
        }
    }

    /// A writer bound to a prebuilt local symbol table. No auto-interning:
    /// a symbol not already present (and not a `$<digits>` literal ID
    /// reference) fails with a `Usage` error (`spec.md`'s E9).
    pub fn with_symbol_table(sink: W, table: LocalSymbolTable) -> BinaryWriter<W> {
        BinaryWriter {
            sink,
            top_level: Vec::new(),
            stack: Vec::new(),
            pending_field: None,
            pending_annotations: Vec::new(),
            base_table: table,
            builder: None,
            finished: false,
        }
    }

    fn resolve_or_intern(&mut self, name: &str) -> IonResult<u64> {
        if let Some(rest) = name.strip_prefix('$') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return rest
                    .parse()
                    .map_err(|_| IonError::usage(format!("malformed symbol ID literal {name:?}")));
            }
        }
        if let Some(id) = self.base_table.find_by_name(name) {
            return Ok(id);
        }
        match &mut self.builder {
            Some(builder) => Ok(builder.add(name).0),
            None => Err(IonError::usage(format!(
                "unknown symbol {name:?} and no symbol table builder bound"
            ))),
        }
    }

    fn push_raw(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(open) => open.node.push(node),
            None => self.top_level.push(node),
        }
    }

    /// Takes the pending field name, validating it against the parent
    /// container (the one the about-to-be-placed value lands in): required
    /// inside a struct, forbidden otherwise (`spec.md` §4.9 state machine).
    fn take_pending_field(&mut self) -> IonResult<Option<String>> {
        let in_struct = matches!(self.stack.last(), Some(c) if c.is_struct);
        let field = self.pending_field.take();
        if in_struct && field.is_none() {
            return Err(IonError::usage("struct value requires a preceding field name"));
        }
        Ok(field)
    }

    fn wrap_annotations(&mut self, value: Node, annotations: Vec<String>) -> IonResult<Node> {
        if annotations.is_empty() {
            return Ok(value);
        }
        let mut prelude = Vec::new();
        for name in &annotations {
            let id = self.resolve_or_intern(name)?;
            prelude.extend(encode_var_uint(id));
        }
        let mut body = encode_var_uint(prelude.len() as u64);
        body.extend(prelude);
        let mut wrapper = Node::container(0xE);
        wrapper.push(Node::Atom(body));
        wrapper.push(value);
        Ok(wrapper)
    }

    fn place_finished(
        &mut self,
        value: Node,
        field: Option<String>,
        annotations: Vec<String>,
    ) -> IonResult<()> {
        if let Some(name) = field {
            let id = self.resolve_or_intern(&name)?;
            self.push_raw(Node::Atom(encode_var_uint(id)));
        }
        let value = self.wrap_annotations(value, annotations)?;
        self.push_raw(value);
        Ok(())
    }

    fn emit_scalar(&mut self, node: Node) -> IonResult<()> {
        let field = self.take_pending_field()?;
        let annotations = std::mem::take(&mut self.pending_annotations);
        self.place_finished(node, field, annotations)
    }

    fn begin_container(&mut self, code: u8, is_struct: bool) -> IonResult<()> {
        let field = self.take_pending_field()?;
        let annotations = std::mem::take(&mut self.pending_annotations);
        self.stack.push(OpenContainer {
            code,
            node: Node::container(code),
            is_struct,
            field,
            annotations,
        });
        Ok(())
    }

    fn end_container(&mut self, expected_code: u8) -> IonResult<()> {
        let open = self
            .stack
            .pop()
            .ok_or_else(|| IonError::usage("end called at the top level"))?;
        if open.code != expected_code {
            let code = open.code;
            self.stack.push(open);
            return Err(IonError::usage(format!(
                "end does not match the open container (expected code 0x{expected_code:X}, found 0x{code:X})"
            )));
        }
        self.place_finished(open.node, open.field, open.annotations)
    }

    fn build_symbol_table_node(&self, symbols: &[String]) -> Node {
        let mut symbols_list = Node::container(0xB);
        for name in symbols {
            symbols_list.push(scalar_node(0x8, name.as_bytes().to_vec()));
        }
        let mut strct = Node::container(0xD);
        strct.push(Node::Atom(encode_var_uint(SYM_SYMBOLS)));
        strct.push(symbols_list);
        annotate_with_id(SYM_ION_SYMBOL_TABLE, strct)
    }
}

impl<W: Write> IonWriter for BinaryWriter<W> {
    fn set_field_name(&mut self, name: &str) -> IonResult<()> {
        if !matches!(self.stack.last(), Some(c) if c.is_struct) {
            return Err(IonError::usage("field name set outside a struct"));
        }
        self.pending_field = Some(name.to_string());
        Ok(())
    }

    fn add_annotation(&mut self, name: &str) -> IonResult<()> {
        self.pending_annotations.push(name.to_string());
        Ok(())
    }

    fn write_null(&mut self, ion_type: IonType) -> IonResult<()> {
        let tag = ((ion_type as u8) << 4) | 0x0F;
        self.emit_scalar(Node::Atom(vec![tag]))
    }

    fn write_bool(&mut self, value: bool) -> IonResult<()> {
        let tag = 0x10 | if value { 0x01 } else { 0x00 };
        self.emit_scalar(Node::Atom(vec![tag]))
    }

    fn write_i64(&mut self, value: i64) -> IonResult<()> {
        self.write_big_int(&BigInt::from(value))
    }

    fn write_big_int(&mut self, value: &BigInt) -> IonResult<()> {
        let node = if value.is_zero() {
            scalar_node(0x2, Vec::new())
        } else {
            let (sign, magnitude) = value.clone().into_parts();
            let code = if sign == Sign::Minus { 0x3 } else { 0x2 };
            scalar_node(code, encode_uint(&magnitude))
        };
        self.emit_scalar(node)
    }

    fn write_f64(&mut self, value: f64) -> IonResult<()> {
        let body = if value == 0.0 && value.is_sign_positive() {
            Vec::new()
        } else {
            value.to_be_bytes().to_vec()
        };
        self.emit_scalar(scalar_node(0x4, body))
    }

    fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        let body = if value.is_zero() && value.exponent() == 0 {
            Vec::new()
        } else {
            let mut body = encode_var_int(value.exponent() as i64);
            let magnitude = value.magnitude().clone();
            let sign = if value.sign_bit() && !magnitude.is_zero() {
                Sign::Minus
            } else {
                Sign::Plus
            };
            body.extend(encode_int(&BigInt::from_biguint(sign, magnitude)));
            body
        };
        self.emit_scalar(scalar_node(0x5, body))
    }

    fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        let mut body = match value.offset_minutes {
            None => vec![0xC0],
            Some(minutes) => encode_var_int(minutes as i64),
        };
        body.extend(encode_var_uint(value.year as u64));
        if value.precision >= TimestampPrecision::Month {
            body.extend(encode_var_uint(value.month as u64));
        }
        if value.precision >= TimestampPrecision::Day {
            body.extend(encode_var_uint(value.day as u64));
        }
        if value.precision >= TimestampPrecision::Minute {
            body.extend(encode_var_uint(value.hour as u64));
            body.extend(encode_var_uint(value.minute as u64));
        }
        if value.precision >= TimestampPrecision::Second {
            body.extend(encode_var_uint(value.second as u64));
        }
        if value.precision == TimestampPrecision::Fractional {
            let digits = value.fractional_digits.clamp(1, 9);
            let exponent = -(digits as i32);
            let coefficient = value.subsecond_nanos as u64 / 10u64.pow(9 - digits);
            body.extend(encode_var_int(exponent as i64));
            body.extend(encode_int(&BigInt::from(coefficient)));
        }
        self.emit_scalar(scalar_node(0x6, body))
    }

    fn write_symbol(&mut self, value: &str) -> IonResult<()> {
        let id = self.resolve_or_intern(value)?;
        let body = encode_uint(&BigUint::from(id));
        self.emit_scalar(scalar_node(0x7, body))
    }

    fn write_string(&mut self, value: &str) -> IonResult<()> {
        self.emit_scalar(scalar_node(0x8, value.as_bytes().to_vec()))
    }

    fn write_clob(&mut self, value: &[u8]) -> IonResult<()> {
        self.emit_scalar(scalar_node(0x9, value.to_vec()))
    }

    fn write_blob(&mut self, value: &[u8]) -> IonResult<()> {
        self.emit_scalar(scalar_node(0xA, value.to_vec()))
    }

    fn begin_list(&mut self) -> IonResult<()> {
        self.begin_container(0xB, false)
    }

    fn end_list(&mut self) -> IonResult<()> {
        self.end_container(0xB)
    }

    fn begin_sexp(&mut self) -> IonResult<()> {
        self.begin_container(0xC, false)
    }

    fn end_sexp(&mut self) -> IonResult<()> {
        self.end_container(0xC)
    }

    fn begin_struct(&mut self) -> IonResult<()> {
        self.begin_container(0xD, true)
    }

    fn end_struct(&mut self) -> IonResult<()> {
        self.end_container(0xD)
    }

    fn finish(&mut self) -> IonResult<()> {
        if !self.stack.is_empty() {
            return Err(IonError::usage("finish called with an open container"));
        }
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let mut out = Vec::new();
        out.extend_from_slice(&BVM);
        if let Some(builder) = &self.builder {
            let symbols = builder.build();
            if !symbols.is_empty() {
                self.build_symbol_table_node(&symbols).emit_to(&mut out);
            }
        }
        for node in self.top_level.drain(..) {
            node.emit_to(&mut out);
        }
        self.sink.write_all(&out)?;
        Ok(())
    }
}
