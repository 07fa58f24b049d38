//! Text `IonWriter` implementation (`spec.md` §4.9, §4.6). Unlike the binary
//! writer, there's no symbol table to build or resolve against — text Ion
//! writes symbol text directly, bare or quoted (`spec.md`: "`SymbolTable()`:
//! ... text has none").

use std::io::Write;

use num_bigint::BigInt;

use super::escaping::{format_float, write_blob_text, write_clob_text, write_quoted_string, write_symbol_text};
use crate::error::{IonError, IonResult};
use crate::types::{Decimal, IonType, Timestamp};
use crate::writer::IonWriter;

struct Frame {
    kind: IonType,
    wrote_first_child: bool,
}

pub struct TextWriter<W> {
    sink: W,
    stack: Vec<Frame>,
    pending_field: Option<String>,
    pending_annotations: Vec<String>,
    wrote_any_top_level: bool,
    finished: bool,
}

impl<W: Write> TextWriter<W> {
    pub fn new(sink: W) -> TextWriter<W> {
        TextWriter {
            sink,
            stack: Vec::new(),
            pending_field: None,
            pending_annotations: Vec::new(),
            wrote_any_top_level: false,
            finished: false,
        }
    }

    fn separator(&self) -> &'static [u8] {
        match self.stack.last() {
            Some(f) if f.kind == IonType::SExp => b" ",
            Some(_) => b",",
            None => b"\n",
        }
    }

    /// Emits the separator, field name, and annotations that precede a
    /// value, and records this value as the current frame's first child if
    /// it's the first one written.
    fn before_value(&mut self) -> IonResult<()> {
        let in_struct = matches!(self.stack.last(), Some(f) if f.kind == IonType::Struct);
        let field = self.pending_field.take();
        if in_struct && field.is_none() {
            return Err(IonError::usage("struct value requires a preceding field name"));
        }
        if !in_struct && field.is_some() {
            return Err(IonError::usage("field name set outside a struct"));
        }

        let needs_separator = match self.stack.last_mut() {
            Some(frame) => std::mem::replace(&mut frame.wrote_first_child, true),
            None => std::mem::replace(&mut self.wrote_any_top_level, true),
        };
        if needs_separator {
            self.sink.write_all(self.separator())?;
        }
        if let Some(name) = field {
            write_symbol_text(&mut self.sink, &name)?;
            self.sink.write_all(b":")?;
        }
        for name in std::mem::take(&mut self.pending_annotations) {
            write_symbol_text(&mut self.sink, &name)?;
            self.sink.write_all(b"::")?;
        }
        Ok(())
    }

    fn begin_container(&mut self, kind: IonType, open: &[u8]) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(open)?;
        self.stack.push(Frame { kind, wrote_first_child: false });
        Ok(())
    }

    fn end_container(&mut self, expected: IonType, close: &[u8]) -> IonResult<()> {
        let frame = self.stack.pop().ok_or_else(|| IonError::usage("end called at the top level"))?;
        if frame.kind != expected {
            self.stack.push(frame);
            return Err(IonError::usage("end does not match the open container"));
        }
        self.sink.write_all(close)?;
        Ok(())
    }
}

impl<W: Write> IonWriter for TextWriter<W> {
    fn set_field_name(&mut self, name: &str) -> IonResult<()> {
        if !matches!(self.stack.last(), Some(f) if f.kind == IonType::Struct) {
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
        self.before_value()?;
        if ion_type == IonType::Null {
            self.sink.write_all(b"null")?;
        } else {
            self.sink.write_all(format!("null.{}", ion_type.name()).as_bytes())?;
        }
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(if value { b"true" } else { b"false" })?;
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> IonResult<()> {
        self.write_big_int(&BigInt::from(value))
    }

    fn write_big_int(&mut self, value: &BigInt) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(value.to_string().as_bytes())?;
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(format_float(value).as_bytes())?;
        Ok(())
    }

    fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(value.format().as_bytes())?;
        Ok(())
    }

    fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(value.format().as_bytes())?;
        Ok(())
    }

    fn write_symbol(&mut self, value: &str) -> IonResult<()> {
        self.before_value()?;
        write_symbol_text(&mut self.sink, value)?;
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> IonResult<()> {
        self.before_value()?;
        write_quoted_string(&mut self.sink, value)?;
        Ok(())
    }

    fn write_clob(&mut self, value: &[u8]) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(b"{{")?;
        write_clob_text(&mut self.sink, value)?;
        self.sink.write_all(b"}}")?;
        Ok(())
    }

    fn write_blob(&mut self, value: &[u8]) -> IonResult<()> {
        self.before_value()?;
        self.sink.write_all(b"{{")?;
        write_blob_text(&mut self.sink, value)?;
        self.sink.write_all(b"}}")?;
        Ok(())
    }

    fn begin_list(&mut self) -> IonResult<()> {
        self.begin_container(IonType::List, b"[")
    }

    fn end_list(&mut self) -> IonResult<()> {
        self.end_container(IonType::List, b"]")
    }

    fn begin_sexp(&mut self) -> IonResult<()> {
        self.begin_container(IonType::SExp, b"(")
    }

    fn end_sexp(&mut self) -> IonResult<()> {
        self.end_container(IonType::SExp, b")")
    }

    fn begin_struct(&mut self) -> IonResult<()> {
        self.begin_container(IonType::Struct, b"{")
    }

    fn end_struct(&mut self) -> IonResult<()> {
        self.end_container(IonType::Struct, b"}")
    }

    fn finish(&mut self) -> IonResult<()> {
        if !self.stack.is_empty() {
            return Err(IonError::usage("finish called with an open container"));
        }
        if !self.finished {
            self.finished = true;
            if self.wrote_any_top_level {
                self.sink.write_all(b"\n")?;
            }
        }
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextReader;
    use crate::reader::{IonReader, StreamItem};
    use std::io::Cursor;

    fn written(f: impl FnOnce(&mut TextWriter<Vec<u8>>) -> IonResult<()>) -> String {
        let mut w = TextWriter::new(Vec::new());
        f(&mut w).unwrap();
        w.finish().unwrap();
        String::from_utf8(w.sink).unwrap()
    }

    #[test]
    fn scalars_are_newline_separated_at_top_level() {
        let text = written(|w| {
            w.write_i64(1)?;
            w.write_bool(true)
        });
        assert_eq!(text, "1\ntrue\n");
    }

    #[test]
    fn list_fields_are_comma_separated_and_sexp_fields_space_separated() {
        let text = written(|w| {
            w.begin_list()?;
            w.write_i64(1)?;
            w.write_i64(2)?;
            w.end_list()?;
            w.begin_sexp()?;
            w.write_symbol("+")?;
            w.write_i64(1)?;
            w.end_sexp()
        });
        assert_eq!(text, "[1,2]\n(+ 1)\n");
    }

    #[test]
    fn struct_field_names_are_quoted_only_when_necessary() {
        let text = written(|w| {
            w.begin_struct()?;
            w.set_field_name("plain")?;
            w.write_i64(1)?;
            w.set_field_name("has space")?;
            w.write_i64(2)?;
            w.end_struct()
        });
        assert_eq!(text, "{plain:1,'has space':2}\n");
    }

    #[test]
    fn annotations_wrap_the_next_value() {
        let text = written(|w| {
            w.add_annotation("meters")?;
            w.write_i64(5)
        });
        assert_eq!(text, "meters::5\n");
    }

    #[test]
    fn end_with_wrong_container_is_a_usage_error_and_stays_open() {
        let mut w = TextWriter::new(Vec::new());
        w.begin_list().unwrap();
        assert!(w.end_struct().is_err());
        w.write_i64(1).unwrap();
        w.end_list().unwrap();
        w.finish().unwrap();
        assert_eq!(String::from_utf8(w.sink).unwrap(), "[1]\n");
    }

    #[test]
    fn round_trips_through_the_text_reader() {
        let text = written(|w| {
            w.begin_struct()?;
            w.set_field_name("name")?;
            w.write_string("hi")?;
            w.set_field_name("tags")?;
            w.begin_list()?;
            w.write_symbol("a")?;
            w.write_symbol("b")?;
            w.end_list()?;
            w.end_struct()
        });
        let mut r = TextReader::new(Cursor::new(text.into_bytes())).unwrap();
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Struct));
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_string().unwrap(), "hi");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_symbol().unwrap(), crate::types::SymbolToken::Known("a".to_string()));
    }
}
