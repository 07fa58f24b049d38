//! The concrete input/output scenarios this crate is built against.
//!
//! Each test below is named after the scenario it covers; most individual
//! reader/writer behaviors also have focused unit tests alongside their
//! implementation, but these exercise the scenarios end to end through the
//! public API the way a caller would use it.

use std::io::Cursor;
use std::cmp::Ordering;

use ion_rs::{
    read, AnyReader, BinaryReader, BinaryWriter, Decimal, IonReader, IonType, IonWriter, StreamItem,
    TextReader, TextWriter,
};

#[test]
fn e1_single_zero_int() {
    let bytes = [0xE0, 0x01, 0x00, 0xEA, 0x20];
    let mut r = BinaryReader::new(&bytes[..]);
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
    assert_eq!(r.read_i64().unwrap(), 0);
    assert_eq!(r.next().unwrap(), StreamItem::Nothing);
}

#[test]
fn e2_false_true_null_bool() {
    let bytes = [0xE0, 0x01, 0x00, 0xEA, 0x10, 0x11, 0x1F];
    let mut r = BinaryReader::new(&bytes[..]);
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Bool));
    assert!(!r.read_bool().unwrap());
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Bool));
    assert!(r.read_bool().unwrap());
    assert_eq!(r.next().unwrap(), StreamItem::Null(IonType::Bool));
    assert!(r.current().is_null());
    assert_eq!(r.next().unwrap(), StreamItem::Nothing);
}

#[test]
fn e3_annotation_on_symbol_with_empty_annotation_text() {
    let mut r = TextReader::new(Cursor::new(b"''::foo".to_vec())).unwrap();
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Symbol));
    assert_eq!(r.annotations().len(), 1);
    assert_eq!(r.annotations()[0].text(), Some(""));
    assert_eq!(r.read_symbol().unwrap().text(), Some("foo"));
}

#[test]
fn e4_null_int_is_null_and_zero() {
    let mut r = TextReader::new(Cursor::new(b"null.int".to_vec())).unwrap();
    assert_eq!(r.next().unwrap(), StreamItem::Null(IonType::Int));
    assert!(r.current().is_null());
    assert_eq!(r.read_i64().unwrap(), 0);
}

#[test]
fn e5_feb_29_in_a_non_leap_year_is_a_syntax_error() {
    let mut r = TextReader::new(Cursor::new(b"2019-02-29T".to_vec())).unwrap();
    assert!(r.next().is_err());
}

#[test]
fn e6_feb_29_in_a_leap_year_has_day_precision() {
    use ion_rs::TimestampPrecision;

    let mut r = TextReader::new(Cursor::new(b"2020-02-29T".to_vec())).unwrap();
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Timestamp));
    let ts = r.read_timestamp().unwrap();
    assert_eq!((ts.year, ts.month, ts.day), (2020, 2, 29));
    assert_eq!(ts.precision, TimestampPrecision::Day);
}

#[test]
fn e7_struct_preserves_duplicate_field_order() {
    let mut r = TextReader::new(Cursor::new(b"{foo:1, foo:2}".to_vec())).unwrap();
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Struct));
    r.step_in().unwrap();
    r.next().unwrap();
    assert_eq!(r.field_name().unwrap().text(), Some("foo"));
    assert_eq!(r.read_i64().unwrap(), 1);
    r.next().unwrap();
    assert_eq!(r.field_name().unwrap().text(), Some("foo"));
    assert_eq!(r.read_i64().unwrap(), 2);
    assert_eq!(r.next().unwrap(), StreamItem::Nothing);
}

#[test]
fn e8_writer_list_of_two_ints_as_text() {
    let mut out = Vec::new();
    {
        let mut w = TextWriter::new(&mut out);
        w.begin_list().unwrap();
        w.write_i64(1).unwrap();
        w.write_i64(2).unwrap();
        w.end_list().unwrap();
        w.finish().unwrap();
    }

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[1,2]"), "unexpected output: {text:?}");
}

#[test]
fn e9_unknown_field_name_with_no_builder_is_a_usage_error_and_emits_no_extra_bytes() {
    use ion_rs::symbols::LocalSymbolTable;

    let mut out = Vec::new();
    let mut w = BinaryWriter::with_symbol_table(&mut out, LocalSymbolTable::system());
    w.begin_struct().unwrap();
    let err = w.set_field_name("bar").and_then(|_| w.write_bool(true));
    assert!(err.is_err());
    // Nothing beyond the still-open struct's state has been buffered;
    // abandoning the writer here (rather than finishing) leaves no bytes.
    drop(w);
    assert!(out.is_empty());
}

#[test]
fn a_symbol_whose_text_looks_like_an_id_reference_round_trips_through_text() {
    let mut out = Vec::new();
    {
        let mut w = TextWriter::new(&mut out);
        w.write_symbol("$10").unwrap();
        w.finish().unwrap();
    }

    let mut r = TextReader::new(Cursor::new(out)).unwrap();
    assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Symbol));
    assert_eq!(r.read_symbol().unwrap(), ion_rs::SymbolToken::Known("$10".to_string()));
}

#[test]
fn e10_text_to_binary_to_text_round_trip_preserves_events() {
    let original = r#"[1, "two", (a b c), {x:null.string}]"#;

    let mut bin = Vec::new();
    {
        let mut reader = TextReader::new(Cursor::new(original.as_bytes().to_vec())).unwrap();
        let mut writer = BinaryWriter::new(&mut bin);
        copy_one_value(&mut reader, &mut writer);
        writer.finish().unwrap();
    }

    let mut text_again = Vec::new();
    {
        let mut reader = BinaryReader::new(&bin[..]);
        let mut writer = TextWriter::new(&mut text_again);
        copy_one_value(&mut reader, &mut writer);
        writer.finish().unwrap();
    }

    let mut first = read(Cursor::new(original.as_bytes().to_vec())).unwrap();
    let mut second = read(Cursor::new(text_again)).unwrap();
    assert_event_streams_match(&mut first, &mut second);
}

/// Copies exactly one top-level value (and everything nested inside it)
/// from `reader` to `writer`, preserving field names, annotations, and
/// nesting structure.
fn copy_one_value(reader: &mut impl IonReader, writer: &mut impl IonWriter) {
    let item = reader.next().unwrap();
    copy_value(reader, writer, item);
}

fn copy_value(reader: &mut impl IonReader, writer: &mut impl IonWriter, item: StreamItem) {
    let ion_type = match item {
        StreamItem::Nothing => return,
        StreamItem::Value(t) | StreamItem::Null(t) => t,
    };
    for annotation in reader.annotations() {
        writer.add_annotation(annotation.text().unwrap_or("")).unwrap();
    }
    if item.is_null() {
        writer.write_null(ion_type).unwrap();
        return;
    }
    match ion_type {
        IonType::Bool => writer.write_bool(reader.read_bool().unwrap()).unwrap(),
        IonType::Int => writer.write_big_int(&reader.read_big_int().unwrap()).unwrap(),
        IonType::Float => writer.write_f64(reader.read_f64().unwrap()).unwrap(),
        IonType::Decimal => writer.write_decimal(&reader.read_decimal().unwrap()).unwrap(),
        IonType::Timestamp => writer.write_timestamp(&reader.read_timestamp().unwrap()).unwrap(),
        IonType::Symbol => {
            let text = reader.read_symbol().unwrap();
            writer.write_symbol(text.text().unwrap_or("")).unwrap();
        }
        IonType::String => writer.write_string(&reader.read_string().unwrap()).unwrap(),
        IonType::Clob => writer.write_clob(&reader.read_clob().unwrap()).unwrap(),
        IonType::Blob => writer.write_blob(&reader.read_blob().unwrap()).unwrap(),
        IonType::List | IonType::SExp | IonType::Struct => {
            reader.step_in().unwrap();
            match ion_type {
                IonType::List => writer.begin_list().unwrap(),
                IonType::SExp => writer.begin_sexp().unwrap(),
                _ => writer.begin_struct().unwrap(),
            }
            loop {
                let child = reader.next().unwrap();
                if child == StreamItem::Nothing {
                    break;
                }
                if let Some(field) = reader.field_name() {
                    writer.set_field_name(field.text().unwrap_or("")).unwrap();
                }
                copy_value(reader, writer, child);
            }
            reader.step_out().unwrap();
            match ion_type {
                IonType::List => writer.end_list().unwrap(),
                IonType::SExp => writer.end_sexp().unwrap(),
                _ => writer.end_struct().unwrap(),
            }
        }
        IonType::Null => unreachable!("null handled above"),
    }
}

fn assert_event_streams_match(a: &mut AnyReader, b: &mut AnyReader) {
    loop {
        let item_a = a.next().unwrap();
        let item_b = b.next().unwrap();
        assert_eq!(item_a, item_b);
        if item_a == StreamItem::Nothing {
            break;
        }
        assert_eq!(field_text(a), field_text(b));
        assert_eq!(annotation_texts(a), annotation_texts(b));
        let ion_type = match item_a {
            StreamItem::Value(t) | StreamItem::Null(t) => t,
            StreamItem::Nothing => unreachable!(),
        };
        if item_a.is_null() {
            continue;
        }
        match ion_type {
            IonType::Bool => assert_eq!(a.read_bool().unwrap(), b.read_bool().unwrap()),
            IonType::Int => assert_eq!(a.read_big_int().unwrap(), b.read_big_int().unwrap()),
            IonType::Float => assert_eq!(a.read_f64().unwrap(), b.read_f64().unwrap()),
            IonType::Decimal => {
                assert_eq!(a.read_decimal().unwrap().compare(&b.read_decimal().unwrap()), Ordering::Equal)
            }
            IonType::Timestamp => assert_eq!(a.read_timestamp().unwrap(), b.read_timestamp().unwrap()),
            IonType::Symbol => assert_eq!(a.read_symbol().unwrap().text(), b.read_symbol().unwrap().text()),
            IonType::String => assert_eq!(a.read_string().unwrap(), b.read_string().unwrap()),
            IonType::Clob => assert_eq!(a.read_clob().unwrap(), b.read_clob().unwrap()),
            IonType::Blob => assert_eq!(a.read_blob().unwrap(), b.read_blob().unwrap()),
            IonType::List | IonType::SExp | IonType::Struct => {
                a.step_in().unwrap();
                b.step_in().unwrap();
                assert_event_streams_match(a, b);
                a.step_out().unwrap();
                b.step_out().unwrap();
            }
            IonType::Null => unreachable!(),
        }
    }
}

fn field_text(r: &AnyReader) -> Option<String> {
    r.field_name().map(|s| s.to_string())
}

fn annotation_texts(r: &AnyReader) -> Vec<String> {
    r.annotations().iter().map(|s| s.to_string()).collect()
}
