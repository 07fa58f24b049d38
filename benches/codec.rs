//! Benchmarks for the binary and text codecs.
//!
//! Run with: cargo bench

use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};

use ion_rs::{BinaryReader, BinaryWriter, IonReader, IonWriter, TextReader, TextWriter};

const SAMPLE_COUNT: i64 = 1_000;

fn sample_text() -> String {
    let mut text = String::from("[");
    for i in 0..SAMPLE_COUNT {
        if i > 0 {
            text.push(',');
        }
        text.push_str(&format!(r#"{{id:{i},name:"item-{i}",tags:[a,b,c],price:{i}.99}}"#));
    }
    text.push(']');
    text
}

fn sample_binary() -> Vec<u8> {
    let mut out = Vec::new();
    let mut w = BinaryWriter::new(&mut out);
    write_sample(&mut w);
    w.finish().unwrap();
    out
}

fn write_sample(w: &mut impl IonWriter) {
    w.begin_list().unwrap();
    for i in 0..SAMPLE_COUNT {
        w.begin_struct().unwrap();
        w.set_field_name("id").unwrap();
        w.write_i64(i).unwrap();
        w.set_field_name("name").unwrap();
        w.write_string(&format!("item-{i}")).unwrap();
        w.set_field_name("tags").unwrap();
        w.begin_list().unwrap();
        w.write_symbol("a").unwrap();
        w.write_symbol("b").unwrap();
        w.write_symbol("c").unwrap();
        w.end_list().unwrap();
        w.set_field_name("price").unwrap();
        w.write_decimal(&ion_rs::Decimal::parse(&format!("{i}.99")).unwrap()).unwrap();
        w.end_struct().unwrap();
    }
    w.end_list().unwrap();
}

fn drain(r: &mut impl IonReader) {
    use ion_rs::{IonType, StreamItem};

    loop {
        let item = r.next().unwrap();
        let ion_type = match item {
            StreamItem::Nothing => return,
            StreamItem::Value(t) | StreamItem::Null(t) => t,
        };
        if item.is_null() {
            continue;
        }
        match ion_type {
            IonType::Int => {
                r.read_i64().unwrap();
            }
            IonType::Decimal => {
                r.read_decimal().unwrap();
            }
            IonType::Symbol => {
                r.read_symbol().unwrap();
            }
            IonType::String => {
                r.read_string().unwrap();
            }
            IonType::List | IonType::Struct => {
                r.step_in().unwrap();
                drain(r);
                r.step_out().unwrap();
            }
            _ => {}
        }
    }
}

fn bench_binary_write(c: &mut Criterion) {
    c.bench_function("binary_write_1000_structs", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            let mut w = BinaryWriter::new(&mut out);
            write_sample(&mut w);
            w.finish().unwrap();
        });
    });
}

fn bench_binary_read(c: &mut Criterion) {
    let bytes = sample_binary();
    c.bench_function("binary_read_1000_structs", |b| {
        b.iter(|| {
            let mut r = BinaryReader::new(Cursor::new(&bytes));
            drain(&mut r);
        });
    });
}

fn bench_text_write(c: &mut Criterion) {
    c.bench_function("text_write_1000_structs", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            let mut w = TextWriter::new(&mut out);
            write_sample(&mut w);
            w.finish().unwrap();
        });
    });
}

fn bench_text_read(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("text_read_1000_structs", |b| {
        b.iter(|| {
            let mut r = TextReader::new(Cursor::new(text.as_bytes().to_vec())).unwrap();
            drain(&mut r);
        });
    });
}

fn copy_value(reader: &mut impl IonReader, writer: &mut impl IonWriter, item: ion_rs::StreamItem) {
    use ion_rs::IonType;

    let ion_type = match item {
        ion_rs::StreamItem::Nothing => return,
        ion_rs::StreamItem::Value(t) | ion_rs::StreamItem::Null(t) => t,
    };
    if item.is_null() {
        writer.write_null(ion_type).unwrap();
        return;
    }
    match ion_type {
        IonType::Int => writer.write_i64(reader.read_i64().unwrap()).unwrap(),
        IonType::Decimal => writer.write_decimal(&reader.read_decimal().unwrap()).unwrap(),
        IonType::Symbol => {
            writer.write_symbol(reader.read_symbol().unwrap().text().unwrap_or("")).unwrap()
        }
        IonType::String => writer.write_string(&reader.read_string().unwrap()).unwrap(),
        IonType::List | IonType::Struct => {
            reader.step_in().unwrap();
            match ion_type {
                IonType::List => writer.begin_list().unwrap(),
                _ => writer.begin_struct().unwrap(),
            }
            loop {
                let child = reader.next().unwrap();
                if child == ion_rs::StreamItem::Nothing {
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
                _ => writer.end_struct().unwrap(),
            }
        }
        _ => {}
    }
}

fn bench_text_to_binary(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("text_to_binary_1000_structs", |b| {
        b.iter(|| {
            let mut reader = TextReader::new(Cursor::new(text.as_bytes().to_vec())).unwrap();
            let item = reader.next().unwrap();
            let mut out = Vec::new();
            let mut writer = BinaryWriter::new(&mut out);
            copy_value(&mut reader, &mut writer, item);
            writer.finish().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_binary_write,
    bench_binary_read,
    bench_text_write,
    bench_text_read,
    bench_text_to_binary,
);
criterion_main!(benches);
