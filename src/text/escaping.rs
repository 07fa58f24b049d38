//! Quoting and escaping rules for the text backend's symbol, string, and
//! clob/blob forms (`spec.md` §4.6, §4.9).

use std::io::{self, Write};

const KEYWORDS: [&str; 4] = ["null", "true", "false", "nan"];

fn is_bare_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_bare_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Whether `text` is shaped like a `$<digits>` symbol-ID reference (e.g.
/// `$10`), which must always be quoted so it isn't reinterpreted as a
/// literal ID on re-read (`spec.md` §4.9).
fn is_symbol_id_reference_shape(text: &str) -> bool {
    text.strip_prefix('$').is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether `text` can be written as a bare identifier symbol rather than a
/// single-quoted one.
pub fn is_bare_symbol(text: &str) -> bool {
    if text.is_empty() || KEYWORDS.contains(&text) || is_symbol_id_reference_shape(text) {
        return false;
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => is_bare_symbol_start(first) && chars.all(is_bare_symbol_char),
        None => false,
    }
}

/// Writes `name` bare if unambiguous, else single-quoted with escapes.
pub fn write_symbol_text<W: Write>(out: &mut W, name: &str) -> io::Result<()> {
    if is_bare_symbol(name) {
        out.write_all(name.as_bytes())
    } else {
        out.write_all(b"'")?;
        write_escaped_text(out, name, '\'')?;
        out.write_all(b"'")
    }
}

pub fn write_quoted_string<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(b"\"")?;
    write_escaped_text(out, text, '"')?;
    out.write_all(b"\"")
}

fn write_escaped_text<W: Write>(out: &mut W, text: &str, quote: char) -> io::Result<()> {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        match c {
            '\\' => out.write_all(b"\\\\")?,
            c if c == quote => {
                out.write_all(b"\\")?;
                out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            }
            '\n' => out.write_all(b"\\n")?,
            '\r' => out.write_all(b"\\r")?,
            '\t' => out.write_all(b"\\t")?,
            c if (c as u32) < 0x20 => out.write_all(format!("\\x{:02x}", c as u32).as_bytes())?,
            c => out.write_all(c.encode_utf8(&mut buf).as_bytes())?,
        }
    }
    Ok(())
}

/// Clob text is ASCII-only; non-printable and non-ASCII bytes are escaped
/// with `\xHH` (`spec.md` §4.6 forbids `\u`/`\U` inside clobs).
pub fn write_clob_text<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(b"\"")?;
    for &b in bytes {
        match b {
            b'\\' => out.write_all(b"\\\\")?,
            b'"' => out.write_all(b"\\\"")?,
            b'\n' => out.write_all(b"\\n")?,
            b'\r' => out.write_all(b"\\r")?,
            b'\t' => out.write_all(b"\\t")?,
            0x20..=0x7E => out.write_all(&[b])?,
            other => out.write_all(format!("\\x{other:02x}").as_bytes())?,
        }
    }
    out.write_all(b"\"")
}

pub fn write_blob_text<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    out.write_all(STANDARD.encode(bytes).as_bytes())
}

/// Ion float text form: always carries an exponent marker, distinguishing it
/// lexically from a bare decimal (`spec.md` §4.6 numeric disambiguation).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "+inf".to_string() } else { "-inf".to_string() }
    } else if value == 0.0 {
        if value.is_sign_negative() { "-0e0".to_string() } else { "0e0".to_string() }
    } else {
        format!("{value:e}")
    }
}
