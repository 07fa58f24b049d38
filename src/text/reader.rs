//! Text `IonReader` implementation built on [`super::tokenizer::Tokenizer`]
//! (`spec.md` §4.6, §4.7). The whole input is buffered into a `String` up
//! front (no incremental byte-stream coupling is needed for text), and
//! container-skip uses bracket-depth counting over tokens rather than raw
//! bytes, matching the "bracket matching and string-boundary tracking"
//! skip-mode description.

use std::io::Read;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::tokenizer::{Token, Tokenizer};
use crate::error::{IonError, IonResult};
use crate::reader::{IonReader, StreamItem};
use crate::types::{Decimal, Int, IonType, SymbolToken, Timestamp, TimestampPrecision as Precision};

fn text_to_symbol(text: &str) -> SymbolToken {
    if let Some(rest) = text.strip_prefix('$') {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = rest.parse::<u64>() {
                return SymbolToken::Unknown(id);
            }
        }
    }
    SymbolToken::Known(text.to_string())
}

fn token_to_symbol(tok: &Token) -> IonResult<SymbolToken> {
    match tok {
        Token::Symbol(s) | Token::OperatorSymbol(s) => Ok(text_to_symbol(s)),
        Token::QuotedSymbol(s) => Ok(SymbolToken::Known(s.clone())),
        other => Err(IonError::syntax(0, format!("expected a symbol, found {other:?}"))),
    }
}

fn closing_token_for(kind: IonType) -> Token {
    match kind {
        IonType::List => Token::CloseBracket,
        IonType::SExp => Token::CloseParen,
        IonType::Struct => Token::CloseBrace,
        other => unreachable!("{other:?} is not a container"),
    }
}

pub struct TextReader<R> {
    tokenizer: Tokenizer,
    stack: Vec<IonType>,
    current: StreamItem,
    current_value: Option<Token>,
    /// True once the frame at the top of `stack` (or the top level, when
    /// `stack` is empty) has already had its closing token consumed by
    /// `next()`. Tells `step_out` whether it still needs to scan forward.
    frame_exhausted: bool,
    field_name: Option<SymbolToken>,
    annotations: Vec<SymbolToken>,
    _marker: std::marker::PhantomData<R>,
}

impl<R: Read> TextReader<R> {
    pub fn new(mut source: R) -> IonResult<TextReader<R>> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        Ok(TextReader {
            tokenizer: Tokenizer::new(&text),
            stack: Vec::new(),
            current: StreamItem::Nothing,
            current_value: None,
            frame_exhausted: false,
            field_name: None,
            annotations: Vec::new(),
            _marker: std::marker::PhantomData,
        })
    }
}

impl<R> TextReader<R> {
    fn current_type_name(&self) -> &'static str {
        self.current.ion_type().map(IonType::name).unwrap_or("none")
    }

    /// Scans forward past the matching close bracket for the container
    /// value `next()` most recently returned, without the caller having
    /// stepped into it. No-op for scalar values and nulls.
    fn skip_unconsumed_container(&mut self) -> IonResult<()> {
        if !matches!(self.current, StreamItem::Value(k) if k.is_container()) {
            return Ok(());
        }
        let mut depth = 1u32;
        loop {
            match self.tokenizer.next()? {
                Token::OpenParen | Token::OpenBracket | Token::OpenBrace => depth += 1,
                Token::CloseParen | Token::CloseBracket | Token::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Token::Eof => return Err(IonError::UnexpectedEof { offset: 0 }),
                _ => {}
            }
        }
    }

    fn at_frame_end(&mut self) -> IonResult<bool> {
        let expected = self.stack.last().map(|k| closing_token_for(*k));
        let tok = self.tokenizer.peek()?;
        Ok(match expected {
            Some(e) => *tok == e,
            None => *tok == Token::Eof,
        })
    }

    fn finish_value(&mut self, tok: Token) -> IonResult<StreamItem> {
        let (item, value) = match tok {
            Token::Null(ion_type) => (StreamItem::Null(ion_type), None),
            Token::Bool(_) => (StreamItem::Value(IonType::Bool), Some(tok)),
            Token::Int(_) => (StreamItem::Value(IonType::Int), Some(tok)),
            Token::Decimal(_) => (StreamItem::Value(IonType::Decimal), Some(tok)),
            Token::Float(_) => (StreamItem::Value(IonType::Float), Some(tok)),
            Token::Timestamp(_) => (StreamItem::Value(IonType::Timestamp), Some(tok)),
            Token::String(_) => (StreamItem::Value(IonType::String), Some(tok)),
            Token::Clob(_) => (StreamItem::Value(IonType::Clob), Some(tok)),
            Token::Blob(_) => (StreamItem::Value(IonType::Blob), Some(tok)),
            Token::Symbol(_) | Token::OperatorSymbol(_) | Token::QuotedSymbol(_) => {
                (StreamItem::Value(IonType::Symbol), Some(tok))
            }
            Token::OpenParen => (StreamItem::Value(IonType::SExp), None),
            Token::OpenBracket => (StreamItem::Value(IonType::List), None),
            Token::OpenBrace => (StreamItem::Value(IonType::Struct), None),
            other => return Err(IonError::syntax(0, format!("unexpected token {other:?}"))),
        };
        self.current = item;
        self.current_value = value;
        Ok(self.current)
    }
}

impl<R> IonReader for TextReader<R> {
    fn next(&mut self) -> IonResult<StreamItem> {
        self.skip_unconsumed_container()?;
        self.field_name = None;
        self.annotations.clear();
        self.current_value = None;

        loop {
            if *self.tokenizer.peek()? == Token::Comma {
                self.tokenizer.next()?;
                continue;
            }
            break;
        }

        if self.at_frame_end()? {
            if self.stack.last().is_some() {
                self.tokenizer.next()?;
            }
            self.frame_exhausted = true;
            self.current = StreamItem::Nothing;
            return Ok(self.current);
        }
        self.frame_exhausted = false;

        if matches!(self.stack.last(), Some(IonType::Struct)) {
            let name_tok = self.tokenizer.next()?;
            let name = token_to_symbol(&name_tok)?;
            let colon = self.tokenizer.next()?;
            if colon != Token::Colon {
                return Err(IonError::syntax(0, "expected ':' after a struct field name"));
            }
            self.field_name = Some(name);
        }

        loop {
            let looks_like_symbol = matches!(
                self.tokenizer.peek()?,
                Token::Symbol(_) | Token::OperatorSymbol(_) | Token::QuotedSymbol(_)
            );
            if !looks_like_symbol {
                break;
            }
            let candidate = self.tokenizer.next()?;
            if *self.tokenizer.peek()? == Token::DoubleColon {
                self.tokenizer.next()?;
                self.annotations.push(token_to_symbol(&candidate)?);
                continue;
            }
            return self.finish_value(candidate);
        }

        let tok = self.tokenizer.next()?;
        self.finish_value(tok)
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
        let kind = match self.current {
            StreamItem::Value(k) if k.is_container() => k,
            _ => return Err(IonError::usage("step_in called on a non-container value")),
        };
        self.stack.push(kind);
        self.frame_exhausted = false;
        self.current = StreamItem::Nothing;
        self.field_name = None;
        self.annotations.clear();
        Ok(())
    }

    fn step_out(&mut self) -> IonResult<()> {
        if self.stack.is_empty() {
            return Err(IonError::usage("step_out called at the top level"));
        }
        self.skip_unconsumed_container()?;
        if !self.frame_exhausted {
            let closer = closing_token_for(*self.stack.last().unwrap());
            let mut depth = 0u32;
            loop {
                match self.tokenizer.next()? {
                    Token::Eof => return Err(IonError::UnexpectedEof { offset: 0 }),
                    Token::OpenParen | Token::OpenBracket | Token::OpenBrace => depth += 1,
                    tok if depth == 0 && tok == closer => break,
                    Token::CloseParen | Token::CloseBracket | Token::CloseBrace => depth -= 1,
                    _ => {}
                }
            }
        }
        self.stack.pop();
        self.frame_exhausted = false;
        self.current = StreamItem::Nothing;
        self.field_name = None;
        self.annotations.clear();
        Ok(())
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn read_bool(&mut self) -> IonResult<bool> {
        match &self.current_value {
            Some(Token::Bool(b)) => Ok(*b),
            None if matches!(self.current, StreamItem::Null(IonType::Bool)) => Ok(false),
            _ => Err(IonError::WrongType { expected: "bool", found: self.current_type_name() }),
        }
    }

    fn read_i64(&mut self) -> IonResult<i64> {
        self.read_big_int()?.to_i64().ok_or(IonError::OutOfRange)
    }

    fn read_int(&mut self) -> IonResult<Int> {
        Ok(Int::normalize(self.read_big_int()?))
    }

    fn read_big_int(&mut self) -> IonResult<BigInt> {
        match &self.current_value {
            Some(Token::Int(v)) => Ok(v.clone()),
            None if matches!(self.current, StreamItem::Null(IonType::Int)) => Ok(BigInt::from(0)),
            _ => Err(IonError::WrongType { expected: "int", found: self.current_type_name() }),
        }
    }

    fn read_f64(&mut self) -> IonResult<f64> {
        match &self.current_value {
            Some(Token::Float(v)) => Ok(*v),
            None if matches!(self.current, StreamItem::Null(IonType::Float)) => Ok(0.0),
            _ => Err(IonError::WrongType { expected: "float", found: self.current_type_name() }),
        }
    }

    fn read_decimal(&mut self) -> IonResult<Decimal> {
        match &self.current_value {
            Some(Token::Decimal(v)) => Ok(v.clone()),
            None if matches!(self.current, StreamItem::Null(IonType::Decimal)) => Ok(Decimal::zero()),
            _ => Err(IonError::WrongType { expected: "decimal", found: self.current_type_name() }),
        }
    }

    fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        match &self.current_value {
            Some(Token::Timestamp(v)) => Ok(v.clone()),
            None if matches!(self.current, StreamItem::Null(IonType::Timestamp)) => Ok(Timestamp {
                year: 1,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
                subsecond_nanos: 0,
                fractional_digits: 0,
                offset_minutes: None,
                precision: Precision::Year,
            }),
            _ => Err(IonError::WrongType { expected: "timestamp", found: self.current_type_name() }),
        }
    }

    fn read_symbol(&mut self) -> IonResult<SymbolToken> {
        match &self.current_value {
            Some(Token::Symbol(s)) | Some(Token::OperatorSymbol(s)) => Ok(text_to_symbol(s)),
            Some(Token::QuotedSymbol(s)) => Ok(SymbolToken::Known(s.clone())),
            None if matches!(self.current, StreamItem::Null(IonType::Symbol)) => Ok(SymbolToken::Unknown(0)),
            _ => Err(IonError::WrongType { expected: "symbol", found: self.current_type_name() }),
        }
    }

    fn read_string(&mut self) -> IonResult<String> {
        match &self.current_value {
            Some(Token::String(s)) => Ok(s.clone()),
            None if matches!(self.current, StreamItem::Null(IonType::String)) => Ok(String::new()),
            _ => Err(IonError::WrongType { expected: "string", found: self.current_type_name() }),
        }
    }

    fn read_clob(&mut self) -> IonResult<Vec<u8>> {
        match &self.current_value {
            Some(Token::Clob(b)) => Ok(b.clone()),
            None if matches!(self.current, StreamItem::Null(IonType::Clob)) => Ok(Vec::new()),
            _ => Err(IonError::WrongType { expected: "clob", found: self.current_type_name() }),
        }
    }

    fn read_blob(&mut self) -> IonResult<Vec<u8>> {
        match &self.current_value {
            Some(Token::Blob(b)) => Ok(b.clone()),
            None if matches!(self.current, StreamItem::Null(IonType::Blob)) => Ok(Vec::new()),
            _ => Err(IonError::WrongType { expected: "blob", found: self.current_type_name() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> TextReader<Cursor<Vec<u8>>> {
        TextReader::new(Cursor::new(text.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn reads_scalars_at_top_level() {
        let mut r = reader("1 \"hi\" true");
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.read_i64().unwrap(), 1);
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::String));
        assert_eq!(r.read_string().unwrap(), "hi");
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Bool));
        assert!(r.read_bool().unwrap());
        assert_eq!(r.next().unwrap(), StreamItem::Nothing);
    }

    #[test]
    fn reads_struct_with_field_names_and_annotations() {
        let mut r = reader("{a: 1, b: my::2}");
        r.next().unwrap();
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.field_name().unwrap(), &SymbolToken::Known("a".to_string()));
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.field_name().unwrap(), &SymbolToken::Known("b".to_string()));
        assert_eq!(r.annotations(), &[SymbolToken::Known("my".to_string())]);
        assert_eq!(r.read_i64().unwrap(), 2);
        assert_eq!(r.next().unwrap(), StreamItem::Nothing);
        r.step_out().unwrap();
    }

    #[test]
    fn step_out_skips_unread_siblings() {
        let mut r = reader("[1, [2, 3], 4] 5");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        r.step_out().unwrap();
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.read_i64().unwrap(), 5);
    }

    #[test]
    fn not_stepping_into_a_nested_list_skips_it() {
        let mut r = reader("[1, [2, 3], 4]");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::List));
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.read_i64().unwrap(), 4);
    }

    #[test]
    fn dollar_digit_symbol_is_a_literal_id() {
        let mut r = reader("$10");
        r.next().unwrap();
        assert_eq!(r.read_symbol().unwrap(), SymbolToken::Unknown(10));
    }

    #[test]
    fn typed_nulls() {
        let mut r = reader("null.string");
        assert_eq!(r.next().unwrap(), StreamItem::Null(IonType::String));
        assert_eq!(r.read_string().unwrap(), "");
    }

    #[test]
    fn sexp_elements_are_space_separated_and_support_operators() {
        let mut r = reader("(+ 1 2)");
        r.next().unwrap();
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Symbol));
        assert_eq!(r.read_symbol().unwrap(), SymbolToken::Known("+".to_string()));
        assert_eq!(r.next().unwrap(), StreamItem::Value(IonType::Int));
        assert_eq!(r.read_i64().unwrap(), 1);
    }
}
