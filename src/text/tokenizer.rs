//! Single-character-lookahead lexer for Ion text (`spec.md` §4.6). Produces
//! fully-classified tokens directly (numeric literals are parsed to their
//! final value here rather than handed to the reader as raw spans), since
//! the whole input is buffered in memory up front and there's no streaming
//! constraint forcing a split between lexing and parsing.

use num_bigint::BigInt;

use crate::error::{IonError, IonResult};
use crate::types::{Decimal, IonType, Timestamp};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    Null(IonType),
    Bool(bool),
    Int(BigInt),
    Decimal(Decimal),
    Float(f64),
    Timestamp(Timestamp),
    /// A bare identifier symbol, including the `$<digits>`-shaped bare form
    /// that is a literal symbol-ID reference rather than symbol text.
    Symbol(String),
    /// A single-quoted symbol. Kept distinct from [`Token::Symbol`] so text
    /// shaped like `$10` is only reinterpreted as a symbol-ID reference when
    /// it was written bare — a quoted `'$10'` is always the literal text
    /// `"$10"` (`spec.md` §4.9).
    QuotedSymbol(String),
    /// A run of operator characters, used as a symbol value inside sexps.
    OperatorSymbol(String),
    String(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    Comma,
    Colon,
    DoubleColon,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '!' | '#' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | ';' | '<' | '=' | '>' | '?' | '@'
            | '^' | '`' | '|' | '~'
    )
}

fn type_name_to_ion_type(name: &str) -> Option<IonType> {
    Some(match name {
        "null" => IonType::Null,
        "bool" => IonType::Bool,
        "int" => IonType::Int,
        "float" => IonType::Float,
        "decimal" => IonType::Decimal,
        "timestamp" => IonType::Timestamp,
        "symbol" => IonType::Symbol,
        "string" => IonType::String,
        "clob" => IonType::Clob,
        "blob" => IonType::Blob,
        "list" => IonType::List,
        "sexp" => IonType::SExp,
        "struct" => IonType::Struct,
        _ => return None,
    })
}

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    lookahead: Option<Token>,
}

impl Tokenizer {
    pub fn new(text: &str) -> Tokenizer {
        Tokenizer {
            chars: text.chars().collect(),
            pos: 0,
            lookahead: None,
        }
    }

    pub fn peek(&mut self) -> IonResult<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan_token()?);
        }
        Ok(self.lookahead.as_ref().unwrap())
    }

    pub fn next(&mut self) -> IonResult<Token> {
        if let Some(tok) = self.lookahead.take() {
            return Ok(tok);
        }
        self.scan_token()
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    fn err(&self, pos: usize, message: impl Into<String>) -> IonError {
        IonError::syntax(pos as u64, message)
    }

    fn matches_keyword(&self, kw: &str) -> bool {
        let kw_chars: Vec<char> = kw.chars().collect();
        if self.pos + kw_chars.len() > self.chars.len() {
            return false;
        }
        if self.chars[self.pos..self.pos + kw_chars.len()] != kw_chars[..] {
            return false;
        }
        !matches!(self.chars.get(self.pos + kw_chars.len()), Some(c) if is_symbol_char(*c))
    }

    fn skip_whitespace_and_comments(&mut self) -> IonResult<()> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_char_at(1) == Some('/') => {
                    while !matches!(self.peek_char(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.peek_char_at(1) == Some('*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    loop {
                        match (self.peek_char(), self.peek_char_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => {
                                self.advance();
                            }
                            (None, _) => return Err(self.err(start, "unterminated block comment")),
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_token(&mut self) -> IonResult<Token> {
        self.skip_whitespace_and_comments()?;
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };
        match c {
            '(' => {
                self.advance();
                Ok(Token::OpenParen)
            }
            ')' => {
                self.advance();
                Ok(Token::CloseParen)
            }
            '[' => {
                self.advance();
                Ok(Token::OpenBracket)
            }
            ']' => {
                self.advance();
                Ok(Token::CloseBracket)
            }
            '{' if self.peek_char_at(1) == Some('{') => {
                self.advance();
                self.advance();
                self.scan_double_brace_payload()
            }
            '{' => {
                self.advance();
                Ok(Token::OpenBrace)
            }
            '}' => {
                self.advance();
                Ok(Token::CloseBrace)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ':' if self.peek_char_at(1) == Some(':') => {
                self.advance();
                self.advance();
                Ok(Token::DoubleColon)
            }
            ':' => {
                self.advance();
                Ok(Token::Colon)
            }
            '"' => {
                self.advance();
                Ok(Token::String(self.read_delimited('"', false)?))
            }
            '\'' if self.peek_char_at(1) == Some('\'') && self.peek_char_at(2) == Some('\'') => {
                self.advance_n(3);
                Ok(Token::String(self.read_long_string(false)?))
            }
            '\'' => {
                self.advance();
                Ok(Token::QuotedSymbol(self.read_delimited('\'', false)?))
            }
            '+' if self.matches_keyword("+inf") => {
                self.advance_n(4);
                Ok(Token::Float(f64::INFINITY))
            }
            c if c.is_ascii_digit() => self.scan_numeric_or_timestamp(),
            '-' if matches!(self.peek_char_at(1), Some(d) if d.is_ascii_digit()) => {
                self.scan_numeric_or_timestamp()
            }
            '-' if self.matches_keyword("-inf") => {
                self.advance_n(4);
                Ok(Token::Float(f64::NEG_INFINITY))
            }
            c if is_symbol_start(c) => self.scan_bare_symbol(),
            c if is_operator_char(c) => Ok(self.scan_operator_symbol()),
            other => Err(self.err(self.pos, format!("unexpected character {other:?}"))),
        }
    }

    /// Consumes a run of digits with `_` digit-group separators, rejecting a
    /// separator at the start or end of the run (`spec.md` §4.6: an
    /// underscore may only appear strictly between two digits).
    fn consume_digit_run(&mut self) -> IonResult<String> {
        let start = self.pos;
        let mut s = String::new();
        let mut last_was_underscore = false;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || c == '_') {
            let c = self.advance().unwrap();
            if c == '_' {
                if s.is_empty() {
                    return Err(self.err(start, "a digit-group underscore cannot start a digit run"));
                }
                last_was_underscore = true;
            } else {
                last_was_underscore = false;
                s.push(c);
            }
        }
        if last_was_underscore {
            return Err(self.err(start, "a digit-group underscore cannot end a digit run"));
        }
        Ok(s)
    }

    fn scan_radix_int(&mut self, start: usize, negative: bool, radix: u32, pred: fn(char) -> bool) -> IonResult<Token> {
        let digits_start = self.pos;
        let mut digits = String::new();
        let mut last_was_underscore = false;
        while matches!(self.peek_char(), Some(c) if pred(c) || c == '_') {
            let c = self.advance().unwrap();
            if c == '_' {
                if digits.is_empty() {
                    return Err(self.err(digits_start, "a digit-group underscore cannot start a digit run"));
                }
                last_was_underscore = true;
            } else {
                last_was_underscore = false;
                digits.push(c);
            }
        }
        if last_was_underscore {
            return Err(self.err(digits_start, "a digit-group underscore cannot end a digit run"));
        }
        if digits.is_empty() {
            return Err(self.err(start, "empty radix integer literal"));
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| self.err(start, "malformed radix integer literal"))?;
        Ok(Token::Int(if negative { -magnitude } else { magnitude }))
    }

    fn scan_timestamp(&mut self, start: usize) -> IonResult<Token> {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || matches!(c, '-' | ':' | '.' | 'T' | 'Z' | '+')) {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let ts = Timestamp::parse(&text).map_err(|_| self.err(start, "malformed timestamp literal"))?;
        Ok(Token::Timestamp(ts))
    }

    fn scan_numeric_or_timestamp(&mut self) -> IonResult<Token> {
        let token_start = self.pos;
        let negative = self.peek_char() == Some('-');
        if negative {
            self.advance();
        }
        if self.peek_char() == Some('0') && matches!(self.peek_char_at(1), Some('x') | Some('X')) {
            self.advance_n(2);
            return self.scan_radix_int(token_start, negative, 16, |c| c.is_ascii_hexdigit());
        }
        if self.peek_char() == Some('0') && matches!(self.peek_char_at(1), Some('b') | Some('B')) {
            self.advance_n(2);
            return self.scan_radix_int(token_start, negative, 2, |c| c == '0' || c == '1');
        }

        let mut normalized = String::new();
        if negative {
            normalized.push('-');
        }
        let int_digits = self.consume_digit_run()?;
        if int_digits.is_empty() {
            return Err(self.err(token_start, "expected a digit"));
        }
        normalized.push_str(&int_digits);

        if !negative && int_digits.len() == 4 && matches!(self.peek_char(), Some('-') | Some('T')) {
            return self.scan_timestamp(token_start);
        }

        if self.peek_char() == Some('.') && !matches!(self.peek_char_at(1), Some('.')) {
            self.advance();
            normalized.push('.');
            normalized.push_str(&self.consume_digit_run()?);
        }

        let mut is_float = false;
        if matches!(self.peek_char(), Some('d') | Some('D')) {
            self.advance();
            normalized.push('d');
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                normalized.push(self.advance().unwrap());
            }
            normalized.push_str(&self.consume_digit_run()?);
        } else if matches!(self.peek_char(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            normalized.push('e');
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                normalized.push(self.advance().unwrap());
            }
            normalized.push_str(&self.consume_digit_run()?);
        }

        if is_float {
            let value: f64 = normalized
                .parse()
                .map_err(|_| self.err(token_start, "malformed float literal"))?;
            Ok(Token::Float(value))
        } else if normalized.contains('.') || normalized.contains('d') {
            let value = Decimal::parse(&normalized).map_err(|_| self.err(token_start, "malformed decimal literal"))?;
            Ok(Token::Decimal(value))
        } else {
            let value = BigInt::parse_bytes(normalized.as_bytes(), 10)
                .ok_or_else(|| self.err(token_start, "malformed integer literal"))?;
            Ok(Token::Int(value))
        }
    }

    fn scan_bare_symbol(&mut self) -> IonResult<Token> {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if is_symbol_char(c)) {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if text == "null" && self.peek_char() == Some('.') {
            self.advance();
            let type_start = self.pos;
            while matches!(self.peek_char(), Some(c) if c.is_ascii_alphabetic()) {
                self.advance();
            }
            let type_name: String = self.chars[type_start..self.pos].iter().collect();
            let ion_type =
                type_name_to_ion_type(&type_name).ok_or_else(|| self.err(type_start, "unknown null.<type>"))?;
            return Ok(Token::Null(ion_type));
        }
        Ok(match text.as_str() {
            "null" => Token::Null(IonType::Null),
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            "nan" => Token::Float(f64::NAN),
            _ => Token::Symbol(text),
        })
    }

    fn scan_operator_symbol(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if is_operator_char(c)) {
            self.advance();
        }
        Token::OperatorSymbol(self.chars[start..self.pos].iter().collect())
    }

    /// Reads content up to an unescaped `terminator`, disallowing literal
    /// newlines (used for short strings and single-quoted symbols).
    fn read_delimited(&mut self, terminator: char, ascii_only: bool) -> IonResult<String> {
        let start = self.pos;
        let mut out = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.err(start, "unterminated quoted text")),
                Some('\n') => return Err(self.err(self.pos, "literal newline in a short quoted value")),
                Some(c) if c == terminator => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance();
                    if let Some(c) = self.read_escape(ascii_only)? {
                        out.push(c);
                    }
                }
                Some(c) => {
                    if ascii_only && !c.is_ascii() {
                        return Err(self.err(self.pos, "non-ASCII character in clob text"));
                    }
                    self.advance();
                    out.push(c);
                }
            }
        }
    }

    /// Reads a `'''...'''` segment (opening quotes already consumed) and
    /// concatenates any further adjacent long-string segments.
    fn read_long_string(&mut self, ascii_only: bool) -> IonResult<String> {
        let mut out = String::new();
        loop {
            loop {
                match self.peek_char() {
                    None => return Err(self.err(self.pos, "unterminated long string")),
                    Some('\'') if self.peek_char_at(1) == Some('\'') && self.peek_char_at(2) == Some('\'') => {
                        self.advance_n(3);
                        break;
                    }
                    Some('\\') => {
                        self.advance();
                        if let Some(c) = self.read_escape(ascii_only)? {
                            out.push(c);
                        }
                    }
                    Some(c) => {
                        if ascii_only && !c.is_ascii() {
                            return Err(self.err(self.pos, "non-ASCII character in clob text"));
                        }
                        self.advance();
                        out.push(c);
                    }
                }
            }
            let save = self.pos;
            self.skip_whitespace_and_comments()?;
            if self.peek_char() == Some('\'') && self.peek_char_at(1) == Some('\'') && self.peek_char_at(2) == Some('\'')
            {
                self.advance_n(3);
            } else {
                self.pos = save;
                return Ok(out);
            }
        }
    }

    fn take_hex_digits(&mut self, n: usize) -> IonResult<String> {
        let start = self.pos;
        let mut s = String::new();
        for _ in 0..n {
            match self.peek_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    s.push(c);
                    self.advance();
                }
                _ => return Err(self.err(start, "malformed hex escape")),
            }
        }
        Ok(s)
    }

    /// Processes one escape sequence (backslash already consumed). Returns
    /// `None` for a line continuation, which contributes no character.
    fn read_escape(&mut self, ascii_only: bool) -> IonResult<Option<char>> {
        let start = self.pos;
        let c = self.advance().ok_or_else(|| self.err(start, "unterminated escape sequence"))?;
        Ok(Some(match c {
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            'v' => '\u{b}',
            '\'' => '\'',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            '\n' => return Ok(None),
            '\r' => {
                if self.peek_char() == Some('\n') {
                    self.advance();
                }
                return Ok(None);
            }
            'x' => {
                let hex = self.take_hex_digits(2)?;
                char::from_u32(u32::from_str_radix(&hex, 16).unwrap())
                    .ok_or_else(|| self.err(start, "invalid \\x escape"))?
            }
            'u' if !ascii_only => {
                let hex = self.take_hex_digits(4)?;
                char::from_u32(u32::from_str_radix(&hex, 16).unwrap())
                    .ok_or_else(|| self.err(start, "invalid \\u escape"))?
            }
            'U' if !ascii_only => {
                let hex = self.take_hex_digits(8)?;
                let code = u32::from_str_radix(&hex, 16).unwrap();
                char::from_u32(code).ok_or_else(|| self.err(start, "invalid \\U escape"))?
            }
            'u' | 'U' => return Err(self.err(start, "\\u/\\U escapes are forbidden inside clobs")),
            other => return Err(self.err(start, format!("unknown escape \\{other}"))),
        }))
    }

    fn expect_close_double_brace(&mut self) -> IonResult<()> {
        self.skip_whitespace_and_comments()?;
        if self.peek_char() == Some('}') && self.peek_char_at(1) == Some('}') {
            self.advance_n(2);
            Ok(())
        } else {
            Err(self.err(self.pos, "expected closing }}"))
        }
    }

    /// `{{` already consumed; reads a clob (quoted text) or blob (base64)
    /// payload through its closing `}}`.
    fn scan_double_brace_payload(&mut self) -> IonResult<Token> {
        self.skip_whitespace_and_comments()?;
        match self.peek_char() {
            Some('"') => {
                self.advance();
                let s = self.read_delimited('"', true)?;
                self.expect_close_double_brace()?;
                Ok(Token::Clob(s.into_bytes()))
            }
            Some('\'') if self.peek_char_at(1) == Some('\'') && self.peek_char_at(2) == Some('\'') => {
                self.advance_n(3);
                let s = self.read_long_string(true)?;
                self.expect_close_double_brace()?;
                Ok(Token::Clob(s.into_bytes()))
            }
            _ => {
                let start = self.pos;
                let mut base64_text = String::new();
                loop {
                    match self.peek_char() {
                        Some(c) if c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' => {
                            base64_text.push(c);
                            self.advance();
                        }
                        Some(c) if c.is_whitespace() => {
                            self.advance();
                        }
                        Some('}') => break,
                        _ => return Err(self.err(start, "malformed blob content")),
                    }
                }
                self.expect_close_double_brace()?;
                let bytes = decode_base64(&base64_text).map_err(|_| self.err(start, "malformed base64 in blob"))?;
                Ok(Token::Blob(bytes))
            }
        }
    }
}

fn decode_base64(text: &str) -> Result<Vec<u8>, ()> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.decode(text).map_err(|_| ())
}
