//! Forward-only pull reader over JSON response text.
//!
//! [`JsonReader`] hands out one token at a time so callers can pick the fields they need
//! without materializing a parse tree. State is a stack of open scopes plus the cursor, so
//! memory grows with nesting depth rather than document size.
//!
//! ```
//! use playbasis_client_sdk::reader::{JsonReader, TokenKind};
//!
//! # fn main() -> playbasis_client_sdk::Result<()> {
//! let mut reader = JsonReader::new(r#"{"a":{"b":1},"c":[1,2,3]}"#);
//!
//! reader.begin_object()?;
//! assert_eq!(reader.next_name()?, "a");
//! reader.skip_value()?;
//! assert_eq!(reader.next_name()?, "c");
//! assert_eq!(reader.peek()?, TokenKind::BeginArray);
//! # Ok(())
//! # }
//! ```

#![expect(
    clippy::module_name_repetitions,
    reason = "JsonReader is the conventional name for a pull parser"
)]

use std::fmt;
use std::str::FromStr as _;

use serde_json::{Map, Number, Value};
use strum_macros::Display;

use crate::Result;
use crate::error::Error;

/// Deepest nesting [`JsonReader::read_value`] will materialize.
pub const MAX_DEPTH: usize = 128;

/// The kind of the next token in the stream.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    /// A field name inside an object
    Name,
    String,
    Number,
    Bool,
    Null,
    /// No tokens remain; the document was fully consumed
    EndDocument,
}

/// A scalar JSON value.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => f.write_str("null"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(s) => Value::String(s),
            Scalar::Number(n) => Value::Number(n),
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Null => Value::Null,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyObject,
    /// A name was read and its value is pending
    DanglingName,
    NonEmptyObject,
    EmptyArray,
    NonEmptyArray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Peeked {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Name,
    String,
    Number,
    True,
    False,
    Null,
    EndDocument,
}

impl Peeked {
    fn kind(self) -> TokenKind {
        match self {
            Peeked::BeginObject => TokenKind::BeginObject,
            Peeked::EndObject => TokenKind::EndObject,
            Peeked::BeginArray => TokenKind::BeginArray,
            Peeked::EndArray => TokenKind::EndArray,
            Peeked::Name => TokenKind::Name,
            Peeked::String => TokenKind::String,
            Peeked::Number => TokenKind::Number,
            Peeked::True | Peeked::False => TokenKind::Bool,
            Peeked::Null => TokenKind::Null,
            Peeked::EndDocument => TokenKind::EndDocument,
        }
    }
}

/// Pull parser over a single JSON document.
///
/// Tokens are consumed strictly forward; a consumed token cannot be revisited. Build a new
/// reader over the same text to start again.
#[derive(Debug)]
pub struct JsonReader<'text> {
    text: &'text str,
    /// Byte offset of the next unread character. When a name, string or number is peeked it
    /// points at the first byte of that token.
    pos: usize,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
    closed: bool,
}

impl<'text> JsonReader<'text> {
    #[must_use]
    pub fn new(text: &'text str) -> Self {
        Self {
            text,
            pos: 0,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
            closed: false,
        }
    }

    /// Returns the kind of the next token without consuming it.
    pub fn peek(&mut self) -> Result<TokenKind> {
        Ok(self.peeked()?.kind())
    }

    /// Returns `true` while the current object or array has further elements.
    pub fn has_next(&mut self) -> Result<bool> {
        Ok(!matches!(
            self.peeked()?,
            Peeked::EndObject | Peeked::EndArray | Peeked::EndDocument
        ))
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.expect(Peeked::BeginObject)?;
        self.stack.push(Scope::EmptyObject);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<()> {
        self.expect(Peeked::EndObject)?;
        self.stack.pop();
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.expect(Peeked::BeginArray)?;
        self.stack.push(Scope::EmptyArray);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<()> {
        self.expect(Peeked::EndArray)?;
        self.stack.pop();
        Ok(())
    }

    /// Consumes a field name.
    pub fn next_name(&mut self) -> Result<String> {
        self.expect(Peeked::Name)?;
        self.read_quoted()
    }

    /// Consumes a string. Numbers are accepted and returned as their literal text.
    pub fn next_string(&mut self) -> Result<String> {
        match self.peeked()? {
            Peeked::String => {
                self.peeked = None;
                self.read_quoted()
            }
            Peeked::Number => {
                self.peeked = None;
                Ok(self.read_number_literal()?.to_owned())
            }
            other => Err(self.unexpected("a string", other)),
        }
    }

    /// Consumes any scalar value.
    pub fn next_scalar(&mut self) -> Result<Scalar> {
        let peeked = self.peeked()?;
        let scalar = match peeked {
            Peeked::String => {
                self.peeked = None;
                Scalar::String(self.read_quoted()?)
            }
            Peeked::Number => {
                self.peeked = None;
                Scalar::Number(self.read_number()?)
            }
            Peeked::True => Scalar::Bool(true),
            Peeked::False => Scalar::Bool(false),
            Peeked::Null => Scalar::Null,
            other => return Err(self.unexpected("a scalar", other)),
        };
        self.peeked = None;
        Ok(scalar)
    }

    pub fn next_bool(&mut self) -> Result<bool> {
        match self.peeked()? {
            Peeked::True => {
                self.peeked = None;
                Ok(true)
            }
            Peeked::False => {
                self.peeked = None;
                Ok(false)
            }
            other => Err(self.unexpected("a boolean", other)),
        }
    }

    pub fn next_null(&mut self) -> Result<()> {
        self.expect(Peeked::Null)
    }

    /// Consumes an integer. Quoted integers such as `"42"` are accepted as well, since the
    /// service sends many counters as strings.
    pub fn next_i64(&mut self) -> Result<i64> {
        let offset = self.pos;
        let text = self.next_string()?;
        text.trim()
            .parse::<i64>()
            .map_err(|e| Error::syntax(offset, format!("expected an integer, got {text:?}: {e}")))
    }

    /// Consumes a floating point number, quoted or not.
    pub fn next_f64(&mut self) -> Result<f64> {
        let offset = self.pos;
        let text = self.next_string()?;
        text.trim()
            .parse::<f64>()
            .map_err(|e| Error::syntax(offset, format!("expected a number, got {text:?}: {e}")))
    }

    /// Consumes the next value. Objects and arrays are consumed with their whole subtree, so
    /// the cursor lands on the following sibling. A pending field name is consumed together
    /// with its value.
    pub fn skip_value(&mut self) -> Result<()> {
        let mut depth = 0_usize;
        loop {
            match self.peek()? {
                TokenKind::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                TokenKind::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                TokenKind::EndObject if depth > 0 => {
                    self.end_object()?;
                    depth -= 1;
                }
                TokenKind::EndArray if depth > 0 => {
                    self.end_array()?;
                    depth -= 1;
                }
                TokenKind::Name => {
                    self.next_name()?;
                    continue;
                }
                kind @ (TokenKind::EndObject | TokenKind::EndArray | TokenKind::EndDocument) => {
                    return Err(Error::syntax(self.pos, format!("no value to skip, found {kind}")));
                }
                _ => {
                    self.next_scalar()?;
                }
            }

            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Scans forward, descending into objects and arrays, until a field called `name` has been
    /// consumed. The cursor is then positioned on that field's value.
    ///
    /// Returns `Ok(false)` when the document ends first; absence is not an error.
    pub fn find_name(&mut self, name: &str) -> Result<bool> {
        Ok(self.seek_name(|candidate| candidate == name)?.is_some())
    }

    /// Like [`JsonReader::find_name`] but matches with a predicate and returns the name that
    /// matched.
    pub(crate) fn seek_name<F: Fn(&str) -> bool>(&mut self, matches: F) -> Result<Option<String>> {
        loop {
            match self.peek()? {
                TokenKind::BeginObject => self.begin_object()?,
                TokenKind::EndObject => self.end_object()?,
                TokenKind::BeginArray => self.begin_array()?,
                TokenKind::EndArray => self.end_array()?,
                TokenKind::EndDocument => return Ok(None),
                TokenKind::Name => {
                    let candidate = self.next_name()?;
                    if matches(&candidate) {
                        return Ok(Some(candidate));
                    }
                }
                _ => self.skip_value()?,
            }
        }
    }

    /// Materializes the next value as a [`serde_json::Value`].
    ///
    /// Fails once the cursor would sit deeper than [`MAX_DEPTH`]; use
    /// [`JsonReader::skip_value`] to step over arbitrarily deep values.
    pub fn read_value(&mut self) -> Result<Value> {
        let kind = self.peek()?;
        if matches!(kind, TokenKind::BeginObject | TokenKind::BeginArray)
            && self.depth() >= MAX_DEPTH
        {
            return Err(Error::syntax(self.pos, "nesting too deep"));
        }

        match kind {
            TokenKind::BeginObject => {
                let mut map = Map::new();
                self.begin_object()?;
                while self.has_next()? {
                    let name = self.next_name()?;
                    let value = self.read_value()?;
                    map.insert(name, value);
                }
                self.end_object()?;
                Ok(Value::Object(map))
            }
            TokenKind::BeginArray => {
                let mut values = Vec::new();
                self.begin_array()?;
                while self.has_next()? {
                    values.push(self.read_value()?);
                }
                self.end_array()?;
                Ok(Value::Array(values))
            }
            _ => Ok(self.next_scalar()?.into()),
        }
    }

    /// Closes the reader. Any later call fails.
    pub fn close(&mut self) {
        self.closed = true;
        self.peeked = None;
        self.stack.clear();
    }

    /// Nesting depth of the cursor; `0` at document level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    fn expect(&mut self, wanted: Peeked) -> Result<()> {
        let peeked = self.peeked()?;
        if peeked == wanted {
            self.peeked = None;
            Ok(())
        } else {
            Err(self.unexpected(&wanted.kind().to_string(), peeked))
        }
    }

    fn unexpected(&self, wanted: &str, found: Peeked) -> Error {
        let error = Error::syntax(
            self.pos,
            format!("expected {wanted} but found {}", found.kind()),
        );
        #[cfg(feature = "tracing")]
        tracing::trace!(%error, "reader call does not match next token");
        error
    }

    fn peeked(&mut self) -> Result<Peeked> {
        if self.closed {
            return Err(Error::syntax(self.pos, "reader is closed"));
        }
        match self.peeked {
            Some(peeked) => Ok(peeked),
            None => {
                let peeked = self.do_peek()?;
                self.peeked = Some(peeked);
                Ok(peeked)
            }
        }
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn do_peek(&mut self) -> Result<Peeked> {
        let Some(&top) = self.stack.last() else {
            return Err(Error::syntax(self.pos, "reader is closed"));
        };

        match top {
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                if self.next_non_whitespace() == Some(b']') {
                    self.pos += 1;
                    return Ok(Peeked::EndArray);
                }
            }
            Scope::NonEmptyArray => match self.next_non_whitespace() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Peeked::EndArray);
                }
                Some(b',') => self.pos += 1,
                other => return Err(self.unexpected_byte(other, "',' or ']'")),
            },
            Scope::EmptyObject | Scope::NonEmptyObject => {
                if top == Scope::NonEmptyObject {
                    match self.next_non_whitespace() {
                        Some(b'}') => {
                            self.pos += 1;
                            return Ok(Peeked::EndObject);
                        }
                        Some(b',') => self.pos += 1,
                        other => return Err(self.unexpected_byte(other, "',' or '}'")),
                    }
                }
                return match self.next_non_whitespace() {
                    Some(b'}') if top == Scope::EmptyObject => {
                        self.pos += 1;
                        Ok(Peeked::EndObject)
                    }
                    Some(b'"') => {
                        self.set_top(Scope::DanglingName);
                        Ok(Peeked::Name)
                    }
                    other => Err(self.unexpected_byte(other, "a field name")),
                };
            }
            Scope::DanglingName => {
                self.set_top(Scope::NonEmptyObject);
                match self.next_non_whitespace() {
                    Some(b':') => self.pos += 1,
                    other => return Err(self.unexpected_byte(other, "':'")),
                }
            }
            Scope::EmptyDocument => self.set_top(Scope::NonEmptyDocument),
            Scope::NonEmptyDocument => {
                return match self.next_non_whitespace() {
                    None => Ok(Peeked::EndDocument),
                    other => Err(self.unexpected_byte(other, "end of document")),
                };
            }
        }

        self.peek_value()
    }

    fn peek_value(&mut self) -> Result<Peeked> {
        match self.next_non_whitespace() {
            Some(b'{') => {
                self.pos += 1;
                Ok(Peeked::BeginObject)
            }
            Some(b'[') => {
                self.pos += 1;
                Ok(Peeked::BeginArray)
            }
            Some(b'"') => Ok(Peeked::String),
            Some(b't') => self.peek_keyword("true", Peeked::True),
            Some(b'f') => self.peek_keyword("false", Peeked::False),
            Some(b'n') => self.peek_keyword("null", Peeked::Null),
            Some(b'-' | b'0'..=b'9') => Ok(Peeked::Number),
            other => Err(self.unexpected_byte(other, "a value")),
        }
    }

    fn peek_keyword(&mut self, keyword: &str, peeked: Peeked) -> Result<Peeked> {
        let end = self.pos + keyword.len();
        if self.text.get(self.pos..end) == Some(keyword) && !self.is_literal_byte(end) {
            self.pos = end;
            Ok(peeked)
        } else {
            Err(Error::syntax(self.pos, format!("expected `{keyword}`")))
        }
    }

    fn is_literal_byte(&self, at: usize) -> bool {
        self.text
            .as_bytes()
            .get(at)
            .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'+' | b'-'))
    }

    fn next_non_whitespace(&mut self) -> Option<u8> {
        let bytes = self.text.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.pos += 1;
            } else {
                return Some(b);
            }
        }
        None
    }

    fn unexpected_byte(&self, found: Option<u8>, wanted: &str) -> Error {
        match found {
            None => Error::syntax(self.pos, format!("unexpected end of input, expected {wanted}")),
            Some(b) => Error::syntax(
                self.pos,
                format!("unexpected character {:?}, expected {wanted}", char::from(b)),
            ),
        }
    }

    fn read_number_literal(&mut self) -> Result<&'text str> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let mut end = start;
        while bytes
            .get(end)
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
        {
            end += 1;
        }

        let literal = self
            .text
            .get(start..end)
            .ok_or_else(|| Error::syntax(start, "number is not on a character boundary"))?;
        if Number::from_str(literal).is_err() {
            return Err(Error::syntax(start, format!("invalid number `{literal}`")));
        }
        self.pos = end;
        Ok(literal)
    }

    fn read_number(&mut self) -> Result<Number> {
        let start = self.pos;
        let literal = self.read_number_literal()?;
        Number::from_str(literal)
            .map_err(|e| Error::syntax(start, format!("invalid number `{literal}`: {e}")))
    }

    /// Reads a quoted string starting at the opening quote and decodes its escapes.
    fn read_quoted(&mut self) -> Result<String> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        if bytes.get(start) != Some(&b'"') {
            return Err(Error::syntax(start, "expected '\"'"));
        }

        let mut out = String::new();
        let mut run_start = start + 1;
        let mut at = run_start;
        loop {
            match bytes.get(at) {
                None => return Err(Error::syntax(start, "unterminated string")),
                Some(b'"') => {
                    out.push_str(self.run(run_start, at)?);
                    self.pos = at + 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(self.run(run_start, at)?);
                    at = self.read_escape(at + 1, &mut out)?;
                    run_start = at;
                }
                Some(&b) if b < 0x20 => {
                    return Err(Error::syntax(at, "unescaped control character in string"));
                }
                Some(_) => at += 1,
            }
        }
    }

    fn run(&self, start: usize, end: usize) -> Result<&'text str> {
        self.text
            .get(start..end)
            .ok_or_else(|| Error::syntax(start, "string is not on a character boundary"))
    }

    /// Decodes the escape whose selector byte is at `at`; returns the offset after it.
    fn read_escape(&self, at: usize, out: &mut String) -> Result<usize> {
        let Some(&selector) = self.text.as_bytes().get(at) else {
            return Err(Error::syntax(at, "unterminated escape sequence"));
        };
        let decoded = match selector {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let (c, next) = self.read_unicode_escape(at + 1)?;
                out.push(c);
                return Ok(next);
            }
            other => {
                return Err(Error::syntax(
                    at,
                    format!("invalid escape '\\{}'", char::from(other)),
                ));
            }
        };
        out.push(decoded);
        Ok(at + 1)
    }

    fn read_unicode_escape(&self, at: usize) -> Result<(char, usize)> {
        let high = self.read_hex4(at)?;
        let mut next = at + 4;

        let code = if (0xD800..0xDC00).contains(&high) {
            let bytes = self.text.as_bytes();
            if bytes.get(next) != Some(&b'\\') || bytes.get(next + 1) != Some(&b'u') {
                return Err(Error::syntax(at, "unpaired surrogate in \\u escape"));
            }
            let low = self.read_hex4(next + 2)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(Error::syntax(next, "invalid low surrogate in \\u escape"));
            }
            next += 6;
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code)
            .map(|c| (c, next))
            .ok_or_else(|| Error::syntax(at, "invalid code point in \\u escape"))
    }

    fn read_hex4(&self, at: usize) -> Result<u32> {
        self.text
            .get(at..at + 4)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .ok_or_else(|| Error::syntax(at, "expected four hex digits after \\u"))
    }
}
