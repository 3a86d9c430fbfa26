//! Closed-grammar parser for brace-delimited attribute maps.
//!
//! Grammar:
//!
//! ```text
//! map    := '{' [ entry { ',' entry } [ ',' ] ] '}'
//! entry  := string ':' value
//! value  := string | number
//! string := '"' chars '"' | '\'' chars '\''
//! number := [+-] digits [ '.' digits ]
//! ```
//!
//! Whitespace is allowed between tokens. Nothing is ever evaluated.

use crate::model::object::AttrValue;
use logos::{Lexer, Logos};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// Parse failure with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLiteralError {
    pub position: usize,
    pub message: &'static str,
}

impl Display for MapLiteralError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid map literal at {}: {}", self.position, self.message)
    }
}

impl Error for MapLiteralError {}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum MapToken {
    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[regex(r#""([^"\\]|\\.)*""#, decode_quoted)]
    #[regex(r#"'([^'\\]|\\.)*'"#, decode_quoted)]
    Text(String),

    #[regex(r"[-+]?[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[-+]?[0-9]+")]
    Int,
}

/// Strips the surrounding quotes and decodes backslash escapes.
fn decode_quoted(lex: &mut Lexer<'_, MapToken>) -> String {
    let slice = lex.slice();
    let interior = &slice[1..slice.len() - 1];

    let mut out = String::with_capacity(interior.len());
    let mut chars = interior.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(escaped @ ('\\' | '"' | '\'')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parses `text` as a map literal, keeping entries in source order.
///
/// A repeated key keeps its first position and takes the last value.
/// Number literals must fit their type: integers in `i64`, floats finite.
pub fn parse_map_literal(text: &str) -> Result<Vec<(String, AttrValue)>, MapLiteralError> {
    let mut lexer = MapToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push((token, lexer.span(), lexer.slice())),
            Err(()) => {
                return Err(MapLiteralError {
                    position: lexer.span().start,
                    message: "unexpected character",
                })
            }
        }
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
    };
    let entries = parser.map()?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing input after `}`"));
    }
    Ok(entries)
}

/// Returns whether `text` is exactly one map literal.
pub fn is_map_literal(text: &str) -> bool {
    parse_map_literal(text).is_ok()
}

struct Parser<'src> {
    tokens: Vec<(MapToken, Range<usize>, &'src str)>,
    pos: usize,
    end: usize,
}

impl Parser<'_> {
    fn map(&mut self) -> Result<Vec<(String, AttrValue)>, MapLiteralError> {
        self.expect(&MapToken::OpenBrace, "expected `{`")?;

        let mut entries: Vec<(String, AttrValue)> = Vec::new();
        loop {
            if self.eat(&MapToken::CloseBrace) {
                return Ok(entries);
            }

            let key = match self.peek() {
                Some(MapToken::Text(key)) => key.clone(),
                _ => return Err(self.error("expected a quoted key")),
            };
            self.pos += 1;
            self.expect(&MapToken::Colon, "expected `:` after key")?;
            let value = self.value()?;

            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }

            if self.eat(&MapToken::Comma) {
                continue;
            }
            self.expect(&MapToken::CloseBrace, "expected `,` or `}`")?;
            return Ok(entries);
        }
    }

    fn value(&mut self) -> Result<AttrValue, MapLiteralError> {
        let Some((token, _, slice)) = self.tokens.get(self.pos) else {
            return Err(self.error("expected a quoted string or a number"));
        };

        let value = match token {
            MapToken::Text(text) => AttrValue::Text(text.clone()),
            MapToken::Int => slice
                .parse::<i64>()
                .map(AttrValue::Int)
                .map_err(|_| self.error("integer literal out of range"))?,
            MapToken::Float => slice
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(AttrValue::Float)
                .ok_or_else(|| self.error("float literal out of range"))?,
            _ => return Err(self.error("expected a quoted string or a number")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn peek(&self) -> Option<&MapToken> {
        self.tokens.get(self.pos).map(|(token, _, _)| token)
    }

    fn eat(&mut self, expected: &MapToken) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, expected: &MapToken, message: &'static str) -> Result<(), MapLiteralError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &'static str) -> MapLiteralError {
        let position = self
            .tokens
            .get(self.pos)
            .map_or(self.end, |(_, span, _)| span.start);
        MapLiteralError { position, message }
    }
}
