use std::str::FromStr;

use crate::lexer::{self, Lexer};
use crate::token::{self, Token, TokenKind};
use crate::value::{Array, Object, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] lexer::Error),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("expected a string key, found {found}")]
    ExpectedStringKey { found: String },
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("trailing content after value: {found}")]
    TrailingContent { found: String },
    #[error("nesting deeper than {max} levels")]
    DepthLimit { max: usize },
}

/// Deepest object/array nesting accepted before parsing fails.
pub const MAX_DEPTH: usize = 512;

const VALUE_START: [TokenKind; 6] = [
    TokenKind::LeftBrace,
    TokenKind::LeftBracket,
    TokenKind::String,
    TokenKind::Number,
    TokenKind::Boolean,
    TokenKind::Null,
];

/// Recursive-descent parser holding one token of lookahead.
///
/// A parser is good for exactly one document: [`Parser::parse`] consumes it.
/// Independent documents can be parsed on separate threads with separate
/// parsers, since nothing is shared between instances.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Primes the lookahead with the first token, which may already fail.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, Error> {
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
        })
    }

    pub fn parse(mut self) -> Result<Value, Error> {
        let value = self.value()?;
        if !self.current.is(TokenKind::EndOfInput) {
            return Err(Error::TrailingContent {
                found: self.current.to_string(),
            });
        }
        Ok(value)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, Error> {
        if !self.current.is(kind) {
            return Err(Error::UnexpectedToken {
                expected: kind.to_string(),
                found: self.current.to_string(),
            });
        }
        let next = self.lexer.next_token()?;
        tracing::trace!(token = %next, "advance");
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn value(&mut self) -> Result<Value, Error> {
        match self.current.kind {
            TokenKind::LeftBrace => self.nested(Self::object),
            TokenKind::LeftBracket => self.nested(Self::array),
            TokenKind::String => self.string(),
            TokenKind::Number => self.number(),
            TokenKind::Boolean | TokenKind::Null => self.keyword(),
            _ => Err(Error::UnexpectedToken {
                expected: token::one_of(&VALUE_START),
                found: self.current.to_string(),
            }),
        }
    }

    fn nested(&mut self, rule: fn(&mut Self) -> Result<Value, Error>) -> Result<Value, Error> {
        if self.depth == MAX_DEPTH {
            return Err(Error::DepthLimit { max: MAX_DEPTH });
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Result<Value, Error> {
        self.expect(TokenKind::LeftBrace)?;
        let mut object = Object::new();

        if self.current.is(TokenKind::RightBrace) {
            self.expect(TokenKind::RightBrace)?;
            return Ok(Value::Object(object));
        }

        loop {
            if !self.current.is(TokenKind::String) {
                return Err(Error::ExpectedStringKey {
                    found: self.current.to_string(),
                });
            }
            let key = self.expect(TokenKind::String)?.text.to_string();
            self.expect(TokenKind::Colon)?;
            let value = self.value()?;
            object.insert(key, value);

            if self.current.is(TokenKind::RightBrace) {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(Value::Object(object))
    }

    fn array(&mut self) -> Result<Value, Error> {
        self.expect(TokenKind::LeftBracket)?;
        let mut array = Array::new();

        if self.current.is(TokenKind::RightBracket) {
            self.expect(TokenKind::RightBracket)?;
            return Ok(Value::Array(array));
        }

        loop {
            array.push(self.value()?);
            if self.current.is(TokenKind::RightBracket) {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }

        self.expect(TokenKind::RightBracket)?;
        Ok(Value::Array(array))
    }

    fn string(&mut self) -> Result<Value, Error> {
        let token = self.expect(TokenKind::String)?;
        Ok(Value::String(token.text.to_string()))
    }

    fn number(&mut self) -> Result<Value, Error> {
        let token = self.expect(TokenKind::Number)?;
        token
            .text
            .parse()
            .map(Value::Number)
            .map_err(|_| Error::InvalidNumber(token.text.to_string()))
    }

    // Only reached with a Boolean or Null lookahead.
    fn keyword(&mut self) -> Result<Value, Error> {
        let token = self.expect(self.current.kind)?;
        if token.is(TokenKind::Null) {
            return Ok(Value::Null);
        }
        Ok(Value::Bool(token.text == "true"))
    }
}

/// Parses one complete document with a fresh lexer and parser.
pub fn parse(input: &str) -> Result<Value, Error> {
    tracing::debug!(bytes = input.len(), "parsing document");
    let value = Parser::new(Lexer::new(input))?.parse()?;
    tracing::debug!(kind = %value.kind(), "parsed document");
    Ok(value)
}

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

pub mod prelude {
    pub use super::{parse, Error as ParserError, Parser};
}
