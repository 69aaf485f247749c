//! A small hand-written JSON reader: a pull lexer feeding a recursive-descent
//! parser that builds an owned [`Value`] tree, plus the haversine tooling
//! that generates and consumes coordinate-pair documents.
//!
//! Strings are kept exactly as written between their quotes; escape
//! sequences such as `\n` or `\u00e9` are not decoded, and a backslash does
//! not protect a following quote.

pub mod answers;
pub mod generate;
pub mod haversine;
pub mod lexer;
pub mod parser;
pub mod profile;
pub mod token;
pub mod value;

pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind};
pub use value::{Array, Object, Value, ValueKind};
