use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unterminated string starting at byte {start}")]
    UnterminatedString { start: usize },
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

fn is_number_char(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E')
}

/// Pull-based tokenizer over a borrowed source string.
///
/// Each call to [`Lexer::next_token`] yields exactly one token. Once the end
/// of the source is reached every further call yields `EndOfInput`.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Byte offset of the cursor into the source.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Lexes the whole input. The returned vector always ends with an
    /// `EndOfInput` token.
    pub fn tokenize(input: &'a str) -> Result<Vec<Token<'a>>, Error> {
        let mut lexer = Lexer::new(input);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token()?;
            tokens.push(token);
            if token.is(TokenKind::EndOfInput) {
                break;
            }
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, Error> {
        self.take_while(is_whitespace);

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::end()),
        };

        let kind = match c {
            b'{' => TokenKind::LeftBrace,
            b'}' => TokenKind::RightBrace,
            b'[' => TokenKind::LeftBracket,
            b']' => TokenKind::RightBracket,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'"' => return self.string(),
            b'-' | b'0'..=b'9' => return Ok(self.number()),
            c if c.is_ascii_alphabetic() => return Ok(self.keyword()),
            _ => return Ok(self.unknown_char()),
        };

        let start = self.pos;
        self.pos += 1;
        Ok(Token::new(kind, &self.input[start..self.pos]))
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        let len = self.input.as_bytes()[start..]
            .iter()
            .take_while(|&&b| pred(b))
            .count();
        self.pos += len;
        &self.input[start..self.pos]
    }

    // No escape handling: the first quote after the opening one closes the
    // string, even when preceded by a backslash.
    fn string(&mut self) -> Result<Token<'a>, Error> {
        let quote = self.pos;
        self.pos += 1;
        let text = self.take_while(|b| b != b'"');
        if self.peek().is_none() {
            return Err(Error::UnterminatedString { start: quote });
        }
        self.pos += 1;
        Ok(Token::new(TokenKind::String, text))
    }

    // Deliberately loose; malformed text is rejected when the parser converts it.
    fn number(&mut self) -> Token<'a> {
        Token::new(TokenKind::Number, self.take_while(is_number_char))
    }

    fn keyword(&mut self) -> Token<'a> {
        let text = self.take_while(|b| b.is_ascii_alphabetic());
        let kind = match text {
            "true" | "false" => TokenKind::Boolean,
            "null" => TokenKind::Null,
            _ => TokenKind::Unknown,
        };
        Token::new(kind, text)
    }

    fn unknown_char(&mut self) -> Token<'a> {
        let start = self.pos;
        let len = self.input[start..].chars().next().map_or(1, char::len_utf8);
        self.pos += len;
        Token::new(TokenKind::Unknown, &self.input[start..self.pos])
    }
}

pub mod prelude {
    pub use super::{Error as LexerError, Lexer};
    pub use crate::token::{Token, TokenKind};
}
