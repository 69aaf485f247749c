use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    String,
    Number,
    Boolean,
    Null,
    EndOfInput,
    Unknown,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::String => "a string",
            TokenKind::Number => "a number",
            TokenKind::Boolean => "a boolean",
            TokenKind::Null => "null",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Unknown => "an unknown token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A lexical unit. `text` is the raw matched slice of the source; for
/// strings it excludes the surrounding quotes and is never unescaped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str) -> Self {
        Token { kind, text }
    }

    pub fn end() -> Self {
        Token::new(TokenKind::EndOfInput, "")
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => f.write_str("end of input"),
            TokenKind::String => write!(f, "string \"{}\"", self.text),
            _ => write!(f, "`{}`", self.text),
        }
    }
}

fn join_with_last<S: ToString>(items: impl AsRef<[S]>, sep: &str, last_sep: &str) -> String {
    let items = items.as_ref();

    let mut buf = String::new();

    let mut iter = items.iter();
    let mut first = true;
    let mut next = iter.next();
    while let Some(item) = next {
        let item = item.to_string();
        next = iter.next();

        let last = next.is_none();
        if !first {
            buf.push_str(if last { last_sep } else { sep });
        }
        buf.push_str(&item);
        first = false;
    }

    buf
}

/// Renders a set of acceptable kinds for error messages, e.g.
/// `'{', '[', or a string`.
pub fn one_of(kinds: &[TokenKind]) -> String {
    match kinds {
        [single] => single.to_string(),
        _ => format!("one of {}", join_with_last(kinds, ", ", ", or ")),
    }
}
