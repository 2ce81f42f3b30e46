//! Token values produced by the lexer.

use std::borrow::Cow;
use std::io::Write;

/// Category of a token.
///
/// The numeric codes are part of the output format (`Type=<code>`), so they
/// must not be reordered.
///
/// Only [`TokenType::Identifier`] is ever produced: the lexer splits on
/// whitespace and doesn't look at the shape of a fragment. The other
/// categories are reserved for a classifier that doesn't exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenType {
    /// End of file.
    Eof = 0,
    /// End of statement.
    Eos = 1,
    Identifier = 2,
    Number = 3,
    String = 4,
    Char = 5,
    Operator = 6,
    Keyword = 7,
    Comment = 8,
}

impl TokenType {
    /// Numeric code, as printed by the CLI.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenType::Eof => "eof",
            TokenType::Eos => "eos",
            TokenType::Identifier => "identifier",
            TokenType::Number => "number",
            TokenType::String => "string",
            TokenType::Char => "character",
            TokenType::Operator => "operator",
            TokenType::Keyword => "keyword",
            TokenType::Comment => "comment",
        }
    }

    /// Pick the category for a whitespace-delimited fragment.
    ///
    /// Every fragment is an identifier, whatever it looks like.
    pub fn classify(_fragment: &[u8]) -> Self {
        TokenType::Identifier
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fragment of the input, tagged with its category and where it started.
///
/// The value holds the input bytes unchanged; they need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenType,
    value: Box<[u8]>,
    line: usize,
    column: usize,
}

impl Token {
    /// Lines and columns are 1-indexed; columns count bytes.
    pub fn new(kind: TokenType, value: impl Into<Box<[u8]>>, line: usize, column: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            line,
            column,
        }
    }

    pub fn kind(&self) -> TokenType {
        self.kind
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The value as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Write the token as a `Type=<code>, Value=<value>` record, with the value
    /// bytes copied through as-is.
    pub fn write_record(&self, out: &mut impl Write) -> std::io::Result<()> {
        write!(out, "Type={}, Value=", self.kind.code())?;
        out.write_all(&self.value)?;
        out.write_all(b"\n")
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Type={}, Value={}", self.kind.code(), self.text())
    }
}

/// Write one record per token, in order.
pub fn write_tokens<'a, W: Write>(
    tokens: impl IntoIterator<Item = &'a Token>,
    out: &mut W,
) -> std::io::Result<()> {
    for token in tokens {
        token.write_record(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let want = [
            (TokenType::Eof, 0, "eof"),
            (TokenType::Eos, 1, "eos"),
            (TokenType::Identifier, 2, "identifier"),
            (TokenType::Number, 3, "number"),
            (TokenType::String, 4, "string"),
            (TokenType::Char, 5, "character"),
            (TokenType::Operator, 6, "operator"),
            (TokenType::Keyword, 7, "keyword"),
            (TokenType::Comment, 8, "comment"),
        ];
        for (kind, code, name) in want {
            assert_eq!(kind.code(), code, "unexpected code for {kind:?}");
            assert_eq!(kind.to_string(), name);
        }
    }

    #[test]
    fn everything_is_an_identifier() {
        for fragment in ["hello", "42", "\"quoted\"", "+=", "if", "//", "'c'"] {
            assert_eq!(
                TokenType::classify(fragment.as_bytes()),
                TokenType::Identifier,
                "fragment {fragment:?}"
            );
        }
    }

    #[test]
    fn record_format() {
        let token = Token::new(TokenType::Identifier, &b"hello"[..], 1, 1);
        let mut out = Vec::new();
        token.write_record(&mut out).unwrap();
        assert_eq!(out, b"Type=2, Value=hello\n");
        assert_eq!(token.to_string(), "Type=2, Value=hello");
    }

    #[test]
    fn record_keeps_raw_bytes() {
        let token = Token::new(TokenType::Identifier, &b"caf\xe9"[..], 3, 7);
        let mut out = Vec::new();
        token.write_record(&mut out).unwrap();
        assert_eq!(out, b"Type=2, Value=caf\xe9\n");
        assert_eq!(token.text(), "caf\u{FFFD}");
        assert_eq!((token.line(), token.column()), (3, 7));
    }

    #[test]
    fn write_several() {
        let tokens = [
            Token::new(TokenType::Identifier, &b"a"[..], 1, 1),
            Token::new(TokenType::Number, &b"1"[..], 1, 3),
        ];
        let mut out = Vec::new();
        write_tokens(&tokens, &mut out).unwrap();
        assert_eq!(out, b"Type=2, Value=a\nType=3, Value=1\n");
    }
}
