//! Splitting source files into whitespace-delimited tokens.
//!
//! A [`Lexer`] owns a [`LineReader`] and the tokens produced from it.
//! [`Lexer::tokenize`] runs the whole file through in one go; afterwards the
//! tokens can be walked, as many times as needed, with a [`TokenCursor`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::reader::{LineReader, ReaderError};

mod cursor;
mod token;

pub use cursor::TokenCursor;
pub use token::{write_tokens, Token, TokenType};


/// Where a [`Lexer`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerState {
    /// Created, nothing read yet.
    Created,
    /// In the middle of [`Lexer::tokenize`].
    Tokenizing,
    /// Reached the end of the input.
    Tokenized,
    /// Stopped on an error; the tokens read before it are still available.
    Failed,
}

impl std::fmt::Display for LexerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LexerState::Created => "created",
            LexerState::Tokenizing => "tokenizing",
            LexerState::Tokenized => "tokenized",
            LexerState::Failed => "failed",
        })
    }
}

/// Errors from creating a lexer or running it.
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("failed to create reader: {0}")]
    ReaderCreation(#[source] ReaderError),

    /// The reader failed part way through the input.
    #[error("tokenization stopped after {produced} tokens: {source}")]
    Tokenization {
        produced: usize,
        #[source]
        source: ReaderError,
    },

    #[error("failed to allocate token {produced} (line {line})")]
    Allocation { line: usize, produced: usize },

    #[error("cannot tokenize: lexer is already {0}")]
    InvalidState(LexerState),
}

mod regex {
    use regex::bytes::Regex;
    use std::sync::OnceLock;

    /// A maximal run of bytes that aren't space, tab, CR, or LF.
    ///
    /// Unicode mode is off so the class matches any byte, UTF-8 or not.
    pub(super) fn fragment() -> &'static Regex {
        static FRAGMENT: OnceLock<Regex> = OnceLock::new();
        FRAGMENT.get_or_init(|| {
            Regex::new(r"(?-u)[^ \t\r\n]+").expect("could not compile regex for fragment")
        })
    }
}

/// Tokenizer over a single input.
#[derive(Debug)]
pub struct Lexer<R = File> {
    reader: LineReader<R>,
    tokens: Vec<Token>,
    // Position for `next_token`; cursors keep their own.
    position: usize,
    state: LexerState,
}

impl Lexer<File> {
    /// Create a lexer reading from the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LexError> {
        let reader = LineReader::open(path).map_err(LexError::ReaderCreation)?;
        Ok(Lexer::new(reader))
    }
}

impl<R: Read> Lexer<R> {
    /// Read every line of the input, splitting it into tokens.
    ///
    /// Returns the total number of tokens. On error the lexer is left
    /// [`LexerState::Failed`], and everything read up to that point is still
    /// in [`Lexer::tokens`].
    pub fn tokenize(&mut self) -> Result<usize, LexError> {
        if self.state != LexerState::Created {
            return Err(LexError::InvalidState(self.state));
        }
        self.state = LexerState::Tokenizing;

        loop {
            match self.next_line() {
                Ok(true) => (),
                Ok(false) => break,
                Err(err) => {
                    self.state = LexerState::Failed;
                    tracing::warn!(
                        lines = self.reader.line_number(),
                        tokens = self.tokens.len(),
                        "tokenization failed: {err}"
                    );
                    return Err(err);
                }
            }
        }

        self.state = LexerState::Tokenized;
        tracing::debug!(
            lines = self.reader.line_number(),
            tokens = self.tokens.len(),
            "tokenized input"
        );
        Ok(self.tokens.len())
    }

    /// Read one line and append its tokens.
    /// Returns false at the end of the input.
    fn next_line(&mut self) -> Result<bool, LexError> {
        // read_line bumps the counter exactly once for the line it returns.
        let line_number = self.reader.line_number() + 1;
        let line = match self.reader.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(false),
            Err(source) => {
                return Err(LexError::Tokenization {
                    produced: self.tokens.len(),
                    source,
                })
            }
        };

        // Token storage failures can't be provoked short of exhausting memory, so
        // LexError::Allocation has no test; the reader's growth failure does.
        for fragment in regex::fragment().find_iter(line) {
            let produced = self.tokens.len();
            let allocation_failed = || LexError::Allocation {
                line: line_number,
                produced,
            };
            self.tokens.try_reserve(1).map_err(|_| allocation_failed())?;
            let value = owned(fragment.as_bytes()).ok_or_else(allocation_failed)?;

            let kind = TokenType::classify(&value);
            self.tokens
                .push(Token::new(kind, value, line_number, fragment.start() + 1));
        }

        Ok(true)
    }
}

impl<R> Lexer<R> {
    /// Wrap an existing reader.
    pub fn new(reader: LineReader<R>) -> Self {
        Lexer {
            reader,
            tokens: Vec::new(),
            position: 0,
            state: LexerState::Created,
        }
    }

    pub fn state(&self) -> LexerState {
        self.state
    }

    /// All tokens produced so far, in input order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of lines read from the input.
    pub fn line_count(&self) -> usize {
        self.reader.line_number()
    }

    /// A new cursor at the start of the token sequence.
    pub fn cursor(&self) -> TokenCursor<'_> {
        TokenCursor::new(&self.tokens)
    }

    /// Return the token at the lexer's own position and move past it.
    ///
    /// This position is independent of any [`TokenCursor`]s.
    pub fn next_token(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }
}

impl<'a, R> IntoIterator for &'a Lexer<R> {
    type Item = &'a Token;
    type IntoIter = TokenCursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

/// Copy a fragment out of the line buffer, reporting allocation failure
/// instead of aborting.
fn owned(fragment: &[u8]) -> Option<Box<[u8]>> {
    let mut value = Vec::new();
    value.try_reserve_exact(fragment.len()).ok()?;
    value.extend_from_slice(fragment);
    Some(value.into_boxed_slice())
}
