//! Forward-only iteration over a finished token sequence.

use std::iter::FusedIterator;

use super::token::Token;

/// A position in a token sequence that only moves forward.
///
/// The cursor borrows the tokens; it never copies or modifies them. To go
/// over the sequence again, make a new cursor.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        TokenCursor {
            tokens,
            position: 0,
        }
    }

    /// Index of the token the next call to `next` returns.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Tokens not yet returned.
    pub fn remaining(&self) -> &'a [Token] {
        &self.tokens[self.position..]
    }
}

impl<'a> Iterator for TokenCursor<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tokens.len() - self.position;
        (len, Some(len))
    }
}

impl ExactSizeIterator for TokenCursor<'_> {}

impl FusedIterator for TokenCursor<'_> {}
