//! Line-based whitespace tokenizer.
//!
//! Reads a source file one line at a time and splits each line on spaces,
//! tabs and line-ending characters. Every fragment becomes a [`Token`];
//! no further lexical analysis is done.
//!
//! ```no_run
//! let mut lexer = linelex::Lexer::open("input.src")?;
//! lexer.tokenize()?;
//! for token in &lexer {
//!     println!("{token}");
//! }
//! # Ok::<(), linelex::LexError>(())
//! ```

pub mod lexer;
pub mod reader;

pub use lexer::{write_tokens, LexError, Lexer, LexerState, Token, TokenCursor, TokenType};
pub use reader::{LineReader, ReaderError, INITIAL_BUFFER_SIZE};
