//! # Inline Dialect Parsing
//!
//! Cursor-based scanning of text runs for the dialect's inline constructs:
//! wikilinks (`[[path#hash|alias]]`), embeds (`![[path]]`) and tags
//! (`#tag/nested`).
//!
//! ## Modules
//!
//! - **`cursor`**: `Cursor`, a copyable byte cursor with lookback
//! - **`token`**: `Token` and `TokenKind`, the tokenizers' output
//! - **`kinds`**: per-construct delimiters and tokenizers
//! - **`parser`**: `scan()` splits a run into segments, `parse_inline()`
//!   feeds them through the AST bridge
//!
//! ## Failure
//!
//! A tokenizer that does not match leaves the cursor where it was; the
//! scanner then steps one byte and the characters stay plain text.

pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod token;

pub use parser::{Segment, parse_inline, scan, tokenize};
pub use token::{Token, TokenKind};
