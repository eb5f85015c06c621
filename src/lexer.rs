//! # Lexer
//!
//! This module contains the structs and primitives related to tokenization.
//! The most useful are:
//!  - [`Grammar`], the compiled catalogue of token definitions, and its
//!    builder [`GrammarBuilder`];
//!  - [`Lexer`], which turns a [`StringStream`] into a stream of tokens;
//!  - [`LexedStream`], the iterator over [`Token`]s produced by a lexer;
//!  - [`Token`], the basic interface to deal with the result of the
//!    tokenization.
//!
//!  [`StringStream`]: crate::stream::StringStream

mod grammar;
#[allow(clippy::module_inception)]
mod lexer;

pub use grammar::{Grammar, GrammarBuilder, Ignores, TerminalId};
pub use lexer::{LexedStream, Lexer, Token};
