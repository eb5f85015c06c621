//! # Sedge
//!
//! A lexing and grammar-rule toolkit built on one piece of machinery:
//! patterns are compiled to nondeterministic state graphs, made
//! deterministic, minimized, and then stepped. The [`lexer`] module
//! instantiates the machinery over characters to produce tokens; the
//! [`parser`] module instantiates the very same machinery over token
//! and rule references to compile grammar rules.

pub mod automaton;
pub mod error;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod regex;
pub mod stream;
