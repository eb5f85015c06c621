//! # Error
//!
//! Everything that can go wrong while compiling or running an automaton.
//! Errors are grouped in three families, mirroring the stages at which
//! they can occur:
//!  - [`ConstructionError`]: the token regexes or the rule grammar are
//!    malformed, or two definitions are not distinguishable;
//!  - [`LexError`]: the input text could not be tokenized;
//!  - [`UsageError`]: an already-frozen state graph was mutated.
//!
//! Compilation either fully succeeds, producing an immutable automaton,
//! or fails with one of these; no partial automaton is ever exposed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Any error raised by this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),
    #[error("lexing error: {0}")]
    Lex(#[from] LexError),
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
}

/// # Summary
///
/// A token regex or a grammar-rule definition is malformed, or a set of
/// definitions cannot be compiled into a single deterministic automaton.
/// Raised synchronously during `build`, never during scanning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("unmatched `(`")]
    UnmatchedGroupOpen,
    #[error("unmatched `)`")]
    UnmatchedGroupClose,
    #[error("unmatched `[`")]
    UnmatchedClassOpen,
    #[error("unmatched `]`")]
    UnmatchedClassClose,
    #[error("escape at end of pattern")]
    TrailingEscape,
    #[error("invalid escape `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid range `{from}-{to}` in character class")]
    InvalidRange { from: char, to: char },
    #[error("`|` not inside a group")]
    AlternationOutsideGroup,
    #[error("empty group")]
    EmptyGroup,
    #[error("empty alternative in group")]
    EmptyAlternative,
    #[error("duplicate token definition `{0}`")]
    DuplicateTerminal(String),
    #[error("duplicate rule `{0}`")]
    DuplicateRule(String),
    #[error("rule `{0}` has the same name as a token")]
    RuleShadowsTerminal(String),
    #[error("unknown token or rule `{0}`")]
    UnknownReference(String),
    #[error("missing `=` after rule name `{rule}`")]
    MissingEquals { rule: String },
    #[error("missing `;` at the end of rule `{0}`")]
    UnterminatedRule(String),
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken { expected: String, found: String },
    #[error("two negated transitions lead to distinct states")]
    NegatedConflict,
    #[error("ambiguous accept: `{first}` and `{second}` are not distinguishable")]
    AmbiguousAccept { first: String, second: String },
    #[error("token `{0}` accepts the empty string")]
    EmptyTokenPattern(String),
}

/// # Summary
///
/// The input text could not be turned into a token sequence. Carries the
/// position, as `(line, column)` (both zero-based), at which scanning
/// stopped. The token sequence ends at the first such error; no
/// resynchronization is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character `{symbol}` at line {line}, column {column}")]
    UnexpectedChar {
        line: usize,
        column: usize,
        symbol: char,
    },
    #[error("unexpected end of input at line {line}, column {column}")]
    UnexpectedEOF { line: usize, column: usize },
}

/// Misuse of the build-once/read-many lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("state graph already frozen")]
    Frozen,
}
