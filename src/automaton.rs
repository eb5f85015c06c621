//! # Automaton
//!
//! The state-graph engine shared by the token compiler and the rule
//! compiler. It is generic over the transition alphabet, so the same
//! machinery runs over characters (token regexes) and over token/rule
//! references (grammar rules). The pieces are:
//!  - [`Label`] and [`Negations`], the alphabet over which automata
//!    transition, including negated symbol sets;
//!  - [`Nfa`] and [`GraphBuilder`], the nondeterministic graph and the
//!    group-stack construction that builds it directly from a pattern,
//!    without an intermediate syntax tree;
//!  - [`determinize`] and [`Dfa`], the subset construction with
//!    epsilon-closure memoization, and the frozen deterministic result.
//!
//! Everything here follows a build-once/read-many model: graphs are
//! mutated only while a builder holds them, and a [`Dfa`] is immutable
//! from the moment it is returned.

mod dfa;
mod label;
mod nfa;

pub use dfa::{determinize, Dfa, DfaStateId};
pub use label::{Label, NegatedId, Negations};
pub use nfa::{GraphBuilder, Nfa, NfaStateId, Repetition};
