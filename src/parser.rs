//! # Parser
//!
//! Rule-level automata. Grammar rules are written in a small DSL, lexed
//! with a fixed meta grammar, and compiled into one automaton per rule.
//! Rule automata run over an alphabet of references instead of
//! characters: token references, rule references and inline literals.
//! The same state-graph machinery as the character level is reused
//! unchanged, only instantiated at a different symbol type.

mod grammar;
mod grammarparser;

pub use grammar::{Element, Rule, RuleId, RuleLabel, RuleSet};
pub use grammarparser::{meta_grammar, RuleSetBuilder};
