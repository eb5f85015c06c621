//! # Regex
//!
//! The token-pattern compiler: a single left-to-right scan that builds a
//! nondeterministic state graph directly, with no intermediate syntax
//! tree. The dialect is deliberately small:
//!  - literals and concatenation;
//!  - groups `( ... )`, alternation `|` inside a group only;
//!  - character classes `[...]` and `[^...]`, with `a-z` ranges;
//!  - `?`, `+`, `*` suffixes directly after a `)` or `]` (a bare suffix
//!    character anywhere else is a literal: a repeated single symbol is
//!    written `(a)*`);
//!  - backslash escapes for the metacharacters `\ ? + * ( ) [ |`.

use crate::automaton::{GraphBuilder, Label, Nfa, NfaStateId, Repetition};
use crate::error::ConstructionError;
use hashbrown::HashSet;
use std::fmt::Debug;


/// Metacharacters that may be escaped outside a character class.
const ESCAPABLE: &str = "\\?+*()[|";
/// Characters that may be escaped inside a character class.
const CLASS_ESCAPABLE: &str = "\\?+*()[]|-^";

/// # Summary
///
/// Compile a pattern into `nfa`, as a fresh sub-graph whose accept state
/// carries `payload`. Return the sub-graph's root so the caller can wire
/// it (e.g. under a catalogue's synthetic epsilon root).
pub fn compile<P: Clone + Eq + Debug>(
    nfa: &mut Nfa<char, P>,
    pattern: &str,
    payload: P,
) -> std::result::Result<NfaStateId, ConstructionError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut builder = GraphBuilder::new(nfa);
    let mut index = 0;
    while index < chars.len() {
        match chars[index] {
            '(' => builder.open_group(),
            ')' => {
                let repetition = suffix(&chars, index + 1);
                if repetition.is_some() {
                    index += 1;
                }
                builder.close_group(repetition)?;
            }
            '|' => builder.alternate()?,
            '[' => {
                let (members, negated, close) = read_class(&chars, index + 1)?;
                index = close;
                let repetition = suffix(&chars, index + 1);
                if repetition.is_some() {
                    index += 1;
                }
                builder.class(members, negated, repetition);
            }
            ']' => return Err(ConstructionError::UnmatchedClassClose),
            '\\' => {
                index += 1;
                let &chr = chars
                    .get(index)
                    .ok_or(ConstructionError::TrailingEscape)?;
                if !ESCAPABLE.contains(chr) {
                    return Err(ConstructionError::InvalidEscape(chr));
                }
                builder.symbol(Label::Symbol(chr));
            }
            chr => builder.symbol(Label::Symbol(chr)),
        }
        index += 1;
    }
    builder.finish(payload)
}

/// Scan a character class from just after its `[`. Returns the member
/// set, the negation flag, and the index of the closing `]`.
fn read_class(
    chars: &[char],
    start: usize,
) -> std::result::Result<(HashSet<char>, bool, usize), ConstructionError> {
    let mut index = start;
    let negated = chars.get(index) == Some(&'^');
    if negated {
        index += 1;
    }
    let mut members = HashSet::new();
    loop {
        match chars.get(index) {
            None => return Err(ConstructionError::UnmatchedClassOpen),
            Some(']') => return Ok((members, negated, index)),
            Some('\\') => {
                index += 1;
                let &chr = chars
                    .get(index)
                    .ok_or(ConstructionError::TrailingEscape)?;
                if !CLASS_ESCAPABLE.contains(chr) {
                    return Err(ConstructionError::InvalidEscape(chr));
                }
                members.insert(chr);
                index += 1;
            }
            Some(&from) => {
                // `x-y` is a range when `-` sits between two plain
                // members; a leading or trailing `-` is a literal.
                if chars.get(index + 1) == Some(&'-')
                    && matches!(chars.get(index + 2), Some(&to) if to != ']' && to != '\\')
                {
                    let to = chars[index + 2];
                    if from > to {
                        return Err(ConstructionError::InvalidRange { from, to });
                    }
                    members.extend(from..=to);
                    index += 3;
                } else {
                    members.insert(from);
                    index += 1;
                }
            }
        }
    }
}

fn suffix(chars: &[char], index: usize) -> Option<Repetition> {
    match chars.get(index) {
        Some('?') => Some(Repetition::Optional),
        Some('+') => Some(Repetition::OneOrMore),
        Some('*') => Some(Repetition::ZeroOrMore),
        _ => None,
    }
}
