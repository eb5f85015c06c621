use super::label::{Label, Negations};
use crate::error::ConstructionError;
use hashbrown::{HashMap, HashSet};
use newty::newty;
use std::fmt::Debug;
use std::hash::Hash;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sequence() {
        // abc
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.symbol(Label::Symbol('a'));
        builder.symbol(Label::Symbol('b'));
        builder.symbol(Label::Symbol('c'));
        let root = builder.finish(0).unwrap();

        let mut state = root;
        for chr in "abc".chars() {
            assert_eq!(nfa.transitions(state).len(), 1);
            let targets = &nfa.transitions(state)[&Label::Symbol(chr)];
            assert_eq!(targets.len(), 1);
            state = targets[0];
        }
        assert!(nfa.transitions(state).is_empty());
        assert!(nfa.is_final(state));
        assert_eq!(nfa.payload(state), Some(&0));
    }

    #[test]
    fn class_one_or_more() {
        // [abc]+
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.class(
            "abc".chars().collect(),
            false,
            Some(Repetition::OneOrMore),
        );
        let root = builder.finish(0).unwrap();

        assert_eq!(nfa.transitions(root).len(), 3);
        let end = nfa.transitions(root)[&Label::Symbol('a')][0];
        assert!(nfa.is_final(end));
        for chr in "abc".chars() {
            assert_eq!(nfa.transitions(root)[&Label::Symbol(chr)][0], end);
        }
        // The looping back-edge.
        assert_eq!(nfa.transitions(end)[&Label::Epsilon], vec![root]);
    }

    #[test]
    fn class_optional() {
        // [abc]?
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.class(
            "abc".chars().collect(),
            false,
            Some(Repetition::Optional),
        );
        let root = builder.finish(0).unwrap();

        assert_eq!(nfa.transitions(root).len(), 4);
        let end = nfa.transitions(root)[&Label::Symbol('a')][0];
        assert!(nfa.is_final(end));
        assert_eq!(nfa.transitions(root)[&Label::Epsilon], vec![end]);
    }

    #[test]
    fn alternation_merges_branches() {
        // (a|b|c)d
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.open_group();
        builder.symbol(Label::Symbol('a'));
        builder.alternate().unwrap();
        builder.symbol(Label::Symbol('b'));
        builder.alternate().unwrap();
        builder.symbol(Label::Symbol('c'));
        builder.close_group(None).unwrap();
        builder.symbol(Label::Symbol('d'));
        let root = builder.finish(0).unwrap();

        // Every branch must reach the same join state, from which `d`
        // leads to the accept state.
        let join = nfa.transitions(root)[&Label::Symbol('a')][0];
        let from_b = nfa.transitions(root)[&Label::Symbol('b')][0];
        let from_c = nfa.transitions(root)[&Label::Symbol('c')][0];
        assert_eq!(nfa.transitions(from_b)[&Label::Epsilon], vec![join]);
        assert_eq!(nfa.transitions(from_c)[&Label::Epsilon], vec![join]);
        let accept = nfa.transitions(join)[&Label::Symbol('d')][0];
        assert!(nfa.is_final(accept));
    }

    #[test]
    fn alternation_outside_group() {
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.symbol(Label::Symbol('a'));
        assert_eq!(
            builder.alternate(),
            Err(ConstructionError::AlternationOutsideGroup)
        );
    }

    #[test]
    fn empty_group() {
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.open_group();
        assert_eq!(builder.close_group(None), Err(ConstructionError::EmptyGroup));
    }

    #[test]
    fn empty_alternative() {
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.open_group();
        assert_eq!(
            builder.alternate(),
            Err(ConstructionError::EmptyAlternative)
        );

        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.open_group();
        builder.symbol(Label::Symbol('a'));
        builder.alternate().unwrap();
        assert_eq!(
            builder.close_group(None),
            Err(ConstructionError::EmptyAlternative)
        );
    }

    #[test]
    fn unmatched_groups() {
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        assert_eq!(
            builder.close_group(None),
            Err(ConstructionError::UnmatchedGroupClose)
        );

        let mut nfa: Nfa<char, usize> = Nfa::new();
        let mut builder = GraphBuilder::new(&mut nfa);
        builder.open_group();
        builder.symbol(Label::Symbol('a'));
        assert_eq!(builder.finish(0), Err(ConstructionError::UnmatchedGroupOpen));
    }

    #[test]
    fn ids_are_monotonic() {
        let mut nfa: Nfa<char, usize> = Nfa::new();
        let first = nfa.state();
        let second = nfa.state();
        assert_eq!(first, NfaStateId(0));
        assert_eq!(second, NfaStateId(1));
    }
}

newty! {
    /// Unique, monotonic id of an NFA state. Never reused: ids are the
    /// memoization key for epsilon closures and the canonical identity
    /// of DFA states.
    #[derive(PartialOrd, Ord)]
    pub id NfaStateId
}

/// A repetition suffix, applied to a (start, end) span of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// `?`: an epsilon transition start -> end makes the span optional.
    Optional,
    /// `+`: an epsilon back-edge end -> start loops the span.
    OneOrMore,
    /// `*`: both of the above.
    ZeroOrMore,
}

#[derive(Debug)]
struct NfaState<T, P> {
    transitions: HashMap<Label<T>, Vec<NfaStateId>>,
    is_final: bool,
    payload: Option<P>,
}

impl<T, P> NfaState<T, P> {
    fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            is_final: false,
            payload: None,
        }
    }
}

/// # Summary
///
/// A nondeterministic state graph: an arena of states connected by
/// [`Label`]led transitions, together with the [`Negations`] arena its
/// negated labels point into. Destination lists keep insertion order;
/// that ordering matters for alternation precedence in some paths, not
/// for correctness.
///
/// Built through a [`GraphBuilder`], then read by
/// [`determinize`](super::determinize); payloads live only on final
/// states.
#[derive(Debug)]
pub struct Nfa<T, P> {
    states: Vec<NfaState<T, P>>,
    negations: Negations<T>,
}

impl<T: Clone + Eq + Hash + Debug, P: Clone + Eq + Debug> Nfa<T, P> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            negations: Negations::new(),
        }
    }

    /// Allocate a fresh state.
    pub fn state(&mut self) -> NfaStateId {
        self.states.push(NfaState::new());
        NfaStateId(self.states.len() - 1)
    }

    /// Add a transition `from -- label --> to`.
    pub fn arc(&mut self, from: NfaStateId, label: Label<T>, to: NfaStateId) {
        self.states[from.0]
            .transitions
            .entry(label)
            .or_default()
            .push(to);
    }

    /// Register an excluded set and return the negated label for it.
    pub fn negated(&mut self, excluded: HashSet<T>) -> Label<T> {
        Label::Negated(self.negations.insert(excluded))
    }

    /// Mark a state final, carrying the given payload.
    pub fn set_final(&mut self, id: NfaStateId, payload: P) {
        let state = &mut self.states[id.0];
        state.is_final = true;
        state.payload = Some(payload);
    }

    pub fn transitions(
        &self,
        id: NfaStateId,
    ) -> &HashMap<Label<T>, Vec<NfaStateId>> {
        &self.states[id.0].transitions
    }

    pub fn is_final(&self, id: NfaStateId) -> bool {
        self.states[id.0].is_final
    }

    pub fn payload(&self, id: NfaStateId) -> Option<&P> {
        self.states[id.0].payload.as_ref()
    }

    pub fn negations(&self) -> &Negations<T> {
        &self.negations
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<T: Clone + Eq + Hash + Debug, P: Clone + Eq + Debug> Default for Nfa<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// # Summary
///
/// The single left-to-right construction shared by the token-regex
/// compiler and the rule compiler: a cursor walking through the graph,
/// with a stack of open groups, each recording its entry state and the
/// pending branch-join state of its alternation.
///
/// # Methods
///
/// `symbol`: extend the graph with one labelled transition.
/// `class`: emit a positive or negated symbol class, with its suffix.
/// `open_group`: start a `(` group.
/// `alternate`: handle `|`; only valid inside a group.
/// `close_group`: handle `)` and its repetition suffix.
/// `finish`: mark the accept state and return the root.
#[derive(Debug)]
pub struct GraphBuilder<'nfa, T, P> {
    nfa: &'nfa mut Nfa<T, P>,
    root: NfaStateId,
    current: NfaStateId,
    groups: Vec<(NfaStateId, Option<NfaStateId>)>,
}

impl<'nfa, T: Clone + Eq + Hash + Debug, P: Clone + Eq + Debug>
    GraphBuilder<'nfa, T, P>
{
    /// Start a new graph inside `nfa`, with a fresh root state.
    pub fn new(nfa: &'nfa mut Nfa<T, P>) -> Self {
        let root = nfa.state();
        Self {
            nfa,
            root,
            current: root,
            groups: Vec::new(),
        }
    }

    /// Extend the current state with one transition and advance to its
    /// destination.
    pub fn symbol(&mut self, label: Label<T>) {
        let next = self.nfa.state();
        self.nfa.arc(self.current, label, next);
        self.current = next;
    }

    /// Emit a symbol class: one transition per member for a positive
    /// class, a single negated transition otherwise, all reaching one
    /// fresh end state. The repetition suffix, if any, is anchored at
    /// (current, end).
    pub fn class(
        &mut self,
        members: HashSet<T>,
        negated: bool,
        repetition: Option<Repetition>,
    ) {
        let start = self.current;
        let end = self.nfa.state();
        if negated {
            let label = self.nfa.negated(members);
            self.nfa.arc(start, label, end);
        } else {
            for symbol in members {
                self.nfa.arc(start, Label::Symbol(symbol), end);
            }
        }
        if let Some(repetition) = repetition {
            self.repeat(start, end, repetition);
        }
        self.current = end;
    }

    /// Open a group: the entry is the current state; a fresh state is
    /// only introduced lazily by whatever the group contains.
    pub fn open_group(&mut self) {
        self.groups.push((self.current, None));
    }

    /// Handle `|`: merge the current branch into the group's pending
    /// join state (the first branch's exit becomes the join), then reset
    /// the cursor to the group entry so a sibling alternative can be
    /// built.
    pub fn alternate(&mut self) -> std::result::Result<(), ConstructionError> {
        let Some(&(entry, join)) = self.groups.last() else {
            return Err(ConstructionError::AlternationOutsideGroup);
        };
        if self.current == entry {
            return Err(ConstructionError::EmptyAlternative);
        }
        match join {
            Some(join) => self.nfa.arc(self.current, Label::Epsilon, join),
            None => {
                if let Some(group) = self.groups.last_mut() {
                    group.1 = Some(self.current);
                }
            }
        }
        self.current = entry;
        Ok(())
    }

    /// Close the innermost group, merging the last alternative into the
    /// join state if one exists, and apply the repetition suffix
    /// anchored at the group's (entry, exit) pair.
    pub fn close_group(
        &mut self,
        repetition: Option<Repetition>,
    ) -> std::result::Result<(), ConstructionError> {
        let Some((entry, join)) = self.groups.pop() else {
            return Err(ConstructionError::UnmatchedGroupClose);
        };
        let exit = match join {
            Some(join) => {
                if self.current == entry {
                    return Err(ConstructionError::EmptyAlternative);
                }
                if self.current != join {
                    self.nfa.arc(self.current, Label::Epsilon, join);
                }
                join
            }
            None => self.current,
        };
        if entry == exit {
            return Err(ConstructionError::EmptyGroup);
        }
        if let Some(repetition) = repetition {
            self.repeat(entry, exit, repetition);
        }
        self.current = exit;
        Ok(())
    }

    /// Mark the terminal state final with the caller's payload and hand
    /// the root back. Fails if a group is still open.
    pub fn finish(
        self,
        payload: P,
    ) -> std::result::Result<NfaStateId, ConstructionError> {
        if !self.groups.is_empty() {
            return Err(ConstructionError::UnmatchedGroupOpen);
        }
        self.nfa.set_final(self.current, payload);
        Ok(self.root)
    }

    fn repeat(&mut self, start: NfaStateId, end: NfaStateId, repetition: Repetition) {
        match repetition {
            Repetition::Optional => {
                self.nfa.arc(start, Label::Epsilon, end);
            }
            Repetition::OneOrMore => {
                self.nfa.arc(end, Label::Epsilon, start);
            }
            Repetition::ZeroOrMore => {
                self.nfa.arc(start, Label::Epsilon, end);
                self.nfa.arc(end, Label::Epsilon, start);
            }
        }
    }
}
