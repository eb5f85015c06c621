use hashbrown::HashSet;
use newty::newty;
use std::fmt::Debug;
use std::hash::Hash;

#[cfg(test)]
mod tests {
    use super::*;

    fn set(chars: &str) -> HashSet<char> {
        chars.chars().collect()
    }

    #[test]
    fn arena() {
        let mut negations = Negations::new();
        let a = negations.insert(set("abc"));
        let b = negations.insert(set("abc"));
        // Distinct entries, identical content.
        assert_ne!(a, b);
        assert!(negations.same(a, b));
        assert!(negations.excludes(a, &'a'));
        assert!(!negations.excludes(a, &'d'));
    }

    #[test]
    fn join_intersects() {
        let mut negations = Negations::new();
        let a = negations.insert(set("abc"));
        let b = negations.insert(set("bcd"));
        let joined = negations.join(a, b);
        assert_eq!(negations.excluded(joined), &set("bc"));
        // The operands are left untouched.
        assert_eq!(negations.excluded(a), &set("abc"));
    }

    #[test]
    fn label_identity() {
        let mut negations: Negations<char> = Negations::new();
        let a = negations.insert(set("x"));
        let b = negations.insert(set("x"));
        assert_eq!(Label::<char>::Negated(a), Label::Negated(a));
        assert_ne!(Label::<char>::Negated(a), Label::Negated(b));
    }
}

newty! {
    /// Index of a negated symbol set in a [`Negations`] arena.
    pub id NegatedId
}

/// # Summary
///
/// A transition label: a literal symbol, epsilon (no consumption), or a
/// negated symbol set ("anything except...").
///
/// `Symbol` compares structurally. `Negated` compares by arena index, so
/// two negated sets built from distinct parts of a pattern stay distinct
/// until they are explicitly merged during determinization; content
/// comparison goes through [`Negations::same`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label<T> {
    /// A literal symbol, consumed on transition.
    Symbol(T),
    /// No consumption.
    Epsilon,
    /// Anything except the symbols of the referenced excluded set.
    Negated(NegatedId),
}

/// # Summary
///
/// The arena holding every negated symbol set of an automaton, referenced
/// by [`NegatedId`]. Entries are immutable once inserted; `join` creates
/// a fresh entry rather than mutating its operands.
///
/// # Methods
///
/// `insert`: store an excluded set, return its id.
/// `excluded`: the excluded set behind an id.
/// `excludes`: whether a symbol is excluded by an entry.
/// `same`: content equality of two entries.
/// `join`: intersect two excluded sets into a fresh entry.
#[derive(Debug, Clone)]
pub struct Negations<T>(Vec<HashSet<T>>);

impl<T: Clone + Eq + Hash + Debug> Negations<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, excluded: HashSet<T>) -> NegatedId {
        self.0.push(excluded);
        NegatedId(self.0.len() - 1)
    }

    pub fn excluded(&self, id: NegatedId) -> &HashSet<T> {
        &self.0[id.0]
    }

    pub fn excludes(&self, id: NegatedId, symbol: &T) -> bool {
        self.0[id.0].contains(symbol)
    }

    pub fn same(&self, left: NegatedId, right: NegatedId) -> bool {
        left == right || self.0[left.0] == self.0[right.0]
    }

    /// Merge two negated sets that reach the same target: the merged
    /// transition accepts a symbol iff either operand did, so the
    /// excluded sets are intersected.
    pub fn join(&mut self, left: NegatedId, right: NegatedId) -> NegatedId {
        let joined = self.0[left.0]
            .intersection(&self.0[right.0])
            .cloned()
            .collect();
        self.insert(joined)
    }
}

impl<T: Clone + Eq + Hash + Debug> Default for Negations<T> {
    fn default() -> Self {
        Self::new()
    }
}
