use crate::automaton::{Dfa, Nfa, NfaStateId, Repetition};
use crate::lexer::TerminalId;
use hashbrown::HashMap;
use newty::newty;
use std::rc::Rc;


newty! {
    #[derive(PartialOrd, Ord)]
    pub id RuleId
}

/// # Summary
///
/// A symbol of the rule-level alphabet. Where the character level steps
/// over `char`s, rule automata step over references:
///  - `Terminal`: a token defined in the lexing grammar;
///  - `Rule`: another rule of the same set (recursion included);
///  - `Literal`: an inline quoted string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleLabel {
    Terminal(TerminalId),
    Rule(RuleId),
    Literal(Rc<str>),
}

/// One element of a rule body, in source order. Kept next to the
/// compiled automaton so tooling can render a rule back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Reference(Rc<str>),
    Literal(Rc<str>),
    GroupOpen,
    GroupClose(Option<Repetition>),
    Alternation,
}

/// # Summary
///
/// A single compiled rule: its name, its body in source order, and its
/// recognizer in both nondeterministic and deterministic form. The
/// deterministic form is what a driver steps; the nondeterministic one
/// is kept for composition.
#[derive(Debug)]
pub struct Rule {
    name: Rc<str>,
    elements: Vec<Element>,
    nfa: Nfa<RuleLabel, RuleId>,
    nfa_root: NfaStateId,
    dfa: Dfa<RuleLabel, RuleId>,
}

impl Rule {
    pub(crate) fn new(
        name: Rc<str>,
        elements: Vec<Element>,
        nfa: Nfa<RuleLabel, RuleId>,
        nfa_root: NfaStateId,
        dfa: Dfa<RuleLabel, RuleId>,
    ) -> Self {
        Self {
            name,
            elements,
            nfa,
            nfa_root,
            dfa,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn nfa(&self) -> &Nfa<RuleLabel, RuleId> {
        &self.nfa
    }

    pub fn nfa_root(&self) -> NfaStateId {
        self.nfa_root
    }

    pub fn dfa(&self) -> &Dfa<RuleLabel, RuleId> {
        &self.dfa
    }
}

/// # Summary
///
/// Every rule of a grammar, addressable by [`RuleId`] or by name. Ids
/// follow definition order, which is also the order references were
/// resolved in.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
    name_map: HashMap<Rc<str>, RuleId>,
}

impl RuleSet {
    pub(crate) fn new(rules: Vec<Rule>, name_map: HashMap<Rc<str>, RuleId>) -> Self {
        Self { rules, name_map }
    }

    pub fn get(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub fn id(&self, name: &str) -> Option<RuleId> {
        self.name_map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}
