use crate::automaton::{determinize, Dfa, Label, Nfa};
use crate::error::{ConstructionError, Result};
use crate::regex;
use hashbrown::HashMap;
use newty::newty;
use std::rc::Rc;


newty! {
    pub id TerminalId
}

newty! {
    pub set Ignores[TerminalId]
}

/// # Summary
///
/// The compiled catalogue of token definitions: one deterministic
/// automaton recognizing every token, each accept state carrying the
/// [`TerminalId`] of the definition it belongs to. Ids are assigned in
/// definition order.
#[derive(Debug)]
pub struct Grammar {
    dfa: Dfa<char, TerminalId>,
    names: Vec<Rc<str>>,
    ignores: Ignores,
    name_map: HashMap<Rc<str>, TerminalId>,
}

impl Grammar {
    pub fn name(&self, id: TerminalId) -> &str {
        &self.names[id.0]
    }

    /// The shared name of a terminal, for cheap handing out to tokens.
    pub(crate) fn shared_name(&self, id: TerminalId) -> Rc<str> {
        self.names[id.0].clone()
    }

    pub fn ignored(&self, id: TerminalId) -> bool {
        self.ignores.contains(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<TerminalId> {
        self.name_map.get(name).copied()
    }

    pub fn dfa(&self) -> &Dfa<char, TerminalId> {
        &self.dfa
    }
}

/// # Summary
///
/// Builder for [`Grammar`]. Token definitions are accumulated with
/// [`with_terminal`](Self::with_terminal) and
/// [`with_ignored`](Self::with_ignored), then compiled at once by
/// [`build`](Self::build). Two definitions accepting a common string are
/// rejected at build time rather than silently prioritized.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    terminals: Vec<(Rc<str>, String, bool)>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token definition.
    pub fn with_terminal(mut self, name: impl Into<Rc<str>>, pattern: impl Into<String>) -> Self {
        self.terminals.push((name.into(), pattern.into(), false));
        self
    }

    /// Add a token definition whose matches are dropped from the token
    /// stream (whitespace, comments).
    pub fn with_ignored(mut self, name: impl Into<Rc<str>>, pattern: impl Into<String>) -> Self {
        self.terminals.push((name.into(), pattern.into(), true));
        self
    }

    /// Compile every definition into a single automaton.
    pub fn build(self) -> Result<Grammar> {
        let mut names = Vec::with_capacity(self.terminals.len());
        let mut name_map = HashMap::with_capacity(self.terminals.len());
        let mut ignores = Ignores::with_raw_capacity(self.terminals.len());
        let mut nfa = Nfa::new();
        let root = nfa.state();
        for (name, pattern, ignored) in self.terminals {
            let id = TerminalId(names.len());
            if name_map.insert(name.clone(), id).is_some() {
                return Err(ConstructionError::DuplicateTerminal(name.to_string()).into());
            }
            names.push(name);
            if ignored {
                ignores.put(id);
            }
            let sub_root = regex::compile(&mut nfa, &pattern, id)?;
            nfa.arc(root, Label::Epsilon, sub_root);
        }
        let dfa = determinize(&nfa, root)?;
        if let Some(&id) = dfa.payload(dfa.start()) {
            return Err(
                ConstructionError::EmptyTokenPattern(names[id.0].to_string()).into(),
            );
        }
        Ok(Grammar {
            dfa,
            names,
            ignores,
            name_map,
        })
    }
}
