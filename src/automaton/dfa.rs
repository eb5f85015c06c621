use super::label::{Label, NegatedId, Negations};
use super::nfa::{Nfa, NfaStateId};
use crate::error::{ConstructionError, Result, UsageError};
use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use itertools::Itertools;
use newty::newty;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;


newty! {
    /// Id of a DFA state; an index into the state list of its [`Dfa`].
    pub id DfaStateId
}

/// # Summary
///
/// A deterministic state: at most one transition per explicit symbol,
/// plus at most one negated transition with its fallback target,
/// consulted when no explicit transition matches and the symbol is not
/// in the excluded set.
#[derive(Debug)]
pub struct DfaState<T, P> {
    transitions: HashMap<T, DfaStateId>,
    negated: Option<(NegatedId, DfaStateId)>,
    is_final: bool,
    payload: Option<P>,
}

/// # Summary
///
/// A frozen deterministic automaton, produced by [`determinize`]. It is
/// immutable (and thus safe to scan from several places at once), and
/// already minimized.
///
/// # Methods
///
/// `start`: the start state.
/// `step`: follow one symbol from a state, explicit transitions first,
///       negated fallback second.
/// `matches`: run a whole symbol sequence from the start state and
///          return the accepted payload, if any.
#[derive(Debug)]
pub struct Dfa<T, P> {
    states: Vec<DfaState<T, P>>,
    start: DfaStateId,
    negations: Negations<T>,
}

impl<T: Clone + Eq + Hash + Debug, P: Clone + Eq + Debug> Dfa<T, P> {
    pub fn start(&self) -> DfaStateId {
        self.start
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn is_final(&self, id: DfaStateId) -> bool {
        self.states[id.0].is_final
    }

    pub fn payload(&self, id: DfaStateId) -> Option<&P> {
        self.states[id.0].payload.as_ref()
    }

    pub fn transitions(&self, id: DfaStateId) -> &HashMap<T, DfaStateId> {
        &self.states[id.0].transitions
    }

    pub fn negated(&self, id: DfaStateId) -> Option<(NegatedId, DfaStateId)> {
        self.states[id.0].negated
    }

    /// Follow one symbol from `from`. An explicit transition wins; the
    /// negated fallback is consulted only when no explicit transition
    /// matches and the symbol is not excluded.
    pub fn step(&self, from: DfaStateId, symbol: &T) -> Option<DfaStateId> {
        let state = &self.states[from.0];
        if let Some(&next) = state.transitions.get(symbol) {
            return Some(next);
        }
        if let Some((negated, next)) = state.negated {
            if !self.negations.excludes(negated, symbol) {
                return Some(next);
            }
        }
        None
    }

    /// Feed a whole symbol sequence from the start state; return the
    /// payload of the state reached at end of input, if it is final.
    pub fn matches<I>(&self, input: I) -> Option<&P>
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.start;
        for symbol in input {
            state = self.step(state, &symbol)?;
        }
        self.payload(state)
    }

    /// Collapse states with identical observable behaviour: same
    /// finality, same payload, same transition map by target, same
    /// negated target with content-equal excluded set. Pairwise scan
    /// until fixpoint; O(n^2) per pass, fine at this scale.
    pub(crate) fn minimize(&mut self) {
        let size = self.states.len();
        let mut dead = FixedBitSet::with_capacity(size);
        let mut run = true;
        while run {
            run = false;
            'scan: for left in 0..size {
                if dead.contains(left) {
                    continue;
                }
                for right in (left + 1)..size {
                    if dead.contains(right) {
                        continue;
                    }
                    if self.out_equals(left, right) {
                        dead.insert(right);
                        self.redirect(DfaStateId(right), DfaStateId(left));
                        run = true;
                        break 'scan;
                    }
                }
            }
        }
        self.compact(&dead);
    }

    fn out_equals(&self, left: usize, right: usize) -> bool {
        let (a, b) = (&self.states[left], &self.states[right]);
        if a.is_final != b.is_final || a.payload != b.payload {
            return false;
        }
        if a.transitions.len() != b.transitions.len() {
            return false;
        }
        for (label, target) in &a.transitions {
            if b.transitions.get(label) != Some(target) {
                return false;
            }
        }
        match (a.negated, b.negated) {
            (None, None) => true,
            (Some((na, ta)), Some((nb, tb))) => {
                ta == tb && self.negations.same(na, nb)
            }
            _ => false,
        }
    }

    fn redirect(&mut self, from: DfaStateId, to: DfaStateId) {
        for state in &mut self.states {
            for target in state.transitions.values_mut() {
                if *target == from {
                    *target = to;
                }
            }
            if let Some((_, target)) = &mut state.negated {
                if *target == from {
                    *target = to;
                }
            }
        }
        if self.start == from {
            self.start = to;
        }
    }

    fn compact(&mut self, dead: &FixedBitSet) {
        let mut remap = vec![DfaStateId(0); self.states.len()];
        let mut kept = 0;
        for index in 0..self.states.len() {
            if !dead.contains(index) {
                remap[index] = DfaStateId(kept);
                kept += 1;
            }
        }
        let mut states = Vec::with_capacity(kept);
        for (index, mut state) in std::mem::take(&mut self.states)
            .into_iter()
            .enumerate()
        {
            if dead.contains(index) {
                continue;
            }
            for target in state.transitions.values_mut() {
                *target = remap[target.0];
            }
            if let Some((_, target)) = &mut state.negated {
                *target = remap[target.0];
            }
            states.push(state);
        }
        self.states = states;
        self.start = remap[self.start.0];
    }
}

/// # Summary
///
/// A set of NFA states in the process of becoming one DFA state. Once
/// frozen, its member set is sealed: late additions are a [`UsageError`].
#[derive(Debug)]
struct Subset {
    ids: BTreeSet<NfaStateId>,
    frozen: bool,
}

impl Subset {
    fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
            frozen: false,
        }
    }

    fn add(&mut self, id: NfaStateId) -> Result<()> {
        if self.frozen {
            return Err(UsageError::Frozen.into());
        }
        self.ids.insert(id);
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn ids(&self) -> impl Iterator<Item = NfaStateId> + '_ {
        self.ids.iter().copied()
    }

    /// The canonical identity of the subset: its sorted member ids,
    /// joined. Two subsets with the same canonical string are the same
    /// DFA state.
    fn canonical(&self) -> String {
        self.ids.iter().map(|id| id.0.to_string()).join(".")
    }
}

/// Per-call memoization of epsilon closures, keyed by NFA state id.
struct Closures {
    memo: HashMap<NfaStateId, Rc<BTreeSet<NfaStateId>>>,
}

impl Closures {
    fn new() -> Self {
        Self {
            memo: HashMap::new(),
        }
    }

    /// The set of states reachable from `id` through epsilon transitions
    /// alone, `id` included. Iterative, with an explicit work stack:
    /// closure depth is unbounded and must not recurse.
    fn closure<T, P>(
        &mut self,
        nfa: &Nfa<T, P>,
        id: NfaStateId,
    ) -> Rc<BTreeSet<NfaStateId>>
    where
        T: Clone + Eq + Hash + Debug,
        P: Clone + Eq + Debug,
    {
        if let Some(closure) = self.memo.get(&id) {
            return closure.clone();
        }
        let mut reached = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(state) = stack.pop() {
            if !reached.insert(state) {
                continue;
            }
            if let Some(closure) = self.memo.get(&state) {
                // Already fully computed: absorb it, no need to expand.
                reached.extend(closure.iter().copied());
                continue;
            }
            if let Some(targets) = nfa.transitions(state).get(&Label::Epsilon) {
                stack.extend(targets.iter().copied());
            }
        }
        let closure = Rc::new(reached);
        self.memo.insert(id, closure.clone());
        closure
    }
}

/// # Summary
///
/// Convert an NFA, starting at `root`, into an equivalent minimized
/// [`Dfa`] by subset construction with epsilon-closure memoization.
///
/// Construction fails if two reachable accept states carry different
/// payloads within one closure set (`AmbiguousAccept`), or if two
/// negated transitions of one DFA state lead to distinct targets
/// (`NegatedConflict`); negated transitions reaching the *same* target
/// are joined by intersecting their excluded sets.
pub fn determinize<T, P>(nfa: &Nfa<T, P>, root: NfaStateId) -> Result<Dfa<T, P>>
where
    T: Clone + Eq + Hash + Debug,
    P: Clone + Eq + Debug,
{
    let mut dfa = subset_construction(nfa, root)?;
    dfa.minimize();
    Ok(dfa)
}

fn subset_construction<T, P>(
    nfa: &Nfa<T, P>,
    root: NfaStateId,
) -> Result<Dfa<T, P>>
where
    T: Clone + Eq + Hash + Debug,
    P: Clone + Eq + Debug,
{
    let mut negations = nfa.negations().clone();
    let mut closures = Closures::new();
    let mut states: Vec<DfaState<T, P>> = Vec::new();
    let mut canonical: HashMap<String, DfaStateId> = HashMap::new();
    let mut worklist: Vec<(DfaStateId, Subset)> = Vec::new();

    let mut start = Subset::new();
    for state in closures.closure(nfa, root).iter() {
        start.add(*state)?;
    }
    start.freeze();
    let start_id =
        intern(nfa, start, &mut states, &mut canonical, &mut worklist)?;

    while let Some((id, subset)) = worklist.pop() {
        // Union the outgoing transitions of every member, per label.
        // Explicit labels are unioned exactly; a symbol that merely
        // satisfies some negated set does not join that set's move.
        let mut moves: HashMap<T, Subset> = HashMap::new();
        let mut negated_moves: Vec<(NegatedId, Subset)> = Vec::new();
        for member in subset.ids() {
            for (label, targets) in nfa.transitions(member) {
                match label {
                    Label::Epsilon => {}
                    Label::Symbol(symbol) => {
                        let entry = moves
                            .entry(symbol.clone())
                            .or_insert_with(Subset::new);
                        for &target in targets {
                            for state in closures.closure(nfa, target).iter() {
                                entry.add(*state)?;
                            }
                        }
                    }
                    Label::Negated(negated) => {
                        let index = match negated_moves
                            .iter()
                            .position(|(existing, _)| existing == negated)
                        {
                            Some(index) => index,
                            None => {
                                negated_moves.push((*negated, Subset::new()));
                                negated_moves.len() - 1
                            }
                        };
                        let entry = &mut negated_moves[index].1;
                        for &target in targets {
                            for state in closures.closure(nfa, target).iter() {
                                entry.add(*state)?;
                            }
                        }
                    }
                }
            }
        }

        for (symbol, mut target) in moves {
            target.freeze();
            let target_id =
                intern(nfa, target, &mut states, &mut canonical, &mut worklist)?;
            states[id.0].transitions.insert(symbol, target_id);
        }

        // A DFA state may carry at most one negated transition. Negated
        // moves reaching the same target are joined (excluded sets
        // intersected); distinct targets cannot be reconciled.
        let mut resolved: Option<(NegatedId, DfaStateId)> = None;
        for (negated, mut target) in negated_moves {
            target.freeze();
            let target_id =
                intern(nfa, target, &mut states, &mut canonical, &mut worklist)?;
            resolved = match resolved {
                None => Some((negated, target_id)),
                Some((previous, previous_id)) if previous_id == target_id => {
                    Some((negations.join(previous, negated), target_id))
                }
                Some(_) => {
                    return Err(ConstructionError::NegatedConflict.into())
                }
            };
        }
        states[id.0].negated = resolved;
    }

    Ok(Dfa {
        states,
        start: start_id,
        negations,
    })
}

/// Get or create the DFA state for a subset, using its canonical id for
/// structural sharing; new states are queued on the worklist.
fn intern<T, P>(
    nfa: &Nfa<T, P>,
    subset: Subset,
    states: &mut Vec<DfaState<T, P>>,
    canonical: &mut HashMap<String, DfaStateId>,
    worklist: &mut Vec<(DfaStateId, Subset)>,
) -> Result<DfaStateId>
where
    T: Clone + Eq + Hash + Debug,
    P: Clone + Eq + Debug,
{
    let key = subset.canonical();
    if let Some(&id) = canonical.get(&key) {
        return Ok(id);
    }
    let id = DfaStateId(states.len());
    states.push(merged(nfa, &subset)?);
    canonical.insert(key, id);
    worklist.push((id, subset));
    Ok(id)
}

/// Merge the members of a subset into one deterministic state: final if
/// any member is final, adopting that member's payload. Two members
/// accepting under different payloads are not distinguishable at this
/// point, which is a construction error.
fn merged<T, P>(nfa: &Nfa<T, P>, subset: &Subset) -> Result<DfaState<T, P>>
where
    T: Clone + Eq + Hash + Debug,
    P: Clone + Eq + Debug,
{
    let mut is_final = false;
    let mut payload: Option<P> = None;
    for member in subset.ids() {
        if !nfa.is_final(member) {
            continue;
        }
        is_final = true;
        match (&payload, nfa.payload(member)) {
            (Some(existing), Some(found)) if existing != found => {
                return Err(ConstructionError::AmbiguousAccept {
                    first: format!("{:?}", existing),
                    second: format!("{:?}", found),
                }
                .into());
            }
            (None, found) => payload = found.cloned(),
            _ => {}
        }
    }
    Ok(DfaState {
        transitions: HashMap::new(),
        negated: None,
        is_final,
        payload,
    })
}
