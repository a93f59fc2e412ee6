//! Finite automata over named states and alphabet symbols.
//!
//! This module provides:
//! - The [`Automaton`] model (possibly nondeterministic, no epsilon moves)
//! - Membership testing by active-set simulation
//! - Subset construction (NFA to DFA conversion)
//! - Hopcroft's DFA minimization algorithm
//! - Language equivalence and emptiness checks

mod minimize;
mod subset_construction;

use crate::error::{FormLangError, Result};
use crate::state::{StateId, StateSet};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};

pub use subset_construction::subset_construction;

/// An alphabet symbol identifier: the symbol's index in the alphabet.
pub type SymbolIndex = u32;

/// A finite automaton whose states and symbols are identified by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    /// State names; the index of a name is its [`StateId`]
    states: IndexSet<String>,
    /// Alphabet symbols; the index of a symbol is its [`SymbolIndex`]
    alphabet: IndexSet<String>,
    /// Transitions: (source, symbol) -> set of destination states
    transitions: IndexMap<(StateId, SymbolIndex), StateSet>,
    start: StateId,
    accept: StateSet,
}

/// A labeled edge in the graph representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub destination: String,
    pub label: String,
}

/// Read-only view of an automaton for drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonGraph {
    pub states: Vec<String>,
    pub start: String,
    pub accept: Vec<String>,
    pub edges: Vec<GraphEdge>,
}

impl Automaton {
    pub(crate) fn from_parts(
        states: IndexSet<String>,
        alphabet: IndexSet<String>,
        transitions: IndexMap<(StateId, SymbolIndex), StateSet>,
        start: StateId,
        accept: StateSet,
    ) -> Self {
        Self {
            states,
            alphabet,
            transitions,
            start,
            accept,
        }
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// State names, in [`StateId`] order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(String::as_str)
    }

    /// Alphabet symbols, in [`SymbolIndex`] order.
    pub fn alphabet(&self) -> impl Iterator<Item = &str> + '_ {
        self.alphabet.iter().map(String::as_str)
    }

    /// Id of the state called `name`.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.get_index_of(name).map(|i| i as StateId)
    }

    /// Index of the alphabet symbol `name`.
    pub fn symbol_index(&self, name: &str) -> Option<SymbolIndex> {
        self.alphabet.get_index_of(name).map(|i| i as SymbolIndex)
    }

    /// Name of a state. Panics on an id from another automaton.
    pub fn state_name(&self, state: StateId) -> &str {
        &self.states[state as usize]
    }

    /// Name of an alphabet symbol.
    pub fn symbol_name(&self, symbol: SymbolIndex) -> &str {
        &self.alphabet[symbol as usize]
    }

    /// Get the start state.
    pub fn start_state(&self) -> StateId {
        self.start
    }

    /// Name of the start state.
    pub fn start_name(&self) -> &str {
        self.state_name(self.start)
    }

    /// Get the set of accepting states.
    pub fn accept_states(&self) -> &StateSet {
        &self.accept
    }

    /// Check if the state called `name` is accepting.
    pub fn is_accepting(&self, name: &str) -> bool {
        self.state_id(name).is_some_and(|s| self.accept.contains(s))
    }

    /// Destinations of `source` on `symbol`, by name.
    pub fn targets(&self, source: &str, symbol: &str) -> Vec<&str> {
        let (Some(src), Some(sym)) = (self.state_id(source), self.symbol_index(symbol)) else {
            return Vec::new();
        };
        self.transitions
            .get(&(src, sym))
            .map(|dests| dests.iter().map(|d| self.state_name(d)).collect())
            .unwrap_or_default()
    }

    /// All transitions as `(source, symbol, destination)` ids.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolIndex, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(src, sym), dests)| dests.iter().map(move |dst| (src, sym, dst)))
    }

    /// Destinations of a single state on a symbol.
    pub(crate) fn successors(&self, state: StateId, symbol: SymbolIndex) -> Option<&StateSet> {
        self.transitions.get(&(state, symbol))
    }

    /// True iff every state×symbol pair has at most one destination.
    pub fn is_deterministic(&self) -> bool {
        self.transitions.values().all(|dests| dests.len() <= 1)
    }

    /// States reached from any state of `states` on `symbol`.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolIndex) -> StateSet {
        let mut reached = StateSet::with_capacity(self.num_states());
        for state in states.iter() {
            if let Some(destinations) = self.successors(state, symbol) {
                reached.union_with(destinations);
            }
        }
        reached
    }

    /// Run the automaton over a sequence of symbol names, tracking every
    /// active state at once. Works for nondeterministic automata as is.
    pub fn accepts<I, S>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = StateSet::singleton(self.start, self.num_states());

        for symbol in input {
            let Some(symbol) = self.symbol_index(symbol.as_ref()) else {
                return false;
            };
            let next = self.move_on_symbol(&current, symbol);
            if next.is_empty() {
                return false;
            }
            current = next;
        }

        current.intersects(&self.accept)
    }

    /// [`Automaton::accepts`] with one symbol per character of `input`.
    pub fn string_belongs_to_language(&self, input: &str) -> bool {
        self.accepts(input.chars().map(String::from))
    }

    /// The equivalent deterministic automaton. An automaton that is already
    /// deterministic is returned as is.
    pub fn to_deterministic(&self) -> Result<Cow<'_, Automaton>> {
        if self.is_deterministic() {
            return Ok(Cow::Borrowed(self));
        }
        subset_construction(self).map(Cow::Owned)
    }

    /// Check if the automaton accepts no string at all.
    pub fn is_empty(&self) -> bool {
        self.reachable_states().intersection(&self.accept).is_empty()
    }

    /// All states reachable from the start state.
    pub(crate) fn reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.num_states());
        let mut queue = VecDeque::from([self.start]);

        while let Some(state) = queue.pop_front() {
            if !reachable.insert(state) {
                continue;
            }
            for symbol in 0..self.alphabet.len() as SymbolIndex {
                if let Some(destinations) = self.successors(state, symbol) {
                    queue.extend(destinations.iter().filter(|&d| !reachable.contains(d)));
                }
            }
        }

        reachable
    }

    /// Whether both automata accept exactly the same strings.
    ///
    /// Both sides are determinized, then the product is explored pairwise,
    /// with `None` standing for the implicit dead state.
    pub fn equivalent(&self, other: &Automaton) -> Result<bool> {
        let left_dfa = self.to_deterministic()?;
        let right_dfa = other.to_deterministic()?;
        let left: &Automaton = &left_dfa;
        let right: &Automaton = &right_dfa;

        let symbols: IndexSet<&str> = left.alphabet().chain(right.alphabet()).collect();
        let step = |a: &Automaton, state: Option<StateId>, symbol: &str| -> Option<StateId> {
            let sym = a.symbol_index(symbol)?;
            a.successors(state?, sym)?.iter().next()
        };
        let accepting =
            |a: &Automaton, state: Option<StateId>| state.is_some_and(|s| a.accept.contains(s));

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(Some(left.start), Some(right.start))]);

        while let Some(pair @ (l, r)) = queue.pop_front() {
            if !seen.insert(pair) {
                continue;
            }
            if accepting(left, l) != accepting(right, r) {
                return Ok(false);
            }
            for &symbol in &symbols {
                let next = (step(left, l, symbol), step(right, r, symbol));
                if next != (None, None) && !seen.contains(&next) {
                    queue.push_back(next);
                }
            }
        }

        Ok(true)
    }

    /// Graph view for renderers: every state, the start, accepting states
    /// and one labeled edge per transition.
    pub fn to_graph(&self) -> AutomatonGraph {
        AutomatonGraph {
            states: self.states.iter().cloned().collect(),
            start: self.start_name().to_string(),
            accept: self
                .accept
                .iter()
                .map(|s| self.state_name(s).to_string())
                .collect(),
            edges: self
                .transitions()
                .map(|(src, sym, dst)| GraphEdge {
                    source: self.state_name(src).to_string(),
                    destination: self.state_name(dst).to_string(),
                    label: self.symbol_name(sym).to_string(),
                })
                .collect(),
        }
    }
}

/// Incremental construction of an [`Automaton`].
///
/// States and alphabet symbols are inferred from the transitions unless
/// declared; once declared, any other name is rejected.
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    states: Option<Vec<String>>,
    alphabet: Option<Vec<String>>,
    transitions: Vec<(String, String, String)>,
    start: Option<String>,
    accept: Vec<String>,
}

impl AutomatonBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the state set; undeclared states are then rejected.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the alphabet; undeclared symbols are then rejected.
    pub fn alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alphabet = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Add a transition `source --symbol--> destination`.
    pub fn transition(
        mut self,
        source: impl Into<String>,
        symbol: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.transitions
            .push((source.into(), symbol.into(), destination.into()));
        self
    }

    /// Add one transition per destination.
    pub fn transitions<I, S>(
        mut self,
        source: impl Into<String>,
        symbol: impl Into<String>,
        destinations: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = source.into();
        let symbol = symbol.into();
        for destination in destinations {
            self.transitions
                .push((source.clone(), symbol.clone(), destination.into()));
        }
        self
    }

    /// Set the start state.
    pub fn start(mut self, state: impl Into<String>) -> Self {
        self.start = Some(state.into());
        self
    }

    /// Mark states as accepting.
    pub fn accept<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept.extend(states.into_iter().map(Into::into));
        self
    }

    /// Resolve names and build the automaton.
    pub fn build(self) -> Result<Automaton> {
        let declared_states = self.states.is_some();
        let declared_alphabet = self.alphabet.is_some();
        let mut states: IndexSet<String> = self.states.unwrap_or_default().into_iter().collect();
        let mut alphabet: IndexSet<String> =
            self.alphabet.unwrap_or_default().into_iter().collect();

        let Some(start_name) = self.start else {
            return Err(FormLangError::MissingStartState);
        };

        let mut state = |name: &str| -> Result<StateId> {
            if let Some(index) = states.get_index_of(name) {
                Ok(index as StateId)
            } else if declared_states {
                Err(FormLangError::SymbolNotDeclared(name.to_string()))
            } else {
                Ok(states.insert_full(name.to_string()).0 as StateId)
            }
        };

        let start = state(&start_name)?;
        let mut accept = StateSet::default();
        for name in &self.accept {
            accept.insert(state(name)?);
        }

        let mut resolved = Vec::with_capacity(self.transitions.len());
        for (source, symbol, destination) in &self.transitions {
            resolved.push((state(source)?, symbol, state(destination)?));
        }

        let mut transitions: IndexMap<(StateId, SymbolIndex), StateSet> = IndexMap::new();
        for (source, symbol, destination) in resolved {
            let symbol = match alphabet.get_index_of(symbol.as_str()) {
                Some(index) => index as SymbolIndex,
                None if declared_alphabet => {
                    return Err(FormLangError::SymbolNotDeclared(symbol.clone()));
                }
                None => alphabet.insert_full(symbol.clone()).0 as SymbolIndex,
            };
            transitions
                .entry((source, symbol))
                .or_default()
                .insert(destination);
        }

        Ok(Automaton::from_parts(states, alphabet, transitions, start, accept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab_automaton() -> Automaton {
        AutomatonBuilder::new()
            .states(["q0", "q1", "q2", "q3"])
            .alphabet(["a", "b", "c"])
            .transitions("q0", "a", ["q0", "q1"])
            .transition("q1", "c", "q1")
            .transition("q1", "b", "q2")
            .transition("q2", "b", "q3")
            .transition("q3", "a", "q1")
            .start("q0")
            .accept(["q2"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_membership_nondeterministic() {
        let nfa = lab_automaton();
        assert!(!nfa.is_deterministic());
        assert!(nfa.string_belongs_to_language("ab"));
        assert!(nfa.string_belongs_to_language("acb"));
        assert!(nfa.string_belongs_to_language("aaccb"));
        assert!(nfa.string_belongs_to_language("abbab"));
        assert!(!nfa.string_belongs_to_language("a"));
        assert!(!nfa.string_belongs_to_language(""));
        assert!(!nfa.string_belongs_to_language("abb"));
    }

    #[test]
    fn test_membership_rejects_foreign_symbols() {
        let nfa = lab_automaton();
        assert!(!nfa.string_belongs_to_language("adb"));
        assert!(!nfa.string_belongs_to_language("ab!"));
        assert!(!nfa.accepts(["a", "bb"]));
        assert!(nfa.accepts(["a", "b"]));
    }

    #[test]
    fn test_builder_rejects_undeclared() {
        let result = AutomatonBuilder::new()
            .states(["q0"])
            .transition("q0", "a", "q9")
            .start("q0")
            .build();
        assert_eq!(result, Err(FormLangError::SymbolNotDeclared("q9".into())));

        let result = AutomatonBuilder::new()
            .alphabet(["a"])
            .transition("q0", "b", "q0")
            .start("q0")
            .build();
        assert_eq!(result, Err(FormLangError::SymbolNotDeclared("b".into())));

        let result = AutomatonBuilder::new().states(["q0"]).start("q1").build();
        assert_eq!(result, Err(FormLangError::SymbolNotDeclared("q1".into())));

        assert_eq!(
            AutomatonBuilder::new().transition("q0", "a", "q0").build(),
            Err(FormLangError::MissingStartState)
        );
    }

    #[test]
    fn test_builder_infers_sets() {
        let dfa = AutomatonBuilder::new()
            .transition("even", "1", "odd")
            .transition("odd", "1", "even")
            .transition("even", "0", "even")
            .transition("odd", "0", "odd")
            .start("even")
            .accept(["even"])
            .build()
            .unwrap();

        assert_eq!(dfa.num_states(), 2);
        assert_eq!(dfa.alphabet().collect::<Vec<_>>(), vec!["1", "0"]);
        assert!(dfa.is_deterministic());
        assert!(dfa.string_belongs_to_language(""));
        assert!(dfa.string_belongs_to_language("1010"));
        assert!(!dfa.string_belongs_to_language("100"));
    }

    #[test]
    fn test_deterministic_is_returned_unchanged() {
        let dfa = AutomatonBuilder::new()
            .transition("s", "x", "t")
            .start("s")
            .accept(["t"])
            .build()
            .unwrap();
        let same = dfa.to_deterministic().unwrap();
        assert!(matches!(same, Cow::Borrowed(_)));
        assert_eq!(*same, dfa);
    }

    #[test]
    fn test_is_empty() {
        let mut builder = AutomatonBuilder::new()
            .states(["q0", "q1", "q2"])
            .transition("q0", "a", "q0")
            .transition("q2", "a", "q1")
            .start("q0")
            .accept(["q1"]);
        assert!(builder.clone().build().unwrap().is_empty());

        builder = builder.transition("q0", "b", "q2");
        assert!(!builder.build().unwrap().is_empty());
    }

    #[test]
    fn test_equivalent() {
        let nfa = lab_automaton();
        let dfa = nfa.to_deterministic().unwrap().into_owned();
        assert!(nfa.equivalent(&dfa).unwrap());

        let other = AutomatonBuilder::new()
            .transition("p", "a", "r")
            .transition("r", "b", "f")
            .start("p")
            .accept(["f"])
            .build()
            .unwrap();
        assert!(!nfa.equivalent(&other).unwrap());
    }

    #[test]
    fn test_graph_view() {
        let graph = lab_automaton().to_graph();
        assert_eq!(graph.states, vec!["q0", "q1", "q2", "q3"]);
        assert_eq!(graph.start, "q0");
        assert_eq!(graph.accept, vec!["q2"]);
        assert_eq!(graph.edges.len(), 6);
        assert!(graph.edges.contains(&GraphEdge {
            source: "q0".into(),
            destination: "q1".into(),
            label: "a".into(),
        }));
    }
}
