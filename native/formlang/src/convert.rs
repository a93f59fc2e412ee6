//! Conversion between regular grammars and finite automata.

use crate::automaton::{Automaton, SymbolIndex};
use crate::error::{FormLangError, Result};
use crate::grammar::{Grammar, GrammarBuilder};
use crate::state::{StateId, StateSet};
use crate::symbol::SymbolId;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Base name of the state reached after the last terminal of a derivation.
pub const ACCEPT_STATE: &str = "ACCEPT";

/// How automaton states are named when they become nonterminals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateNaming {
    /// Use the state names as they are.
    #[default]
    Preserve,
    /// Map a state named `prefix + N` to the `N`th name of the sequence
    /// `A`, ..., `Z`, `AA`, `AB`, ...
    Letters,
}

impl Grammar {
    /// The automaton recognizing this grammar's language.
    ///
    /// Every right-hand side must be `a`, `a B` or epsilon.
    pub fn to_automaton(&self) -> Result<Automaton> {
        grammar_to_automaton(self)
    }
}

impl Automaton {
    /// The right-linear grammar generating this automaton's language.
    pub fn to_grammar(&self, naming: StateNaming) -> Result<Grammar> {
        automaton_to_grammar(self, naming)
    }
}

/// One state per nonterminal plus an accepting sentinel: `N -> a M` becomes
/// `N --a--> M`, `N -> a` becomes `N --a--> ACCEPT` and `N -> ε` makes `N`
/// accepting.
pub fn grammar_to_automaton(grammar: &Grammar) -> Result<Automaton> {
    let mut states: IndexSet<String> = grammar
        .nonterminals()
        .iter()
        .map(|&id| grammar.name(id).to_string())
        .collect();
    let mut sentinel = ACCEPT_STATE.to_string();
    while states.contains(&sentinel) {
        sentinel.push('\'');
    }
    let sentinel = states.insert_full(sentinel).0 as StateId;

    let alphabet: IndexSet<String> = grammar
        .terminals()
        .iter()
        .map(|&id| grammar.name(id).to_string())
        .collect();

    // Nonterminals and terminals were collected in set order, so their
    // positions are their state and symbol indices.
    let state_of = |id: SymbolId| grammar.nonterminals().get_index_of(&id).map(|i| i as StateId);
    let symbol_of = |id: SymbolId| grammar.terminals().get_index_of(&id).map(|i| i as SymbolIndex);

    let mut transitions: IndexMap<(StateId, SymbolIndex), StateSet> = IndexMap::new();
    let mut accept = StateSet::singleton(sentinel, states.len());

    for (&lhs, alternatives) in grammar.productions() {
        let source = state_of(lhs).ok_or_else(|| {
            FormLangError::SymbolNotDeclared(grammar.name(lhs).to_string())
        })?;

        for rhs in alternatives {
            let edge = match rhs.as_slice() {
                [] => None,
                &[a] => symbol_of(a).map(|sym| (sym, sentinel)),
                &[a, m] => symbol_of(a).zip(state_of(m)),
                _ => None,
            };
            match edge {
                Some((symbol, destination)) => {
                    transitions
                        .entry((source, symbol))
                        .or_default()
                        .insert(destination);
                }
                None if rhs.is_empty() => {
                    accept.insert(source);
                }
                None => {
                    return Err(FormLangError::UnsupportedProductionForm {
                        nonterminal: grammar.name(lhs).to_string(),
                        production: grammar.symbols().render(rhs),
                    });
                }
            }
        }
    }

    let start = state_of(grammar.start())
        .ok_or_else(|| FormLangError::SymbolNotDeclared(grammar.start_name().to_string()))?;

    debug!(
        states = states.len(),
        transitions = transitions.len(),
        "converted grammar to automaton"
    );
    Ok(Automaton::from_parts(
        states,
        alphabet,
        transitions,
        start,
        accept,
    ))
}

/// Each state becomes a nonterminal: `S --a--> T` yields `S -> a T`, plus
/// `S -> a` when `T` accepts. An accepting start state yields `S -> ε`.
pub fn automaton_to_grammar(automaton: &Automaton, naming: StateNaming) -> Result<Grammar> {
    let names = nonterminal_names(automaton, naming)?;
    let name = |state: StateId| names[state as usize].as_str();

    let mut builder = GrammarBuilder::new()
        .start(name(automaton.start_state()))
        .nonterminals(names.iter().cloned())
        .terminals(automaton.alphabet());

    // Insertion-ordered, so duplicates are emitted once in first-seen order
    let mut productions: IndexSet<(&str, Vec<&str>)> = IndexSet::new();
    for (source, symbol, destination) in automaton.transitions() {
        let lhs = name(source);
        let terminal = automaton.symbol_name(symbol);
        productions.insert((lhs, vec![terminal, name(destination)]));
        if automaton.accept_states().contains(destination) {
            productions.insert((lhs, vec![terminal]));
        }
    }
    if automaton.accept_states().contains(automaton.start_state()) {
        productions.insert((name(automaton.start_state()), Vec::new()));
    }
    for (lhs, rhs) in productions {
        builder = builder.production(lhs, rhs);
    }

    let grammar = builder.build()?;
    debug!(
        nonterminals = grammar.nonterminals().len(),
        productions = grammar.production_count(),
        "converted automaton to grammar"
    );
    Ok(grammar)
}

/// Nonterminal name for every state, indexed by [`StateId`].
fn nonterminal_names(automaton: &Automaton, naming: StateNaming) -> Result<Vec<String>> {
    match naming {
        StateNaming::Preserve => Ok(automaton.states().map(str::to_string).collect()),
        StateNaming::Letters => {
            let mut owners: HashMap<String, &str> = HashMap::new();
            let mut names = Vec::with_capacity(automaton.num_states());
            for state in automaton.states() {
                let letters = letter_name(parse_state_index(state)?);
                if let Some(owner) = owners.insert(letters.clone(), state) {
                    return Err(FormLangError::StateNameCollision(
                        owner.to_string(),
                        state.to_string(),
                        letters,
                    ));
                }
                names.push(letters);
            }
            Ok(names)
        }
    }
}

/// The numeric suffix of a state name such as `q12`.
pub fn parse_state_index(name: &str) -> Result<usize> {
    let invalid = || FormLangError::InvalidStateNameFormat(name.to_string());

    let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[prefix.len()..];
    if digits.is_empty() || prefix.ends_with(['-', '+']) {
        return Err(invalid());
    }
    digits.parse().map_err(|_| invalid())
}

/// Bijective base-26 name: 0 is `A`, 25 is `Z`, 26 is `AA`.
pub fn letter_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}
