//! Subset construction algorithm for converting an NFA to a DFA.

use crate::automaton::{Automaton, SymbolIndex};
use crate::error::{FormLangError, Result};
use crate::state::{StateId, StateSet};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Convert an automaton to an equivalent deterministic one using the
/// powerset construction.
///
/// Each DFA state stands for a set of NFA states and is named by the
/// concatenation of its members' names in sorted order. Two different sets
/// that would receive the same name are reported as a
/// [`FormLangError::StateNameCollision`].
pub fn subset_construction(nfa: &Automaton) -> Result<Automaton> {
    // Maps sorted NFA state lists to DFA state IDs
    let mut state_mapping: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut names: IndexSet<String> = IndexSet::new();
    let mut transitions: IndexMap<(StateId, SymbolIndex), StateSet> = IndexMap::new();
    let mut accept = StateSet::default();

    let mut worklist: VecDeque<StateSet> = VecDeque::new();

    let initial_set = StateSet::singleton(nfa.start_state(), nfa.num_states());
    let start = add_subset(nfa, &initial_set, &mut state_mapping, &mut names)?;
    if initial_set.intersects(nfa.accept_states()) {
        accept.insert(start);
    }
    worklist.push_back(initial_set);

    while let Some(current_nfa_set) = worklist.pop_front() {
        let current_dfa_state = state_mapping[&current_nfa_set.to_vec()];

        for symbol in 0..nfa.alphabet.len() as SymbolIndex {
            let next_nfa_set = nfa.move_on_symbol(&current_nfa_set, symbol);

            if next_nfa_set.is_empty() {
                // No transition on this symbol; the DFA stays partial
                continue;
            }

            let next_dfa_state = match state_mapping.get(&next_nfa_set.to_vec()) {
                Some(&existing) => existing,
                None => {
                    let new_state = add_subset(nfa, &next_nfa_set, &mut state_mapping, &mut names)?;
                    if next_nfa_set.intersects(nfa.accept_states()) {
                        accept.insert(new_state);
                    }
                    worklist.push_back(next_nfa_set);
                    new_state
                }
            };

            trace!(
                "{} --{}--> {}",
                names[current_dfa_state as usize],
                nfa.symbol_name(symbol),
                names[next_dfa_state as usize]
            );
            transitions
                .entry((current_dfa_state, symbol))
                .or_default()
                .insert(next_dfa_state);
        }
    }

    debug!(
        nfa_states = nfa.num_states(),
        dfa_states = names.len(),
        "subset construction finished"
    );

    Ok(Automaton::from_parts(
        names,
        nfa.alphabet.clone(),
        transitions,
        start,
        accept,
    ))
}

/// Register a new DFA state for `set`, rejecting names already taken by a
/// different set.
fn add_subset(
    nfa: &Automaton,
    set: &StateSet,
    state_mapping: &mut IndexMap<Vec<StateId>, StateId>,
    names: &mut IndexSet<String>,
) -> Result<StateId> {
    let name = subset_name(nfa, set);
    let (index, inserted) = names.insert_full(name);
    if !inserted {
        let (owner, _) = state_mapping
            .iter()
            .find(|&(_, &id)| id as usize == index)
            .map(|(members, id)| (members.clone(), *id))
            .unwrap_or_default();
        return Err(FormLangError::StateNameCollision(
            describe(nfa, &owner),
            describe(nfa, &set.to_vec()),
            names[index].clone(),
        ));
    }

    let id = index as StateId;
    state_mapping.insert(set.to_vec(), id);
    Ok(id)
}

/// Member names sorted and concatenated.
pub(crate) fn subset_name(nfa: &Automaton, set: &StateSet) -> String {
    let mut members: Vec<&str> = set.iter().map(|s| nfa.state_name(s)).collect();
    members.sort_unstable();
    members.concat()
}

fn describe(nfa: &Automaton, members: &[StateId]) -> String {
    let names: Vec<&str> = members.iter().map(|&s| nfa.state_name(s)).collect();
    format!("{{{}}}", names.join(", "))
}
