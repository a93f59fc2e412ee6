//! DFA minimization with Hopcroft's partition refinement.

use crate::automaton::{Automaton, SymbolIndex};
use crate::error::Result;
use crate::state::{StateId, StateSet};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

impl Automaton {
    /// The minimal deterministic automaton for the same language.
    ///
    /// Nondeterministic input is determinized first. Unreachable states and
    /// states that can never reach an accepting state are dropped, so the
    /// result may be partial. Each state keeps the smallest name among the
    /// states it merges.
    pub fn minimize(&self) -> Result<Automaton> {
        let dfa = self.to_deterministic()?;
        Ok(Hopcroft::new(&dfa).run())
    }
}

struct Hopcroft<'a> {
    dfa: &'a Automaton,
    /// Implicit sink that completes the transition function
    dead: StateId,
    alphabet_len: SymbolIndex,
    /// Reachable states plus the sink
    states: StateSet,
    /// Reverse transitions: (destination, symbol) -> set of sources
    reverse: HashMap<(StateId, SymbolIndex), StateSet>,
}

impl<'a> Hopcroft<'a> {
    fn new(dfa: &'a Automaton) -> Self {
        let dead = dfa.num_states() as StateId;
        let mut states = dfa.reachable_states();
        states.insert(dead);

        let mut this = Self {
            dfa,
            dead,
            alphabet_len: dfa.alphabet.len() as SymbolIndex,
            states,
            reverse: HashMap::new(),
        };
        let members: Vec<StateId> = this.states.iter().collect();
        for state in members {
            for symbol in 0..this.alphabet_len {
                let target = this.delta(state, symbol);
                this.reverse
                    .entry((target, symbol))
                    .or_default()
                    .insert(state);
            }
        }
        this
    }

    /// Total transition function over reachable states and the sink.
    fn delta(&self, state: StateId, symbol: SymbolIndex) -> StateId {
        if state == self.dead {
            return self.dead;
        }
        self.dfa
            .successors(state, symbol)
            .and_then(|dests| dests.iter().next())
            .unwrap_or(self.dead)
    }

    /// Find all states that can reach the target set on a given symbol.
    fn predecessors(&self, targets: &StateSet, symbol: SymbolIndex) -> StateSet {
        let mut predecessors = StateSet::default();
        for target in targets.iter() {
            if let Some(sources) = self.reverse.get(&(target, symbol)) {
                predecessors.union_with(sources);
            }
        }
        predecessors
    }

    fn run(self) -> Automaton {
        // Initial partition: final states and non-final states
        let accepting = self.states.intersection(&self.dfa.accept);
        let rejecting = self.states.difference(&self.dfa.accept);

        let mut partitions: Vec<StateSet> = [accepting, rejecting]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();

        let mut worklist: VecDeque<(usize, SymbolIndex)> = VecDeque::new();
        for idx in 0..partitions.len() {
            worklist.extend((0..self.alphabet_len).map(|symbol| (idx, symbol)));
        }

        while let Some((splitter_idx, symbol)) = worklist.pop_front() {
            let splitter = partitions[splitter_idx].clone();
            let predecessors = self.predecessors(&splitter, symbol);
            if predecessors.is_empty() {
                continue;
            }

            let mut splits = Vec::new();
            for (part_idx, partition) in partitions.iter().enumerate() {
                let inside = partition.intersection(&predecessors);
                let outside = partition.difference(&predecessors);
                if !inside.is_empty() && !outside.is_empty() {
                    // Keep the larger part in place, queue the smaller one
                    if inside.len() <= outside.len() {
                        splits.push((part_idx, outside, inside));
                    } else {
                        splits.push((part_idx, inside, outside));
                    }
                }
            }

            for (part_idx, keep, add) in splits {
                let new_idx = partitions.len();
                partitions[part_idx] = keep;
                partitions.push(add);
                worklist.extend((0..self.alphabet_len).map(|symbol| (new_idx, symbol)));
            }
        }

        debug!(
            states = self.states.len() - 1,
            blocks = partitions.len(),
            "hopcroft refinement finished"
        );
        self.build(partitions)
    }

    /// Build the minimized automaton, leaving out the block of the sink.
    fn build(&self, mut partitions: Vec<StateSet>) -> Automaton {
        partitions.sort_by_key(|p| p.iter().next());

        let block_of: HashMap<StateId, usize> = partitions
            .iter()
            .enumerate()
            .flat_map(|(idx, p)| p.iter().map(move |s| (s, idx)))
            .collect();
        let dead_block = block_of[&self.dead];
        let start_block = block_of[&self.dfa.start];

        let mut names: IndexSet<String> = IndexSet::new();
        let mut new_id: HashMap<usize, StateId> = HashMap::new();
        for (idx, partition) in partitions.iter().enumerate() {
            if idx == dead_block && idx != start_block {
                continue;
            }
            let name = partition
                .iter()
                .filter(|&s| s != self.dead)
                .map(|s| self.dfa.state_name(s))
                .min()
                .unwrap_or_else(|| self.dfa.start_name());
            new_id.insert(idx, names.insert_full(name.to_string()).0 as StateId);
        }

        let mut accept = StateSet::default();
        let mut transitions: IndexMap<(StateId, SymbolIndex), StateSet> = IndexMap::new();
        for (&idx, &id) in &new_id {
            let partition = &partitions[idx];
            if partition.intersects(&self.dfa.accept) {
                accept.insert(id);
            }
            let Some(representative) = partition.iter().find(|&s| s != self.dead) else {
                continue;
            };
            for symbol in 0..self.alphabet_len {
                let target_block = block_of[&self.delta(representative, symbol)];
                if target_block == dead_block {
                    continue;
                }
                transitions
                    .entry((id, symbol))
                    .or_default()
                    .insert(new_id[&target_block]);
            }
        }
        transitions.sort_keys();

        Automaton::from_parts(
            names,
            self.dfa.alphabet.clone(),
            transitions,
            new_id[&start_block],
            accept,
        )
    }
}
