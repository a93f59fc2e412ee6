//! Unit-production elimination.

use crate::error::{FormLangError, Result};
use crate::grammar::{Grammar, Rhs};
use crate::symbol::SymbolId;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{debug, trace};

/// The nonterminal a unit production `lhs -> B` rewrites to, if `rhs` is one.
fn unit_target(grammar: &Grammar, rhs: &[SymbolId]) -> Option<SymbolId> {
    match rhs {
        &[b] if !grammar.is_terminal(b) => Some(b),
        _ => None,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Find a cycle `A -> B -> ... -> A` of unit productions between distinct
/// nonterminals, returned as the names along the cycle.
fn find_unit_cycle(grammar: &Grammar) -> Option<Vec<String>> {
    let edges: IndexMap<SymbolId, Vec<SymbolId>> = grammar
        .productions()
        .iter()
        .map(|(&lhs, alternatives)| {
            let targets = alternatives
                .iter()
                .filter_map(|rhs| unit_target(grammar, rhs))
                .filter(|&b| b != lhs)
                .collect();
            (lhs, targets)
        })
        .collect();

    let mut marks: HashMap<SymbolId, Mark> = HashMap::new();
    for &root in edges.keys() {
        if marks.contains_key(&root) {
            continue;
        }

        // Iterative DFS; `path` mirrors the nodes currently being visited.
        let mut path: Vec<SymbolId> = vec![root];
        let mut stack: Vec<(SymbolId, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::Visiting);

        while let Some(top) = stack.last_mut() {
            let (node, index) = *top;
            top.1 += 1;

            let targets = edges.get(&node).map(Vec::as_slice).unwrap_or_default();
            let Some(&target) = targets.get(index) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                path.pop();
                continue;
            };

            match marks.get(&target) {
                Some(Mark::Visiting) => {
                    let from = path.iter().position(|&s| s == target).unwrap_or(0);
                    let mut cycle: Vec<String> = path[from..]
                        .iter()
                        .map(|&s| grammar.name(s).to_string())
                        .collect();
                    cycle.push(grammar.name(target).to_string());
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(target, Mark::Visiting);
                    path.push(target);
                    stack.push((target, 0));
                }
            }
        }
    }

    None
}

pub(crate) fn eliminate_unit_productions(grammar: &Grammar) -> Result<Grammar> {
    if let Some(cycle) = find_unit_cycle(grammar) {
        return Err(FormLangError::CyclicUnitProductions(cycle));
    }

    let symbols = grammar.symbols();
    let mut productions = grammar.productions().clone();
    let n = productions.len();
    // Without cycles every round shortens the longest unit chain by one.
    let max_rounds = n * n + 1;

    for round in 0.. {
        if round == max_rounds {
            let pending: Vec<String> = productions
                .iter()
                .filter(|(_, alts)| alts.iter().any(|rhs| unit_target(grammar, rhs).is_some()))
                .map(|(&lhs, _)| symbols.name(lhs).to_string())
                .collect();
            return Err(FormLangError::CyclicUnitProductions(pending));
        }

        let mut changed = false;
        let mut next: IndexMap<SymbolId, Vec<Rhs>> = IndexMap::with_capacity(n);

        for (&lhs, alternatives) in &productions {
            let mut rewritten: IndexSet<Rhs> = IndexSet::with_capacity(alternatives.len());
            for rhs in alternatives {
                match unit_target(grammar, rhs) {
                    Some(b) if b == lhs => changed = true,
                    Some(b) => {
                        changed = true;
                        for replacement in productions.get(&b).into_iter().flatten() {
                            // An epsilon alternative belongs to the start symbol alone
                            if replacement.is_empty() {
                                continue;
                            }
                            trace!(
                                "{} -> {}  via {}",
                                symbols.name(lhs),
                                symbols.render(replacement),
                                symbols.name(b)
                            );
                            rewritten.insert(replacement.clone());
                        }
                    }
                    None => {
                        rewritten.insert(rhs.clone());
                    }
                }
            }
            next.insert(lhs, rewritten.into_iter().collect());
        }

        productions = next;
        if !changed {
            debug!(rounds = round, "eliminated unit productions");
            break;
        }
    }

    Ok(Grammar::from_parts(
        symbols.clone(),
        grammar.start(),
        productions,
    ))
}
