//! Removal of unreachable and non-productive nonterminals.

use crate::grammar::{Grammar, Rhs};
use crate::symbol::SymbolId;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Nonterminals reachable from the start symbol, in discovery order.
pub fn reachable_nonterminals(grammar: &Grammar) -> IndexSet<SymbolId> {
    let mut reachable = IndexSet::new();
    let mut queue = VecDeque::from([grammar.start()]);

    while let Some(symbol) = queue.pop_front() {
        if !reachable.insert(symbol) {
            continue;
        }
        for rhs in grammar.productions().get(&symbol).into_iter().flatten() {
            queue.extend(
                rhs.iter()
                    .filter(|&&s| !grammar.is_terminal(s) && !reachable.contains(&s)),
            );
        }
    }

    reachable
}

/// Nonterminals that derive at least one terminal string.
pub fn productive_nonterminals(grammar: &Grammar) -> IndexSet<SymbolId> {
    let mut productive = IndexSet::new();
    let mut changed = true;

    while changed {
        changed = false;
        for (&lhs, alternatives) in grammar.productions() {
            if productive.contains(&lhs) {
                continue;
            }
            let derives_terminals = alternatives.iter().any(|rhs| {
                rhs.iter()
                    .all(|&s| grammar.is_terminal(s) || productive.contains(&s))
            });
            if derives_terminals {
                productive.insert(lhs);
                changed = true;
            }
        }
    }

    productive
}

pub(crate) fn remove_unreachable(grammar: &Grammar) -> Grammar {
    let reachable = reachable_nonterminals(grammar);

    let mut productions = grammar.productions().clone();
    productions.retain(|lhs, _| {
        let keep = reachable.contains(lhs);
        if !keep {
            trace!("dropping unreachable {}", grammar.name(*lhs));
        }
        keep
    });

    debug!(
        removed = grammar.productions().len() - productions.len(),
        "removed unreachable nonterminals"
    );
    Grammar::from_parts(grammar.symbols().clone(), grammar.start(), productions)
}

pub(crate) fn remove_non_productive(grammar: &Grammar) -> Grammar {
    let productive = productive_nonterminals(grammar);
    let start = grammar.start();
    let uses_only_productive = |rhs: &Rhs| {
        rhs.iter()
            .all(|&s| grammar.is_terminal(s) || productive.contains(&s))
    };

    let mut productions: IndexMap<SymbolId, Vec<Rhs>> = IndexMap::new();
    for (&lhs, alternatives) in grammar.productions() {
        if !productive.contains(&lhs) && lhs != start {
            trace!("dropping non-productive {}", grammar.name(lhs));
            continue;
        }
        let kept: Vec<Rhs> = alternatives
            .iter()
            .filter(|rhs| uses_only_productive(rhs))
            .cloned()
            .collect();
        productions.insert(lhs, kept);
    }

    debug!(
        productive = productive.len(),
        before = grammar.production_count(),
        after = productions.values().map(Vec::len).sum::<usize>(),
        "removed non-productive nonterminals"
    );
    Grammar::from_parts(grammar.symbols().clone(), start, productions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_removed() {
        let grammar = Grammar::parse("S -> a A\nA -> b\nB -> c A").unwrap();
        let result = grammar.remove_unreachable();

        assert!(result.productions_of("B").is_none());
        assert!(!result.has_nonterminal("B"));
        assert!(result.has_production("A", &["b"]));
        assert_eq!(result.terminals().len(), 2);
    }

    #[test]
    fn test_non_productive_removed_with_their_uses() {
        let grammar = Grammar::parse("S -> a | a L\nL -> b L").unwrap();
        let result = grammar.remove_non_productive();

        assert!(!result.has_nonterminal("L"));
        assert_eq!(result.to_string(), "S -> a\n");
    }

    #[test]
    fn test_non_productive_start_is_kept() {
        let grammar = Grammar::parse("S -> a S").unwrap();
        let result = grammar.remove_non_productive();
        assert_eq!(result.start_name(), "S");
        assert_eq!(result.productions_of("S"), Some(&[][..]));
    }

    #[test]
    fn test_productive_order() {
        let grammar = Grammar::parse("S -> A B\nA -> a\nB -> A A | B").unwrap();
        let productive: Vec<&str> = productive_nonterminals(&grammar)
            .iter()
            .map(|&id| grammar.name(id))
            .collect();
        assert_eq!(productive, vec!["A", "B", "S"]);
    }
}
