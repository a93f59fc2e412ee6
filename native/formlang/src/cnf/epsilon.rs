//! Epsilon-production elimination.

use crate::grammar::{Grammar, Rhs};
use crate::symbol::SymbolId;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

/// Nonterminals that derive the empty string.
pub fn nullable_nonterminals(grammar: &Grammar) -> IndexSet<SymbolId> {
    let mut nullable = IndexSet::new();
    let mut changed = true;

    while changed {
        changed = false;
        for (&lhs, alternatives) in grammar.productions() {
            if nullable.contains(&lhs) {
                continue;
            }
            if alternatives
                .iter()
                .any(|rhs| rhs.iter().all(|s| nullable.contains(s)))
            {
                nullable.insert(lhs);
                changed = true;
            }
        }
    }

    nullable
}

/// Every way of keeping or dropping the nullable occurrences of `rhs`,
/// in a stable order starting from the unchanged sequence.
fn expansions(rhs: &[SymbolId], nullable: &IndexSet<SymbolId>) -> Vec<Rhs> {
    let mut partials: Vec<Rhs> = vec![Vec::with_capacity(rhs.len())];
    for &symbol in rhs {
        if nullable.contains(&symbol) {
            let without = partials.clone();
            for partial in &mut partials {
                partial.push(symbol);
            }
            partials.extend(without);
        } else {
            for partial in &mut partials {
                partial.push(symbol);
            }
        }
    }
    partials
}

pub(crate) fn eliminate_epsilon_productions(grammar: &Grammar) -> Grammar {
    let nullable = nullable_nonterminals(grammar);
    let symbols = grammar.symbols();
    let start = grammar.start();

    let mut productions: IndexMap<SymbolId, Vec<Rhs>> = IndexMap::new();
    for (&lhs, alternatives) in grammar.productions() {
        let mut rewritten: IndexSet<Rhs> = IndexSet::new();
        for rhs in alternatives {
            for expanded in expansions(rhs, &nullable) {
                if expanded.is_empty() {
                    continue;
                }
                if expanded != *rhs {
                    trace!("{} -> {}", symbols.name(lhs), symbols.render(&expanded));
                }
                rewritten.insert(expanded);
            }
        }
        if !rewritten.is_empty() || lhs == start {
            productions.insert(lhs, rewritten.into_iter().collect());
        }
    }

    // The only epsilon production left, kept so the empty string stays in
    // the language.
    if nullable.contains(&start) {
        let alternatives = productions.entry(start).or_default();
        if !alternatives.iter().any(Vec::is_empty) {
            alternatives.push(Vec::new());
        }
    }

    debug!(
        nullable = nullable.len(),
        before = grammar.production_count(),
        after = productions.values().map(Vec::len).sum::<usize>(),
        "eliminated epsilon productions"
    );
    Grammar::from_parts(symbols.clone(), start, productions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn names(grammar: &Grammar, set: &IndexSet<SymbolId>) -> Vec<String> {
        let mut names: Vec<String> = set.iter().map(|&id| grammar.name(id).to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_nullable_fixed_point() {
        let grammar = Grammar::parse("S -> A B | c\nA -> ε | a\nB -> A A").unwrap();
        assert_eq!(
            names(&grammar, &nullable_nonterminals(&grammar)),
            vec!["A", "B", "S"]
        );
    }

    #[test]
    fn test_all_combinations() {
        let grammar = Grammar::parse("S -> a A b A\nA -> c | ε").unwrap();
        let result = grammar.eliminate_epsilon_productions();

        assert!(result.has_production("S", &["a", "A", "b", "A"]));
        assert!(result.has_production("S", &["a", "b", "A"]));
        assert!(result.has_production("S", &["a", "A", "b"]));
        assert!(result.has_production("S", &["a", "b"]));
        assert_eq!(result.productions_of("A").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_start_keeps_epsilon() {
        let grammar = Grammar::parse("S -> a S b | ε").unwrap();
        let result = grammar.eliminate_epsilon_productions();

        assert!(result.has_production("S", &[]));
        assert!(result.has_production("S", &["a", "b"]));
        assert!(result.has_production("S", &["a", "S", "b"]));
        assert_eq!(result.production_count(), 3);
    }

    #[test]
    fn test_indirectly_nullable_start() {
        let grammar = Grammar::parse("S -> A\nA -> B\nB -> ε | b").unwrap();
        let result = grammar.eliminate_epsilon_productions();

        let epsilons: Vec<&str> = result
            .productions()
            .iter()
            .filter(|(_, alts)| alts.iter().any(Vec::is_empty))
            .map(|(&lhs, _)| result.name(lhs))
            .collect();
        assert_eq!(epsilons, vec!["S"]);
    }

    #[test]
    fn test_repeated_expansions_kept_once() {
        let grammar = Grammar::parse("S -> A A\nA -> a | ε").unwrap();
        let result = grammar.eliminate_epsilon_productions();

        assert_eq!(result.to_string(), "S -> A A | A | ε\nA -> a\n");
    }

    #[test]
    fn test_wide_nullable_rhs() {
        let names: Vec<String> = (1..=14).map(|i| format!("B{i}")).collect();
        let mut builder = GrammarBuilder::new().production("S", names.clone());
        for name in &names {
            builder = builder
                .production(name.as_str(), ["b"])
                .production(name.as_str(), Vec::<String>::new());
        }
        let result = builder.build().unwrap().eliminate_epsilon_productions();

        // Every non-empty subsequence once, plus the start's epsilon
        assert_eq!(result.productions_of("S").map(<[_]>::len), Some(1 << 14));
        assert_eq!(result.production_count(), (1 << 14) + names.len());
    }

    #[test]
    fn test_epsilon_only_nonterminal_disappears() {
        let grammar = Grammar::parse("S -> a E\nE -> ε").unwrap();
        let result = grammar.eliminate_epsilon_productions();
        assert_eq!(result.productions_of("E"), None);
        assert!(result.has_production("S", &["a"]));
    }
}
