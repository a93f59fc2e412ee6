//! Binarization: the final rewrite into Chomsky normal form.

use crate::cnf::NormalizerOptions;
use crate::error::Result;
use crate::grammar::{Grammar, Rhs};
use crate::symbol::{SymbolId, SymbolKind, SymbolTable};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Synthetic nonterminals introduced during one binarization run.
///
/// Identical patterns share one variable: a terminal is always lifted into
/// the same `X_i -> a`, and a repeated nonterminal suffix folds into the
/// same chain.
struct FreshVariables<'o> {
    prefix: &'o str,
    next: usize,
    terminals: HashMap<SymbolId, SymbolId>,
    suffixes: HashMap<Vec<SymbolId>, SymbolId>,
    /// New productions, in creation order
    definitions: Vec<(SymbolId, Rhs)>,
}

impl<'o> FreshVariables<'o> {
    fn new(prefix: &'o str) -> Self {
        Self {
            prefix,
            next: 0,
            terminals: HashMap::new(),
            suffixes: HashMap::new(),
            definitions: Vec::new(),
        }
    }

    fn fresh(&mut self, symbols: &mut SymbolTable) -> Result<SymbolId> {
        symbols.fresh_indexed(self.prefix, &mut self.next, SymbolKind::Nonterminal)
    }

    /// The variable deriving exactly the terminal `a`.
    fn for_terminal(&mut self, symbols: &mut SymbolTable, a: SymbolId) -> Result<SymbolId> {
        if let Some(&var) = self.terminals.get(&a) {
            return Ok(var);
        }
        let var = self.fresh(symbols)?;
        trace!("{} -> {}", symbols.name(var), symbols.name(a));
        self.terminals.insert(a, var);
        self.definitions.push((var, vec![a]));
        Ok(var)
    }

    /// The variable deriving the nonterminal sequence `suffix`, at least
    /// two symbols long, built as a right-leaning chain of pairs.
    fn for_suffix(&mut self, symbols: &mut SymbolTable, suffix: &[SymbolId]) -> Result<SymbolId> {
        if let Some(&var) = self.suffixes.get(suffix) {
            return Ok(var);
        }
        let var = self.fresh(symbols)?;
        self.suffixes.insert(suffix.to_vec(), var);

        let rhs = match suffix {
            [first, second] => vec![*first, *second],
            [first, rest @ ..] => vec![*first, self.for_suffix(symbols, rest)?],
            [] => Vec::new(),
        };
        trace!("{} -> {}", symbols.name(var), symbols.render(&rhs));
        self.definitions.push((var, rhs));
        Ok(var)
    }
}

pub(crate) fn binarize(grammar: &Grammar, options: &NormalizerOptions) -> Result<Grammar> {
    let mut symbols = grammar.symbols().clone();
    let old_start = grammar.start();
    let mut start = old_start;
    let mut productions: IndexMap<SymbolId, Vec<Rhs>> = IndexMap::new();

    if grammar.occurs_on_rhs(old_start) {
        // The new start copies the old start's alternatives and takes over
        // its epsilon production.
        let base = format!("{}{}", grammar.start_name(), options.start_suffix);
        start = symbols.fresh(&base, SymbolKind::Nonterminal)?;
        let alternatives = grammar.productions().get(&old_start).cloned().unwrap_or_default();
        productions.insert(start, alternatives);
        debug!(start = symbols.name(start), "introduced new start symbol");
    }

    for (&lhs, alternatives) in grammar.productions() {
        let mut alternatives = alternatives.clone();
        if lhs == old_start && start != old_start {
            alternatives.retain(|rhs| !rhs.is_empty());
        }
        productions.insert(lhs, alternatives);
    }

    let mut fresh = FreshVariables::new(&options.fresh_prefix);
    for alternatives in productions.values_mut() {
        let mut rewritten: IndexSet<Rhs> = IndexSet::with_capacity(alternatives.len());
        for rhs in alternatives.drain(..) {
            if rhs.len() < 2 {
                rewritten.insert(rhs);
                continue;
            }

            let mut lifted = Vec::with_capacity(rhs.len());
            for symbol in rhs {
                if symbols.is_terminal(symbol) {
                    lifted.push(fresh.for_terminal(&mut symbols, symbol)?);
                } else {
                    lifted.push(symbol);
                }
            }
            if lifted.len() > 2 {
                let tail = fresh.for_suffix(&mut symbols, &lifted[1..])?;
                lifted.truncate(1);
                lifted.push(tail);
            }
            rewritten.insert(lifted);
        }
        *alternatives = rewritten.into_iter().collect();
    }

    let introduced = fresh.definitions.len();
    for (var, rhs) in fresh.definitions {
        productions.entry(var).or_default().push(rhs);
    }

    debug!(introduced, "binarized productions");
    Ok(Grammar::from_parts(symbols, start, productions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::is_chomsky_normal_form;

    #[test]
    fn test_terminals_are_lifted_once() {
        let grammar = Grammar::parse("S -> a B | a\nB -> b a").unwrap();
        let result = grammar.binarize().unwrap();

        assert!(result.has_production("S", &["X0", "B"]));
        assert!(result.has_production("S", &["a"]));
        assert!(result.has_production("B", &["X1", "X0"]));
        assert!(result.has_production("X0", &["a"]));
        assert!(result.has_production("X1", &["b"]));
        assert!(is_chomsky_normal_form(&result));
    }

    #[test]
    fn test_long_sequences_fold_right() {
        let grammar = Grammar::parse("S -> A B C D | B C D\nA -> a\nB -> b\nC -> c\nD -> d").unwrap();
        let result = grammar.binarize().unwrap();

        assert!(result.has_production("S", &["A", "X0"]));
        assert!(result.has_production("X0", &["B", "X1"]));
        assert!(result.has_production("X1", &["C", "D"]));
        // The `C D` tail is shared with the first chain
        assert!(result.has_production("S", &["B", "X1"]));
        assert_eq!(result.productions_of("X0").map(<[_]>::len), Some(1));
        assert!(result.productions_of("X2").is_none());
        assert!(is_chomsky_normal_form(&result));
    }

    #[test]
    fn test_start_on_rhs_gets_new_start() {
        let grammar = Grammar::parse("S -> A S | a | ε\nA -> a").unwrap();
        let result = grammar.binarize().unwrap();

        assert_eq!(result.start_name(), "S'");
        assert_eq!(result.productions().keys().next(), Some(&result.start()));
        assert!(result.has_production("S'", &["A", "S"]));
        assert!(result.has_production("S'", &[]));
        assert!(!result.has_production("S", &[]));
        assert!(is_chomsky_normal_form(&result));
    }

    #[test]
    fn test_fresh_names_skip_existing() {
        let grammar = Grammar::parse("S -> X0 b\nX0 -> a").unwrap();
        let result = grammar.binarize().unwrap();
        assert!(result.has_production("S", &["X0", "X1"]));
        assert!(result.has_production("X1", &["b"]));
    }
}
