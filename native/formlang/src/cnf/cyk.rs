//! CYK membership for grammars in Chomsky normal form.

use crate::grammar::Grammar;
use crate::symbol::SymbolId;
use fixedbitset::FixedBitSet;

/// Whether `grammar` derives `input`, one symbol name per element.
///
/// Only `A -> a`, `A -> B C` and `S -> ε` productions are consulted, so the
/// answer is exact for grammars in Chomsky normal form.
pub fn cyk_accepts<S: AsRef<str>>(grammar: &Grammar, input: &[S]) -> bool {
    let start = grammar.start();
    if input.is_empty() {
        return grammar
            .productions()
            .get(&start)
            .is_some_and(|alts| alts.iter().any(Vec::is_empty));
    }

    let symbols = grammar.symbols();
    let Some(word) = input
        .iter()
        .map(|s| symbols.lookup(s.as_ref()).filter(|&id| symbols.is_terminal(id)))
        .collect::<Option<Vec<SymbolId>>>()
    else {
        return false;
    };

    let mut terminal_rules: Vec<(SymbolId, SymbolId)> = Vec::new();
    let mut pair_rules: Vec<(SymbolId, SymbolId, SymbolId)> = Vec::new();
    for (&lhs, alternatives) in grammar.productions() {
        for rhs in alternatives {
            match rhs.as_slice() {
                &[a] if symbols.is_terminal(a) => terminal_rules.push((lhs, a)),
                &[b, c] if symbols.is_nonterminal(b) && symbols.is_nonterminal(c) => {
                    pair_rules.push((lhs, b, c))
                }
                _ => {}
            }
        }
    }

    let n = word.len();
    let width = symbols.len();
    // table[len - 1][i]: nonterminals deriving word[i..i + len]
    let mut table = vec![vec![FixedBitSet::with_capacity(width); n]; n];

    for (i, &a) in word.iter().enumerate() {
        for &(lhs, terminal) in &terminal_rules {
            if terminal == a {
                table[0][i].insert(lhs as usize);
            }
        }
    }

    for len in 2..=n {
        for i in 0..=n - len {
            let mut cell = FixedBitSet::with_capacity(width);
            for split in 1..len {
                let left = &table[split - 1][i];
                let right = &table[len - split - 1][i + split];
                for &(lhs, b, c) in &pair_rules {
                    if left.contains(b as usize) && right.contains(c as usize) {
                        cell.insert(lhs as usize);
                    }
                }
            }
            table[len - 1][i] = cell;
        }
    }

    table[n - 1][0].contains(start as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced() {
        // a^n b^n, n >= 1
        let grammar = Grammar::parse("S -> A T | A B\nT -> S B\nA -> a\nB -> b").unwrap();

        assert!(cyk_accepts(&grammar, &["a", "b"]));
        assert!(cyk_accepts(&grammar, &["a", "a", "a", "b", "b", "b"]));
        assert!(!cyk_accepts(&grammar, &["a", "b", "b"]));
        assert!(!cyk_accepts(&grammar, &["b", "a"]));
        assert!(!cyk_accepts::<&str>(&grammar, &[]));
    }

    #[test]
    fn test_unknown_symbols_and_epsilon() {
        let grammar = Grammar::parse("S -> a | ε").unwrap();
        assert!(cyk_accepts::<&str>(&grammar, &[]));
        assert!(cyk_accepts(&grammar, &["a"]));
        assert!(!cyk_accepts(&grammar, &["z"]));
        assert!(!cyk_accepts(&grammar, &["S"]));
    }
}
