mod common;

use common::chars;
use formlang::cnf::{cyk_accepts, is_chomsky_normal_form};
use formlang::{Automaton, AutomatonBuilder, Grammar, GrammarBuilder, StateNaming};
use proptest::prelude::*;
use std::borrow::Cow;

const TERMINALS: [&str; 2] = ["a", "b"];

prop_compose! {
    fn small_nfa()(n in 1usize..5)(
        n in Just(n),
        edges in prop::collection::vec((0..n, 0..TERMINALS.len(), 0..n), 0..12),
        accept in prop::collection::vec(0..n, 0..3),
    ) -> Automaton {
        let mut builder = AutomatonBuilder::new()
            .states((0..n).map(|i| format!("q{i}")))
            .alphabet(TERMINALS)
            .start("q0")
            .accept(accept.iter().map(|i| format!("q{i}")));
        for (source, symbol, destination) in edges {
            builder = builder.transition(
                format!("q{source}"),
                TERMINALS[symbol],
                format!("q{destination}"),
            );
        }
        builder.build().unwrap()
    }
}

prop_compose! {
    /// Rules of the shapes `N -> a M`, `N -> a` and `N -> ε` over N0..N3.
    fn right_linear_grammar()(
        rules in prop::collection::vec((0..4usize, 0..3u8, 0..TERMINALS.len(), 0..4usize), 0..10),
    ) -> Grammar {
        let mut builder = GrammarBuilder::new().start("N0");
        for (lhs, shape, terminal, target) in rules {
            let rhs = match shape {
                0 => vec![TERMINALS[terminal].to_string(), format!("N{target}")],
                1 => vec![TERMINALS[terminal].to_string()],
                _ => Vec::new(),
            };
            builder = builder.production(format!("N{lhs}"), rhs);
        }
        builder.build().unwrap()
    }
}

fn is_anbn(s: &str) -> bool {
    let n = s.len() / 2;
    s.len() % 2 == 0 && s[..n].chars().all(|c| c == 'a') && s[n..].chars().all(|c| c == 'b')
}

fn is_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        depth += if c == '(' { 1 } else { -1 };
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

proptest! {
    #[test]
    fn prop_determinization_preserves_membership(nfa in small_nfa(), input in "[ab]{0,8}") {
        let dfa = nfa.to_deterministic().unwrap();
        prop_assert!(dfa.is_deterministic());
        prop_assert_eq!(
            nfa.string_belongs_to_language(&input),
            dfa.string_belongs_to_language(&input)
        );
    }

    #[test]
    fn prop_determinization_is_idempotent(nfa in small_nfa()) {
        let dfa = nfa.to_deterministic().unwrap().into_owned();
        let again = dfa.to_deterministic().unwrap();
        prop_assert!(matches!(again, Cow::Borrowed(_)));

        let rebuilt = formlang::automaton::subset_construction(&dfa).unwrap();
        prop_assert!(rebuilt.equivalent(&dfa).unwrap());
    }

    #[test]
    fn prop_minimization_preserves_language(nfa in small_nfa(), input in "[ab]{0,8}") {
        let minimal = nfa.minimize().unwrap();
        prop_assert!(minimal.is_deterministic());
        prop_assert!(minimal.num_states() <= nfa.to_deterministic().unwrap().num_states());
        prop_assert_eq!(
            nfa.string_belongs_to_language(&input),
            minimal.string_belongs_to_language(&input)
        );
    }

    #[test]
    fn prop_grammar_round_trip(nfa in small_nfa(), input in "[ab]{0,8}") {
        let back = nfa.to_grammar(StateNaming::Preserve).unwrap().to_automaton().unwrap();
        prop_assert_eq!(
            nfa.string_belongs_to_language(&input),
            back.string_belongs_to_language(&input)
        );
    }

    #[test]
    fn prop_normal_form_matches_automaton(grammar in right_linear_grammar(), input in "[ab]{0,7}") {
        let automaton = grammar.to_automaton().unwrap();
        let normalized = grammar.normalize_to_chomsky_form().unwrap();

        prop_assert!(is_chomsky_normal_form(&normalized));
        prop_assert_eq!(
            automaton.string_belongs_to_language(&input),
            cyk_accepts(&normalized, &chars(&input))
        );
    }

    #[test]
    fn prop_anbn_normal_form(input in "[ab]{0,10}") {
        let normalized = Grammar::parse("S -> a S b | ε").unwrap().normalize_to_chomsky_form().unwrap();
        prop_assert_eq!(cyk_accepts(&normalized, &chars(&input)), is_anbn(&input));
    }

    #[test]
    fn prop_balanced_parentheses_normal_form(input in "[()]{0,10}") {
        let normalized = Grammar::parse("S -> ( S ) S | ε").unwrap().normalize_to_chomsky_form().unwrap();
        prop_assert!(is_chomsky_normal_form(&normalized));
        prop_assert_eq!(cyk_accepts(&normalized, &chars(&input)), is_balanced(&input));
    }
}
