#![allow(dead_code)]

use formlang::{Automaton, AutomatonBuilder, Grammar};
use std::sync::Once;

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    });
}

/// S -> aP | bQ, P -> bP | cP | dQ | e, Q -> eQ | fQ | a
pub fn lab_grammar() -> Grammar {
    Grammar::parse(
        "S -> a P | b Q\n\
         P -> b P | c P | d Q | e\n\
         Q -> e Q | f Q | a",
    )
    .unwrap()
}

/// The textbook exercise grammar with an unreachable `E`.
pub fn exercise_grammar() -> Grammar {
    Grammar::parse(
        "S -> a B | A C\n\
         A -> a | A S C | B C | a D\n\
         B -> b | b S\n\
         C -> ε | B A\n\
         D -> a b C\n\
         E -> a B",
    )
    .unwrap()
}

/// Nondeterministic on `a` out of `q0`, accepting `a (c* b b a)* c* b`
/// style strings ending in `q2`.
pub fn lab_automaton() -> Automaton {
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

/// One symbol per character.
pub fn chars(s: &str) -> Vec<String> {
    s.chars().map(String::from).collect()
}
