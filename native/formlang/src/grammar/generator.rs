//! Random derivations by leftmost expansion.

use crate::error::{FormLangError, Result};
use crate::grammar::Grammar;
use crate::symbol::SymbolId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Limits for a [`StringGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Upper bound on nonterminal expansions per derivation
    pub max_steps: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self { max_steps: 10_000 }
    }
}

/// Samples strings from a grammar by repeatedly replacing the leftmost
/// nonterminal with a uniformly chosen alternative.
///
/// The random source is owned by the generator; pass a seeded `StdRng` (or
/// `&mut` to one) for reproducible derivations.
pub struct StringGenerator<'g, R> {
    grammar: &'g Grammar,
    rng: R,
    options: GeneratorOptions,
}

impl<'g, R: Rng> StringGenerator<'g, R> {
    /// Create a generator with default options.
    pub fn new(grammar: &'g Grammar, rng: R) -> Self {
        Self::with_options(grammar, rng, GeneratorOptions::default())
    }

    /// Create a generator with explicit options.
    pub fn with_options(grammar: &'g Grammar, rng: R, options: GeneratorOptions) -> Self {
        Self {
            grammar,
            rng,
            options,
        }
    }

    /// Derive one terminal string, as symbol handles.
    pub fn generate(&mut self) -> Result<Vec<SymbolId>> {
        let grammar = self.grammar;
        let symbols = grammar.symbols();
        let mut sentential = vec![grammar.start()];
        let mut steps = 0;

        while let Some(pos) = sentential.iter().position(|&s| symbols.is_nonterminal(s)) {
            if steps == self.options.max_steps {
                return Err(FormLangError::GenerationBudgetExceeded(self.options.max_steps));
            }
            steps += 1;

            let nonterminal = sentential[pos];
            let alternatives = grammar
                .productions()
                .get(&nonterminal)
                .filter(|alts| !alts.is_empty())
                .ok_or_else(|| FormLangError::NoProductions(symbols.name(nonterminal).to_string()))?;

            let choice = &alternatives[self.rng.random_range(0..alternatives.len())];
            trace!(
                "{} -> {}",
                symbols.name(nonterminal),
                symbols.render(choice)
            );
            sentential.splice(pos..=pos, choice.iter().copied());
        }

        Ok(sentential)
    }

    /// Derive one terminal string, as symbol names.
    pub fn generate_symbols(&mut self) -> Result<Vec<&'g str>> {
        let grammar = self.grammar;
        let symbols = grammar.symbols();
        Ok(self
            .generate()?
            .into_iter()
            .map(|id| symbols.name(id))
            .collect())
    }

    /// Derive one terminal string with the symbol names concatenated.
    pub fn generate_string(&mut self) -> Result<String> {
        Ok(self.generate_symbols()?.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn lab_grammar() -> Grammar {
        GrammarBuilder::new()
            .start("S")
            .nonterminals(["S", "P", "Q"])
            .terminals(["a", "b", "c", "d", "e", "f"])
            .char_production("S", "aP")
            .char_production("S", "bQ")
            .char_production("P", "bP")
            .char_production("P", "cP")
            .char_production("P", "dQ")
            .char_production("P", "e")
            .char_production("Q", "eQ")
            .char_production("Q", "fQ")
            .char_production("Q", "a")
            .build()
            .unwrap()
    }

    #[test]
    fn test_generated_strings_have_language_shape() {
        let grammar = lab_grammar();
        let mut generator = StringGenerator::new(&grammar, StdRng::seed_from_u64(7));

        for _ in 0..50 {
            let s = generator.generate_string().unwrap();
            assert!(s.starts_with('a') || s.starts_with('b'));
            assert!(s.ends_with('e') || s.ends_with('a'));
            assert!(s.chars().all(|c| "abcdef".contains(c)));
        }
    }

    #[test]
    fn test_same_seed_same_derivation() {
        let grammar = lab_grammar();
        let mut first = StringGenerator::new(&grammar, StdRng::seed_from_u64(42));
        let mut second = StringGenerator::new(&grammar, StdRng::seed_from_u64(42));
        for _ in 0..10 {
            assert_eq!(
                first.generate_string().unwrap(),
                second.generate_string().unwrap()
            );
        }
    }

    #[test]
    fn test_budget_exceeded() {
        let grammar = Grammar::parse("S -> A\nA -> S").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut generator = StringGenerator::with_options(
            &grammar,
            &mut rng,
            GeneratorOptions { max_steps: 25 },
        );
        assert_eq!(
            generator.generate(),
            Err(FormLangError::GenerationBudgetExceeded(25))
        );
    }

    #[test]
    fn test_multi_character_terminals() {
        let grammar = Grammar::parse("Stmt -> let id = num ;").unwrap();
        let mut generator = StringGenerator::new(&grammar, StdRng::seed_from_u64(1));
        assert_eq!(
            generator.generate_symbols().unwrap(),
            vec!["let", "id", "=", "num", ";"]
        );
    }

    #[test]
    fn test_nonterminal_without_productions() {
        let grammar = Grammar::parse("S -> a B").unwrap();
        let mut generator = StringGenerator::new(&grammar, StdRng::seed_from_u64(3));
        assert_eq!(
            generator.generate(),
            Err(FormLangError::NoProductions("B".into()))
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: GeneratorOptions = serde_json::from_str(r#"{"max_steps": 12}"#).unwrap();
        assert_eq!(options.max_steps, 12);
        let defaults: GeneratorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, GeneratorOptions::default());
    }
}
