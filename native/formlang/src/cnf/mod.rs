//! Chomsky normal form conversion.
//!
//! [`ChomskyNormalizer`] runs five stages, each of which assumes the
//! guarantees of the ones before it:
//! 1. Epsilon elimination (only the start symbol may keep `S -> ε`)
//! 2. Unit-production elimination
//! 3. Reachability pruning
//! 4. Productivity pruning, followed by another reachability pass
//! 5. Binarization into `A -> a` and `A -> B C`
//!
//! Every stage is also available on its own through [`Grammar`] methods.

mod binarize;
mod cyk;
mod epsilon;
mod prune;
mod unit;

use crate::error::Result;
use crate::grammar::Grammar;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use cyk::cyk_accepts;
pub use epsilon::nullable_nonterminals;
pub use prune::{productive_nonterminals, reachable_nonterminals};

/// Naming of the symbols the normalizer introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerOptions {
    /// Name prefix of the variables introduced by binarization
    pub fresh_prefix: String,
    /// Appended to the start symbol's name when a new start is needed
    pub start_suffix: String,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            fresh_prefix: "X".to_string(),
            start_suffix: "'".to_string(),
        }
    }
}

/// Runs the five normalization stages in order.
#[derive(Debug, Clone, Default)]
pub struct ChomskyNormalizer {
    options: NormalizerOptions,
}

impl ChomskyNormalizer {
    /// Create a normalizer with the given naming options.
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    /// Get the naming options.
    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// An equivalent grammar in Chomsky normal form.
    pub fn normalize(&self, grammar: &Grammar) -> Result<Grammar> {
        let grammar = epsilon::eliminate_epsilon_productions(grammar);
        let grammar = unit::eliminate_unit_productions(&grammar)?;
        let grammar = prune::remove_unreachable(&grammar);
        let grammar = prune::remove_non_productive(&grammar);
        let grammar = prune::remove_unreachable(&grammar);
        let grammar = binarize::binarize(&grammar, &self.options)?;

        debug!(
            nonterminals = grammar.nonterminals().len(),
            productions = grammar.production_count(),
            "normalized to chomsky normal form"
        );
        Ok(grammar)
    }
}

impl Grammar {
    /// [`ChomskyNormalizer::normalize`] with default options.
    pub fn normalize_to_chomsky_form(&self) -> Result<Grammar> {
        ChomskyNormalizer::default().normalize(self)
    }

    /// Remove epsilon productions, keeping `S -> ε` when the start is nullable.
    pub fn eliminate_epsilon_productions(&self) -> Grammar {
        epsilon::eliminate_epsilon_productions(self)
    }

    /// Fails with [`FormLangError::CyclicUnitProductions`] when unit
    /// productions form a cycle through two or more nonterminals.
    ///
    /// [`FormLangError::CyclicUnitProductions`]: crate::FormLangError::CyclicUnitProductions
    pub fn eliminate_unit_productions(&self) -> Result<Grammar> {
        unit::eliminate_unit_productions(self)
    }

    /// Drop nonterminals not reachable from the start symbol.
    pub fn remove_unreachable(&self) -> Grammar {
        prune::remove_unreachable(self)
    }

    /// Drop non-productive nonterminals and every production that mentions
    /// one. The start symbol always stays, possibly without productions.
    pub fn remove_non_productive(&self) -> Grammar {
        prune::remove_non_productive(self)
    }

    /// Rewrite every right-hand side into `a` or `B C` with default options.
    pub fn binarize(&self) -> Result<Grammar> {
        binarize::binarize(self, &NormalizerOptions::default())
    }

    /// Check the result of [`chomsky_violations`] is empty.
    pub fn is_chomsky_normal_form(&self) -> bool {
        is_chomsky_normal_form(self)
    }
}

/// Every production that is not `A -> a`, `A -> B C`, or `S -> ε` for a
/// start symbol that appears on no right-hand side, rendered as text.
pub fn chomsky_violations(grammar: &Grammar) -> Vec<String> {
    let symbols = grammar.symbols();
    let start = grammar.start();
    let start_on_rhs = grammar.occurs_on_rhs(start);

    grammar
        .productions()
        .iter()
        .flat_map(|(&lhs, alternatives)| alternatives.iter().map(move |rhs| (lhs, rhs)))
        .filter(|&(lhs, rhs)| {
            let valid = match rhs.as_slice() {
                [] => lhs == start && !start_on_rhs,
                &[a] => symbols.is_terminal(a),
                &[b, c] => symbols.is_nonterminal(b) && symbols.is_nonterminal(c),
                _ => false,
            };
            !valid
        })
        .map(|(lhs, rhs)| format!("{} -> {}", symbols.name(lhs), symbols.render(rhs)))
        .collect()
}

/// Check that every production has a Chomsky normal form shape.
pub fn is_chomsky_normal_form(grammar: &Grammar) -> bool {
    chomsky_violations(grammar).is_empty()
}
