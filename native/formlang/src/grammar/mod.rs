//! Grammar model: a start symbol and an ordered production map over
//! interned symbols.

pub mod classify;
pub mod generator;

use crate::error::{FormLangError, Result};
use crate::symbol::{EPSILON, SymbolId, SymbolKind, SymbolTable};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::fmt;

pub use classify::{ChomskyType, GeneralRule, classify};
pub use generator::{GeneratorOptions, StringGenerator};

/// A right-hand side: a sequence of symbols, empty for epsilon.
pub type Rhs = Vec<SymbolId>;

/// A grammar whose rules each rewrite a single nonterminal.
///
/// Values are snapshots: every transformation returns a new grammar with
/// its terminal and nonterminal sets recomputed from the productions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    symbols: SymbolTable,
    start: SymbolId,
    nonterminals: IndexSet<SymbolId>,
    terminals: IndexSet<SymbolId>,
    productions: IndexMap<SymbolId, Vec<Rhs>>,
}

impl Grammar {
    /// Build a snapshot from a production map, deriving the symbol sets from
    /// the start symbol and everything the productions mention.
    pub(crate) fn from_parts(
        symbols: SymbolTable,
        start: SymbolId,
        productions: IndexMap<SymbolId, Vec<Rhs>>,
    ) -> Self {
        let mut nonterminals = IndexSet::new();
        let mut terminals = IndexSet::new();
        nonterminals.insert(start);

        for (&lhs, alternatives) in &productions {
            nonterminals.insert(lhs);
            for &sym in alternatives.iter().flatten() {
                if symbols.is_terminal(sym) {
                    terminals.insert(sym);
                } else {
                    nonterminals.insert(sym);
                }
            }
        }

        Self {
            symbols,
            start,
            nonterminals,
            terminals,
            productions,
        }
    }

    /// Parse one rule per line: `S -> a B | A C | ε`.
    ///
    /// Symbols are separated by whitespace; an `ε` or empty alternative is
    /// the epsilon production. Blank lines and lines starting with `#` are
    /// skipped. The first rule's left-hand side becomes the start symbol.
    pub fn parse(text: &str) -> Result<Self> {
        let mut builder = GrammarBuilder::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((lhs, rhs)) = line.split_once("->") else {
                return Err(FormLangError::MalformedRule(line.to_string()));
            };
            let lhs = lhs.trim();
            if lhs.is_empty() || lhs.contains(char::is_whitespace) {
                return Err(FormLangError::MalformedRule(line.to_string()));
            }

            for alternative in rhs.split('|') {
                let symbols: Vec<&str> = alternative
                    .split_whitespace()
                    .filter(|s| *s != EPSILON)
                    .collect();
                builder = builder.production(lhs, symbols);
            }
        }

        builder.build()
    }

    /// Get the start symbol.
    pub fn start(&self) -> SymbolId {
        self.start
    }

    /// Name of the start symbol.
    pub fn start_name(&self) -> &str {
        self.symbols.name(self.start)
    }

    /// Symbol table holding every name the grammar uses.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Get the set of nonterminals.
    pub fn nonterminals(&self) -> &IndexSet<SymbolId> {
        &self.nonterminals
    }

    /// Get the set of terminals.
    pub fn terminals(&self) -> &IndexSet<SymbolId> {
        &self.terminals
    }

    /// Alternatives of every nonterminal, in insertion order.
    pub fn productions(&self) -> &IndexMap<SymbolId, Vec<Rhs>> {
        &self.productions
    }

    /// Name of an interned symbol.
    pub fn name(&self, id: SymbolId) -> &str {
        self.symbols.name(id)
    }

    /// Check if a symbol is a terminal.
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.symbols.is_terminal(id)
    }

    /// Alternatives of the nonterminal called `name`, if it has any entry.
    pub fn productions_of(&self, name: &str) -> Option<&[Rhs]> {
        let id = self.symbols.lookup(name)?;
        self.productions.get(&id).map(Vec::as_slice)
    }

    /// Whether `lhs -> rhs` is one of the productions, by name.
    pub fn has_production(&self, lhs: &str, rhs: &[&str]) -> bool {
        self.productions_of(lhs).is_some_and(|alternatives| {
            alternatives.iter().any(|alt| {
                alt.len() == rhs.len()
                    && alt
                        .iter()
                        .zip(rhs)
                        .all(|(&id, name)| self.symbols.name(id) == *name)
            })
        })
    }

    /// Check if `name` is one of the nonterminals.
    pub fn has_nonterminal(&self, name: &str) -> bool {
        self.symbols
            .lookup(name)
            .is_some_and(|id| self.nonterminals.contains(&id))
    }

    /// Total number of alternatives over all nonterminals.
    pub fn production_count(&self) -> usize {
        self.productions.values().map(Vec::len).sum()
    }

    /// Whether `symbol` occurs on any right-hand side.
    pub fn occurs_on_rhs(&self, symbol: SymbolId) -> bool {
        self.productions
            .values()
            .flatten()
            .any(|rhs| rhs.contains(&symbol))
    }

    /// Chomsky hierarchy type of this grammar.
    pub fn classify(&self) -> ChomskyType {
        let rules: Vec<GeneralRule> = self
            .productions
            .iter()
            .flat_map(|(&lhs, alternatives)| {
                alternatives.iter().map(move |rhs| GeneralRule {
                    lhs: vec![lhs],
                    rhs: rhs.clone(),
                })
            })
            .collect();
        classify(&self.symbols, &rules)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (&lhs, alternatives) in &self.productions {
            let rendered: Vec<String> = alternatives
                .iter()
                .map(|rhs| self.symbols.render(rhs))
                .collect();
            writeln!(f, "{} -> {}", self.symbols.name(lhs), rendered.join(" | "))?;
        }
        Ok(())
    }
}

/// Incremental construction of a [`Grammar`].
///
/// Undeclared kinds are inferred: left-hand sides are nonterminals, and so
/// is any right-hand name with an uppercase initial. Declaring a set makes
/// it closed, so a name inferred into that set must appear in it; the other
/// set is still inferred.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    start: Option<String>,
    nonterminals: Option<Vec<String>>,
    terminals: Option<Vec<String>>,
    productions: Vec<(String, Vec<String>)>,
}

impl GrammarBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start symbol; defaults to the first left-hand side.
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Declare the nonterminal set.
    pub fn nonterminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nonterminals = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the terminal set.
    pub fn terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Add `lhs -> rhs`; an empty `rhs` is the epsilon production.
    pub fn production<I, S>(mut self, lhs: impl Into<String>, rhs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.productions
            .push((lhs.into(), rhs.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a production in the single-character encoding: every character
    /// of `rhs` is one symbol and `""` is epsilon.
    pub fn char_production(self, lhs: impl Into<String>, rhs: &str) -> Self {
        let symbols: Vec<String> = rhs.chars().map(String::from).collect();
        self.production(lhs, symbols)
    }

    /// Resolve names and build the grammar.
    pub fn build(self) -> Result<Grammar> {
        let start_name = match (&self.start, self.productions.first()) {
            (Some(start), _) => start.clone(),
            (None, Some((lhs, _))) => lhs.clone(),
            (None, None) => return Err(FormLangError::EmptyGrammarDefinition),
        };

        let mut symbols = SymbolTable::new();
        let declared_nonterminals = self.nonterminals.is_some();
        let declared_terminals = self.terminals.is_some();

        for name in self.nonterminals.iter().flatten() {
            symbols.intern(name, SymbolKind::Nonterminal)?;
        }
        for name in self.terminals.iter().flatten() {
            symbols.intern(name, SymbolKind::Terminal)?;
        }
        if !declared_nonterminals {
            symbols.intern(&start_name, SymbolKind::Nonterminal)?;
            for (lhs, _) in &self.productions {
                symbols.intern(lhs, SymbolKind::Nonterminal)?;
            }
        }

        let lhs_names: HashSet<&str> = self.productions.iter().map(|(l, _)| l.as_str()).collect();
        let resolve = |symbols: &mut SymbolTable, name: &str| -> Result<SymbolId> {
            if let Some(id) = symbols.lookup(name) {
                return Ok(id);
            }
            let kind = if lhs_names.contains(name) {
                SymbolKind::Nonterminal
            } else {
                SymbolKind::infer(name)
            };
            let declared = match kind {
                SymbolKind::Nonterminal => declared_nonterminals,
                SymbolKind::Terminal => declared_terminals,
            };
            if declared {
                return Err(FormLangError::SymbolNotDeclared(name.to_string()));
            }
            symbols.intern(name, kind)
        };

        let start = resolve(&mut symbols, &start_name)?;
        if !symbols.is_nonterminal(start) {
            return Err(FormLangError::SymbolNotDeclared(start_name));
        }

        let mut productions: IndexMap<SymbolId, Vec<Rhs>> = IndexMap::new();
        for (lhs, rhs) in &self.productions {
            let lhs_id = resolve(&mut symbols, lhs)?;
            if !symbols.is_nonterminal(lhs_id) {
                return Err(FormLangError::SymbolNotDeclared(lhs.clone()));
            }
            let rhs_ids = rhs
                .iter()
                .map(|name| resolve(&mut symbols, name))
                .collect::<Result<Rhs>>()?;
            productions.entry(lhs_id).or_default().push(rhs_ids);
        }

        let mut grammar = Grammar::from_parts(symbols, start, productions);
        // Declared symbols stay in the sets even when no rule mentions them.
        if declared_nonterminals || declared_terminals {
            for (id, _, kind) in grammar.symbols.iter() {
                match kind {
                    SymbolKind::Nonterminal => grammar.nonterminals.insert(id),
                    SymbolKind::Terminal => grammar.terminals.insert(id),
                };
            }
        }
        Ok(grammar)
    }
}
