//! Symbol interning for grammars.
//!
//! Grammar algorithms never look at symbol names: every terminal and
//! nonterminal is interned once into a [`SymbolTable`] and handled through
//! its [`SymbolId`] afterwards.

use crate::error::{FormLangError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A symbol identifier represented as a u32.
pub type SymbolId = u32;

/// Printed in place of an empty right-hand side.
pub const EPSILON: &str = "ε";

/// Whether a symbol is a terminal or a nonterminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

impl SymbolKind {
    /// Guess the kind of a bare name: an uppercase initial marks a
    /// nonterminal.
    pub fn infer(name: &str) -> Self {
        match name.chars().next() {
            Some(c) if c.is_uppercase() => SymbolKind::Nonterminal,
            _ => SymbolKind::Terminal,
        }
    }
}

/// Bidirectional mapping between symbol names and [`SymbolId`]s.
///
/// A name is interned with exactly one kind, so the terminal and nonterminal
/// namespaces never overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// Interned names; the index of a name is its id
    names: IndexSet<String>,
    /// Kind of each interned name, indexed by id
    kinds: Vec<SymbolKind>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name` with the given kind, returning the existing id when the
    /// name is already known with the same kind.
    pub fn intern(&mut self, name: &str, kind: SymbolKind) -> Result<SymbolId> {
        if name.is_empty() || name.chars().any(char::is_whitespace) || name == EPSILON {
            return Err(FormLangError::InvalidSymbolName(name.to_string()));
        }

        if let Some(id) = self.lookup(name) {
            if self.kind(id) != kind {
                return Err(FormLangError::ConflictingSymbolKind(name.to_string()));
            }
            return Ok(id);
        }

        let (index, _) = self.names.insert_full(name.to_string());
        self.kinds.push(kind);
        Ok(index as SymbolId)
    }

    /// Id of `name`, if interned.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.names.get_index_of(name).map(|i| i as SymbolId)
    }

    /// Name of an interned symbol. Panics on a handle from another table.
    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id as usize]
    }

    /// Kind of an interned symbol.
    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        self.kinds[id as usize]
    }

    /// Check if a symbol is a terminal.
    #[inline]
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Terminal
    }

    /// Check if a symbol is a nonterminal.
    #[inline]
    pub fn is_nonterminal(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Nonterminal
    }

    /// Intern a new symbol named `base`, appending `'` until the name is
    /// unused.
    pub fn fresh(&mut self, base: &str, kind: SymbolKind) -> Result<SymbolId> {
        let mut name = base.to_string();
        while self.names.contains(&name) {
            name.push('\'');
        }
        self.intern(&name, kind)
    }

    /// Intern `{prefix}{next}`, skipping names already taken. `next` only
    /// ever grows, so a counter shared across calls never hands out the
    /// same name twice.
    pub fn fresh_indexed(
        &mut self,
        prefix: &str,
        next: &mut usize,
        kind: SymbolKind,
    ) -> Result<SymbolId> {
        loop {
            let name = format!("{prefix}{next}");
            *next += 1;
            if !self.names.contains(&name) {
                return self.intern(&name, kind);
            }
        }
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing is interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(id, name, kind)` in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str, SymbolKind)> + '_ {
        self.names
            .iter()
            .zip(&self.kinds)
            .enumerate()
            .map(|(i, (name, &kind))| (i as SymbolId, name.as_str(), kind))
    }

    /// Render a right-hand side, using [`EPSILON`] for the empty sequence.
    pub fn render(&self, rhs: &[SymbolId]) -> String {
        if rhs.is_empty() {
            return EPSILON.to_string();
        }
        rhs.iter()
            .map(|&id| self.name(id))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let s = table.intern("Expr", SymbolKind::Nonterminal).unwrap();
        let again = table.intern("Expr", SymbolKind::Nonterminal).unwrap();
        assert_eq!(s, again);
        assert_eq!(table.len(), 1);
        assert_eq!(table.name(s), "Expr");
        assert!(table.is_nonterminal(s));
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let mut table = SymbolTable::new();
        table.intern("id", SymbolKind::Terminal).unwrap();
        assert_eq!(
            table.intern("id", SymbolKind::Nonterminal),
            Err(FormLangError::ConflictingSymbolKind("id".into()))
        );
    }

    #[test]
    fn test_rejects_empty_and_epsilon_names() {
        let mut table = SymbolTable::new();
        assert!(table.intern("", SymbolKind::Terminal).is_err());
        assert!(table.intern("ε", SymbolKind::Terminal).is_err());
        assert!(table.intern("a b", SymbolKind::Terminal).is_err());
    }

    #[test]
    fn test_fresh_names() {
        let mut table = SymbolTable::new();
        table.intern("S", SymbolKind::Nonterminal).unwrap();
        table.intern("S'", SymbolKind::Nonterminal).unwrap();
        let fresh = table.fresh("S'", SymbolKind::Nonterminal).unwrap();
        assert_eq!(table.name(fresh), "S''");

        table.intern("X1", SymbolKind::Nonterminal).unwrap();
        let mut next = 0;
        let x0 = table.fresh_indexed("X", &mut next, SymbolKind::Nonterminal).unwrap();
        let x2 = table.fresh_indexed("X", &mut next, SymbolKind::Nonterminal).unwrap();
        assert_eq!(table.name(x0), "X0");
        assert_eq!(table.name(x2), "X2");
        assert_eq!(next, 3);
    }

    #[test]
    fn test_beyond_single_letters() {
        let mut table = SymbolTable::new();
        let mut next = 0;
        for _ in 0..40 {
            table.fresh_indexed("N", &mut next, SymbolKind::Nonterminal).unwrap();
        }
        assert_eq!(table.len(), 40);
        assert_eq!(table.lookup("N39"), Some(39));
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(SymbolKind::infer("Term"), SymbolKind::Nonterminal);
        assert_eq!(SymbolKind::infer("id"), SymbolKind::Terminal);
        assert_eq!(SymbolKind::infer("+"), SymbolKind::Terminal);
    }
}
