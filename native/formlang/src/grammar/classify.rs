//! Chomsky hierarchy classification.

use crate::error::{FormLangError, Result};
use crate::symbol::{EPSILON, SymbolId, SymbolKind, SymbolTable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the Chomsky hierarchy; the discriminant is the type number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChomskyType {
    Unrestricted = 0,
    ContextSensitive = 1,
    ContextFree = 2,
    Regular = 3,
}

impl ChomskyType {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ChomskyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChomskyType::Unrestricted => "unrestricted",
            ChomskyType::ContextSensitive => "context-sensitive",
            ChomskyType::ContextFree => "context-free",
            ChomskyType::Regular => "regular",
        };
        write!(f, "type {} ({name})", self.number())
    }
}

/// A rewriting rule with an arbitrary left-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralRule {
    pub lhs: Vec<SymbolId>,
    pub rhs: Vec<SymbolId>,
}

impl GeneralRule {
    /// Parse `a B -> a B C`, interning names into `symbols` with their
    /// inferred kind. An `ε` right-hand side is empty.
    pub fn parse_line(symbols: &mut SymbolTable, line: &str) -> Result<Self> {
        let Some((lhs, rhs)) = line.split_once("->") else {
            return Err(FormLangError::MalformedRule(line.to_string()));
        };

        let mut intern_all = |side: &str| -> Result<Vec<SymbolId>> {
            side.split_whitespace()
                .filter(|s| *s != EPSILON)
                .map(|name| symbols.intern(name, SymbolKind::infer(name)))
                .collect()
        };

        let lhs = intern_all(lhs)?;
        let rhs = intern_all(rhs)?;
        if lhs.is_empty() {
            return Err(FormLangError::MalformedRule(line.to_string()));
        }
        Ok(Self { lhs, rhs })
    }
}

/// Classify a rule set into the most restrictive type that admits it.
pub fn classify(symbols: &SymbolTable, rules: &[GeneralRule]) -> ChomskyType {
    let single_nonterminal_lhs = rules
        .iter()
        .all(|rule| rule.lhs.len() == 1 && symbols.is_nonterminal(rule.lhs[0]));

    if single_nonterminal_lhs {
        let right_linear = rules.iter().all(|r| is_right_linear(symbols, &r.rhs));
        let left_linear = rules.iter().all(|r| is_left_linear(symbols, &r.rhs));
        if right_linear || left_linear {
            return ChomskyType::Regular;
        }
        return ChomskyType::ContextFree;
    }

    let every_lhs_has_nonterminal = rules
        .iter()
        .all(|rule| rule.lhs.iter().any(|&s| symbols.is_nonterminal(s)));
    if every_lhs_has_nonterminal && is_noncontracting(symbols, rules) {
        ChomskyType::ContextSensitive
    } else {
        ChomskyType::Unrestricted
    }
}

/// `t* N?`: terminals optionally followed by one trailing nonterminal.
fn is_right_linear(symbols: &SymbolTable, rhs: &[SymbolId]) -> bool {
    match rhs.split_last() {
        None => true,
        Some((_, init)) => init.iter().all(|&s| symbols.is_terminal(s)),
    }
}

/// `N? t*`: one leading nonterminal at most, then terminals.
fn is_left_linear(symbols: &SymbolTable, rhs: &[SymbolId]) -> bool {
    match rhs.split_first() {
        None => true,
        Some((_, tail)) => tail.iter().all(|&s| symbols.is_terminal(s)),
    }
}

/// No rule shrinks the sentential form, except `S -> ε` for a start symbol
/// that never appears on a right-hand side. The start symbol is the
/// left-hand side of the first rule.
fn is_noncontracting(symbols: &SymbolTable, rules: &[GeneralRule]) -> bool {
    let start = rules
        .first()
        .filter(|r| r.lhs.len() == 1 && symbols.is_nonterminal(r.lhs[0]))
        .map(|r| r.lhs[0]);

    rules.iter().all(|rule| {
        if rule.rhs.len() >= rule.lhs.len() && !rule.rhs.is_empty() {
            return true;
        }
        match start {
            Some(s) if rule.rhs.is_empty() && rule.lhs == [s] => {
                !rules.iter().any(|r| r.rhs.contains(&s))
            }
            _ => false,
        }
    })
}
