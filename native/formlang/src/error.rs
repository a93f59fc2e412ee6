//! Error type shared by every grammar and automaton operation.

/// Failures reported by model construction, conversion, normalization and
/// generation. Every variant is recoverable at the call boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormLangError {
    #[error("state `{0}` must be a prefix followed by a nonnegative integer, e.g. `q3`")]
    InvalidStateNameFormat(String),

    #[error("production `{nonterminal} -> {production}` is not of the form `a` or `a B`")]
    UnsupportedProductionForm {
        nonterminal: String,
        production: String,
    },

    #[error("unit productions form a cycle: {}", .0.join(" -> "))]
    CyclicUnitProductions(Vec<String>),

    #[error("derivation did not terminate within {0} expansion steps")]
    GenerationBudgetExceeded(usize),

    #[error("no productions supplied and no start symbol given")]
    EmptyGrammarDefinition,

    #[error("symbol `{0}` is not declared")]
    SymbolNotDeclared(String),

    #[error("symbol `{0}` is declared both as a terminal and as a nonterminal")]
    ConflictingSymbolKind(String),

    #[error("invalid symbol name {0:?}")]
    InvalidSymbolName(String),

    #[error("malformed rule {0:?}: expected `Lhs -> rhs | rhs`")]
    MalformedRule(String),

    #[error("automaton has no start state")]
    MissingStartState,

    #[error("states {0} and {1} map to the same name `{2}`")]
    StateNameCollision(String, String, String),

    #[error("nonterminal `{0}` has no productions to expand")]
    NoProductions(String),
}

pub type Result<T, E = FormLangError> = std::result::Result<T, E>;
