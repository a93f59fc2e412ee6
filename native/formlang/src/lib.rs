//! Regular and context-free grammars, finite automata, and the conversions
//! between them.
//!
//! - [`Grammar`] and [`Automaton`] convert into each other through
//!   [`Grammar::to_automaton`] and [`Automaton::to_grammar`]
//! - [`Automaton::to_deterministic`] runs the subset construction
//! - [`Grammar::normalize_to_chomsky_form`] runs the [`ChomskyNormalizer`]
//! - [`StringGenerator`] samples strings from a grammar
//!
//! Every fallible operation returns [`FormLangError`].

pub mod automaton;
pub mod cnf;
pub mod convert;
pub mod error;
pub mod grammar;
pub mod state;
pub mod symbol;

#[cfg(feature = "python")]
mod python_bindings;

pub use automaton::{Automaton, AutomatonBuilder, AutomatonGraph, GraphEdge};
pub use cnf::{ChomskyNormalizer, NormalizerOptions};
pub use convert::StateNaming;
pub use error::{FormLangError, Result};
pub use grammar::{
    ChomskyType, GeneratorOptions, Grammar, GrammarBuilder, StringGenerator,
};
pub use state::{StateId, StateSet};
pub use symbol::{SymbolId, SymbolKind, SymbolTable};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
fn import_submodule<'py>(
    py: Python<'py>,
    m: &Bound<'py, PyModule>,
    package: &str,
    name: &str,
    import_func: impl FnOnce(&Bound<'py, PyModule>) -> PyResult<()>,
) -> PyResult<()> {
    let submodule = PyModule::new(py, name)?;
    import_func(&submodule)?;

    // Make `import formlang.<name>` work
    let sys_modules = PyModule::import(py, "sys")?.getattr("modules")?;
    sys_modules.set_item(format!("{package}.{name}"), submodule.clone())?;

    m.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn formlang(m: &Bound<'_, PyModule>) -> PyResult<()> {
    import_submodule(m.py(), m, "formlang", "grammar", python_bindings::grammar)?;
    import_submodule(m.py(), m, "formlang", "automaton", python_bindings::automaton)?;
    Ok(())
}
