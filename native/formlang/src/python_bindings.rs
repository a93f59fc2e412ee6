//! PyO3 bindings for grammars and automata.

use crate::automaton::{Automaton, AutomatonBuilder};
use crate::convert::StateNaming;
use crate::error::FormLangError;
use crate::grammar::{GeneratorOptions, Grammar, GrammarBuilder, StringGenerator};
use indexmap::IndexMap;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rand::SeedableRng;
use rand::rngs::StdRng;

impl From<FormLangError> for PyErr {
    fn from(err: FormLangError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// A grammar whose rules each rewrite a single nonterminal.
#[pyclass(name = "Grammar", module = "formlang.grammar")]
#[derive(Clone)]
pub struct PyGrammar {
    grammar: Grammar,
}

#[pymethods]
impl PyGrammar {
    /// Parse rules written one per line as `S -> a B | ε`.
    #[new]
    fn new(text: &str) -> PyResult<Self> {
        Ok(Self {
            grammar: Grammar::parse(text)?,
        })
    }

    /// Build from `(lhs, [symbols...])` pairs; an empty list is epsilon.
    #[staticmethod]
    #[pyo3(signature = (rules, start=None))]
    fn from_rules(rules: Vec<(String, Vec<String>)>, start: Option<String>) -> PyResult<Self> {
        let mut builder = GrammarBuilder::new();
        if let Some(start) = start {
            builder = builder.start(start);
        }
        for (lhs, rhs) in rules {
            builder = builder.production(lhs, rhs);
        }
        Ok(Self {
            grammar: builder.build()?,
        })
    }

    #[getter]
    fn start(&self) -> &str {
        self.grammar.start_name()
    }

    /// Productions as an ordered dict of lists of symbol lists.
    #[getter]
    fn productions(&self) -> IndexMap<String, Vec<Vec<String>>> {
        let symbols = self.grammar.symbols();
        self.grammar
            .productions()
            .iter()
            .map(|(&lhs, alternatives)| {
                let alternatives = alternatives
                    .iter()
                    .map(|rhs| rhs.iter().map(|&s| symbols.name(s).to_string()).collect())
                    .collect();
                (symbols.name(lhs).to_string(), alternatives)
            })
            .collect()
    }

    /// Chomsky hierarchy type number, 0 to 3.
    fn classify(&self) -> u8 {
        self.grammar.classify().number()
    }

    fn is_chomsky_normal_form(&self) -> bool {
        self.grammar.is_chomsky_normal_form()
    }

    fn normalize_to_chomsky_form(&self) -> PyResult<PyGrammar> {
        Ok(Self {
            grammar: self.grammar.normalize_to_chomsky_form()?,
        })
    }

    fn to_automaton(&self) -> PyResult<PyFiniteAutomaton> {
        Ok(PyFiniteAutomaton {
            automaton: self.grammar.to_automaton()?,
        })
    }

    /// Derive a random string. Pass a seed for reproducible output.
    #[pyo3(signature = (seed=None, max_steps=GeneratorOptions::default().max_steps))]
    fn generate_string(&self, seed: Option<u64>, max_steps: usize) -> PyResult<String> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let options = GeneratorOptions { max_steps };
        Ok(StringGenerator::with_options(&self.grammar, rng, options).generate_string()?)
    }

    fn __str__(&self) -> String {
        self.grammar.to_string()
    }
}

/// A finite automaton over named states and symbols.
#[pyclass(name = "FiniteAutomaton", module = "formlang.automaton")]
#[derive(Clone)]
pub struct PyFiniteAutomaton {
    automaton: Automaton,
}

#[pymethods]
impl PyFiniteAutomaton {
    #[new]
    #[pyo3(signature = (states, alphabet, transitions, start, accept))]
    fn new(
        states: Vec<String>,
        alphabet: Vec<String>,
        transitions: Vec<(String, String, String)>,
        start: String,
        accept: Vec<String>,
    ) -> PyResult<Self> {
        let mut builder = AutomatonBuilder::new()
            .states(states)
            .alphabet(alphabet)
            .start(start)
            .accept(accept);
        for (source, symbol, destination) in transitions {
            builder = builder.transition(source, symbol, destination);
        }
        Ok(Self {
            automaton: builder.build()?,
        })
    }

    fn string_belongs_to_language(&self, input: &str) -> bool {
        self.automaton.string_belongs_to_language(input)
    }

    fn is_deterministic(&self) -> bool {
        self.automaton.is_deterministic()
    }

    fn is_empty(&self) -> bool {
        self.automaton.is_empty()
    }

    fn convert_to_deterministic(&self) -> PyResult<PyFiniteAutomaton> {
        Ok(Self {
            automaton: self.automaton.to_deterministic()?.into_owned(),
        })
    }

    fn minimize(&self) -> PyResult<PyFiniteAutomaton> {
        Ok(Self {
            automaton: self.automaton.minimize()?,
        })
    }

    fn equivalent(&self, other: &PyFiniteAutomaton) -> PyResult<bool> {
        Ok(self.automaton.equivalent(&other.automaton)?)
    }

    /// Convert to a right-linear grammar. With `letters`, states named
    /// `prefix + N` become `A`, `B`, ... in index order.
    #[pyo3(signature = (letters=false))]
    fn to_grammar(&self, letters: bool) -> PyResult<PyGrammar> {
        let naming = if letters {
            StateNaming::Letters
        } else {
            StateNaming::Preserve
        };
        Ok(PyGrammar {
            grammar: self.automaton.to_grammar(naming)?,
        })
    }

    /// Graph view as a dict with `states`, `start`, `accept` and `edges`,
    /// where each edge is a `(source, destination, label)` tuple.
    fn to_graph<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let graph = self.automaton.to_graph();
        let edges: Vec<(String, String, String)> = graph
            .edges
            .into_iter()
            .map(|e| (e.source, e.destination, e.label))
            .collect();

        let dict = PyDict::new(py);
        dict.set_item("states", graph.states)?;
        dict.set_item("start", graph.start)?;
        dict.set_item("accept", graph.accept)?;
        dict.set_item("edges", edges)?;
        Ok(dict)
    }
}

/// Register the grammar submodule.
pub fn grammar(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGrammar>()?;
    Ok(())
}

/// Register the automaton submodule.
pub fn automaton(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFiniteAutomaton>()?;
    Ok(())
}
