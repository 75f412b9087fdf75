//! Turns the expression source into something we can call once per line.

use log::debug;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rustpython_parser::{ast, Parse};

use crate::convert::type_name;
use crate::error::{NqError, NqResult};
use crate::mode::Mode;
use crate::utility::UtilityBelt;

/// Namespace visible to the expression as `ctx`. Lives for the whole run, so
/// an expression can keep counters or caches on it between lines.
pub struct SharedContext<'py>(Bound<'py, PyAny>);

impl<'py> SharedContext<'py>
{
    pub fn new(py: Python<'py>) -> NqResult<Self>
    {
        let namespace = PyModule::import_bound(py, "types")?.getattr("SimpleNamespace")?.call0()?;
        Ok(Self(namespace))
    }

    pub fn as_any(&self) -> &Bound<'py, PyAny>
    {
        &self.0
    }
}

/// The user's function, already checked to be callable.
pub struct Callable<'py>
{
    function: Bound<'py, PyAny>,
}

impl<'py> Callable<'py>
{
    /// Map/filter invocation for input line `line`.
    pub fn call1(&self, line: usize, value: &Bound<'py, PyAny>) -> NqResult<Bound<'py, PyAny>>
    {
        self.function
            .call1((value.clone(),))
            .map_err(|source| NqError::Callable { line, source })
    }

    /// Reduce invocation for input line `line`.
    pub fn call2(
        &self,
        line: usize,
        accumulator: &Bound<'py, PyAny>,
        value: &Bound<'py, PyAny>,
    ) -> NqResult<Bound<'py, PyAny>>
    {
        self.function
            .call1((accumulator.clone(), value.clone()))
            .map_err(|source| NqError::Callable { line, source })
    }
}

pub struct FunctionResolver<'py>
{
    py: Python<'py>,
    belt: UtilityBelt,
}

impl<'py> FunctionResolver<'py>
{
    pub fn new(py: Python<'py>, belt: UtilityBelt) -> Self
    {
        Self { py, belt }
    }

    pub fn resolve(
        &self,
        source: Option<&str>,
        context: &SharedContext<'py>,
        mode: &Mode,
    ) -> NqResult<Callable<'py>>
    {
        let source = match source
        {
            Some(source) if !source.trim().is_empty() => source.trim(),
            _ =>
            {
                return Err(NqError::config(
                    "no function provided; did you pass an invalid option? run nq --help to see available options",
                ))
            }
        };

        if let Some(arity) = LambdaArity::of(source)
        {
            if !arity.accepts(mode.arity())
            {
                return Err(NqError::config(format!(
                    "{} mode calls the function with {} argument(s), but the lambda takes {}",
                    mode.name(),
                    mode.arity(),
                    arity
                )));
            }
        }

        let globals = PyDict::new_bound(self.py);
        globals.set_item("__builtins__", PyModule::import_bound(self.py, "builtins")?)?;
        globals.set_item("_", self.belt.load(self.py)?)?;
        globals.set_item("ctx", context.as_any())?;

        let function = self
            .py
            .eval_bound(source, Some(&globals), None)
            .map_err(|err| NqError::config(format!("failed to evaluate {source:?}: {err}")))?;

        if !function.is_callable()
        {
            let shown = function
                .repr()
                .map(|repr| repr.to_string())
                .unwrap_or_else(|_| source.to_owned());
            return Err(NqError::config(format!(
                "{shown} is a '{}' not a function",
                type_name(&function)
            )));
        }

        debug!("resolved {source:?} with {:?} helpers", self.belt);
        Ok(Callable { function })
    }
}

/// How many positional arguments a lambda literal accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LambdaArity
{
    required: usize,
    /// `None` when the lambda has `*args`.
    max: Option<usize>,
}

impl LambdaArity
{
    /// Only lambda literals are inspected; anything else (including sources
    /// this parser rejects) is left for the interpreter to judge.
    fn of(source: &str) -> Option<Self>
    {
        match ast::Expr::parse(source, "<expression>")
        {
            Ok(ast::Expr::Lambda(lambda)) =>
            {
                let args = &lambda.args;
                let positional: Vec<&ast::ArgWithDefault> =
                    args.posonlyargs.iter().chain(args.args.iter()).collect();
                let required = positional.iter().filter(|arg| arg.default.is_none()).count();
                let max = if args.vararg.is_some()
                {
                    None
                }
                else
                {
                    Some(positional.len())
                };
                Some(Self { required, max })
            }
            Ok(_) => None,
            Err(err) =>
            {
                debug!("skipping arity check: {err}");
                None
            }
        }
    }

    fn accepts(self, count: usize) -> bool
    {
        count >= self.required && self.max.map_or(true, |max| count <= max)
    }
}

impl std::fmt::Display for LambdaArity
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self.max
        {
            Some(max) if max == self.required => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {max}", self.required),
            None => write!(f, "{} or more", self.required),
        }
    }
}
