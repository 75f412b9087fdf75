use pyo3::prelude::*;

const PRELUDE: &str = include_str!("utility.py");

/// Which flavor of helpers the expression sees as `_`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UtilityBelt
{
    /// Auto-curried, data-last: `_.map(f)(xs)`.
    #[default]
    Functional,
    /// Data-first: `_.map(xs, f)`.
    Standard,
}

impl UtilityBelt
{
    pub fn select(not_fp: bool) -> Self
    {
        if not_fp
        {
            UtilityBelt::Standard
        }
        else
        {
            UtilityBelt::Functional
        }
    }

    fn namespace(self) -> &'static str
    {
        match self
        {
            UtilityBelt::Functional => "fp",
            UtilityBelt::Standard => "std",
        }
    }

    /// Compile the prelude and return the namespace for this flavor.
    pub fn load<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>>
    {
        let module = PyModule::from_code_bound(py, PRELUDE, "nq_utility.py", "nq_utility")?;
        module.getattr(self.namespace())
    }
}
