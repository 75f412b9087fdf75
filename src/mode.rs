use log::debug;
use serde_json::Value;

use crate::cli::Options;
use crate::codec::parse_json;
use crate::error::{NqError, NqResult};

/// How each input line is handled. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode
{
    Map,
    Filter,
    /// Fold every line into one value, starting from `seed`.
    Reduce
    {
        seed: Value,
    },
}

impl Mode
{
    /// Pick the mode from the flags. The reduce seed is decoded here so a bad
    /// seed is reported before any input is touched.
    pub fn select(options: &Options) -> NqResult<Self>
    {
        let mode = match (&options.reduce, options.filter)
        {
            (Some(_), true) => return Err(NqError::config("cannot specify both 'reduce' and 'filter'")),
            (Some(seed), false) =>
            {
                let seed = parse_json(seed).map_err(|err| {
                    NqError::config(format!("reduce seed {seed:?} is not valid JSON: {err}"))
                })?;
                Mode::Reduce { seed }
            }
            (None, true) => Mode::Filter,
            (None, false) => Mode::Map,
        };
        debug!("selected {} mode", mode.name());
        Ok(mode)
    }

    /// Number of positional arguments the user's function is called with.
    pub fn arity(&self) -> usize
    {
        match self
        {
            Mode::Map | Mode::Filter => 1,
            Mode::Reduce { .. } => 2,
        }
    }

    pub fn name(&self) -> &'static str
    {
        match self
        {
            Mode::Map => "map",
            Mode::Filter => "filter",
            Mode::Reduce { .. } => "reduce",
        }
    }
}
