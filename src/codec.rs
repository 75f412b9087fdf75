use std::io::{self, ErrorKind, Write};

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter};
use serde_json::Value;

use crate::convert::{from_python, to_python};
use crate::error::{NqError, NqResult};

/// Longest slice of an offending line quoted back in a decode error.
const PREVIEW_CHARS: usize = 80;

/// Integral floats below this print in plain digits, above it with an exponent.
const PLAIN_DIGITS_LIMIT: f64 = 1e21;

/// Parse one JSON document without a nesting limit. Deep documents grow the
/// stack as they go instead of being rejected.
pub fn parse_json(text: &str) -> Result<Value, serde_json::Error>
{
    let mut json = serde_json::Deserializer::from_str(text);
    json.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Raw input line -> value handed to the function.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDecoder
{
    string_input: bool,
}

impl LineDecoder
{
    pub fn new(string_input: bool) -> Self
    {
        Self { string_input }
    }

    pub fn decode<'py>(&self, py: Python<'py>, number: usize, line: &str) -> NqResult<Bound<'py, PyAny>>
    {
        if self.string_input
        {
            return Ok(IntoPy::<PyObject>::into_py(line, py).into_bound(py));
        }

        let value = parse_json(line).map_err(|source| NqError::Decode {
            line: number,
            text: preview(line),
            source,
        })?;
        Ok(to_python(py, &value)?)
    }
}

/// Compact JSON, except that integral floats too wide for an integer are
/// written as plain digits (`18446744073709552000`, not `1.8446744073709552e19`).
struct LineFormatter;

impl Formatter for LineFormatter
{
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if value.fract() == 0.0 && value.abs() < PLAIN_DIGITS_LIMIT
        {
            write!(writer, "{value}")
        }
        else
        {
            CompactFormatter.write_f64(writer, value)
        }
    }
}

/// Value -> one line of output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEncoder
{
    string_output: bool,
}

impl LineEncoder
{
    pub fn new(string_output: bool) -> Self
    {
        Self { string_output }
    }

    pub fn encode(&self, value: &Bound<'_, PyAny>) -> NqResult<String>
    {
        if self.string_output
        {
            return Ok(value.str()?.extract::<String>()?);
        }

        let json = from_python(value)?;
        let mut bytes = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, LineFormatter);
        json.serialize(&mut serializer)
            .map_err(|err| NqError::Encode(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| NqError::Encode(err.to_string()))
    }

    /// Encode and write one newline-terminated line, flushing so downstream
    /// readers see it immediately. A reader that went away shows up as
    /// [`NqError::OutputClosed`].
    pub fn emit<W: Write>(&self, out: &mut W, value: &Bound<'_, PyAny>) -> NqResult<()>
    {
        let line = self.encode(value)?;
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|err| match err.kind()
            {
                ErrorKind::BrokenPipe => NqError::OutputClosed,
                _ => NqError::Io(err),
            })
    }
}

fn preview(line: &str) -> String
{
    match line.char_indices().nth(PREVIEW_CHARS)
    {
        Some((cut, _)) => format!("{}...", &line[.. cut]),
        None => line.to_owned(),
    }
}
