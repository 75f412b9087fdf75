//! Conversion between `serde_json` values and Python objects.

use std::collections::HashSet;

use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyList, PyLong, PyString, PyTuple};
use serde_json::{Map, Number, Value};

use crate::error::{NqError, NqResult};

/// Largest integer a JSON reader is guaranteed to hold exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn to_python<'py>(py: Python<'py>, value: &Value) -> PyResult<Bound<'py, PyAny>>
{
    let object: PyObject = match value
    {
        Value::Null => py.None(),
        Value::Bool(flag) => (*flag).into_py(py),
        Value::Number(number) =>
        {
            if let Some(int) = number.as_i64()
            {
                int.into_py(py)
            }
            else if let Some(uint) = number.as_u64()
            {
                uint.into_py(py)
            }
            else
            {
                number.as_f64().unwrap_or(f64::NAN).into_py(py)
            }
        }
        Value::String(text) => text.as_str().into_py(py),
        Value::Array(items) =>
        {
            let list = PyList::empty_bound(py);
            for item in items
            {
                list.append(to_python(py, item)?)?;
            }
            list.into_any().unbind()
        }
        Value::Object(entries) =>
        {
            let dict = PyDict::new_bound(py);
            for (key, item) in entries
            {
                dict.set_item(key, to_python(py, item)?)?;
            }
            dict.into_any().unbind()
        }
    };
    Ok(object.into_bound(py))
}

pub fn from_python(object: &Bound<'_, PyAny>) -> NqResult<Value>
{
    from_python_on(object, &mut HashSet::new())
}

/// `path` holds the ids of the containers being converted right now; meeting
/// one of them again means the value contains itself.
fn from_python_on(object: &Bound<'_, PyAny>, path: &mut HashSet<usize>) -> NqResult<Value>
{
    if object.is_none()
    {
        return Ok(Value::Null);
    }
    // bool is a subclass of int, so it has to be checked first
    if object.is_instance_of::<PyBool>()
    {
        return Ok(Value::Bool(object.extract::<bool>()?));
    }
    if object.is_instance_of::<PyLong>()
    {
        return int_to_json(object);
    }
    if object.is_instance_of::<PyFloat>()
    {
        return Ok(float_to_json(object.extract::<f64>()?));
    }
    if object.is_instance_of::<PyString>()
    {
        return Ok(Value::String(object.extract::<String>()?));
    }
    if !(object.is_instance_of::<PyList>() || object.is_instance_of::<PyTuple>() || object.is_instance_of::<PyDict>())
    {
        return Err(not_serializable(object));
    }

    let id = object.as_ptr() as usize;
    if !path.insert(id)
    {
        return Err(NqError::Encode(format!(
            "circular reference: a '{}' contains itself",
            type_name(object)
        )));
    }
    let converted = container_to_json(object, path);
    path.remove(&id);
    converted
}

fn container_to_json(object: &Bound<'_, PyAny>, path: &mut HashSet<usize>) -> NqResult<Value>
{
    if let Ok(list) = object.downcast::<PyList>()
    {
        return list
            .iter()
            .map(|item| from_python_on(&item, path))
            .collect::<NqResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(tuple) = object.downcast::<PyTuple>()
    {
        return tuple
            .iter()
            .map(|item| from_python_on(&item, path))
            .collect::<NqResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(dict) = object.downcast::<PyDict>()
    {
        let mut entries = Map::new();
        for (key, item) in dict.iter()
        {
            entries.insert(key_to_string(&key)?, from_python_on(&item, path)?);
        }
        return Ok(Value::Object(entries));
    }
    Err(not_serializable(object))
}

fn not_serializable(object: &Bound<'_, PyAny>) -> NqError
{
    NqError::Encode(format!(
        "object of type '{}' is not JSON serializable",
        type_name(object)
    ))
}

fn int_to_json(object: &Bound<'_, PyAny>) -> NqResult<Value>
{
    if let Ok(int) = object.extract::<i64>()
    {
        return Ok(Value::from(int));
    }
    if let Ok(uint) = object.extract::<u64>()
    {
        return Ok(Value::from(uint));
    }
    // wider than 64 bits: keep the magnitude, lose precision
    let wide = object
        .extract::<f64>()
        .map_err(|err| NqError::Encode(format!("integer {object} cannot be represented: {err}")))?;
    Ok(float_to_json(wide))
}

fn float_to_json(float: f64) -> Value
{
    if float.is_finite() && float.fract() == 0.0 && float.abs() < MAX_SAFE_INTEGER
    {
        return Value::from(float as i64);
    }
    Number::from_f64(float).map_or(Value::Null, Value::Number)
}

fn key_to_string(key: &Bound<'_, PyAny>) -> NqResult<String>
{
    if key.is_instance_of::<PyString>()
    {
        return Ok(key.extract::<String>()?);
    }
    if key.is_none()
    {
        return Ok("null".to_owned());
    }
    if key.is_instance_of::<PyBool>()
    {
        let flag = key.extract::<bool>()?;
        return Ok(flag.to_string());
    }
    if key.is_instance_of::<PyLong>() || key.is_instance_of::<PyFloat>()
    {
        return Ok(key.str()?.extract::<String>()?);
    }
    Err(NqError::Encode(format!(
        "keys must be str, int, float, bool or None, not '{}'",
        type_name(key)
    )))
}

pub(crate) fn type_name(object: &Bound<'_, PyAny>) -> String
{
    object
        .get_type()
        .getattr("__name__")
        .and_then(|name| name.extract::<String>())
        .unwrap_or_else(|_| "object".to_owned())
}
