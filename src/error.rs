use pyo3::PyErr;
use thiserror::Error;

pub type NqResult<T> = Result<T, NqError>;

/// Every failure is fatal: nothing in the crate catches one of these and
/// keeps going.
#[derive(Debug, Error)]
pub enum NqError
{
    /// Bad flags, missing or unusable expression, invalid reduce seed.
    /// Always raised before the first line is read.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("line {line}: input is not valid JSON ({source}): {text}")]
    Decode
    {
        line: usize,
        text: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode output value: {0}")]
    Encode(String),

    /// The user's function raised while handling an input line.
    #[error("function raised on line {line}: {source}")]
    Callable
    {
        line: usize,
        #[source]
        source: PyErr,
    },

    #[error("line {line}: cannot read input: {source}")]
    Read
    {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// The reader on the other end of STDOUT went away (`nq ... | head -1`).
    /// The stream driver treats this as the end of output.
    #[error("output closed")]
    OutputClosed,

    #[error("python error: {0}")]
    Interpreter(#[from] PyErr),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NqError
{
    pub(crate) fn config(message: impl Into<String>) -> Self
    {
        Self::Configuration(message.into())
    }
}
