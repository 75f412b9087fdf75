//! `nq`: apply a Python lambda to every line of STDIN.
//!
//! Each line is decoded (JSON by default), handed to the user's function and
//! the result written back out, one line per value. `--filter` keeps the
//! lines the function accepts, `--reduce <seed>` folds the whole stream into
//! one value emitted when input ends.

use std::io::{self, BufRead, IsTerminal, Write};

use log::info;
use pyo3::prelude::*;

pub mod cli;
pub mod codec;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod mode;
pub mod resolver;
pub mod utility;

pub use cli::{parse_args, Command, Options, USAGE};
pub use codec::{LineDecoder, LineEncoder};
pub use dispatch::{Dispatcher, Summary};
pub use error::{NqError, NqResult};
pub use mode::Mode;
pub use resolver::{Callable, FunctionResolver, SharedContext};
pub use utility::UtilityBelt;

pub fn run_from_env() -> NqResult<()>
{
    run_from_args(std::env::args().skip(1))
}

pub fn run_from_args<I>(args: I) -> NqResult<()>
where
    I: IntoIterator<Item = String>,
{
    match parse_args(args)?
    {
        Command::Help => println!("{}", USAGE.trim()),
        Command::Version => println!("nq {}", env!("CARGO_PKG_VERSION")),
        Command::Run(options) =>
        {
            let stdin = io::stdin();
            if stdin.is_terminal()
            {
                info!("reading lines from the terminal, end input with Ctrl-D");
            }
            run(&options, stdin.lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}

/// Validate `options`, resolve the function and stream `input` to `output`.
/// Every configuration problem is reported before `input` is read.
pub fn run<R, W>(options: &Options, input: R, output: W) -> NqResult<Summary>
where
    R: BufRead,
    W: Write,
{
    let mode = Mode::select(options)?;

    Python::with_gil(|py| {
        let context = SharedContext::new(py)?;
        let belt = UtilityBelt::select(options.not_fp);
        let callable = FunctionResolver::new(py, belt).resolve(options.function.as_deref(), &context, &mode)?;
        let dispatcher = Dispatcher::new(
            py,
            &mode,
            callable,
            LineDecoder::new(options.string_input),
            LineEncoder::new(options.string_output),
        )?;
        dispatcher.run(input, output)
    })
}
