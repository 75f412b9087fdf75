//! Command line surface of `nq`.

use log::warn;

use crate::error::{NqError, NqResult};

pub const USAGE: &str = r#"
nq - Map, filter or reduce JSON lines from STDIN with a Python lambda
Usage: nq [options] <py lambda>

Options:
  -r, --reduce <json>   reduce STDIN to a single value, starting from <json>
  -f, --filter          keep the lines for which the lambda is truthy
      --not-fp          `_` holds data-first helpers instead of curried ones
  -i, --string-input    don't JSON-decode input lines
  -o, --string-output   don't JSON-encode output lines
  -h, --help            print this help
  -V, --version         print the version

The lambda sees `_` (utility helpers) and `ctx` (a namespace shared by
every call).

Examples:
  seq 3 | nq 'lambda v: v * 2'
  seq 4 | nq -f 'lambda v: v % 2 == 0'
  seq 3 | nq -r 0 'lambda acc, v: acc + v'
  ps | nq -io 'lambda line: line.upper()'
"#;

/// Options for a run, before any of them are validated against each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options
{
    /// Raw JSON text of the reduce seed, present when `--reduce` was given.
    pub reduce: Option<String>,
    pub filter: bool,
    pub not_fp: bool,
    pub string_input: bool,
    pub string_output: bool,
    /// Source of the expression to evaluate.
    pub function: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command
{
    Help,
    Version,
    Run(Options),
}

pub fn parse_args<I>(args: I) -> NqResult<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut positionals: Vec<String> = Vec::new();
    let mut args = args.into_iter();

    while let Some(token) = args.next()
    {
        match token.as_str()
        {
            "--" =>
            {
                positionals.extend(args.by_ref());
            }
            "--help" => return Ok(Command::Help),
            "--version" => return Ok(Command::Version),
            "--reduce" =>
            {
                options.reduce = Some(reduce_seed(args.next())?);
            }
            "--filter" => options.filter = true,
            "--not-fp" => options.not_fp = true,
            "--string-input" => options.string_input = true,
            "--string-output" => options.string_output = true,
            long if long.starts_with("--") =>
            {
                match long.split_once('=')
                {
                    Some(("--reduce", seed)) => options.reduce = Some(seed.to_owned()),
                    _ => return Err(NqError::config(format!("unknown option: {long}"))),
                }
            }
            short if short.starts_with('-') && short.len() > 1 =>
            {
                let cluster = &short[1 ..];
                for (offset, flag) in cluster.char_indices()
                {
                    match flag
                    {
                        'h' => return Ok(Command::Help),
                        'V' => return Ok(Command::Version),
                        'f' => options.filter = true,
                        'i' => options.string_input = true,
                        'o' => options.string_output = true,
                        'r' =>
                        {
                            // `-r0` carries its seed inline, `-r 0` in the next token
                            let rest = &cluster[offset + 1 ..];
                            options.reduce = Some(if rest.is_empty()
                            {
                                reduce_seed(args.next())?
                            }
                            else
                            {
                                rest.to_owned()
                            });
                            break;
                        }
                        other => return Err(NqError::config(format!("unknown option: -{other}"))),
                    }
                }
            }
            _ => positionals.push(token),
        }
    }

    let mut positionals = positionals.into_iter();
    options.function = positionals.next();
    let ignored: Vec<String> = positionals.collect();
    if !ignored.is_empty()
    {
        warn!("ignoring extra arguments: {ignored:?}");
    }

    Ok(Command::Run(options))
}

fn reduce_seed(next: Option<String>) -> NqResult<String>
{
    next.ok_or_else(|| NqError::config("--reduce requires a JSON seed value, e.g. --reduce 0"))
}
