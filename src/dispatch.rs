//! Per-line map/filter/reduce driver.

use std::io::{BufRead, Write};

use log::debug;
use pyo3::prelude::*;

use crate::codec::{LineDecoder, LineEncoder};
use crate::convert::to_python;
use crate::error::{NqError, NqResult};
use crate::mode::Mode;
use crate::resolver::Callable;

/// Line counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary
{
    pub lines_read: usize,
    pub lines_written: usize,
}

/// Mode plus whatever state it carries. Only reduce keeps anything
/// between lines.
enum Stage<'py>
{
    Map,
    Filter,
    Reduce
    {
        accumulator: Bound<'py, PyAny>,
    },
}

pub struct Dispatcher<'py>
{
    py: Python<'py>,
    stage: Stage<'py>,
    callable: Callable<'py>,
    decoder: LineDecoder,
    encoder: LineEncoder,
    summary: Summary,
}

impl<'py> Dispatcher<'py>
{
    pub fn new(
        py: Python<'py>,
        mode: &Mode,
        callable: Callable<'py>,
        decoder: LineDecoder,
        encoder: LineEncoder,
    ) -> NqResult<Self>
    {
        let stage = match mode
        {
            Mode::Map => Stage::Map,
            Mode::Filter => Stage::Filter,
            Mode::Reduce { seed } => Stage::Reduce {
                accumulator: to_python(py, seed)?,
            },
        };
        Ok(Self {
            py,
            stage,
            callable,
            decoder,
            encoder,
            summary: Summary::default(),
        })
    }

    /// Handle input line number `number` (1-based). Map and filter write to
    /// `out` straight away; reduce only updates its accumulator.
    pub fn feed<W: Write>(&mut self, number: usize, line: &str, out: &mut W) -> NqResult<()>
    {
        let value = self.decoder.decode(self.py, number, line)?;
        self.summary.lines_read += 1;

        match &mut self.stage
        {
            Stage::Map =>
            {
                let mapped = self.callable.call1(number, &value)?;
                self.encoder.emit(out, &mapped)?;
                self.summary.lines_written += 1;
            }
            Stage::Filter =>
            {
                let keep = self.callable.call1(number, &value)?;
                let keep = keep
                    .is_truthy()
                    .map_err(|source| NqError::Callable { line: number, source })?;
                if keep
                {
                    self.encoder.emit(out, &value)?;
                    self.summary.lines_written += 1;
                }
            }
            Stage::Reduce { accumulator } =>
            {
                *accumulator = self.callable.call2(number, accumulator, &value)?;
            }
        }
        Ok(())
    }

    /// End of input. Reduce emits its accumulator here, exactly once.
    pub fn finish<W: Write>(mut self, out: &mut W) -> NqResult<Summary>
    {
        if let Stage::Reduce { accumulator } = &self.stage
        {
            self.encoder.emit(out, accumulator)?;
            self.summary.lines_written += 1;
        }
        Ok(self.summary)
    }

    /// Drive the whole stream: one line is fully handled before the next is
    /// read. If the reader of `out` goes away the run ends early but cleanly.
    pub fn run<R: BufRead, W: Write>(mut self, input: R, mut out: W) -> NqResult<Summary>
    {
        for (index, line) in input.lines().enumerate()
        {
            let number = index + 1;
            let line = line.map_err(|source| NqError::Read { line: number, source })?;
            match self.feed(number, &line, &mut out)
            {
                Ok(()) => {}
                Err(NqError::OutputClosed) =>
                {
                    debug!("output closed at line {number}, stopping");
                    return Ok(self.summary);
                }
                Err(err) => return Err(err),
            }
        }

        let before_finish = self.summary;
        let summary = match self.finish(&mut out)
        {
            Err(NqError::OutputClosed) =>
            {
                debug!("output closed before the final value");
                before_finish
            }
            result => result?,
        };
        debug!(
            "read {} line(s), wrote {} line(s)",
            summary.lines_read, summary.lines_written
        );
        Ok(summary)
    }
}
