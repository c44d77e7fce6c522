//! Reporting the outcome of a run to the invoking process

use clap::ValueEnum;
use expunge_common::{ErrorKind, ExpungeError, Result};
use expunge_mongodb::DeleteResult;
use serde::Serialize;
use std::io::{self, Stderr, Stdout, Write};

/// Exit status for a completed run, including "nothing matched"
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for any configuration, connection, identifier or operation error
pub const EXIT_FAILURE: u8 = 1;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Bare deleted count on stdout
    #[default]
    Text,
    /// JSON objects on stdout / stderr
    Json,
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    message: &'a str,
}

/// Terminal sink for a run: prints the outcome and picks the exit status
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
    format: OutputFormat,
}

impl Reporter<Stdout, Stderr> {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(io::stdout(), io::stderr(), format)
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E, format: OutputFormat) -> Self {
        Self { out, err, format }
    }

    /// Prints `outcome` and returns the process exit status
    pub fn report(&mut self, outcome: &Result<DeleteResult>) -> u8 {
        match outcome {
            Ok(result) => match self.write_result(result) {
                Ok(()) => EXIT_SUCCESS,
                // stdout is gone (closed pipe); nothing else to tell
                Err(_) => EXIT_FAILURE,
            },
            Err(error) => {
                let _ = self.write_error(error);
                EXIT_FAILURE
            }
        }
    }

    fn write_result(&mut self, result: &DeleteResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", result.deleted_count())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, result)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn write_error(&mut self, error: &ExpungeError) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.err, "Error: {}", error)?,
            OutputFormat::Json => {
                let report = ErrorReport {
                    error: ErrorBody {
                        kind: error.kind(),
                        message: error.message(),
                    },
                };
                serde_json::to_writer(&mut self.err, &report)?;
                writeln!(self.err)?;
            }
        }
        self.err.flush()
    }
}
