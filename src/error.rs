use std::io;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Misuse of the validator API. Input validity is reported through
/// [`Verdict`](crate::types::Verdict), never through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("reset destination must be empty, it already holds {len} bytes")]
    NonEmptyDestination { len: usize },
}

/// Errors surfaced by the `cxxrepl` front end.
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("line editor error: {0}")]
    Readline(#[from] ReadlineError),

    #[error("failed to read {path}: {source}")]
    Input { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}
