//! Errors that abort an assembly run. None of them are recoverable:
//! the first one stops the pipeline and no object file is written.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A normalized line matched neither `push #N` nor a bare mnemonic.
    #[error("invalid expression \"{text}\" on line {line}")]
    InvalidExpression { line: usize, text: String },

    /// The line source failed while being read.
    #[error("unable to read source: {0}")]
    Read(#[from] io::Error),

    #[error("{}: {}", path.display(), source)]
    File { path: PathBuf, source: io::Error },

    #[error("{0}")]
    Usage(String),
}

impl AssemblyError {
    /// Attaches a path to a bare read error so it can be reported
    /// against the file it came from.
    pub fn at_path(self, path: impl Into<PathBuf>) -> AssemblyError {
        match self {
            AssemblyError::Read(source) => AssemblyError::File { path: path.into(), source },
            other => other,
        }
    }
}
