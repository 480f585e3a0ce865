use std::{error::Error as StdError, fmt, io, result::Result as StdResult};

/// A type alias for `Result<T, trackplot::Error>`.
pub type Result<T> = StdResult<T, Error>;

/// Error raised while loading tables, building profiles or rendering figures.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }
}

/// Specific errors that can happen.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// I/O error while writing output.
    #[error("I/O error - {0}")]
    Io(#[from] io::Error),
    /// The table could not be opened, read or a field could not be parsed.
    #[error("parse error - {0}")]
    Parse(#[from] csv::Error),
    /// A row does not have the fixed 9 tab-separated columns.
    #[error("parse error - line {line} has {found} columns, expected 9")]
    Schema { line: u64, found: usize },
    /// A score table row carries no numeric score.
    #[error("parse error - line {line} has no numeric score")]
    MissingScore { line: u64 },
    /// A gene id is absent from the annotation index.
    #[error("gene id not in annotation - {0}")]
    Lookup(String),
    /// The profile cannot be built or normalized.
    #[error("invalid profile - {0}")]
    InvalidProfile(String),
    /// The coordinate window cannot be rendered.
    #[error("invalid window - [{start}, {end}) with {tick_count} ticks")]
    InvalidWindow { start: u64, end: u64, tick_count: usize },
    /// Drawing backend or layout failure.
    #[error("render error - {0}")]
    Render(String),
    /// Render options could not be read.
    #[error("config error - {0}")]
    Config(#[from] serde_json::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(err.into())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::new(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::new(err.into())
    }
}

/// Map a plotters drawing error into a crate error.
pub(crate) fn render_err<E: fmt::Display>(err: E) -> Error {
    Error::new(ErrorKind::Render(err.to_string()))
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}
