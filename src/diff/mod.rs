pub mod types;
pub mod walker;

pub use types::{AddedLine, Diagnostic, ParseOutcome};
pub use walker::{parse, walk};

use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read diff from {source_name}: {error}")]
    Read {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
}

/// Where the diff text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    Stdin,
    File(PathBuf),
}

impl DiffSource {
    /// `-` selects stdin, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            DiffSource::Stdin
        } else {
            DiffSource::File(PathBuf::from(arg))
        }
    }

    /// Read the raw bytes of the diff.
    #[instrument(skip(self), fields(source = %self))]
    pub fn read(&self) -> Result<Vec<u8>, DiffError> {
        let bytes = match self {
            DiffSource::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .map_err(|error| self.read_error(error))?;
                buf
            }
            DiffSource::File(path) => std::fs::read(path).map_err(|error| self.read_error(error))?,
        };
        debug!(diff_bytes = bytes.len(), "read diff");
        Ok(bytes)
    }

    fn read_error(&self, error: std::io::Error) -> DiffError {
        DiffError::Read {
            source_name: self.to_string(),
            error,
        }
    }
}

impl std::fmt::Display for DiffSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffSource::Stdin => write!(f, "<stdin>"),
            DiffSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a diff given as raw bytes.
///
/// Diff text must be UTF-8; anything else is a caller error rather than a
/// malformed diff, and is reported as [`DiffError::InvalidArgument`].
pub fn parse_bytes(raw: &[u8]) -> Result<Vec<AddedLine>, DiffError> {
    walk_bytes(raw).map(|outcome| outcome.lines)
}

/// Like [`parse_bytes`], also returning the walker's diagnostics.
pub fn walk_bytes(raw: &[u8]) -> Result<ParseOutcome, DiffError> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        DiffError::InvalidArgument(format!("diff text is not valid UTF-8: {}", e))
    })?;
    Ok(walk(text))
}
