use crate::Mark;

/// A specialized `Result` type for the tokenizer.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failure reported by a [`CharSource`](crate::CharSource).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid UTF-8 sequence starting with byte {value:#04x}")]
    InvalidUtf8 { value: u8 },
    #[error("control characters are not allowed (U+{value:04X} at offset {offset})")]
    ControlCharacter { offset: usize, value: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a document this tokenizer accepts.
    #[error("{}:{}: {problem}", mark.line + 1, mark.column + 1)]
    InvalidInput { problem: String, mark: Mark },
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl Error {
    pub(crate) fn invalid<T>(problem: impl Into<String>, mark: Mark) -> Result<T> {
        Err(Error::InvalidInput {
            problem: problem.into(),
            mark,
        })
    }

    /// The description of an [`Error::InvalidInput`], if this is one.
    pub fn problem(&self) -> Option<&str> {
        match self {
            Error::InvalidInput { problem, .. } => Some(problem),
            Error::Source(_) => None,
        }
    }

    /// The position at which an [`Error::InvalidInput`] was detected.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            Error::InvalidInput { mark, .. } => Some(*mark),
            Error::Source(_) => None,
        }
    }
}
