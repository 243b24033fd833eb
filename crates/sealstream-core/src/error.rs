use std::fmt;

use thiserror::Error;

pub type SealResult<T> = Result<T, SealError>;

/// Section of a container that failed authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Filename,
    Header,
    Chunk(u32),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Filename => f.write_str("filename"),
            Segment::Header => f.write_str("header"),
            Segment::Chunk(index) => write!(f, "chunk {index}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SealError {
    #[error("authentication failed at {segment}")]
    Authentication { segment: Segment },

    #[error("container declares {declared} chunks but {actual} were present")]
    TruncationOrExtension { declared: u32, actual: u32 },

    #[error("invalid container format: {0}")]
    InvalidContainerFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("config error: {0}")]
    Config(String),
}

impl SealError {
    /// True for failures that indicate tampering or corruption of the container
    /// rather than a local I/O or setup problem.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            SealError::Authentication { .. }
                | SealError::TruncationOrExtension { .. }
                | SealError::InvalidContainerFormat(_)
        )
    }
}
