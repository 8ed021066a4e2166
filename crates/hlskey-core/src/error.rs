use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Errors produced while generating, writing, or cleaning up key material.
#[derive(Debug, Error)]
pub enum KeyInfoError {
    /// The secure random source failed or is unavailable.
    #[error("secure random source unavailable: {reason}")]
    RandomSource { reason: String },
    /// A filesystem operation failed.
    #[error("{op} failed: {source}")]
    Io {
        op: IoOp,
        #[source]
        source: io::Error,
    },
    /// Serialization stopped part way; `written` bytes already reached the sink.
    #[error("writing {line} line failed after {written} bytes: {source}")]
    Write {
        line: Line,
        written: u64,
        #[source]
        source: io::Error,
    },
    /// A file-producing operation ran without key material.
    #[error("key material not initialized")]
    KeyNotInitialized,
    #[error("invalid IV: {reason}")]
    InvalidIv { reason: String },
    #[error("invalid key file {}: {reason}", .path.display())]
    InvalidKeyFile { path: PathBuf, reason: String },
    /// One or more owned artifacts could not be removed.
    #[error("failed to clean up temporary files: {}", join_failures(.failures))]
    Cleanup { failures: Vec<CleanupFailure> },
    /// Keyinfo text did not match the two/three line layout.
    #[error("malformed keyinfo: {reason}")]
    Format { reason: String },
}

impl KeyInfoError {
    pub(crate) fn io(op: IoOp) -> impl FnOnce(io::Error) -> Self {
        move |source| KeyInfoError::Io { op, source }
    }
}

/// Filesystem operations that can fail, named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    CreateKeyFile,
    WriteKeyFile,
    CreateKeyInfoFile,
    WriteKeyInfoFile,
    RemoveKeyFile,
    RemoveKeyInfoFile,
    ReadKeyInfoFile,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IoOp::CreateKeyFile => "creating key file",
            IoOp::WriteKeyFile => "writing key file",
            IoOp::CreateKeyInfoFile => "creating keyinfo file",
            IoOp::WriteKeyInfoFile => "writing keyinfo file",
            IoOp::RemoveKeyFile => "removing key file",
            IoOp::RemoveKeyInfoFile => "removing keyinfo file",
            IoOp::ReadKeyInfoFile => "reading keyinfo file",
        };
        f.write_str(label)
    }
}

/// Keyinfo lines, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Url,
    KeyFile,
    Iv,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Line::Url => "url",
            Line::KeyFile => "key file",
            Line::Iv => "iv",
        })
    }
}

/// A single removal that failed during disposal.
#[derive(Debug)]
pub struct CleanupFailure {
    pub op: IoOp,
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.op, self.path.display(), self.source)
    }
}

fn join_failures(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
