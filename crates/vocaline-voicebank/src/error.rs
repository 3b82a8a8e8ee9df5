//! Error types for voicebank loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a voicebank.
///
/// A malformed line inside an `oto.ini` that is otherwise readable does not
/// abort loading; the line is logged and skipped.
#[derive(Debug, Error)]
pub enum VoicebankError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory
    #[error("failed to read directory '{path}': {source}")]
    ReadDir {
        /// Path of the directory that could not be listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The voicebank path is not a directory
    #[error("not a voicebank directory: {0}")]
    NotADirectory(PathBuf),

    /// An oto line does not match `wav=alias,offset,consonant,cutoff,preutter,overlap`
    #[error("malformed oto line '{line}': {reason}")]
    MalformedOto {
        /// The offending line.
        line: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl VoicebankError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VoicebankError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a read directory error.
    pub fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VoicebankError::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed oto line error.
    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        VoicebankError::MalformedOto {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock")
    }

    #[test]
    fn io_variants_display_path_and_source() {
        let err = VoicebankError::read_file("/bank/oto.ini", mock_io_err());
        assert!(err.to_string().contains("/bank/oto.ini"));
        assert!(err.source().is_some());

        let err = VoicebankError::read_dir("/bank", mock_io_err());
        assert!(err.to_string().starts_with("failed to read directory"));
        assert!(err.source().is_some());
    }

    #[test]
    fn malformed_display() {
        let err = VoicebankError::malformed("ka.wav", "missing '='");
        assert_eq!(err.to_string(), "malformed oto line 'ka.wav': missing '='");
        assert!(err.source().is_none());
    }
}
