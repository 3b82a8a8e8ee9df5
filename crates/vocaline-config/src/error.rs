//! Errors raised while locating, reading or writing language tables.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    /// Reading a table file.
    Read,
    /// Writing a table file.
    Write,
    /// Creating the directory a table is saved into.
    CreateDir,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
            FileOp::CreateDir => "create directory",
        })
    }
}

/// Failure to produce or persist a [`LanguageTable`](crate::LanguageTable).
///
/// A table that parses never fails on its content: malformed entries are
/// skipped and reported as [`Diagnostic`](crate::Diagnostic)s instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A table file could not be read or written.
    #[error("cannot {op} '{}': {source}", .path.display())]
    File {
        /// What was being attempted.
        op: FileOp,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A table file is not valid TOML for the table schema.
    #[error("table '{}' is malformed: {source}", .path.display())]
    MalformedFile {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error, with line and column.
        #[source]
        source: toml::de::Error,
    },

    /// Table text given directly is not valid TOML for the table schema.
    #[error("table text is malformed: {0}")]
    Malformed(#[from] toml::de::Error),

    /// The table could not be rendered back to TOML.
    #[error("cannot render table as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    /// No factory table or table file answers to the name.
    #[error("table '{name}' not found among factory tables or in {}", searched_list(.searched))]
    UnknownTable {
        /// Name that was looked up.
        name: String,
        /// Directories that were searched.
        searched: Vec<PathBuf>,
    },
}

impl ConfigError {
    pub(crate) fn file(op: FileOp, path: &Path, source: std::io::Error) -> Self {
        ConfigError::File {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn malformed_file(path: &Path, source: toml::de::Error) -> Self {
        ConfigError::MalformedFile {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the file involved, if the error concerns one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::File { path, .. } | ConfigError::MalformedFile { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn searched_list(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "no directories".to_string();
    }
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn denied() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn file_errors_name_the_operation() {
        let read = ConfigError::file(FileOp::Read, Path::new("/t/cvvc.toml"), denied());
        assert_eq!(read.to_string(), "cannot read '/t/cvvc.toml': denied");
        assert_eq!(read.path(), Some(Path::new("/t/cvvc.toml")));
        assert!(read.source().is_some());

        let mkdir = ConfigError::file(FileOp::CreateDir, Path::new("/t"), denied());
        assert!(mkdir.to_string().starts_with("cannot create directory '/t'"));
    }

    #[test]
    fn malformed_file_keeps_path_and_position() {
        let source = toml::from_str::<toml::Table>("name = = 1").unwrap_err();
        let err = ConfigError::malformed_file(Path::new("mine.toml"), source);
        let msg = err.to_string();
        assert!(msg.starts_with("table 'mine.toml' is malformed"), "got: {msg}");
        assert!(msg.contains("line 1"), "got: {msg}");
        assert_eq!(err.path(), Some(Path::new("mine.toml")));
    }

    #[test]
    fn inline_text_errors_convert() {
        let err: ConfigError = toml::from_str::<toml::Table>("= nope").unwrap_err().into();
        assert!(matches!(err, ConfigError::Malformed(_)));
        assert!(err.path().is_none());
    }

    #[test]
    fn unknown_table_lists_searched_dirs() {
        let err = ConfigError::UnknownTable {
            name: "klingon".into(),
            searched: vec![PathBuf::from("/u/tables"), PathBuf::from("/s/tables")],
        };
        assert_eq!(
            err.to_string(),
            "table 'klingon' not found among factory tables or in /u/tables, /s/tables"
        );
        let bare = ConfigError::UnknownTable {
            name: "x".into(),
            searched: Vec::new(),
        };
        assert!(bare.to_string().ends_with("in no directories"));
    }
}
